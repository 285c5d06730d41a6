//! YAML content module parser.
//!
//! YAML documents are deserialized to `serde_json::Value` so every rule pass
//! works on one tree representation.

use std::path::Path;

use serde_json::Value;

use crate::error::{ScanError, ScanErrorKind};
use crate::format::{Document, ParsedFile};

/// Split a YAML stream on `---` separator lines.
///
/// Returns `(original_index, text)` pairs; empty segments are dropped but
/// still counted so indices match the stream.
fn split_yaml_documents(content: &str) -> Vec<(usize, String)> {
    let mut documents = Vec::new();
    let mut current_doc: Vec<&str> = Vec::new();
    let mut index = 0;

    for line in content.lines() {
        if line.trim() == "---" {
            let doc = current_doc.join("\n");
            if !doc.trim().is_empty() {
                documents.push((index, doc));
                index += 1;
            }
            current_doc.clear();
            continue;
        }
        current_doc.push(line);
    }

    let doc = current_doc.join("\n");
    if !doc.trim().is_empty() {
        documents.push((index, doc));
    }

    documents
}

/// Parse a YAML content module into its documents.
///
/// The whole stream is parsed first. If that fails (e.g. one malformed
/// document), documents are parsed one by one so valid siblings are still
/// linted; each broken document becomes its own load error. If nothing
/// parses, a single file-level error is reported.
pub fn parse_yaml_content(content: &str, path: &Path) -> ParsedFile {
    match serde_saphyr::from_multiple::<Value>(content) {
        Ok(docs) => ParsedFile {
            documents: docs
                .into_iter()
                .enumerate()
                .map(|(index, value)| Document { index, value })
                .collect(),
            errors: Vec::new(),
        },
        Err(stream_err) => {
            let mut parsed = ParsedFile::default();
            for (index, segment) in split_yaml_documents(content) {
                match serde_saphyr::from_str::<Value>(&segment) {
                    Ok(value) => parsed.documents.push(Document { index, value }),
                    Err(doc_err) => parsed.errors.push(ScanError::new(
                        path,
                        ScanErrorKind::YamlParseError,
                        format!(
                            "YAML parse error in document {} of multi-document stream: {doc_err}",
                            index + 1
                        ),
                    )),
                }
            }

            if parsed.documents.is_empty() {
                parsed.errors = vec![ScanError::new(
                    path,
                    ScanErrorKind::YamlParseError,
                    format!("YAML parse error: {stream_err}"),
                )];
            }
            parsed
        }
    }
}

/// Whether `content` still parses as YAML. Used by the fixer before rewriting.
pub fn is_valid_yaml(content: &str) -> bool {
    serde_saphyr::from_multiple::<Value>(content).is_ok()
}
