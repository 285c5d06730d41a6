//! JSON content module parser.

use std::path::Path;

use serde_json::Value;

use crate::error::{ScanError, ScanErrorKind};
use crate::format::{Document, ParsedFile};

/// Parse a JSON content module into a single document.
///
/// Invalid JSON is a load error for the file, never silently ignored.
pub fn parse_json_content(content: &str, path: &Path) -> ParsedFile {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => ParsedFile {
            documents: vec![Document { index: 0, value }],
            errors: Vec::new(),
        },
        Err(e) => ParsedFile {
            documents: Vec::new(),
            errors: vec![ScanError::new(
                path,
                ScanErrorKind::JsonParseError,
                format!("JSON parse error: {e}"),
            )],
        },
    }
}
