//! Content item extraction and classification.
//!
//! A parsed document may hold one item, an array of items, or a keyed map of
//! items (possibly nested). Each object is duck-typed: strict
//! `EducationalContent`, a custom/legacy module, or not content at all.

use std::path::{Path, PathBuf};

use curriculum::slug::slugify;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ScanError;
use crate::format::{self, Document, ParsedFile};
use crate::strategy::ContentFormat;
use crate::strategy::fs::{ScanResult, content_format_for, read_file_bounded};

/// Deepest container nesting followed when looking for items.
pub const MAX_NESTING: usize = 4;

/// Which family an extracted object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemShape {
    /// Conforms (or tries to conform) to `EducationalContent`; every pass runs.
    Strict,
    /// Bespoke module with level-like entries; only the reduced rules run.
    Custom,
}

/// One content object found in a file.
#[derive(Debug, Clone)]
pub struct ContentEntry {
    pub file: PathBuf,
    /// Document position within a multi-document YAML stream.
    pub document: usize,
    /// JSON path of the object inside its document (`$`, `$.otitisMedia`, `$[2]`).
    pub pointer: String,
    /// Logical slug the id is expected to match, if one can be derived.
    pub slug: Option<String>,
    pub shape: ItemShape,
    pub value: Value,
}

impl ContentEntry {
    /// The raw `id` string, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.value.get("id").and_then(Value::as_str)
    }

    /// Extend this entry's pointer with a field path.
    #[must_use]
    pub fn pointer_to(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.pointer)
    }
}

/// A content module after reading and parsing.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub format: ContentFormat,
    pub line_count: usize,
    pub entries: Vec<ContentEntry>,
    pub load_errors: Vec<ScanError>,
}

impl LoadedFile {
    /// Whether nothing at all could be parsed from the file.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        !self.load_errors.is_empty() && self.entries.is_empty()
    }
}

/// Read, parse and extract one file. Never fails; problems become load errors.
pub fn load_file(path: &Path, max_file_size: u64) -> Option<LoadedFile> {
    let format = content_format_for(path)?;
    let content = match read_file_bounded(path, max_file_size) {
        ScanResult::Ok(c) => c,
        ScanResult::Err(e) => {
            return Some(LoadedFile {
                path: path.to_owned(),
                format,
                line_count: 0,
                entries: Vec::new(),
                load_errors: vec![e],
            });
        }
    };

    let parsed = parse_content(&content, path, format);
    let entries = extract_entries(path, &parsed.documents);
    tracing::debug!(
        file = %path.display(),
        items = entries.len(),
        "loaded content module"
    );

    Some(LoadedFile {
        path: path.to_owned(),
        format,
        line_count: content.lines().count(),
        entries,
        load_errors: parsed.errors,
    })
}

/// Dispatch to the parser for `format`.
#[must_use]
pub fn parse_content(content: &str, path: &Path, format: ContentFormat) -> ParsedFile {
    match format {
        ContentFormat::Json => format::json::parse_json_content(content, path),
        ContentFormat::Yaml => format::yaml::parse_yaml_content(content, path),
    }
}

/// Duck-type one object.
///
/// Strict: `levels` is an object and either some level entry has `summary` or
/// `explanation`, or the object has both `name` and `type`.
/// Custom: `levels` (object or array) entries carry a `content` or
/// `explanation` string without the strict shape.
#[must_use]
pub fn classify(value: &Value) -> Option<ItemShape> {
    let obj = value.as_object()?;
    let levels = obj.get("levels")?;

    if let Some(level_map) = levels.as_object() {
        let has_level_prose = level_map.values().any(|entry| {
            entry
                .as_object()
                .is_some_and(|e| e.contains_key("summary") || e.contains_key("explanation"))
        });
        if has_level_prose || (obj.contains_key("name") && obj.contains_key("type")) {
            return Some(ItemShape::Strict);
        }
    }

    let entries: Vec<&Value> = match levels {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => return None,
    };
    let custom = entries.iter().any(|entry| {
        ["content", "explanation"]
            .iter()
            .any(|key| entry.get(*key).is_some_and(Value::is_string))
    });
    custom.then_some(ItemShape::Custom)
}

/// Extract every content object from a file's documents, in document order.
#[must_use]
pub fn extract_entries(path: &Path, documents: &[Document]) -> Vec<ContentEntry> {
    let mut entries = Vec::new();
    for doc in documents {
        walk(&doc.value, path, doc.index, "$", None, 0, &mut entries);
    }

    // A lone item with no export key takes its slug from the file name.
    if let [only] = entries.as_mut_slice()
        && only.slug.is_none()
        && let Some(stem) = path.file_stem()
    {
        only.slug = Some(slugify(&stem.to_string_lossy()));
    }
    entries
}

fn walk(
    value: &Value,
    path: &Path,
    document: usize,
    pointer: &str,
    key: Option<&str>,
    depth: usize,
    out: &mut Vec<ContentEntry>,
) {
    if let Some(shape) = classify(value) {
        out.push(ContentEntry {
            file: path.to_owned(),
            document,
            pointer: pointer.to_owned(),
            slug: key.map(slugify),
            shape,
            value: value.clone(),
        });
        return;
    }
    if depth >= MAX_NESTING {
        return;
    }
    match value {
        Value::Object(map) => walk_map(map, path, document, pointer, depth, out),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, path, document, &format!("{pointer}[{i}]"), None, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn walk_map(
    map: &Map<String, Value>,
    path: &Path,
    document: usize,
    pointer: &str,
    depth: usize,
    out: &mut Vec<ContentEntry>,
) {
    for (key, child) in map {
        if child.is_object() || child.is_array() {
            walk(
                child,
                path,
                document,
                &format!("{pointer}.{key}"),
                Some(key),
                depth + 1,
                out,
            );
        }
    }
}
