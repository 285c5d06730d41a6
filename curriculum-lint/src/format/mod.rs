//! Format-specific document parsers.
//!
//! Each sub-module turns file text into `serde_json::Value` documents:
//! - `json` for a single JSON document
//! - `yaml` for YAML streams, with per-document fallback on parse failure

pub mod json;
pub mod yaml;

use serde_json::Value;

use crate::error::ScanError;

/// One parsed document from a content module.
#[derive(Debug, Clone)]
pub struct Document {
    /// 0-based position in a multi-document stream.
    pub index: usize,
    pub value: Value,
}

/// Everything that could be parsed from one file.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub documents: Vec<Document>,
    /// Documents (or the whole file) that failed to parse.
    pub errors: Vec<ScanError>,
}
