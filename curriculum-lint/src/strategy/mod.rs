//! Content source strategies.
//!
//! Only the filesystem strategy exists. The linter reads content modules from
//! disk; there is no second source that would justify a trait here.

pub mod fs;

/// Serialization format of a content module, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Json,
    Yaml,
}
