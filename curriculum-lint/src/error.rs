//! Error types for content linting.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The kind of load failure that prevented a content file from being linted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ScanErrorKind {
    /// An I/O error occurred while reading the file.
    IoError,
    /// The file exceeded the configured maximum size limit.
    FileTooLarge,
    /// The file content could not be parsed as valid JSON.
    JsonParseError,
    /// The file content could not be parsed as valid YAML.
    YamlParseError,
    /// The file content is not valid UTF-8.
    InvalidEncoding,
    /// The resolved path is outside the scan root (symlink escape).
    OutsideRoot,
    /// A resource limit (`max_files` or `max_total_bytes`) was reached, truncating the scan.
    LimitExceeded,
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
}

/// A load error: a file (or one document in it) that could not be linted at all.
///
/// Load errors are isolated per file. They surface in the report as `ERROR`
/// diagnostics under the `load-error` rule and never abort the scan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ScanError {
    /// The file path that could not be loaded.
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: ScanErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ScanError {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Invalid linter configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid external id pattern '{pattern}': {message}")]
    ExternalIdPattern { pattern: String, message: String },

    #[error("`load-error` cannot be disabled or downgraded")]
    LoadErrorOverride,

    #[error("unknown rule '{0}'")]
    UnknownRule(String),
}

/// A fix could not be written back.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize fixed content for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
