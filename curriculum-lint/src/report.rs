//! Lint report types.

use std::path::PathBuf;

use serde::Serialize;

use crate::diagnostic::{Diagnostic, Severity};

/// Findings for one content file.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct FileReport {
    pub file: PathBuf,
    /// Strict items linted in this file.
    pub items: usize,
    /// Custom/legacy modules linted with the reduced rule set.
    pub custom_items: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Informational messages (skipped custom modules). Never affect the exit code.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl FileReport {
    #[must_use]
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            items: 0,
            custom_items: 0,
            diagnostics: Vec::new(),
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.notices.is_empty()
    }
}

/// Result of a lint run.
///
/// CI gating looks only at error-severity diagnostics; load errors are
/// diagnostics too, so an unreadable file fails `--check`.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct LintReport {
    /// Files read and parsed (possibly with per-document load errors).
    pub scanned_files: usize,
    /// Files that could not be linted at all.
    pub failed_files: usize,
    /// Strict items linted across the corpus.
    pub items: usize,
    /// Custom/legacy modules linted across the corpus.
    pub custom_items: usize,
    /// Files rewritten by `--fix` before this report was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_files: Option<usize>,
    /// One entry per file, ordered by path.
    pub files: Vec<FileReport>,
}

impl LintReport {
    /// Total number of files attempted (scanned + failed).
    #[must_use]
    pub fn files_attempted(&self) -> usize {
        self.scanned_files + self.failed_files
    }

    /// Every diagnostic in file order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|f| &f.diagnostics)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Number of error-severity diagnostics.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning-severity diagnostics.
    #[must_use]
    pub fn warnings_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(Diagnostic::is_error)
    }

    /// `N errors, M warnings across K files`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} errors, {} warnings across {} files",
            self.errors_count(),
            self.warnings_count(),
            self.files_attempted()
        )
    }

    /// Process outcome for this report.
    ///
    /// Advisory mode always succeeds; `check` fails if and only if an error
    /// exists anywhere in the corpus.
    #[must_use]
    pub fn exit_status(&self, check: bool) -> ExitStatus {
        if check && self.has_errors() {
            ExitStatus::ErrorsFound
        } else {
            ExitStatus::Clean
        }
    }
}

/// Process exit codes of `content-linter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// No blocking findings (or advisory mode).
    Clean,
    /// `--check` and at least one error.
    ErrorsFound,
    /// The run itself failed (bad config, missing path).
    Fatal,
}

impl ExitStatus {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::ErrorsFound => 1,
            Self::Fatal => 2,
        }
    }
}
