//! Diagnostic types produced by the rule passes.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which pass produced a diagnostic.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// The file could not be read or parsed.
    Load,
    /// Schema shape: required fields, levels, vocabularies.
    Structure,
    /// Prose heuristics.
    Quality,
    /// Medical-accuracy heuristics.
    Accuracy,
    /// Markdown and citation hygiene.
    Formatting,
    /// Id uniqueness and cross-reference integrity.
    Reference,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Structure => "structure",
            Self::Quality => "quality",
            Self::Accuracy => "accuracy",
            Self::Formatting => "formatting",
            Self::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// Severity level. Only errors affect the `--check` exit code.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; never blocks.
    #[serde(alias = "warn")]
    Warning,
    /// Blocks treating the item as complete.
    Error,
}

impl Severity {
    /// Fixed-width label used in text reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single finding.
///
/// Rules fill in rule, severity, message and pointer; the engine stamps the
/// file and content id before the diagnostic reaches the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// File the finding belongs to.
    pub file: PathBuf,
    /// Id of the content item, when one could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub message: String,
    /// JSON path of the offending field (e.g. `$.levels.3.explanation`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// 1-indexed line within the pointed-to field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Whether `--fix` can correct this finding.
    pub fixable: bool,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        rule_id: impl Into<String>,
        category: RuleCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: PathBuf::new(),
            content_id: None,
            rule_id: rule_id.into(),
            category,
            severity,
            message: message.into(),
            pointer: None,
            line: None,
            suggestion: None,
            fixable: false,
        }
    }

    #[must_use]
    pub fn error(
        rule_id: impl Into<String>,
        category: RuleCategory,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule_id, category, Severity::Error, message)
    }

    #[must_use]
    pub fn warning(
        rule_id: impl Into<String>,
        category: RuleCategory,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule_id, category, Severity::Warning, message)
    }

    #[must_use]
    pub fn at(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    #[must_use]
    pub fn on_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format without the file path, for reports grouped by file.
    #[must_use]
    pub fn format_grouped(&self) -> String {
        Grouped(self).to_string()
    }
}

/// A diagnostic rendered without its file path.
struct Grouped<'a>(&'a Diagnostic);

impl fmt::Display for Grouped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diag = self.0;
        write!(
            f,
            "{:<5} [{}/{}] ",
            diag.severity.label(),
            diag.category,
            diag.rule_id
        )?;
        if let Some(id) = &diag.content_id {
            write!(f, "{id}: ")?;
        }
        f.write_str(&diag.message)?;
        match (&diag.pointer, diag.line) {
            (Some(pointer), Some(line)) => write!(f, " (at {pointer}, line {line})")?,
            (Some(pointer), None) => write!(f, " (at {pointer})")?,
            (None, Some(line)) => write!(f, " (line {line})")?,
            (None, None) => {}
        }
        if let Some(suggestion) = &diag.suggestion {
            write!(f, " (hint: {suggestion})")?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), Grouped(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error("missing-level", RuleCategory::Structure, "missing level 5")
            .at("$.levels")
            .with_suggestion("add a level 5 entry");

        assert_eq!(diag.rule_id, "missing-level");
        assert!(diag.is_error());
        assert_eq!(diag.pointer.as_deref(), Some("$.levels"));
        assert!(!diag.fixable);
    }

    #[test]
    fn test_format_grouped() {
        let mut diag = Diagnostic::warning(
            "list-markers",
            RuleCategory::Formatting,
            "mixed bullet markers",
        )
        .at("$.levels.2.explanation")
        .on_line(4)
        .fixable();
        diag.content_id = Some("ear-otitis-media".to_owned());

        assert_eq!(
            diag.format_grouped(),
            "WARN  [formatting/list-markers] ear-otitis-media: mixed bullet markers (at $.levels.2.explanation, line 4)"
        );
    }

    #[test]
    fn test_display_includes_file_and_hint() {
        let mut diag = Diagnostic::error(
            "placeholder-text",
            RuleCategory::Accuracy,
            "placeholder text 'TBD'",
        )
        .at("$.nameEs")
        .with_suggestion("replace the placeholder");
        diag.file = PathBuf::from("core/content/ent/otitis-media.json");

        assert_eq!(
            diag.to_string(),
            "core/content/ent/otitis-media.json: ERROR [accuracy/placeholder-text] placeholder text 'TBD' (at $.nameEs) (hint: replace the placeholder)"
        );
    }

    #[test]
    fn test_severity_accepts_warn_alias() {
        let sev: Severity = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(sev, Severity::Warning);
    }
}
