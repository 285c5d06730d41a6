//! Configuration types for content linting.
//!
//! Split into lint config (what is checked) and source-specific config (where
//! content comes from), so the rule passes never see filesystem concerns.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Deserialize;

use crate::diagnostic::Severity;
use crate::error::ConfigError;
use crate::rules::{LOAD_ERROR, RULE_IDS};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".content-lint.yaml";

/// Content roots scanned when no paths are given.
pub const DEFAULT_ROOTS: &[&str] = &["core/content", "core/womens-health"];

/// Per-level prose length expectations, in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct LengthLimits {
    /// Minimum explanation length for levels 1 through 5.
    pub min_explanation_chars: [usize; 5],
    pub max_summary_chars: usize,
    pub max_explanation_chars: usize,
}

impl Default for LengthLimits {
    fn default() -> Self {
        Self {
            min_explanation_chars: [40, 60, 80, 100, 120],
            max_summary_chars: 600,
            max_explanation_chars: 12_000,
        }
    }
}

impl LengthLimits {
    /// Minimum explanation length for a 1-based level.
    #[must_use]
    pub fn min_explanation(&self, level: u8) -> usize {
        let idx = usize::from(level.saturating_sub(1)).min(4);
        self.min_explanation_chars[idx]
    }
}

/// Core lint config. Applies regardless of input source.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LintConfig {
    /// Glob patterns for ids that live outside the scanned corpus.
    /// Dangling references to matching ids are not reported.
    pub external_ids: Vec<String>,
    /// Rule ids whose diagnostics are dropped.
    pub disabled_rules: BTreeSet<String>,
    /// Rule id to severity remaps. Never applied to `load-error`.
    pub severity_overrides: BTreeMap<String, Severity>,
    /// Report `sibling`/`related` links without a link back (default: on).
    pub reciprocal_links: bool,
    pub limits: LengthLimits,
    /// Content files longer than this are flagged (default: 600).
    pub max_file_lines: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            external_ids: Vec::new(),
            disabled_rules: BTreeSet::new(),
            severity_overrides: BTreeMap::new(),
            reciprocal_links: true,
            limits: LengthLimits::default(),
            max_file_lines: 600,
        }
    }
}

impl LintConfig {
    /// Check rule names and patterns before a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unknown rule ids, an attempt to disable or
    /// remap `load-error`, or an unparsable external id glob.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = self
            .disabled_rules
            .iter()
            .chain(self.severity_overrides.keys());
        for rule in named {
            if rule == LOAD_ERROR {
                return Err(ConfigError::LoadErrorOverride);
            }
            if !RULE_IDS.contains(&rule.as_str()) {
                return Err(ConfigError::UnknownRule(rule.clone()));
            }
        }
        self.external_id_patterns().map(|_| ())
    }

    /// Compile `external_ids` into glob patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ExternalIdPattern`] for the first invalid pattern.
    pub fn external_id_patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.external_ids
            .iter()
            .map(|raw| {
                Pattern::new(raw).map_err(|e| ConfigError::ExternalIdPattern {
                    pattern: raw.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        rule_id == LOAD_ERROR || !self.disabled_rules.contains(rule_id)
    }

    /// Effective severity for a diagnostic of `rule_id` emitted at `emitted`.
    #[must_use]
    pub fn severity_for(&self, rule_id: &str, emitted: Severity) -> Severity {
        if rule_id == LOAD_ERROR {
            return emitted;
        }
        self.severity_overrides
            .get(rule_id)
            .copied()
            .unwrap_or(emitted)
    }
}

/// Filesystem-specific source options.
///
/// NOTE: `paths` is required and must be non-empty. Default content roots are
/// a CLI concern, not baked into the library.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct FsSourceConfig {
    /// Paths to scan (files or directories). Required, must be non-empty.
    pub paths: Vec<PathBuf>,
    /// Exclude patterns (glob format).
    pub exclude: Vec<String>,
    /// Maximum file size in bytes (default: 10 MB).
    pub max_file_size: u64,
    /// Whether to follow symbolic links.
    ///
    /// **Defaults to `false`**. Following symlinks allows escaping the content
    /// root; files that resolve outside it are reported as load errors either way.
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: 64).
    pub max_depth: usize,
    /// Maximum total number of files to scan (default: `100_000`).
    pub max_files: usize,
    /// Maximum total bytes to read across all files (default: 512 MB).
    pub max_total_bytes: u64,
}

impl Default for FsSourceConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            exclude: Vec::new(),
            max_file_size: 10_485_760,
            follow_links: false,
            max_depth: 64,
            max_files: 100_000,
            max_total_bytes: 536_870_912,
        }
    }
}

/// On-disk shape of `.content-lint.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub roots: Option<Vec<PathBuf>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub external_ids: Option<Vec<String>>,
    #[serde(default)]
    pub disabled_rules: Option<Vec<String>>,
    #[serde(default)]
    pub severity_overrides: Option<BTreeMap<String, Severity>>,
    #[serde(default)]
    pub reciprocal_links: Option<bool>,
    #[serde(default)]
    pub min_explanation_chars: Option<[usize; 5]>,
    #[serde(default)]
    pub max_summary_chars: Option<usize>,
    #[serde(default)]
    pub max_explanation_chars: Option<usize>,
    #[serde(default)]
    pub max_file_lines: Option<usize>,
}

impl FileConfig {
    /// Read and parse a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] for malformed YAML or unknown keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse config text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or unknown keys.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            message: e.to_string(),
        })
    }

    /// Layer the lint settings from this file over `config`.
    pub fn apply_to(&self, config: &mut LintConfig) {
        if let Some(ids) = &self.external_ids {
            config.external_ids.clone_from(ids);
        }
        if let Some(rules) = &self.disabled_rules {
            config.disabled_rules = rules.iter().cloned().collect();
        }
        if let Some(overrides) = &self.severity_overrides {
            config.severity_overrides.clone_from(overrides);
        }
        if let Some(reciprocal) = self.reciprocal_links {
            config.reciprocal_links = reciprocal;
        }
        if let Some(mins) = self.min_explanation_chars {
            config.limits.min_explanation_chars = mins;
        }
        if let Some(max) = self.max_summary_chars {
            config.limits.max_summary_chars = max;
        }
        if let Some(max) = self.max_explanation_chars {
            config.limits.max_explanation_chars = max;
        }
        if let Some(max) = self.max_file_lines {
            config.max_file_lines = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LintConfig::default();
        assert!(config.reciprocal_links);
        assert_eq!(config.max_file_lines, 600);
        assert_eq!(config.limits.min_explanation(1), 40);
        assert_eq!(config.limits.min_explanation(5), 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_config_applies_over_defaults() {
        let text = "\
external_ids:
  - future-*
disabled_rules:
  - missing-analogy
severity_overrides:
  dangling-reference: error
reciprocal_links: false
min_explanation_chars: [10, 20, 30, 40, 50]
";
        let file = FileConfig::parse(text, Path::new(".content-lint.yaml")).unwrap();
        let mut config = LintConfig::default();
        file.apply_to(&mut config);

        assert_eq!(config.external_ids, vec!["future-*".to_owned()]);
        assert!(!config.is_enabled("missing-analogy"));
        assert_eq!(
            config.severity_for("dangling-reference", Severity::Warning),
            Severity::Error
        );
        assert!(!config.reciprocal_links);
        assert_eq!(config.limits.min_explanation(3), 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let result = FileConfig::parse("colour: true\n", Path::new("x.yaml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_error_cannot_be_disabled() {
        let mut config = LintConfig::default();
        config.disabled_rules.insert(LOAD_ERROR.to_owned());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LoadErrorOverride)
        ));
        assert!(config.is_enabled(LOAD_ERROR));
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let mut config = LintConfig::default();
        config
            .severity_overrides
            .insert("no-such-rule".to_owned(), Severity::Error);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_invalid_external_pattern() {
        let mut config = LintConfig::default();
        config.external_ids.push("[unclosed".to_owned());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ExternalIdPattern { .. })
        ));
    }
}
