//! Runs the rule passes over a loaded corpus.
//!
//! Input-agnostic: the engine sees loaded files and discovery errors, never
//! the filesystem. The corpus index is built once per run and shared by
//! borrow with every rule.

use curriculum::EducationalContent;
use glob::Pattern;

use crate::config::LintConfig;
use crate::diagnostic::{Diagnostic, RuleCategory};
use crate::error::{ConfigError, ScanError};
use crate::index::CorpusIndex;
use crate::loader::{ContentEntry, ItemShape, LoadedFile};
use crate::report::{FileReport, LintReport};
use crate::rules::{self, BoxedRule, FILE_LENGTH, LOAD_ERROR, RuleContext, structural};
use crate::typed::lenient_item;

pub struct Engine<'a> {
    config: &'a LintConfig,
    external_ids: Vec<Pattern>,
    strict: Vec<BoxedRule>,
    custom: Vec<BoxedRule>,
}

impl<'a> Engine<'a> {
    /// Prepare an engine with every built-in rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` names unknown rules or holds an
    /// invalid external id pattern.
    pub fn new(config: &'a LintConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            external_ids: config.external_id_patterns()?,
            strict: rules::strict_rules(),
            custom: rules::custom_rules(),
        })
    }

    /// Lint every loaded file. `discovery_errors` are failures from before
    /// any file was read (walk errors, root escapes, budget truncation).
    #[must_use]
    pub fn lint(&self, files: &[LoadedFile], discovery_errors: &[ScanError]) -> LintReport {
        let index = CorpusIndex::build(files.iter().flat_map(|f| &f.entries));
        tracing::debug!(ids = index.len(), "built corpus index");

        let mut reports: Vec<FileReport> = files
            .iter()
            .map(|file| self.lint_file(file, &index))
            .collect();
        for err in discovery_errors {
            let mut report = FileReport::new(err.file.clone());
            report.diagnostics.push(load_error(err));
            reports.push(report);
        }
        reports.sort_by(|a, b| a.file.cmp(&b.file));

        let failed_loaded = files.iter().filter(|f| f.is_failed()).count();
        LintReport {
            scanned_files: files.len() - failed_loaded,
            failed_files: failed_loaded + discovery_errors.len(),
            items: reports.iter().map(|r| r.items).sum(),
            custom_items: reports.iter().map(|r| r.custom_items).sum(),
            fixed_files: None,
            files: reports,
        }
    }

    fn lint_file(&self, file: &LoadedFile, index: &CorpusIndex) -> FileReport {
        let mut report = FileReport::new(file.path.clone());
        report
            .diagnostics
            .extend(file.load_errors.iter().map(load_error));

        if file.line_count > self.config.max_file_lines {
            let diagnostic = Diagnostic::warning(
                FILE_LENGTH,
                RuleCategory::Formatting,
                format!(
                    "file has {} lines, more than {}",
                    file.line_count, self.config.max_file_lines
                ),
            )
            .with_suggestion("split the module into smaller files");
            report.diagnostics.extend(self.finalize(file, None, vec![diagnostic]));
        }
        if let Some(diagnostic) = structural::file_name_diagnostic(&file.path) {
            report.diagnostics.extend(self.finalize(file, None, vec![diagnostic]));
        }

        for entry in &file.entries {
            let diagnostics = match entry.shape {
                ItemShape::Strict => {
                    report.items += 1;
                    self.lint_strict(entry, index)
                }
                ItemShape::Custom => {
                    report.custom_items += 1;
                    let label = entry.id().unwrap_or(&entry.pointer);
                    tracing::info!(
                        file = %file.path.display(),
                        item = label,
                        "custom content module, skipped strict schema"
                    );
                    report
                        .notices
                        .push(format!("{label}: custom content module, skipped strict schema"));
                    self.run(&self.custom, entry, None, index)
                }
            };
            tracing::debug!(
                file = %file.path.display(),
                pointer = %entry.pointer,
                diagnostics = diagnostics.len(),
                "linted item"
            );
            report
                .diagnostics
                .extend(self.finalize(file, entry.id(), diagnostics));
        }
        report
    }

    fn lint_strict(&self, entry: &ContentEntry, index: &CorpusIndex) -> Vec<Diagnostic> {
        let view = lenient_item(&entry.value);
        let mut diagnostics = self.run(&self.strict, entry, view.as_ref(), index);

        // The view papers over fields strict typing rejects; make sure the
        // item cannot look clean.
        if let Err(err) = serde_json::from_value::<EducationalContent>(entry.value.clone()) {
            let has_structure_error = diagnostics
                .iter()
                .any(|d| d.is_error() && d.category == RuleCategory::Structure);
            if !has_structure_error {
                diagnostics.push(
                    Diagnostic::error(
                        "field-type",
                        RuleCategory::Structure,
                        format!("item does not match the content schema: {err}"),
                    )
                    .at(entry.pointer.clone()),
                );
            }
        }
        diagnostics
    }

    fn run(
        &self,
        rules: &[BoxedRule],
        entry: &ContentEntry,
        item: Option<&EducationalContent>,
        index: &CorpusIndex,
    ) -> Vec<Diagnostic> {
        let ctx = RuleContext {
            entry,
            item,
            index,
            config: self.config,
            external_ids: &self.external_ids,
        };
        rules.iter().flat_map(|rule| rule.check(&ctx)).collect()
    }

    /// Stamp file and item id, drop disabled rules and apply severity overrides.
    fn finalize(
        &self,
        file: &LoadedFile,
        content_id: Option<&str>,
        diagnostics: Vec<Diagnostic>,
    ) -> impl Iterator<Item = Diagnostic> {
        let content_id = content_id.map(str::to_owned);
        diagnostics
            .into_iter()
            .filter(move |d| self.config.is_enabled(&d.rule_id))
            .map(move |mut d| {
                d.file.clone_from(&file.path);
                d.content_id.clone_from(&content_id);
                d.severity = self.config.severity_for(&d.rule_id, d.severity);
                d
            })
    }
}

fn load_error(err: &ScanError) -> Diagnostic {
    let mut diagnostic = Diagnostic::error(LOAD_ERROR, RuleCategory::Load, err.message.clone());
    diagnostic.file.clone_from(&err.file);
    diagnostic
}
