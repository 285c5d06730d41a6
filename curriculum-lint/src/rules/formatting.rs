//! Markdown hygiene in level prose, key-term emphasis and citation completeness.

use super::{BoxedRule, LintRule, RuleContext};
use crate::diagnostic::{Diagnostic, RuleCategory, Severity};
use crate::markdown::{
    Finding, box_drawing_lines, check_emphasis, check_headings, check_list_markers, check_tables,
    trailing_whitespace_lines,
};

const CATEGORY: RuleCategory = RuleCategory::Formatting;

/// Markdown-bearing level fields.
const MARKDOWN_FIELDS: &[&str] = &["explanation", "clinicalNotes"];

/// Markdown checks over `explanation` and `clinicalNotes`.
pub struct MarkdownRule;

impl MarkdownRule {
    fn findings(
        pointer: &str,
        rule_id: &str,
        severity: Severity,
        fixable: bool,
        findings: Vec<Finding>,
    ) -> impl Iterator<Item = Diagnostic> {
        findings.into_iter().map(move |finding| {
            let diagnostic = Diagnostic::new(rule_id, CATEGORY, severity, finding.message)
                .at(pointer)
                .on_line(finding.line);
            if fixable { diagnostic.fixable() } else { diagnostic }
        })
    }

    fn check_text(pointer: &str, text: &str) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        diagnostics.extend(Self::findings(
            pointer,
            "table-shape",
            Severity::Error,
            false,
            check_tables(text),
        ));
        diagnostics.extend(Self::findings(
            pointer,
            "list-markers",
            Severity::Warning,
            true,
            check_list_markers(text),
        ));
        diagnostics.extend(Self::findings(
            pointer,
            "unbalanced-emphasis",
            Severity::Error,
            false,
            check_emphasis(text),
        ));
        diagnostics.extend(Self::findings(
            pointer,
            "heading-jump",
            Severity::Warning,
            false,
            check_headings(text),
        ));

        if let Some(&line) = box_drawing_lines(text).first() {
            diagnostics.push(
                Diagnostic::error(
                    "box-drawing",
                    CATEGORY,
                    "box-drawing characters do not render reliably",
                )
                .at(pointer)
                .on_line(line)
                .with_suggestion("use a markdown table or list instead"),
            );
        }

        let trailing = trailing_whitespace_lines(text);
        if let Some(&line) = trailing.first() {
            diagnostics.push(
                Diagnostic::warning(
                    "trailing-whitespace",
                    CATEGORY,
                    format!("{} line(s) end in whitespace", trailing.len()),
                )
                .at(pointer)
                .on_line(line)
                .fixable(),
            );
        }
        diagnostics
    }
}

impl LintRule for MarkdownRule {
    fn id(&self) -> &'static str {
        "markdown"
    }

    fn description(&self) -> &'static str {
        "Tables, lists, emphasis and headings in level prose are well formed"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let mut diagnostics = Vec::new();
        for (level, content) in &item.levels {
            for &field in MARKDOWN_FIELDS {
                let text = match field {
                    "explanation" => Some(content.explanation.as_str()),
                    _ => content.clinical_notes.as_deref(),
                };
                let Some(text) = text else { continue };
                let pointer = ctx.pointer(&format!("levels.{level}.{field}"));
                diagnostics.extend(Self::check_text(&pointer, text));
            }
        }
        diagnostics
    }
}

/// Citations need an id, type, title and source; websites also need a url.
pub struct CitationFieldsRule;

impl LintRule for CitationFieldsRule {
    fn id(&self) -> &'static str {
        "citation-fields"
    }

    fn description(&self) -> &'static str {
        "Citation records are complete"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        item.citations
            .iter()
            .enumerate()
            .filter_map(|(i, citation)| {
                let missing = citation.missing_fields();
                if missing.is_empty() {
                    return None;
                }
                let name = if citation.id.trim().is_empty() {
                    format!("#{}", i + 1)
                } else {
                    format!("'{}'", citation.id)
                };
                Some(
                    Diagnostic::warning(
                        "citation-fields",
                        CATEGORY,
                        format!("citation {name} is missing {}", missing.join(", ")),
                    )
                    .at(ctx.pointer(&format!("citations[{i}]"))),
                )
            })
            .collect()
    }
}

/// Emphasis markers, doubled forms first so `**t**` is not also read as `*t*`.
const EMPHASIS_MARKERS: &[&str] = &["**", "__", "*", "_"];

/// Markers wrapped around `term` somewhere in `text`, case-insensitively.
fn emphasis_styles(text: &str, term: &str) -> Vec<&'static str> {
    let term = term.to_lowercase();
    let mut rest = text.to_lowercase();
    let mut styles = Vec::new();
    for &marker in EMPHASIS_MARKERS {
        let wrapped = format!("{marker}{term}{marker}");
        if rest.contains(&wrapped) {
            styles.push(marker);
            rest = rest.replace(&wrapped, " ");
        }
    }
    styles
}

/// A key term is emphasised the same way everywhere in its level.
pub struct KeyTermFormatRule;

impl LintRule for KeyTermFormatRule {
    fn id(&self) -> &'static str {
        "key-term-format"
    }

    fn description(&self) -> &'static str {
        "Key terms use one emphasis style within a level"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let mut diagnostics = Vec::new();
        for (level, content) in &item.levels {
            let text = match content.clinical_notes.as_deref() {
                Some(notes) => format!("{}\n{notes}", content.explanation),
                None => content.explanation.clone(),
            };
            for (i, key_term) in content.key_terms.iter().enumerate() {
                let term = key_term.term.trim();
                if term.is_empty() {
                    continue;
                }
                let styles = emphasis_styles(&text, term);
                if styles.len() < 2 {
                    continue;
                }
                let listed = styles
                    .iter()
                    .map(|m| format!("`{m}`"))
                    .collect::<Vec<_>>()
                    .join(" and ");
                diagnostics.push(
                    Diagnostic::warning(
                        "key-term-format",
                        CATEGORY,
                        format!("key term '{term}' is emphasised with both {listed} at level {level}"),
                    )
                    .at(ctx.pointer(&format!("levels.{level}.keyTerms[{i}]")))
                    .with_suggestion(format!("use `{}` throughout", styles[0])),
                );
            }
        }
        diagnostics
    }
}

/// Returns all formatting rules.
///
/// `file-length` is a per-file check and runs in the engine.
#[must_use]
pub fn formatting_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(MarkdownRule),
        Box::new(KeyTermFormatRule),
        Box::new(CitationFieldsRule),
    ]
}
