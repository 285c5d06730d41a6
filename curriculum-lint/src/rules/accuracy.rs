//! Medical-accuracy heuristics: leftover placeholders, code formats, and
//! absolute claims.

use std::sync::LazyLock;

use curriculum::EducationalContent;
use regex::Regex;

use super::{BoxedRule, LintRule, RuleContext};
use crate::diagnostic::{Diagnostic, RuleCategory, Severity};
use crate::markdown::prose_lines;

const CATEGORY: RuleCategory = RuleCategory::Accuracy;

/// Upper-case markers are matched case-sensitively so Spanish "todo" passes.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"\b(?:TODO|FIXME|TBD)\b|(?i:\blorem ipsum\b|\bplaceholder\b)") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid placeholder regex: {err}"),
    }
});

static ICD11_CODE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(?:[A-Z][A-Z0-9]?\d{1,2}|\d[A-Z][A-Z0-9]\d)(?:\.[A-Z0-9]{1,3})?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid ICD-11 regex: {err}"),
    }
});

static ICD11_MENTION: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"ICD-11:\s*(\S+)") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid ICD-11 mention regex: {err}"),
});

static HPO_ID: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^HP:\d{7}$") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid HPO regex: {err}"),
});

static ABSOLUTE_CLAIM: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(
        r"(?i)100% (?:effective|safe|curable)|\b(?:always cures?|guaranteed (?:cure|results?)|no side[- ]effects|completely safe|cures? (?:all|everything)|never fails)\b",
    ) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid absolute claim regex: {err}"),
    }
});

/// Every prose string of an item with its JSON pointer suffix.
fn item_prose(item: &EducationalContent) -> Vec<(String, &str)> {
    let mut out = vec![("name".to_owned(), item.name.as_str())];
    if let Some(name_es) = &item.name_es {
        out.push(("nameEs".to_owned(), name_es.as_str()));
    }
    for (level, content) in &item.levels {
        out.extend(
            content
                .prose()
                .map(|(field, text)| (format!("levels.{level}.{field}"), text)),
        );
    }
    out
}

/// First line of `text` matching `regex`, with the matched text.
fn first_match<'t>(regex: &Regex, text: &'t str) -> Option<(usize, &'t str)> {
    prose_lines(text)
        .into_iter()
        .find_map(|(no, line)| regex.find(line).map(|m| (no, m.as_str())))
}

/// Leftover drafting markers. Errors once the item is published.
pub struct PlaceholderRule;

impl LintRule for PlaceholderRule {
    fn id(&self) -> &'static str {
        "placeholder-text"
    }

    fn description(&self) -> &'static str {
        "No TODO, FIXME, TBD, lorem ipsum or placeholder text"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let severity = if item.is_published() {
            Severity::Error
        } else {
            Severity::Warning
        };
        item_prose(item)
            .into_iter()
            .filter_map(|(field, text)| {
                let (line, found) = first_match(&PLACEHOLDER, text)?;
                Some(
                    Diagnostic::new(
                        "placeholder-text",
                        CATEGORY,
                        severity,
                        format!("placeholder text '{found}' in {field}"),
                    )
                    .at(ctx.pointer(&field))
                    .on_line(line),
                )
            })
            .collect()
    }
}

fn is_valid_icd11(code: &str) -> bool {
    ICD11_CODE.is_match(code)
}

/// ICD-11 codes in `tags.systems` (as `ICD-11:<code>`) and in prose.
pub struct Icd11FormatRule;

impl LintRule for Icd11FormatRule {
    fn id(&self) -> &'static str {
        "icd11-format"
    }

    fn description(&self) -> &'static str {
        "ICD-11 codes are well formed"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let mut diagnostics = Vec::new();

        for (i, system) in item.tags.systems.iter().enumerate() {
            let Some(code) = system.strip_prefix("ICD-11:") else {
                continue;
            };
            let code = code.trim();
            if !is_valid_icd11(code) {
                diagnostics.push(
                    Diagnostic::warning(
                        "icd11-format",
                        CATEGORY,
                        format!("'{code}' does not look like an ICD-11 code"),
                    )
                    .at(ctx.pointer(&format!("tags.systems[{i}]"))),
                );
            }
        }

        for (field, text) in item_prose(item) {
            for (no, line) in prose_lines(text) {
                for caps in ICD11_MENTION.captures_iter(line) {
                    let code = caps[1].trim_end_matches(['.', ',', ';', ')']);
                    if !is_valid_icd11(code) {
                        diagnostics.push(
                            Diagnostic::warning(
                                "icd11-format",
                                CATEGORY,
                                format!("'{code}' does not look like an ICD-11 code"),
                            )
                            .at(ctx.pointer(&field))
                            .on_line(no),
                        );
                    }
                }
            }
        }
        diagnostics
    }
}

/// `hpoId` must look like `HP:0000000`.
pub struct HpoFormatRule;

impl LintRule for HpoFormatRule {
    fn id(&self) -> &'static str {
        "hpo-format"
    }

    fn description(&self) -> &'static str {
        "HPO ids match HP:<seven digits>"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(hpo) = ctx.item.and_then(|item| item.hpo_id.as_deref()) else {
            return vec![];
        };
        if hpo.trim().is_empty() || HPO_ID.is_match(hpo) {
            return vec![];
        }
        vec![
            Diagnostic::warning(
                "hpo-format",
                CATEGORY,
                format!("hpoId '{hpo}' should match HP:NNNNNNN"),
            )
            .at(ctx.pointer("hpoId")),
        ]
    }
}

/// Overclaiming language ("100% effective", "no side effects").
pub struct AbsoluteClaimRule;

impl LintRule for AbsoluteClaimRule {
    fn id(&self) -> &'static str {
        "absolute-claim"
    }

    fn description(&self) -> &'static str {
        "Prose avoids absolute medical claims"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let mut diagnostics = Vec::new();
        for (field, text) in item_prose(item) {
            for (no, line) in prose_lines(text) {
                if let Some(m) = ABSOLUTE_CLAIM.find(line) {
                    diagnostics.push(
                        Diagnostic::warning(
                            "absolute-claim",
                            CATEGORY,
                            format!("absolute claim '{}' in {field}", m.as_str()),
                        )
                        .at(ctx.pointer(&field))
                        .on_line(no)
                        .with_suggestion("qualify the claim and cite a source"),
                    );
                }
            }
        }
        diagnostics
    }
}

/// Returns all accuracy rules.
#[must_use]
pub fn accuracy_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(PlaceholderRule),
        Box::new(Icd11FormatRule),
        Box::new(HpoFormatRule),
        Box::new(AbsoluteClaimRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{entry, rule_ids, run_rules, valid_item};
    use serde_json::{Value, json};

    fn check(value: Value) -> Vec<Diagnostic> {
        let target = entry(value);
        run_rules(&accuracy_rules(), &target, &[&target])
    }

    #[test]
    fn test_valid_item_is_clean() {
        assert!(check(valid_item("ear-otitis-media")).is_empty());
    }

    #[test]
    fn test_placeholder_severity_follows_status() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["2"]["explanation"] = json!("First line.\nTODO: finish this section.");
        let diags = check(value.clone());
        assert_eq!(rule_ids(&diags), vec!["placeholder-text"]);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].pointer.as_deref(), Some("$.levels.2.explanation"));
        assert_eq!(diags[0].line, Some(2));

        value["status"] = json!("published");
        let diags = check(value);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_placeholder_ignores_spanish_todo() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["summary"] = json!("Ear pain | Dolor en todo el oido");
        assert!(check(value).is_empty());

        let mut value = valid_item("ear-otitis-media");
        value["name"] = json!("Lorem Ipsum dolor");
        assert_eq!(rule_ids(&check(value)), vec!["placeholder-text"]);
    }

    #[test]
    fn test_placeholder_in_spanish_name() {
        let mut value = valid_item("ear-otitis-media");
        value["nameEs"] = json!("TBD");
        value["status"] = json!("published");
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["placeholder-text"]);
        assert_eq!(diags[0].pointer.as_deref(), Some("$.nameEs"));
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_icd11_codes() {
        for code in ["AB11", "1A00", "CA40.0", "8A80.1", "A00"] {
            assert!(is_valid_icd11(code), "{code}");
        }
        for code in ["123", "A", "ab11", "AB11.", "AB11.ABCD"] {
            assert!(!is_valid_icd11(code), "{code}");
        }

        let mut value = valid_item("ear-otitis-media");
        value["tags"]["systems"] = json!(["ear", "ICD-11:AB11", "ICD-11:otitis"]);
        value["levels"]["5"]["clinicalNotes"] = json!("Code as ICD-11: AB00.0, or ICD-11: 12.");
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["icd11-format", "icd11-format"]);
        assert_eq!(diags[0].pointer.as_deref(), Some("$.tags.systems[2]"));
        assert!(diags[1].message.contains("'12'"));
    }

    #[test]
    fn test_hpo_format() {
        let mut value = valid_item("ear-otitis-media");
        value["hpoId"] = json!("HP:0000388");
        assert!(check(value.clone()).is_empty());

        value["hpoId"] = json!("HP:388");
        assert_eq!(rule_ids(&check(value)), vec!["hpo-format"]);
    }

    #[test]
    fn test_absolute_claims() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["explanation"] =
            json!("This drop is 100% effective.\nIt has no side effects and always cures pain.");
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["absolute-claim", "absolute-claim"]);
        assert_eq!(diags[0].line, Some(1));
        assert_eq!(diags[1].line, Some(2));
    }
}
