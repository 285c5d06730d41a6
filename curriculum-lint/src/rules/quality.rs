//! Prose quality heuristics.
//!
//! Medical prose quality cannot be certified algorithmically, so every rule
//! here emits warnings only.

use std::collections::HashMap;
use std::sync::LazyLock;

use curriculum::{ComplexityLevel, EducationalContent, LevelContent};
use regex::Regex;

use super::{BoxedRule, LintRule, RuleContext};
use crate::diagnostic::{Diagnostic, RuleCategory};
use crate::markdown::{prose_len, prose_lines};

const CATEGORY: RuleCategory = RuleCategory::Quality;

static MEDICAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(
        r"(?i)^[a-z]{2,}(?:itis|osis|emia|ectomy|otomy|ostomy|plasty|pathy|algia|oma|ology|megaly|scopy)$",
    ) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid medical suffix regex: {err}"),
    }
});

static WORD: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[A-Za-z][A-Za-z'-]*") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid word regex: {err}"),
});

/// Upper-case tokens that are not medical acronyms.
const ACRONYM_STOPLIST: &[&str] = &["OK", "US", "USA", "UK", "EU", "AM", "PM", "TV", "FAQ", "ID", "VS"];

/// Iterate the levels of an item that are present, in ascending order.
fn present_levels(item: &EducationalContent) -> impl Iterator<Item = (ComplexityLevel, &LevelContent)> {
    item.levels.iter().map(|(level, content)| (*level, content))
}

fn level_pointer(ctx: &RuleContext<'_>, level: ComplexityLevel, field: &str) -> String {
    ctx.pointer(&format!("levels.{level}.{field}"))
}

/// Explanations must not get shorter as the tier rises (1 <= 3 <= 5).
pub struct ComplexityEscalationRule;

impl LintRule for ComplexityEscalationRule {
    fn id(&self) -> &'static str {
        "complexity-escalation"
    }

    fn description(&self) -> &'static str {
        "Explanation length grows from level 1 to level 3 to level 5"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let checkpoints: Vec<(ComplexityLevel, usize)> = [1, 3, 5]
            .into_iter()
            .filter_map(ComplexityLevel::new)
            .filter_map(|level| {
                item.level(level)
                    .filter(|c| !c.explanation.trim().is_empty())
                    .map(|c| (level, prose_len(&c.explanation)))
            })
            .collect();

        let shrinks = checkpoints
            .windows(2)
            .find(|pair| pair[1].1 < pair[0].1);
        let Some(pair) = shrinks else {
            return vec![];
        };
        let (low, low_len) = pair[0];
        let (high, high_len) = pair[1];
        vec![
            Diagnostic::warning(
                "complexity-escalation",
                CATEGORY,
                format!(
                    "complexity does not escalate: level {high} explanation ({high_len} chars) is shorter than level {low} ({low_len} chars)"
                ),
            )
            .at(ctx.pointer("levels")),
        ]
    }
}

/// Configurable length bounds per level.
pub struct LevelLengthRule;

impl LintRule for LevelLengthRule {
    fn id(&self) -> &'static str {
        "level-length"
    }

    fn description(&self) -> &'static str {
        "Summaries and explanations stay within the configured length bounds"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let limits = &ctx.config.limits;
        let mut diagnostics = Vec::new();

        for (level, content) in present_levels(item) {
            let explanation = prose_len(&content.explanation);
            let min = limits.min_explanation(level.get());
            if explanation > 0 && explanation < min {
                diagnostics.push(
                    Diagnostic::warning(
                        "level-length",
                        CATEGORY,
                        format!(
                            "level {level} explanation is {explanation} characters, expected at least {min}"
                        ),
                    )
                    .at(level_pointer(ctx, level, "explanation")),
                );
            }
            if explanation > limits.max_explanation_chars {
                diagnostics.push(
                    Diagnostic::warning(
                        "level-length",
                        CATEGORY,
                        format!(
                            "level {level} explanation is {explanation} characters, more than {}",
                            limits.max_explanation_chars
                        ),
                    )
                    .at(level_pointer(ctx, level, "explanation")),
                );
            }
            let summary = prose_len(&content.summary);
            if summary > limits.max_summary_chars {
                diagnostics.push(
                    Diagnostic::warning(
                        "level-length",
                        CATEGORY,
                        format!(
                            "level {level} summary is {summary} characters, more than {}",
                            limits.max_summary_chars
                        ),
                    )
                    .at(level_pointer(ctx, level, "summary"))
                    .with_suggestion("move detail into the explanation"),
                );
            }
        }
        diagnostics
    }
}

/// Whether the word at `start` opens a sentence, line or markdown block.
fn is_sentence_initial(line: &str, start: usize) -> bool {
    let before = line[..start].trim_end();
    before.is_empty()
        || before.ends_with(['.', '!', '?', ':', '#', '-', '*', '>', '|', '(', '"'])
        || before.chars().all(|c| c.is_ascii_digit() || c == '.' || c.is_whitespace())
}

/// Glossary-worthy words in one explanation, keyed by lowercase form.
///
/// Returns `(display form, occurrences)` in order of first appearance.
fn term_candidates(text: &str) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();

    for (_, line) in prose_lines(text) {
        for m in WORD.find_iter(line) {
            let word = m.as_str().trim_end_matches(['\'', '-']);
            let is_acronym = (2..=6).contains(&word.len())
                && word.chars().all(|c| c.is_ascii_uppercase())
                && !ACRONYM_STOPLIST.contains(&word);
            let is_medical = MEDICAL_SUFFIX.is_match(word);
            let is_proper = word.len() >= 3
                && word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
                && word.chars().skip(1).all(|c| c.is_ascii_lowercase())
                && !is_sentence_initial(line, m.start());
            if !(is_acronym || is_medical || is_proper) {
                continue;
            }
            let key = if is_acronym {
                word.to_owned()
            } else {
                word.to_lowercase()
            };
            let slot = counts.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                (word.to_owned(), 0)
            });
            slot.1 += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|key| counts.remove(&key))
        .collect()
}

/// Recurring medical or proper terms should have a glossary entry.
pub struct KeyTermCoverageRule;

impl LintRule for KeyTermCoverageRule {
    fn id(&self) -> &'static str {
        "missing-key-term"
    }

    fn description(&self) -> &'static str {
        "Terms used at least twice in an explanation appear in that level's keyTerms"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let names: Vec<String> = std::iter::once(&item.name)
            .chain(&item.alternate_names)
            .map(|n| n.to_lowercase())
            .collect();

        present_levels(item)
            .flat_map(|(level, content)| {
                term_candidates(&content.explanation)
                    .into_iter()
                    .filter(|(word, count)| {
                        let lower = word.to_lowercase();
                        *count >= 2
                            && !content.defines(word)
                            && !names.iter().any(|n| n.contains(&lower))
                    })
                    .map(move |(word, count)| {
                        Diagnostic::warning(
                            "missing-key-term",
                            CATEGORY,
                            format!(
                                "'{word}' appears {count} times in the level {level} explanation but has no keyTerms entry"
                            ),
                        )
                        .at(level_pointer(ctx, level, "keyTerms"))
                    })
            })
            .collect()
    }
}

/// Lay tiers (1 and 2) should carry at least one analogy.
pub struct AnalogyRule;

impl LintRule for AnalogyRule {
    fn id(&self) -> &'static str {
        "missing-analogy"
    }

    fn description(&self) -> &'static str {
        "Levels 1 and 2 include at least one analogy"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        present_levels(item)
            .filter(|(level, content)| {
                level.is_lay() && content.analogies.iter().all(|a| a.trim().is_empty())
            })
            .map(|(level, _)| {
                Diagnostic::warning(
                    "missing-analogy",
                    CATEGORY,
                    format!("level {level} has no analogy for a lay audience"),
                )
                .at(level_pointer(ctx, level, "analogies"))
            })
            .collect()
    }
}

/// Conditions should carry clinician-facing notes at levels 4 and 5.
pub struct ClinicalNotesRule;

impl LintRule for ClinicalNotesRule {
    fn id(&self) -> &'static str {
        "clinical-notes"
    }

    fn description(&self) -> &'static str {
        "Condition items have clinicalNotes at levels 4 and 5"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item.filter(|item| item.is_condition()) else {
            return vec![];
        };
        present_levels(item)
            .filter(|(level, content)| level.is_advanced() && !content.has_clinical_notes())
            .map(|(level, _)| {
                Diagnostic::warning(
                    "clinical-notes",
                    CATEGORY,
                    format!("condition has no clinicalNotes at level {level}"),
                )
                .at(level_pointer(ctx, level, "clinicalNotes"))
            })
            .collect()
    }
}

/// A `" | "`-delimited line with an empty side, if any.
fn unbalanced_bilingual_line(text: &str) -> Option<usize> {
    prose_lines(text).into_iter().find_map(|(no, line)| {
        let bilingual = !line.starts_with('|')
            && (line.contains(" | ") || line.ends_with(" |"));
        let unbalanced = bilingual && line.split('|').any(|side| side.trim().is_empty());
        unbalanced.then_some(no)
    })
}

/// English/Spanish `" | "` segments need text on both sides.
pub struct BilingualBalanceRule;

impl LintRule for BilingualBalanceRule {
    fn id(&self) -> &'static str {
        "bilingual-balance"
    }

    fn description(&self) -> &'static str {
        "Bilingual `English | Spanish` segments have both halves"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(item) = ctx.item else {
            return vec![];
        };
        let mut diagnostics = Vec::new();
        for (level, content) in present_levels(item) {
            for (field, text) in content.prose() {
                if let Some(line) = unbalanced_bilingual_line(text) {
                    diagnostics.push(
                        Diagnostic::warning(
                            "bilingual-balance",
                            CATEGORY,
                            format!("bilingual segment in level {level} {field} has an empty side"),
                        )
                        .at(level_pointer(ctx, level, field))
                        .on_line(line),
                    );
                }
            }
        }
        diagnostics
    }
}

/// Returns all quality rules.
#[must_use]
pub fn quality_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(ComplexityEscalationRule),
        Box::new(LevelLengthRule),
        Box::new(KeyTermCoverageRule),
        Box::new(AnalogyRule),
        Box::new(ClinicalNotesRule),
        Box::new(BilingualBalanceRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{entry, rule_ids, run_rules, valid_item};
    use serde_json::{Value, json};

    fn check(value: Value) -> Vec<Diagnostic> {
        let target = entry(value);
        run_rules(&quality_rules(), &target, &[&target])
    }

    #[test]
    fn test_valid_item_has_no_quality_warnings() {
        let diags = check(valid_item("ear-otitis-media"));
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn test_complexity_does_not_escalate() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["explanation"] = json!("A very long lay explanation. ".repeat(40));
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["complexity-escalation"]);
        assert!(diags[0].message.contains("complexity does not escalate"));
        assert!(diags.iter().all(|d| !d.is_error()));
    }

    #[test]
    fn test_escalation_reported_once_even_if_both_steps_shrink() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["explanation"] = json!("x".repeat(2000));
        value["levels"]["3"]["explanation"] = json!("x".repeat(1000));
        value["levels"]["5"]["explanation"] = json!("x".repeat(500));
        let diags = check(value);
        let escalation = diags
            .iter()
            .filter(|d| d.rule_id == "complexity-escalation")
            .count();
        assert_eq!(escalation, 1);
    }

    #[test]
    fn test_level_length_bounds() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["explanation"] = json!("Too short.");
        value["levels"]["2"]["summary"] = json!("s".repeat(700));
        let diags = check(value);
        let lengths: Vec<_> = diags.iter().filter(|d| d.rule_id == "level-length").collect();
        assert_eq!(lengths.len(), 2, "{diags:?}");
        assert_eq!(lengths[0].pointer.as_deref(), Some("$.levels.1.explanation"));
        assert_eq!(lengths[1].pointer.as_deref(), Some("$.levels.2.summary"));
    }

    #[test]
    fn test_missing_key_term() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["3"]["explanation"] = json!(
            "Fluid behind the drum is called effusion. Chronic otitis can follow, and the \
             Eustachian tube may stay blocked. Repeated otitis damages hearing. A blocked \
             Eustachian tube is common in children. Tympanostomy tubes are placed by ENT \
             surgeons; an ENT referral is typical."
        );
        let diags = check(value);
        let missing: Vec<_> = diags
            .iter()
            .filter(|d| d.rule_id == "missing-key-term")
            .map(|d| d.message.clone())
            .collect();
        assert_eq!(missing.len(), 3, "{missing:?}");
        assert!(missing[0].contains("'otitis'"));
        assert!(missing[1].contains("'Eustachian'"));
        assert!(missing[2].contains("'ENT'"));
    }

    #[test]
    fn test_key_term_covered_by_glossary_or_name() {
        let mut value = valid_item("ear-otitis-media");
        value["name"] = json!("Otitis media");
        value["levels"]["3"]["explanation"] =
            json!("Otitis is common. Recurrent otitis affects the Eustachian area and the Eustachian tube.");
        value["levels"]["3"]["keyTerms"] = json!([{"term": "Eustachian tube", "definition": "Canal to the throat."}]);
        let diags = check(value);
        assert!(
            diags.iter().all(|d| d.rule_id != "missing-key-term"),
            "{diags:?}"
        );
    }

    #[test]
    fn test_missing_analogy_and_clinical_notes() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["2"]["analogies"] = json!([]);
        value["levels"]["5"].as_object_mut().unwrap().remove("clinicalNotes");
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["missing-analogy", "clinical-notes"]);
    }

    #[test]
    fn test_clinical_notes_only_for_conditions() {
        let mut value = valid_item("ear-anatomy");
        value["type"] = json!("structure");
        value["levels"]["4"].as_object_mut().unwrap().remove("clinicalNotes");
        assert!(check(value).is_empty());
    }

    #[test]
    fn test_bilingual_balance() {
        assert_eq!(unbalanced_bilingual_line("Ear pain | Dolor de oido"), None);
        assert_eq!(unbalanced_bilingual_line("ok\nEar pain | "), Some(2));
        assert_eq!(unbalanced_bilingual_line(" | Dolor"), Some(1));
        assert_eq!(unbalanced_bilingual_line("| a | b |\n|---|---|"), None);

        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["analogies"] = json!(["Like a drum | "]);
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["bilingual-balance"]);
        assert_eq!(diags[0].pointer.as_deref(), Some("$.levels.1.analogies"));
    }
}
