//! Id uniqueness and cross-reference integrity across the corpus.
//!
//! These rules read the raw tree and the shared [`CorpusIndex`], so they run
//! even on items that fail typed deserialization.
//!
//! [`CorpusIndex`]: crate::index::CorpusIndex

use curriculum::Relationship;
use serde_json::Value;

use super::{BoxedRule, LintRule, RuleContext, is_blank};
use crate::diagnostic::{Diagnostic, RuleCategory};

const CATEGORY: RuleCategory = RuleCategory::Reference;

/// Every strict id is declared once; later declarations are errors.
pub struct DuplicateIdRule;

impl LintRule for DuplicateIdRule {
    fn id(&self) -> &'static str {
        "duplicate-id"
    }

    fn description(&self) -> &'static str {
        "Item ids are unique across the corpus"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(id) = ctx.entry.id() else {
            return vec![];
        };
        if ctx.index.occurrences(id) < 2 {
            return vec![];
        }
        let Some(first) = ctx.index.first_location(id) else {
            return vec![];
        };
        if first.is(ctx.entry) {
            return vec![];
        }
        vec![
            Diagnostic::error(
                "duplicate-id",
                CATEGORY,
                format!(
                    "duplicate id '{id}', first declared in {} at {}",
                    first.file.display(),
                    first.pointer
                ),
            )
            .at(ctx.pointer("id")),
        ]
    }
}

/// Targets must resolve, must not point at the item itself, and conventionally
/// reciprocal links should be mirrored.
pub struct CrossReferenceRule;

impl CrossReferenceRule {
    fn is_external(ctx: &RuleContext<'_>, target: &str) -> bool {
        ctx.external_ids.iter().any(|pattern| pattern.matches(target))
    }

    fn check_link(ctx: &RuleContext<'_>, id: &str, i: usize, link: &Value) -> Option<Diagnostic> {
        let pointer = ctx.pointer(&format!("crossReferences[{i}]"));
        let relationship = link.get("relationship").and_then(Value::as_str);
        let label = relationship.unwrap_or("unlabelled");

        let target = link.get("targetId");
        if is_blank(target) {
            return Some(
                Diagnostic::error("empty-target", CATEGORY, "cross-reference has no targetId")
                    .at(pointer),
            );
        }
        let target = target.and_then(Value::as_str)?;

        if target == id {
            return Some(
                Diagnostic::error(
                    "self-reference",
                    CATEGORY,
                    format!("'{id}' links to itself ({label})"),
                )
                .at(pointer),
            );
        }

        if !ctx.index.contains(target) {
            if Self::is_external(ctx, target) {
                return None;
            }
            return Some(
                Diagnostic::warning(
                    "dangling-reference",
                    CATEGORY,
                    format!("dangling reference from '{id}' to '{target}' ({label})"),
                )
                .at(pointer)
                .with_suggestion("create the target item or list it under external_ids"),
            );
        }

        let reciprocal = relationship
            .and_then(|r| r.parse::<Relationship>().ok())
            .is_some_and(Relationship::is_reciprocal);
        if ctx.config.reciprocal_links
            && reciprocal
            && ctx.index.occurrences(target) > 0
            && !ctx.index.links_to(target, id)
        {
            return Some(
                Diagnostic::warning(
                    "missing-reciprocal",
                    CATEGORY,
                    format!("'{target}' has no link back to '{id}' for this {label} link"),
                )
                .at(pointer),
            );
        }
        None
    }
}

impl LintRule for CrossReferenceRule {
    fn id(&self) -> &'static str {
        "cross-reference"
    }

    fn description(&self) -> &'static str {
        "Cross-references resolve to known items"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(id) = ctx.entry.id() else {
            return vec![];
        };
        let Some(links) = ctx.value().get("crossReferences").and_then(Value::as_array) else {
            return vec![];
        };
        links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_object())
            .filter_map(|(i, link)| Self::check_link(ctx, id, i, link))
            .collect()
    }
}

/// Returns all reference rules.
#[must_use]
pub fn reference_rules() -> Vec<BoxedRule> {
    vec![Box::new(DuplicateIdRule), Box::new(CrossReferenceRule)]
}
