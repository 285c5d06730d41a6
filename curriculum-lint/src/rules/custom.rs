//! Reduced rule set for custom/legacy modules that do not follow the strict
//! `EducationalContent` schema.

use serde_json::Value;

use super::{BoxedRule, LintRule, RuleContext, is_blank};
use crate::diagnostic::{Diagnostic, RuleCategory};

const CATEGORY: RuleCategory = RuleCategory::Structure;

/// Level-like entries need a non-empty `content` or `explanation`.
pub struct CustomContentRule;

impl CustomContentRule {
    fn has_text(entry: &Value) -> bool {
        match entry {
            Value::String(s) => !s.trim().is_empty(),
            Value::Object(obj) => ["content", "explanation"]
                .iter()
                .any(|key| obj.get(*key).is_some_and(|v| v.is_string() && !is_blank(Some(v)))),
            _ => false,
        }
    }
}

impl LintRule for CustomContentRule {
    fn id(&self) -> &'static str {
        "custom-empty-content"
    }

    fn description(&self) -> &'static str {
        "Custom module levels carry text"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let entries: Vec<(String, &Value)> = match ctx.value().get("levels") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, entry)| (format!("levels.{key}"), entry))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, entry)| (format!("levels[{i}]"), entry))
                .collect(),
            _ => return vec![],
        };
        entries
            .into_iter()
            .filter(|(_, entry)| !Self::has_text(entry))
            .map(|(field, _)| {
                Diagnostic::error(
                    "custom-empty-content",
                    CATEGORY,
                    format!("{field} has no content or explanation text"),
                )
                .at(ctx.pointer(&field))
            })
            .collect()
    }
}

/// Top-level fields that are present but empty.
pub struct CustomFieldRule;

impl LintRule for CustomFieldRule {
    fn id(&self) -> &'static str {
        "custom-empty-field"
    }

    fn description(&self) -> &'static str {
        "Custom module top-level fields are not empty"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(obj) = ctx.value().as_object() else {
            return vec![];
        };
        obj.iter()
            .filter(|(_, value)| is_blank(Some(value)))
            .map(|(key, _)| {
                Diagnostic::warning(
                    "custom-empty-field",
                    CATEGORY,
                    format!("top-level field '{key}' is empty"),
                )
                .at(ctx.pointer(key))
            })
            .collect()
    }
}

/// Returns the rules run on custom/legacy modules.
#[must_use]
pub fn custom_rules() -> Vec<BoxedRule> {
    vec![Box::new(CustomContentRule), Box::new(CustomFieldRule)]
}
