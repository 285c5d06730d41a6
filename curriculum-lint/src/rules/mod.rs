//! Built-in lint rules, organised by pass:
//!
//! - **Structural** (`structural`): schema shape, levels, vocabularies, ids
//! - **Quality** (`quality`): prose heuristics, warnings only
//! - **Accuracy** (`accuracy`): placeholder text, code formats, absolute claims
//! - **Formatting** (`formatting`): markdown hygiene and citation records
//! - **Reference** (`reference`): id uniqueness and cross-reference integrity
//! - **Custom** (`custom`): the reduced subset for custom/legacy modules
//!
//! Structural and reference rules read the raw JSON tree. Quality, accuracy
//! and formatting rules read a field-by-field typed view, so one malformed
//! field never switches them off for the rest of the item.

pub mod accuracy;
pub mod custom;
pub mod formatting;
pub mod quality;
pub mod reference;
pub mod structural;

use curriculum::EducationalContent;
use glob::Pattern;
use serde_json::Value;

use crate::config::LintConfig;
use crate::diagnostic::{Diagnostic, RuleCategory};
use crate::index::CorpusIndex;
use crate::loader::ContentEntry;

/// Rule id for files or documents that could not be read or parsed.
pub const LOAD_ERROR: &str = "load-error";

/// Rule id for content files over the configured line budget.
pub const FILE_LENGTH: &str = "file-length";

/// Every rule id a diagnostic can carry.
pub const RULE_IDS: &[&str] = &[
    LOAD_ERROR,
    // structure
    "required-field",
    "field-type",
    "missing-level",
    "unexpected-level",
    "level-mismatch",
    "empty-summary",
    "empty-explanation",
    "key-term-incomplete",
    "invalid-enum",
    "invalid-version",
    "invalid-timestamp",
    "id-format",
    "id-filename",
    "recommended-field",
    "hpo-scope",
    "exam-relevance",
    "tag-entry",
    "file-name",
    // quality
    "complexity-escalation",
    "level-length",
    "missing-key-term",
    "missing-analogy",
    "clinical-notes",
    "bilingual-balance",
    // accuracy
    "placeholder-text",
    "icd11-format",
    "hpo-format",
    "absolute-claim",
    // formatting
    "table-shape",
    "list-markers",
    "unbalanced-emphasis",
    "heading-jump",
    "box-drawing",
    "trailing-whitespace",
    "citation-fields",
    "key-term-format",
    FILE_LENGTH,
    // reference
    "duplicate-id",
    "self-reference",
    "empty-target",
    "dangling-reference",
    "missing-reciprocal",
    // custom/legacy modules
    "custom-empty-content",
    "custom-empty-field",
];

/// Everything a rule may look at for one item.
pub struct RuleContext<'a> {
    pub entry: &'a ContentEntry,
    /// Typed view of the item. Fields that do not deserialize read as their
    /// defaults; `None` only when there is no `levels` object.
    pub item: Option<&'a EducationalContent>,
    pub index: &'a CorpusIndex,
    pub config: &'a LintConfig,
    pub external_ids: &'a [Pattern],
}

impl RuleContext<'_> {
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.entry.value
    }

    /// JSON path of a field of this item.
    #[must_use]
    pub fn pointer(&self, suffix: &str) -> String {
        self.entry.pointer_to(suffix)
    }
}

/// A lint rule over one content item.
///
/// Rules are stateless. One rule may emit diagnostics under several rule ids;
/// `id` names the rule itself for logging and listings.
pub trait LintRule: Send + Sync {
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic>;
}

pub type BoxedRule = Box<dyn LintRule>;

/// Rules for strict items, in pass order.
#[must_use]
pub fn strict_rules() -> Vec<BoxedRule> {
    let mut rules = structural::structural_rules();
    rules.extend(quality::quality_rules());
    rules.extend(accuracy::accuracy_rules());
    rules.extend(formatting::formatting_rules());
    rules.extend(reference::reference_rules());
    rules
}

/// Rules for custom/legacy modules.
#[must_use]
pub fn custom_rules() -> Vec<BoxedRule> {
    custom::custom_rules()
}

/// Short JSON type name for messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a value is absent, null, or a blank string.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use serde_json::{Value, json};

    use super::{BoxedRule, RuleContext};
    use crate::config::LintConfig;
    use crate::diagnostic::Diagnostic;
    use crate::index::CorpusIndex;
    use crate::loader::{ContentEntry, ItemShape};

    /// A complete, valid condition item that passes every rule.
    pub fn valid_item(id: &str) -> Value {
        let level = |n: u8| {
            let body = "The eardrum becomes inflamed and fluid collects behind it. "
                .repeat(usize::from(n) * 2);
            let explanation = format!("Level {n} explanation of the middle ear infection. {body}")
                .trim_end()
                .to_owned();
            let mut level = json!({
                "level": n,
                "summary": format!("Summary for level {n}."),
                "explanation": explanation,
                "keyTerms": [{"term": "Eardrum", "definition": "Thin membrane between outer and middle ear."}],
            });
            if n <= 2 {
                level["analogies"] = json!(["The eardrum is like the skin of a drum."]);
            }
            if n >= 4 {
                level["clinicalNotes"] = json!("Consider tympanometry when effusion persists.");
            }
            level
        };
        json!({
            "id": id,
            "type": "condition",
            "name": "Middle ear infection",
            "nameEs": "Infeccion del oido medio",
            "levels": {"1": level(1), "2": level(2), "3": level(3), "4": level(4), "5": level(5)},
            "media": [],
            "citations": [{"id": "c1", "type": "guideline", "title": "Acute otitis media", "source": "AAP"}],
            "crossReferences": [],
            "tags": {"systems": ["ear"], "topics": ["infection"], "clinicalRelevance": "high"},
            "createdAt": "2024-01-15",
            "updatedAt": "2024-03-01T10:00:00Z",
            "version": 1,
            "status": "draft"
        })
    }

    pub fn entry(value: Value) -> ContentEntry {
        let slug = value.get("id").and_then(Value::as_str).map(str::to_owned);
        ContentEntry {
            file: PathBuf::from("content/item.json"),
            document: 0,
            pointer: "$".to_owned(),
            slug,
            shape: ItemShape::Strict,
            value,
        }
    }

    /// Run rules over one entry against an index built from `corpus`.
    pub fn run_rules(
        rules: &[BoxedRule],
        target: &ContentEntry,
        corpus: &[&ContentEntry],
    ) -> Vec<Diagnostic> {
        let config = LintConfig::default();
        let index = CorpusIndex::build(corpus.iter().copied());
        let item = crate::typed::lenient_item(&target.value);
        let ctx = RuleContext {
            entry: target,
            item: item.as_ref(),
            index: &index,
            config: &config,
            external_ids: &[],
        };
        rules.iter().flat_map(|r| r.check(&ctx)).collect()
    }

    pub fn rule_ids(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.rule_id.as_str()).collect()
    }
}
