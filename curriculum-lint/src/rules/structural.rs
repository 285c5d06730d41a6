//! Structural rules: schema shape over the raw JSON tree.
//!
//! Every check runs independently; a missing field never hides a problem in a
//! sibling field.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use curriculum::slug::{id_matches_slug, is_kebab_case, slugify};
use curriculum::{
    CitationType, ClinicalRelevance, ComplexityLevel, ContentStatus, ContentType, EXAM_KEYS,
    MediaType, Relationship, UnknownTag,
};
use serde_json::{Map, Value};

use super::{BoxedRule, LintRule, RuleContext, is_blank, json_kind};
use crate::diagnostic::{Diagnostic, RuleCategory};

const CATEGORY: RuleCategory = RuleCategory::Structure;

/// Expected JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn article(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

const REQUIRED_FIELDS: &[(&str, Kind)] = &[
    ("id", Kind::String),
    ("type", Kind::String),
    ("name", Kind::String),
    ("levels", Kind::Object),
    ("media", Kind::Array),
    ("citations", Kind::Array),
    ("crossReferences", Kind::Array),
    ("tags", Kind::Object),
    ("createdAt", Kind::String),
    ("updatedAt", Kind::String),
    ("version", Kind::Number),
    ("status", Kind::String),
];

const OPTIONAL_FIELDS: &[(&str, Kind)] = &[
    ("nameEs", Kind::String),
    ("alternateNames", Kind::Array),
    ("hpoId", Kind::String),
];

const LEVEL_OPTIONAL_FIELDS: &[(&str, Kind)] = &[
    ("analogies", Kind::Array),
    ("examples", Kind::Array),
    ("clinicalNotes", Kind::String),
    ("patientCounselingPoints", Kind::Array),
];

fn type_error(pointer: String, field: &str, expected: Kind, found: &Value) -> Diagnostic {
    Diagnostic::error(
        "field-type",
        CATEGORY,
        format!(
            "`{field}` must be {}, found {}",
            expected.article(),
            json_kind(found)
        ),
    )
    .at(pointer)
}

/// Check an optional field's type, if present and non-null.
fn check_optional(
    obj: &Map<String, Value>,
    field: &str,
    kind: Kind,
    pointer: impl FnOnce() -> String,
) -> Option<Diagnostic> {
    match obj.get(field) {
        Some(value) if !value.is_null() && !kind.matches(value) => {
            Some(type_error(pointer(), field, kind, value))
        }
        _ => None,
    }
}

/// `required-field` and `field-type` for top-level fields.
pub struct RequiredFieldsRule;

impl LintRule for RequiredFieldsRule {
    fn id(&self) -> &'static str {
        "required-fields"
    }

    fn description(&self) -> &'static str {
        "Required top-level fields are present and have the expected JSON type"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(obj) = ctx.value().as_object() else {
            return vec![];
        };
        let mut diagnostics = Vec::new();

        for &(field, kind) in REQUIRED_FIELDS {
            match obj.get(field) {
                None | Some(Value::Null) => diagnostics.push(
                    Diagnostic::error(
                        "required-field",
                        CATEGORY,
                        format!("missing required field `{field}`"),
                    )
                    .at(ctx.entry.pointer.clone()),
                ),
                Some(value) if !kind.matches(value) => {
                    diagnostics.push(type_error(ctx.pointer(field), field, kind, value));
                }
                Some(Value::String(s)) if s.trim().is_empty() && matches!(field, "id" | "name") => {
                    diagnostics.push(
                        Diagnostic::error(
                            "required-field",
                            CATEGORY,
                            format!("required field `{field}` is empty"),
                        )
                        .at(ctx.pointer(field)),
                    );
                }
                Some(_) => {}
            }
        }

        for &(field, kind) in OPTIONAL_FIELDS {
            diagnostics.extend(check_optional(obj, field, kind, || ctx.pointer(field)));
        }
        diagnostics
    }
}

/// Level keys, self-consistency and per-level required prose.
pub struct LevelsRule;

impl LevelsRule {
    fn check_level(
        ctx: &RuleContext<'_>,
        key: &str,
        level: ComplexityLevel,
        entry: &Value,
    ) -> Vec<Diagnostic> {
        let base = format!("levels.{key}");
        let Some(obj) = entry.as_object() else {
            return vec![type_error(ctx.pointer(&base), &base, Kind::Object, entry)];
        };
        let mut diagnostics = Vec::new();

        match obj.get("level") {
            None | Some(Value::Null) => diagnostics.push(
                Diagnostic::error(
                    "required-field",
                    CATEGORY,
                    format!("level {level} has no `level` field"),
                )
                .at(ctx.pointer(&base)),
            ),
            Some(value) if value.as_u64() != Some(u64::from(level.get())) => diagnostics.push(
                Diagnostic::error(
                    "level-mismatch",
                    CATEGORY,
                    format!("entry stored under key {key} declares level {value}"),
                )
                .at(ctx.pointer(&format!("{base}.level"))),
            ),
            Some(_) => {}
        }

        for (field, rule) in [
            ("summary", "empty-summary"),
            ("explanation", "empty-explanation"),
        ] {
            let pointer = ctx.pointer(&format!("{base}.{field}"));
            match obj.get(field) {
                Some(value) if !value.is_null() && !value.is_string() => {
                    diagnostics.push(type_error(pointer, field, Kind::String, value));
                }
                value if is_blank(value) => diagnostics.push(
                    Diagnostic::error(rule, CATEGORY, format!("level {level} has an empty {field}"))
                        .at(pointer),
                ),
                _ => {}
            }
        }

        diagnostics.extend(Self::check_key_terms(ctx, &base, level, obj));
        for &(field, kind) in LEVEL_OPTIONAL_FIELDS {
            diagnostics.extend(check_optional(obj, field, kind, || {
                ctx.pointer(&format!("{base}.{field}"))
            }));
        }
        diagnostics
    }

    fn check_key_terms(
        ctx: &RuleContext<'_>,
        base: &str,
        level: ComplexityLevel,
        obj: &Map<String, Value>,
    ) -> Vec<Diagnostic> {
        let pointer = ctx.pointer(&format!("{base}.keyTerms"));
        let terms = match obj.get("keyTerms") {
            None | Some(Value::Null) => {
                return vec![
                    Diagnostic::warning(
                        "recommended-field",
                        CATEGORY,
                        format!("level {level} has no keyTerms"),
                    )
                    .at(pointer),
                ];
            }
            Some(Value::Array(terms)) => terms,
            Some(other) => return vec![type_error(pointer, "keyTerms", Kind::Array, other)],
        };

        terms
            .iter()
            .enumerate()
            .filter_map(|(i, term)| {
                let at = format!("{pointer}[{i}]");
                let Some(term_obj) = term.as_object() else {
                    return Some(type_error(at, "keyTerms[]", Kind::Object, term));
                };
                let missing: Vec<&str> = ["term", "definition"]
                    .into_iter()
                    .filter(|f| is_blank(term_obj.get(*f)))
                    .collect();
                (!missing.is_empty()).then(|| {
                    Diagnostic::error(
                        "key-term-incomplete",
                        CATEGORY,
                        format!(
                            "key term at level {level} is missing {}",
                            missing.join(" and ")
                        ),
                    )
                    .at(at)
                })
            })
            .collect()
    }
}

impl LintRule for LevelsRule {
    fn id(&self) -> &'static str {
        "levels"
    }

    fn description(&self) -> &'static str {
        "All five complexity levels are present, self-consistent and non-empty"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(levels) = ctx.value().get("levels").and_then(Value::as_object) else {
            return vec![];
        };
        let mut diagnostics = Vec::new();
        let mut present = Vec::new();

        for (key, entry) in levels {
            match ComplexityLevel::from_key(key) {
                Ok(level) => {
                    present.push(level);
                    diagnostics.extend(Self::check_level(ctx, key, level, entry));
                }
                Err(e) => diagnostics.push(
                    Diagnostic::error("unexpected-level", CATEGORY, e.to_string())
                        .at(ctx.pointer(&format!("levels.{key}"))),
                ),
            }
        }

        for level in ComplexityLevel::ALL {
            if !present.contains(&level) {
                diagnostics.push(
                    Diagnostic::error(
                        "missing-level",
                        CATEGORY,
                        format!("missing complexity level {level}"),
                    )
                    .at(ctx.pointer("levels")),
                );
            }
        }
        diagnostics
    }
}

/// Closed-vocabulary fields.
pub struct VocabularyRule;

fn check_tag<T: FromStr<Err = UnknownTag>>(
    value: Option<&Value>,
    field: &str,
    pointer: impl FnOnce() -> String,
) -> Option<Diagnostic> {
    let tag = value?.as_str()?;
    T::from_str(tag)
        .err()
        .map(|e| Diagnostic::error("invalid-enum", CATEGORY, format!("`{field}`: {e}")).at(pointer()))
}

fn each_record<'v>(value: &'v Value, field: &str) -> impl Iterator<Item = (usize, &'v Value)> {
    value
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
}

impl LintRule for VocabularyRule {
    fn id(&self) -> &'static str {
        "vocabulary"
    }

    fn description(&self) -> &'static str {
        "Enumerated fields use a recognised tag"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let value = ctx.value();
        let mut diagnostics = Vec::new();

        diagnostics.extend(check_tag::<ContentType>(value.get("type"), "type", || {
            ctx.pointer("type")
        }));
        diagnostics.extend(check_tag::<ContentStatus>(value.get("status"), "status", || {
            ctx.pointer("status")
        }));
        diagnostics.extend(check_tag::<ClinicalRelevance>(
            value.pointer("/tags/clinicalRelevance"),
            "tags.clinicalRelevance",
            || ctx.pointer("tags.clinicalRelevance"),
        ));

        for (i, citation) in each_record(value, "citations") {
            diagnostics.extend(check_tag::<CitationType>(citation.get("type"), "type", || {
                ctx.pointer(&format!("citations[{i}].type"))
            }));
        }
        for (i, media) in each_record(value, "media") {
            diagnostics.extend(check_tag::<MediaType>(media.get("type"), "type", || {
                ctx.pointer(&format!("media[{i}].type"))
            }));
        }
        for (i, link) in each_record(value, "crossReferences") {
            diagnostics.extend(check_tag::<Relationship>(
                link.get("relationship"),
                "relationship",
                || ctx.pointer(&format!("crossReferences[{i}].relationship")),
            ));
        }
        diagnostics
    }
}

/// Version, timestamps, exam tags, recommended fields and HPO scope.
pub struct MetadataRule;

fn is_valid_timestamp(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok() || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

impl MetadataRule {
    fn check_version(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let version = ctx.value().get("version")?;
        if !version.is_number() {
            return None;
        }
        let positive = version.as_u64().is_some_and(|v| v > 0);
        (!positive).then(|| {
            Diagnostic::error(
                "invalid-version",
                CATEGORY,
                format!("`version` must be a positive integer, found {version}"),
            )
            .at(ctx.pointer("version"))
        })
    }

    fn check_exam_relevance(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(exam) = ctx
            .value()
            .pointer("/tags/examRelevance")
            .and_then(Value::as_object)
        else {
            return vec![];
        };
        exam.keys()
            .filter(|key| !EXAM_KEYS.contains(&key.as_str()))
            .map(|key| {
                Diagnostic::warning(
                    "exam-relevance",
                    CATEGORY,
                    format!(
                        "unknown exam '{key}' in tags.examRelevance, expected one of: {}",
                        EXAM_KEYS.join(", ")
                    ),
                )
                .at(ctx.pointer(&format!("tags.examRelevance.{key}")))
            })
            .collect()
    }

    /// Tag lists hold non-empty strings; exam flags are booleans.
    fn check_tag_entries(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(tags) = ctx.value().get("tags").and_then(Value::as_object) else {
            return vec![];
        };
        let exam = tags.get("examRelevance").and_then(Value::as_object);
        let mut diagnostics = Vec::new();

        let lists = [
            ("tags.systems", tags.get("systems")),
            ("tags.topics", tags.get("topics")),
            ("tags.examRelevance.shelf", exam.and_then(|e| e.get("shelf"))),
        ];
        for (path, list) in lists {
            let entries = match list {
                None | Some(Value::Null) => continue,
                Some(Value::Array(entries)) => entries,
                Some(other) => {
                    diagnostics.push(type_error(ctx.pointer(path), path, Kind::Array, other));
                    continue;
                }
            };
            for (i, entry) in entries.iter().enumerate() {
                if entry.as_str().is_some_and(|s| !s.trim().is_empty()) {
                    continue;
                }
                let found = if entry.is_string() {
                    "an empty string"
                } else {
                    json_kind(entry)
                };
                diagnostics.push(
                    Diagnostic::error(
                        "tag-entry",
                        CATEGORY,
                        format!("`{path}[{i}]` must be a non-empty string, found {found}"),
                    )
                    .at(ctx.pointer(&format!("{path}[{i}]"))),
                );
            }
        }

        for key in ["usmle", "nbme"] {
            if let Some(flag) = exam.and_then(|e| e.get(key))
                && !flag.is_null()
                && !flag.is_boolean()
            {
                let path = format!("tags.examRelevance.{key}");
                diagnostics.push(type_error(ctx.pointer(&path), &path, Kind::Boolean, flag));
            }
        }
        diagnostics
    }

    fn check_recommended(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let value = ctx.value();
        let mut diagnostics = Vec::new();
        if is_blank(value.get("nameEs")) {
            diagnostics.push(
                Diagnostic::warning("recommended-field", CATEGORY, "missing Spanish name `nameEs`")
                    .at(ctx.entry.pointer.clone()),
            );
        }
        for (i, link) in each_record(value, "crossReferences") {
            if link.is_object() && is_blank(link.get("targetType")) {
                diagnostics.push(
                    Diagnostic::warning(
                        "recommended-field",
                        CATEGORY,
                        "cross-reference has no `targetType`",
                    )
                    .at(ctx.pointer(&format!("crossReferences[{i}]"))),
                );
            }
        }
        diagnostics
    }
}

impl LintRule for MetadataRule {
    fn id(&self) -> &'static str {
        "metadata"
    }

    fn description(&self) -> &'static str {
        "Version, timestamps, exam tags and recommended metadata are well-formed"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let value = ctx.value();
        let mut diagnostics: Vec<Diagnostic> = Self::check_version(ctx).into_iter().collect();

        for field in ["createdAt", "updatedAt"] {
            if let Some(raw) = value.get(field).and_then(Value::as_str)
                && !is_valid_timestamp(raw)
            {
                diagnostics.push(
                    Diagnostic::error(
                        "invalid-timestamp",
                        CATEGORY,
                        format!("`{field}` is not an ISO 8601 date or RFC 3339 timestamp: '{raw}'"),
                    )
                    .at(ctx.pointer(field)),
                );
            }
        }

        diagnostics.extend(Self::check_exam_relevance(ctx));
        diagnostics.extend(Self::check_tag_entries(ctx));
        diagnostics.extend(Self::check_recommended(ctx));

        let is_condition = value.get("type").and_then(Value::as_str) == Some("condition");
        if !is_condition && !is_blank(value.get("hpoId")) {
            diagnostics.push(
                Diagnostic::warning(
                    "hpo-scope",
                    CATEGORY,
                    "`hpoId` is only meaningful on condition items",
                )
                .at(ctx.pointer("hpoId")),
            );
        }
        diagnostics
    }
}

/// Id naming conventions.
pub struct IdConventionRule;

impl LintRule for IdConventionRule {
    fn id(&self) -> &'static str {
        "id-convention"
    }

    fn description(&self) -> &'static str {
        "Ids are kebab-case and match the file or export key they live under"
    }

    fn category(&self) -> RuleCategory {
        CATEGORY
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let Some(id) = ctx.entry.id().filter(|id| !id.trim().is_empty()) else {
            return vec![];
        };
        let mut diagnostics = Vec::new();

        if !is_kebab_case(id) {
            diagnostics.push(
                Diagnostic::warning("id-format", CATEGORY, format!("id '{id}' is not kebab-case"))
                    .at(ctx.pointer("id"))
                    .with_suggestion("use lowercase words joined by single hyphens"),
            );
        }
        if let Some(slug) = &ctx.entry.slug
            && !id_matches_slug(id, slug)
        {
            diagnostics.push(
                Diagnostic::warning(
                    "id-filename",
                    CATEGORY,
                    format!("id '{id}' does not match its file or export name '{slug}'"),
                )
                .at(ctx.pointer("id")),
            );
        }
        diagnostics
    }
}

/// `file-name`: content file names are kebab-case. A per-file check, run by
/// the engine.
pub(crate) fn file_name_diagnostic(path: &Path) -> Option<Diagnostic> {
    let stem = path.file_stem()?.to_string_lossy();
    if is_kebab_case(&stem) {
        return None;
    }
    Some(
        Diagnostic::warning(
            "file-name",
            CATEGORY,
            format!("file name '{stem}' is not kebab-case"),
        )
        .with_suggestion(format!("rename the file to '{}'", slugify(&stem))),
    )
}

/// Returns all structural rules.
#[must_use]
pub fn structural_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(RequiredFieldsRule),
        Box::new(LevelsRule),
        Box::new(VocabularyRule),
        Box::new(MetadataRule),
        Box::new(IdConventionRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::rules::test_support::{entry, rule_ids, run_rules, valid_item};
    use serde_json::json;

    fn check(value: Value) -> Vec<Diagnostic> {
        let target = entry(value);
        run_rules(&structural_rules(), &target, &[&target])
    }

    #[test]
    fn test_valid_item_has_no_diagnostics() {
        let diags = check(valid_item("ear-otitis-media"));
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn test_missing_level_five() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"].as_object_mut().unwrap().remove("5");
        let diags = check(value);
        let errors: Vec<_> = diags.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 1, "{diags:?}");
        assert_eq!(errors[0].rule_id, "missing-level");
        assert!(errors[0].message.contains("level 5"));
    }

    #[test]
    fn test_one_error_per_missing_level() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"] = json!({"3": value["levels"]["3"].clone()});
        let diags = check(value);
        assert_eq!(
            rule_ids(&diags),
            vec!["missing-level", "missing-level", "missing-level", "missing-level"]
        );
    }

    #[test]
    fn test_missing_required_fields_and_wrong_types() {
        let mut value = valid_item("ear-otitis-media");
        let obj = value.as_object_mut().unwrap();
        obj.remove("createdAt");
        obj.insert("media".to_owned(), json!("none"));
        obj.insert("status".to_owned(), Value::Null);
        let diags = check(value);
        let ids = rule_ids(&diags);
        assert_eq!(ids.iter().filter(|id| **id == "required-field").count(), 2);
        assert!(ids.contains(&"field-type"));
    }

    #[test]
    fn test_level_mismatch_and_empty_prose() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["2"]["level"] = json!(3);
        value["levels"]["2"]["summary"] = json!("  ");
        value["levels"]["4"]["explanation"] = json!("");
        let ids = rule_ids(&check(value)).join(",");
        assert_eq!(ids, "level-mismatch,empty-summary,empty-explanation");
    }

    #[test]
    fn test_unexpected_level_key() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["6"] = value["levels"]["5"].clone();
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["unexpected-level"]);
    }

    #[test]
    fn test_key_term_incomplete_and_missing_key_terms() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["keyTerms"] = json!([{"term": "Otitis", "definition": ""}]);
        value["levels"]["2"].as_object_mut().unwrap().remove("keyTerms");
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["key-term-incomplete", "recommended-field"]);
        assert_eq!(diags[1].severity, Severity::Warning);
    }

    #[test]
    fn test_invalid_enums() {
        let mut value = valid_item("ear-otitis-media");
        value["type"] = json!("disease");
        value["citations"][0]["type"] = json!("blog");
        value["tags"]["clinicalRelevance"] = json!("extreme");
        value["media"] = json!([{"id": "m1", "type": "model-3d"}, {"id": "m2", "type": "hologram"}]);
        let diags = check(value);
        let enums: Vec<_> = diags.iter().filter(|d| d.rule_id == "invalid-enum").collect();
        assert_eq!(enums.len(), 4, "{diags:?}");
        assert!(enums.iter().any(|d| d.pointer.as_deref() == Some("$.media[1].type")));
    }

    #[test]
    fn test_version_and_timestamps() {
        let mut value = valid_item("ear-otitis-media");
        value["version"] = json!(0);
        value["createdAt"] = json!("yesterday");
        value["updatedAt"] = json!("2024-02-30");
        let diagnostics = check(value);
        let ids = rule_ids(&diagnostics);
        assert_eq!(ids, vec!["invalid-version", "invalid-timestamp", "invalid-timestamp"]);
    }

    #[test]
    fn test_fractional_version_rejected() {
        let mut value = valid_item("ear-otitis-media");
        value["version"] = json!(1.5);
        assert_eq!(rule_ids(&check(value)), vec!["invalid-version"]);
    }

    #[test]
    fn test_metadata_warnings() {
        let mut value = valid_item("ear-otitis-media");
        value["type"] = json!("structure");
        value["hpoId"] = json!("HP:0000388");
        value["tags"]["examRelevance"] = json!({"usmle": true, "mcat": true});
        value["crossReferences"] = json!([{"targetId": "ear-otitis-media-x", "relationship": "related"}]);
        value.as_object_mut().unwrap().remove("nameEs");
        let diagnostics = check(value);
        let ids = rule_ids(&diagnostics);
        assert_eq!(
            ids,
            vec!["exam-relevance", "recommended-field", "recommended-field", "hpo-scope"]
        );
    }

    #[test]
    fn test_tag_entries() {
        let mut value = valid_item("ear-otitis-media");
        value["tags"]["topics"] = json!(["infection", "  ", 4]);
        value["tags"]["examRelevance"] = json!({"usmle": "yes", "nbme": false, "shelf": ["pediatrics", ""]});
        let diags = check(value);
        assert_eq!(
            rule_ids(&diags),
            vec!["tag-entry", "tag-entry", "tag-entry", "field-type"]
        );
        assert_eq!(diags[0].pointer.as_deref(), Some("$.tags.topics[1]"));
        assert!(diags[0].message.ends_with("found an empty string"));
        assert!(diags[1].message.ends_with("found number"));
        assert_eq!(diags[2].pointer.as_deref(), Some("$.tags.examRelevance.shelf[1]"));
        assert_eq!(diags[3].pointer.as_deref(), Some("$.tags.examRelevance.usmle"));
        assert_eq!(
            diags[3].message,
            "`tags.examRelevance.usmle` must be a boolean, found string"
        );
        assert!(diags.iter().all(Diagnostic::is_error));
    }

    #[test]
    fn test_tag_lists_must_be_arrays() {
        let mut value = valid_item("ear-otitis-media");
        value["tags"]["systems"] = json!("ear");
        value["tags"]["examRelevance"] = json!({"shelf": "pediatrics", "usmle": null});
        let diags = check(value);
        assert_eq!(rule_ids(&diags), vec!["field-type", "field-type"]);
        assert_eq!(diags[1].pointer.as_deref(), Some("$.tags.examRelevance.shelf"));
    }

    #[test]
    fn test_file_name_convention() {
        assert!(file_name_diagnostic(Path::new("core/ear/otitis-media.json")).is_none());
        assert!(file_name_diagnostic(Path::new("core/ear/ear2.yaml")).is_none());

        let diag = file_name_diagnostic(Path::new("core/ear/otitisMedia.json")).unwrap();
        assert_eq!(diag.rule_id, "file-name");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.suggestion.as_deref(), Some("rename the file to 'otitis-media'"));
        assert!(file_name_diagnostic(Path::new("ear_disorders.json")).is_some());
    }

    #[test]
    fn test_id_conventions() {
        let mut value = valid_item("Ear_Otitis");
        let mut target = entry(value.clone());
        target.slug = Some("tinnitus".to_owned());
        let diags = run_rules(&structural_rules(), &target, &[&target]);
        assert_eq!(rule_ids(&diags), vec!["id-format", "id-filename"]);

        value["id"] = json!("ear-otitis-media");
        let mut target = entry(value);
        target.slug = Some("otitis-media".to_owned());
        assert!(run_rules(&structural_rules(), &target, &[&target]).is_empty());
    }
}
