//! `--fix`: mechanically safe corrections.
//!
//! Fixes never touch prose meaning. JSON modules are re-parsed and
//! re-serialized with trailing whitespace trimmed, bullets normalised to `-`,
//! and `levels` keys in ascending order. YAML modules only get trailing
//! whitespace trimmed at the text level, and only when the result still
//! parses. Every rewrite goes through a temp file in the target directory
//! followed by a rename.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::FixError;
use crate::format::yaml::is_valid_yaml;
use crate::loader::{ItemShape, MAX_NESTING, classify};
use crate::markdown::{normalize_bullets, trim_trailing_whitespace};
use crate::strategy::ContentFormat;
use crate::strategy::fs::{ScanResult, content_format_for, read_file_bounded};

/// Level fields holding a single prose string.
const PROSE_FIELDS: &[&str] = &["summary", "explanation", "clinicalNotes"];

/// Level fields holding lists of prose strings.
const PROSE_LIST_FIELDS: &[&str] = &["analogies", "examples", "patientCounselingPoints"];

/// Level fields where list bullets are normalised.
const MARKDOWN_FIELDS: &[&str] = &["explanation", "clinicalNotes"];

/// Summary of a fix pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FixSummary {
    /// Files rewritten, in path order.
    pub files_fixed: Vec<PathBuf>,
    /// Files whose fix could not be written.
    pub errors: Vec<(PathBuf, String)>,
}

/// Fix every file in `files`. Unreadable or unparsable files are left alone;
/// the following lint run reports them.
#[must_use]
pub fn fix_files(files: &[PathBuf], max_file_size: u64, max_file_lines: usize) -> FixSummary {
    let mut outcomes: Vec<(PathBuf, Result<bool, FixError>)> = files
        .par_iter()
        .map(|path| (path.clone(), fix_file(path, max_file_size, max_file_lines)))
        .collect();
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut summary = FixSummary::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(true) => {
                tracing::info!(file = %path.display(), "applied fixes");
                summary.files_fixed.push(path);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to apply fixes");
                summary.errors.push((path, e.to_string()));
            }
        }
    }
    summary
}

/// Fix one file in place. Returns whether it was rewritten.
///
/// # Errors
///
/// Returns [`FixError`] if the fixed content cannot be serialized or written.
pub fn fix_file(path: &Path, max_file_size: u64, max_file_lines: usize) -> Result<bool, FixError> {
    let Some(format) = content_format_for(path) else {
        return Ok(false);
    };
    let ScanResult::Ok(content) = read_file_bounded(path, max_file_size) else {
        return Ok(false);
    };
    let fixed = match format {
        ContentFormat::Json => fix_json_text(&content, path)?,
        ContentFormat::Yaml => fix_yaml_text(&content),
    };
    let Some(fixed) = fixed else {
        return Ok(false);
    };

    // A rewrite must not push a file over the line budget.
    let before = content.lines().count();
    let after = fixed.lines().count();
    if after > max_file_lines && before <= max_file_lines {
        tracing::debug!(file = %path.display(), before, after, "fix skipped, would exceed line budget");
        return Ok(false);
    }

    write_atomic(path, &fixed)?;
    Ok(true)
}

/// Apply JSON fixes. `None` when the text does not parse or nothing changed.
///
/// # Errors
///
/// Returns [`FixError::Serialize`] if the fixed value cannot be written back.
pub fn fix_json_text(content: &str, path: &Path) -> Result<Option<String>, FixError> {
    let Ok(mut value) = serde_json::from_str::<Value>(content) else {
        return Ok(None);
    };
    if !fix_value(&mut value, 0) {
        return Ok(None);
    }
    let mut out = serde_json::to_string_pretty(&value).map_err(|source| FixError::Serialize {
        path: path.to_owned(),
        source,
    })?;
    out.push('\n');
    Ok(Some(out))
}

/// Apply YAML fixes. `None` when nothing changed or the result would not parse.
#[must_use]
pub fn fix_yaml_text(content: &str) -> Option<String> {
    let fixed = trim_trailing_whitespace(content);
    (fixed != content && is_valid_yaml(&fixed)).then_some(fixed)
}

/// Fix every strict item reachable in `value`, following the same containers
/// the loader does.
fn fix_value(value: &mut Value, depth: usize) -> bool {
    match classify(value) {
        Some(ItemShape::Strict) => {
            return value.as_object_mut().is_some_and(fix_item);
        }
        Some(ItemShape::Custom) => return false,
        None => {}
    }
    if depth >= MAX_NESTING {
        return false;
    }
    let mut changed = false;
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                changed |= fix_value(child, depth + 1);
            }
        }
        Value::Array(items) => {
            for child in items {
                changed |= fix_value(child, depth + 1);
            }
        }
        _ => {}
    }
    changed
}

fn fix_item(item: &mut Map<String, Value>) -> bool {
    let Some(Value::Object(levels)) = item.get_mut("levels") else {
        return false;
    };
    let mut changed = sort_level_keys(levels);
    for level in levels.values_mut() {
        if let Value::Object(level) = level {
            changed |= fix_level(level);
        }
    }
    changed
}

/// Order `levels` keys numerically; non-numeric keys go last.
///
/// Map equality ignores order, so the change is detected by comparing keys.
fn sort_level_keys(levels: &mut Map<String, Value>) -> bool {
    let rank = |key: &str| key.parse::<u32>().map_or((1, u32::MAX), |n| (0, n));
    let sorted = levels
        .keys()
        .zip(levels.keys().skip(1))
        .all(|(a, b)| (rank(a), a) <= (rank(b), b));
    if sorted {
        return false;
    }
    let mut entries: Vec<(String, Value)> = std::mem::take(levels).into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| (rank(a), a).cmp(&(rank(b), b)));
    *levels = entries.into_iter().collect();
    true
}

fn fix_string(value: &mut Value, bullets: bool) -> bool {
    let Value::String(text) = value else {
        return false;
    };
    let mut fixed = trim_trailing_whitespace(text);
    if bullets {
        fixed = normalize_bullets(&fixed);
    }
    if fixed == *text {
        return false;
    }
    *text = fixed;
    true
}

fn fix_level(level: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    for &field in PROSE_FIELDS {
        if let Some(value) = level.get_mut(field) {
            changed |= fix_string(value, MARKDOWN_FIELDS.contains(&field));
        }
    }
    for &field in PROSE_LIST_FIELDS {
        if let Some(Value::Array(items)) = level.get_mut(field) {
            for item in items {
                changed |= fix_string(item, false);
            }
        }
    }
    if let Some(Value::Array(terms)) = level.get_mut("keyTerms") {
        for term in terms.iter_mut().filter_map(Value::as_object_mut) {
            for field in ["term", "definition"] {
                if let Some(value) = term.get_mut(field) {
                    changed |= fix_string(value, false);
                }
            }
        }
    }
    changed
}

fn write_atomic(path: &Path, content: &str) -> Result<(), FixError> {
    let write_err = |source| FixError::Write {
        path: path.to_owned(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    // Temp files are created owner-only; the rewrite keeps the original mode.
    let permissions = fs::metadata(path).map_err(write_err)?.permissions();
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().set_permissions(permissions).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::valid_item;
    use serde_json::json;
    use tempfile::TempDir;

    fn fix(value: &Value) -> Option<Value> {
        let text = serde_json::to_string(value).unwrap();
        fix_json_text(&text, Path::new("x.json"))
            .unwrap()
            .map(|out| serde_json::from_str(&out).unwrap())
    }

    #[test]
    fn test_valid_item_needs_no_fix() {
        assert!(fix(&valid_item("ear-otitis-media")).is_none());
    }

    #[test]
    fn test_trims_whitespace_and_normalises_bullets() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["3"]["explanation"] = json!("Causes:  \n- fluid\n* pressure\t\n+ infection");
        value["levels"]["1"]["analogies"] = json!(["Like a drum.   "]);
        value["levels"]["2"]["keyTerms"][0]["definition"] = json!("A membrane. ");

        let fixed = fix(&value).unwrap();
        assert_eq!(
            fixed["levels"]["3"]["explanation"],
            json!("Causes:\n- fluid\n- pressure\n- infection")
        );
        assert_eq!(fixed["levels"]["1"]["analogies"][0], json!("Like a drum."));
        assert_eq!(fixed["levels"]["2"]["keyTerms"][0]["definition"], json!("A membrane."));
        assert!(fix(&fixed).is_none(), "second pass must be a no-op");
    }

    #[test]
    fn test_summary_bullets_are_left_alone() {
        let mut value = valid_item("ear-otitis-media");
        value["levels"]["1"]["summary"] = json!("* one");
        assert!(fix(&value).is_none());
    }

    #[test]
    fn test_reorders_level_keys() {
        let mut value = valid_item("ear-otitis-media");
        let levels = value["levels"].as_object().unwrap().clone();
        let reversed: Map<String, Value> = levels.into_iter().rev().collect();
        value["levels"] = Value::Object(reversed);

        let fixed = fix(&value).unwrap();
        let keys: Vec<_> = fixed["levels"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_fixes_items_inside_containers() {
        let mut item = valid_item("ear-otitis-media");
        item["levels"]["2"]["summary"] = json!("Summary. ");
        let fixed = fix(&json!({"ear": {"otitisMedia": item}})).unwrap();
        assert_eq!(fixed["ear"]["otitisMedia"]["levels"]["2"]["summary"], json!("Summary."));
    }

    #[test]
    fn test_yaml_trim() {
        assert_eq!(fix_yaml_text("id: a  \nname: b\n").as_deref(), Some("id: a\nname: b\n"));
        assert_eq!(fix_yaml_text("id: a\n"), None);
        assert_eq!(fix_yaml_text("key: [unclosed  \n"), None);
    }

    #[test]
    fn test_fix_file_rewrites_atomically() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ear.json");
        let mut value = valid_item("ear");
        value["levels"]["1"]["summary"] = json!("Summary.  ");
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        assert!(fix_file(&path, 1 << 20, 600).unwrap());
        assert!(!fix_file(&path, 1 << 20, 600).unwrap());

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["levels"]["1"]["summary"], json!("Summary."));
        let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_fix_respects_line_budget() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ear.json");
        let mut value = valid_item("ear");
        value["levels"]["1"]["summary"] = json!("Summary.  ");
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        assert!(!fix_file(&path, 1 << 20, 5).unwrap());
    }
}
