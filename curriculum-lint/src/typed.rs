//! Field-by-field typed view of a raw item.
//!
//! A single bad field (an unknown tag, a string where a number belongs) makes
//! strict deserialization of the whole item fail. The prose passes must still
//! run in that case, so each field is read on its own and one that does not
//! deserialize falls back to its default. The structural pass reports the bad
//! field itself.

use std::collections::BTreeMap;

use curriculum::{
    ComplexityLevel, ContentType, CrossReference, EducationalContent, LevelContent,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Deserialize `value`, dropping any object field that prevents it.
///
/// Fields are admitted one at a time on top of `seed`; a field is kept only
/// if the record still deserializes with it.
fn salvage<T: DeserializeOwned>(value: &Value, seed: Map<String, Value>) -> Option<T> {
    if let Ok(record) = T::deserialize(value) {
        return Some(record);
    }
    let obj = value.as_object()?;
    let mut kept = seed;
    for (key, field) in obj {
        if kept.contains_key(key) {
            continue;
        }
        kept.insert(key.clone(), field.clone());
        if T::deserialize(&Value::Object(kept.clone())).is_err() {
            kept.remove(key);
        }
    }
    T::deserialize(&Value::Object(kept)).ok()
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    obj.get(key).and_then(|v| T::deserialize(v).ok())
}

/// Salvage every object element of the array at `key`.
fn records<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| salvage(v, Map::new()))
        .collect()
}

fn strings(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_owned))
        .collect()
}

fn level_view(level: ComplexityLevel, value: &Value) -> Option<LevelContent> {
    let mut seed = Map::new();
    seed.insert("level".to_owned(), Value::from(level.get()));
    salvage(value, seed)
}

/// Typed view of a strict item, or `None` when it has no `levels` object.
///
/// Level entries stored under keys outside 1..=5 are left out. An unusable
/// `type` reads as `topic`, so condition-only checks stay quiet.
#[must_use]
pub fn lenient_item(value: &Value) -> Option<EducationalContent> {
    let obj = value.as_object()?;
    let levels: BTreeMap<ComplexityLevel, LevelContent> = obj
        .get("levels")?
        .as_object()?
        .iter()
        .filter_map(|(key, entry)| {
            let level = ComplexityLevel::from_key(key).ok()?;
            Some((level, level_view(level, entry)?))
        })
        .collect();

    Some(EducationalContent {
        id: field(obj, "id").unwrap_or_default(),
        content_type: field(obj, "type").unwrap_or(ContentType::Topic),
        name: field(obj, "name").unwrap_or_default(),
        name_es: field(obj, "nameEs"),
        alternate_names: strings(obj, "alternateNames"),
        hpo_id: field(obj, "hpoId"),
        levels,
        media: records(obj, "media"),
        citations: records(obj, "citations"),
        cross_references: records::<CrossReference>(obj, "crossReferences"),
        tags: obj
            .get("tags")
            .and_then(|tags| salvage(tags, Map::new()))
            .unwrap_or_default(),
        created_at: field(obj, "createdAt"),
        updated_at: field(obj, "updatedAt"),
        version: field(obj, "version"),
        status: field(obj, "status"),
    })
}
