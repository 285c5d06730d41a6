//! The `EducationalContent` family.
//!
//! These types mirror what authors write in content modules. Collections and
//! recommended fields default when absent so a partially-authored item still
//! deserializes; enforcing presence is the linter's job, not the type's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::level::ComplexityLevel;
use crate::vocabulary::{
    CitationType, ClinicalRelevance, ContentStatus, ContentType, MediaType, Relationship,
};

/// One self-contained educational item, written at five complexity tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalContent {
    /// Globally unique kebab-case identifier. Immutable once published.
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub name: String,
    /// Spanish display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_es: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,
    /// Human Phenotype Ontology id, only meaningful for conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpo_id: Option<String>,
    pub levels: BTreeMap<ComplexityLevel, LevelContent>,
    #[serde(default)]
    pub media: Vec<MediaAsset>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub cross_references: Vec<CrossReference>,
    #[serde(default)]
    pub tags: ContentTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
}

impl EducationalContent {
    #[must_use]
    pub fn level(&self, level: ComplexityLevel) -> Option<&LevelContent> {
        self.levels.get(&level)
    }

    #[must_use]
    pub fn is_condition(&self) -> bool {
        self.content_type == ContentType::Condition
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == Some(ContentStatus::Published)
    }
}

/// The prose for one complexity tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelContent {
    /// Must equal the key the entry is stored under.
    pub level: u8,
    #[serde(default)]
    pub summary: String,
    /// Markdown body. Expected to grow with the tier.
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub key_terms: Vec<KeyTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analogies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patient_counseling_points: Vec<String>,
}

impl LevelContent {
    /// Whether `word` is covered by a glossary entry (case-insensitive substring of a term).
    #[must_use]
    pub fn defines(&self, word: &str) -> bool {
        let needle = word.to_lowercase();
        self.key_terms
            .iter()
            .any(|t| t.term.to_lowercase().contains(&needle))
    }

    #[must_use]
    pub fn has_clinical_notes(&self) -> bool {
        self.clinical_notes
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty())
    }

    /// Every prose string of the level, labelled with its field name.
    pub fn prose(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let singles = [
            ("summary", self.summary.as_str()),
            ("explanation", self.explanation.as_str()),
        ];
        singles
            .into_iter()
            .chain(self.clinical_notes.as_deref().map(|n| ("clinicalNotes", n)))
            .chain(self.analogies.iter().map(|a| ("analogies", a.as_str())))
            .chain(self.examples.iter().map(|e| ("examples", e.as_str())))
            .chain(
                self.patient_counseling_points
                    .iter()
                    .map(|p| ("patientCounselingPoints", p.as_str())),
            )
            .chain(self.key_terms.iter().flat_map(|t| {
                [("keyTerms", t.term.as_str()), ("keyTerms", t.definition.as_str())]
            }))
    }
}

/// A glossary entry attached to a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// A bibliographic source backing the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub citation_type: Option<CitationType>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Citation {
    /// Names of the expected fields that are blank or absent.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.trim().is_empty() {
            missing.push("id");
        }
        if self.citation_type.is_none() {
            missing.push("type");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.source.trim().is_empty() {
            missing.push("source");
        }
        if self.citation_type == Some(CitationType::Website)
            && self.url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            missing.push("url");
        }
        missing
    }
}

/// A weak link to another item, resolved by id lookup only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    #[serde(default)]
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Filtering metadata. Shape-checked only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTags {
    #[serde(default)]
    pub systems: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_relevance: Option<ClinicalRelevance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_relevance: Option<ExamRelevance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRelevance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usmle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbme: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shelf: Vec<String>,
}

/// Exam keys recognised in `tags.examRelevance`.
pub const EXAM_KEYS: &[&str] = &["usmle", "nbme", "shelf"];
