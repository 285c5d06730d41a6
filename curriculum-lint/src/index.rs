//! Immutable corpus id index.
//!
//! Built once per run from every extracted entry and handed to the reference
//! rules by shared borrow; nothing mutates it after construction.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde_json::Value;

use crate::loader::{ContentEntry, ItemShape};

/// Where an id is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdLocation {
    pub file: PathBuf,
    pub document: usize,
    pub pointer: String,
}

impl IdLocation {
    fn of(entry: &ContentEntry) -> Self {
        Self {
            file: entry.file.clone(),
            document: entry.document,
            pointer: entry.pointer.clone(),
        }
    }

    #[must_use]
    pub fn is(&self, entry: &ContentEntry) -> bool {
        self.file == entry.file && self.document == entry.document && self.pointer == entry.pointer
    }
}

#[derive(Debug, Default)]
pub struct CorpusIndex {
    /// Strict item ids, with every declaration in load order.
    locations: HashMap<String, Vec<IdLocation>>,
    /// Every id declared anywhere, custom modules included.
    known: HashSet<String>,
    /// Outgoing link targets per strict item id.
    links: HashMap<String, HashSet<String>>,
}

impl CorpusIndex {
    /// Build the index from entries in deterministic (path-sorted) order.
    #[must_use]
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a ContentEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let Some(id) = entry.id() else { continue };
            index.known.insert(id.to_owned());
            if entry.shape != ItemShape::Strict {
                continue;
            }
            index
                .locations
                .entry(id.to_owned())
                .or_default()
                .push(IdLocation::of(entry));

            let targets = entry
                .value
                .get("crossReferences")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|r| r.get("targetId").and_then(Value::as_str))
                .map(str::to_owned);
            index
                .links
                .entry(id.to_owned())
                .or_default()
                .extend(targets);
        }
        index
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    /// First declaration of a strict id.
    #[must_use]
    pub fn first_location(&self, id: &str) -> Option<&IdLocation> {
        self.locations.get(id).and_then(|locs| locs.first())
    }

    /// Number of strict declarations of `id`.
    #[must_use]
    pub fn occurrences(&self, id: &str) -> usize {
        self.locations.get(id).map_or(0, Vec::len)
    }

    /// Whether item `from` links to `to`.
    #[must_use]
    pub fn links_to(&self, from: &str, to: &str) -> bool {
        self.links.get(from).is_some_and(|targets| targets.contains(to))
    }

    /// Number of distinct ids in the corpus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
