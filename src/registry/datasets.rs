//! Enumerated datasets (materials, entity types, sounds, ...)
//!
//! Datasets are ordered `(key, metadata)` lists addressed by an upper-case
//! identifier such as `MATERIAL`. Schema `enum` nodes, array keys and
//! dataset-backed placeholder segments all read them through [`DatasetProvider`].

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Metadata attached to one dataset entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntryMeta {
    #[serde(default)]
    pub description: Option<String>,
}

/// One named, ordered enumeration
#[derive(Debug, Clone, Default)]
pub struct EnumDataset {
    name: String,
    entries: Vec<(String, EnumEntryMeta)>,
    members: FxHashSet<String>,
}

impl EnumDataset {
    pub fn new(name: impl Into<String>, entries: Vec<(String, EnumEntryMeta)>) -> Self {
        let members = entries.iter().map(|(key, _)| key.to_lowercase()).collect();
        Self {
            name: name.into(),
            entries,
            members,
        }
    }

    /// Dataset of bare keys without metadata
    pub fn from_keys<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = keys
            .into_iter()
            .map(|key| (key.into(), EnumEntryMeta::default()))
            .collect();
        Self::new(name, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive membership
    pub fn contains(&self, key: &str) -> bool {
        self.members.contains(&key.to_lowercase())
    }

    pub fn entries(&self) -> &[(String, EnumEntryMeta)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read access to enumerated datasets by identifier
pub trait DatasetProvider {
    fn dataset(&self, name: &str) -> Option<&EnumDataset>;
}

/// Dataset collection keyed by upper-cased identifier
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    map: FxHashMap<String, EnumDataset>,
}

impl Datasets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: EnumDataset) {
        self.map.insert(dataset.name().to_uppercase(), dataset);
    }

    pub fn with(mut self, dataset: EnumDataset) -> Self {
        self.insert(dataset);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.values().map(|dataset| dataset.name())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl DatasetProvider for Datasets {
    fn dataset(&self, name: &str) -> Option<&EnumDataset> {
        self.map.get(&name.to_uppercase())
    }
}
