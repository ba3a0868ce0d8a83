//! Reference-data bundles
//!
//! A bundle is one JSON document carrying everything a resolution context is
//! built from:
//!
//! ```json
//! {
//!   "mechanics": [{ "name": "damage", "aliases": ["dmg"], "attributes": [...] }],
//!   "targeters": [...], "conditions": [...], "triggers": [...],
//!   "ai_goals": [...], "ai_targets": [...],
//!   "datasets": { "MATERIAL": ["STONE", { "key": "DIAMOND", "description": "..." }] },
//!   "placeholders": [{ "path": "caster.name", "return_type": "STRING" }],
//!   "meta_keywords": [{ "path": "toupper", "origin_type": "STRING", "return_type": "STRING" }],
//!   "schemas": { "definitions": {...}, "categories": {...} },
//!   "config": { "max_suffix_choices": 16 }
//! }
//! ```
//!
//! Every field is optional. Fetching bundles from anywhere but the local file
//! system is left to callers.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::BundleError;
use crate::placeholder::{MetaKeyword, PlaceholderEntry};
use crate::registry::{Datasets, EnumDataset, EnumEntryMeta, ObjectCategory, ObjectEntry, ObjectRegistry, Registry};

/// A dataset entry: a bare key or a key with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEnumEntry {
    Key(String),
    Described {
        key: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl RawEnumEntry {
    fn into_entry(self) -> (String, EnumEntryMeta) {
        match self {
            RawEnumEntry::Key(key) => (key, EnumEntryMeta::default()),
            RawEnumEntry::Described { key, description } => (key, EnumEntryMeta { description }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetBundle {
    pub mechanics: Vec<ObjectEntry>,
    pub targeters: Vec<ObjectEntry>,
    pub conditions: Vec<ObjectEntry>,
    pub triggers: Vec<ObjectEntry>,
    pub ai_goals: Vec<ObjectEntry>,
    pub ai_targets: Vec<ObjectEntry>,
    pub datasets: FxHashMap<String, Vec<RawEnumEntry>>,
    pub placeholders: Vec<PlaceholderEntry>,
    pub meta_keywords: Vec<MetaKeyword>,
    /// Schema document, compiled when a context is built
    pub schemas: Option<serde_json::Value>,
    pub config: Option<EngineConfig>,
}

impl DatasetBundle {
    /// Read and parse a bundle file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::parse(&text)?;
        info!("Loaded bundle {:?}", path);
        Ok(bundle)
    }

    pub fn parse(text: &str) -> Result<Self, BundleError> {
        let bundle: DatasetBundle = serde_json::from_str(text)?;
        debug!(
            "Parsed bundle: {} mechanics, {} targeters, {} conditions, {} datasets, {} placeholders",
            bundle.mechanics.len(),
            bundle.targeters.len(),
            bundle.conditions.len(),
            bundle.datasets.len(),
            bundle.placeholders.len()
        );
        Ok(bundle)
    }

    fn objects(&self, category: ObjectCategory) -> &[ObjectEntry] {
        match category {
            ObjectCategory::Mechanic => &self.mechanics,
            ObjectCategory::Targeter => &self.targeters,
            ObjectCategory::Condition => &self.conditions,
            ObjectCategory::Trigger => &self.triggers,
            ObjectCategory::AiGoal => &self.ai_goals,
            ObjectCategory::AiTarget => &self.ai_targets,
        }
    }

    pub fn registry(&self) -> Registry {
        let mut registry = Registry::default();
        for category in [
            ObjectCategory::Mechanic,
            ObjectCategory::Targeter,
            ObjectCategory::Condition,
            ObjectCategory::Trigger,
            ObjectCategory::AiGoal,
            ObjectCategory::AiTarget,
        ] {
            *registry.category_mut(category) = ObjectRegistry::new(self.objects(category).to_vec());
        }
        registry
    }

    pub fn datasets(&self) -> Datasets {
        let mut datasets = Datasets::new();
        for (name, entries) in &self.datasets {
            let entries = entries.iter().cloned().map(RawEnumEntry::into_entry).collect();
            datasets.insert(EnumDataset::new(name.clone(), entries));
        }
        datasets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DatasetProvider;
    use std::io::Write;

    const BUNDLE: &str = r#"{
        "mechanics": [{ "name": "damage", "aliases": ["dmg"], "attributes": [{ "name": "amount", "aliases": ["a"], "type": "number" }] }],
        "targeters": [{ "name": "PlayersInRadius", "aliases": ["PIR"] }],
        "datasets": { "MATERIAL": ["STONE", { "key": "DIAMOND", "description": "Shiny" }] },
        "placeholders": [{ "path": "caster.name", "return_type": "STRING" }]
    }"#;

    #[test]
    fn test_parse_bundle() {
        let bundle = DatasetBundle::parse(BUNDLE).expect("valid bundle");
        let registry = bundle.registry();
        let damage = registry.mechanics.get_by_name("DMG").expect("damage");
        assert_eq!(damage.attributes[0].value_type.as_deref(), Some("number"));
        assert!(registry.targeters.get_by_name("pir").is_some());
        assert!(registry.conditions.is_empty());

        let datasets = bundle.datasets();
        let material = datasets.dataset("material").expect("material");
        assert_eq!(material.keys().collect::<Vec<_>>(), vec!["STONE", "DIAMOND"]);
        assert_eq!(material.entries()[1].1.description.as_deref(), Some("Shiny"));
        assert!(bundle.config.is_none());
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = DatasetBundle::parse("{}").expect("valid bundle");
        assert!(bundle.registry().mechanics.is_empty());
        assert!(bundle.datasets().is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(BUNDLE.as_bytes()).expect("write bundle");
        let bundle = DatasetBundle::from_path(file.path()).expect("bundle loads");
        assert_eq!(bundle.mechanics.len(), 1);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(DatasetBundle::parse("{ not json"), Err(BundleError::Json(_))));
        assert!(matches!(
            DatasetBundle::from_path("/nonexistent/bundle.json"),
            Err(BundleError::Io { .. })
        ));
    }
}
