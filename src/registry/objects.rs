//! Object registries: mechanics, targeters, conditions, triggers and AI selectors
//!
//! Each category is an ordered list of [`ObjectEntry`] values with a
//! case-insensitive name/alias index. Lookups return `None` for unknown names;
//! users type arbitrary text and an unknown name is an ordinary outcome.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name of the mechanic that `skill:<name>` shorthand resolves to
pub const SKILL_MECHANIC: &str = "skill";

/// A named, typed parameter of an object, written `name=value`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    /// The attribute's value is an inline `[ - condition ]` list
    #[serde(default)]
    pub inline_conditions: bool,
    /// Enumerated dataset the attribute's values come from
    #[serde(default)]
    pub dataset: Option<String>,
}

impl AttributeEntry {
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// A mechanic, targeter, condition, trigger or AI selector definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeEntry>,
}

impl ObjectEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|alias| alias.to_string()).collect();
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeEntry) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Attribute by name or alias, case-insensitive
    pub fn get_attribute_by_name(&self, name: &str) -> Option<&AttributeEntry> {
        self.attributes.iter().find(|attribute| attribute.matches(name))
    }

    /// Stand-in for the `skill` mechanic when the registry does not define one
    pub fn synthetic_skill() -> Self {
        ObjectEntry {
            name: SKILL_MECHANIC.to_string(),
            aliases: vec!["metaskill".to_string()],
            description: Some("Executes a metaskill".to_string()),
            link: None,
            attributes: vec![AttributeEntry {
                name: "skill".to_string(),
                aliases: vec!["s".to_string(), "meta".to_string(), "m".to_string()],
                value_type: Some("metaskill".to_string()),
                description: Some("The metaskill to execute".to_string()),
                ..Default::default()
            }],
        }
    }
}

/// Ordered registry of one object category
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    entries: Vec<Arc<ObjectEntry>>,
    /// Lowercased name or alias -> index into `entries`
    index: FxHashMap<String, usize>,
}

impl ObjectRegistry {
    pub fn new(entries: Vec<ObjectEntry>) -> Self {
        let mut registry = ObjectRegistry::default();
        for entry in entries {
            registry.insert(entry);
        }
        registry
    }

    /// Add an entry; a later entry does not shadow names already taken
    pub fn insert(&mut self, entry: ObjectEntry) {
        let position = self.entries.len();
        for name in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
            let key = name.to_lowercase();
            if self.index.contains_key(&key) {
                warn!("Duplicate object name or alias {:?}; keeping the first definition", name);
                continue;
            }
            self.index.insert(key, position);
        }
        self.entries.push(Arc::new(entry));
    }

    /// Entry by name or alias, case-insensitive
    pub fn get_by_name(&self, name: &str) -> Option<Arc<ObjectEntry>> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|&position| self.entries.get(position))
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ObjectEntry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn damage() -> ObjectEntry {
        ObjectEntry::new("damage")
            .with_aliases(&["dmg", "d"])
            .with_attribute(AttributeEntry {
                name: "amount".to_string(),
                aliases: vec!["a".to_string()],
                ..Default::default()
            })
    }

    #[test]
    fn test_lookup_by_alias_is_case_insensitive() {
        let registry = ObjectRegistry::new(vec![damage()]);
        assert_eq!(registry.get_by_name("DMG").map(|e| e.name.clone()), Some("damage".to_string()));
        assert!(registry.get_by_name("heal").is_none());
    }

    #[test]
    fn test_attribute_lookup() {
        let entry = damage();
        assert_eq!(entry.get_attribute_by_name("A").map(|a| a.name.as_str()), Some("amount"));
        assert!(entry.get_attribute_by_name("missing").is_none());
    }

    #[test]
    fn test_first_definition_wins() {
        let registry = ObjectRegistry::new(vec![damage(), ObjectEntry::new("decoy").with_aliases(&["d"])]);
        assert_eq!(registry.get_by_name("d").map(|e| e.name.clone()), Some("damage".to_string()));
        assert_eq!(registry.get_by_name("decoy").map(|e| e.name.clone()), Some("decoy".to_string()));
        assert_eq!(registry.len(), 2);
    }
}
