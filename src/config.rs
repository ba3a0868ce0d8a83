//! Engine configuration
//!
//! Which YAML keys hold skill lines, and which registry un-sigiled objects under
//! them resolve against, differ between file categories and plugin versions, so
//! they are data rather than code. A bundle may carry a `config` object; missing
//! fields fall back to the defaults below.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::registry::ObjectCategory;

/// Default cap on integer-range suffix choices expanded into one snippet
pub const DEFAULT_MAX_SUFFIX_CHOICES: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Skill-bearing keys and the category of un-sigiled objects listed under them.
    /// Matched case-insensitively.
    pub key_categories: FxHashMap<String, ObjectCategory>,

    /// Attribute names treated as inline skill lists when the registry does not
    /// describe the attribute
    pub inline_list_attributes: Vec<String>,

    /// Largest integer range expanded into a snippet choice list
    pub max_suffix_choices: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let key_categories = [
            ("Skills", ObjectCategory::Mechanic),
            ("Conditions", ObjectCategory::Condition),
            ("TargetConditions", ObjectCategory::Condition),
            ("TriggerConditions", ObjectCategory::Condition),
            ("AIGoalSelectors", ObjectCategory::AiGoal),
            ("AITargetSelectors", ObjectCategory::AiTarget),
        ]
        .into_iter()
        .map(|(key, category)| (key.to_lowercase(), category))
        .collect();

        Self {
            key_categories,
            inline_list_attributes: vec![
                "skills".to_string(),
                "skill".to_string(),
                "s".to_string(),
                "onTick".to_string(),
                "onHit".to_string(),
                "onEnd".to_string(),
                "onStart".to_string(),
            ],
            max_suffix_choices: DEFAULT_MAX_SUFFIX_CHOICES,
        }
    }
}

impl EngineConfig {
    /// Category of objects listed under `key`, if `key` is skill-bearing
    pub fn key_category(&self, key: &str) -> Option<ObjectCategory> {
        self.key_categories.get(&key.to_lowercase()).copied()
    }

    pub fn is_skill_bearing(&self, key: &str) -> bool {
        self.key_category(key).is_some()
    }

    pub fn is_inline_list_attribute(&self, name: &str) -> bool {
        self.inline_list_attributes
            .iter()
            .any(|attribute| attribute.eq_ignore_ascii_case(name))
    }

    /// Normalise user-supplied key names to the lowercase form lookups use
    pub fn normalized(mut self) -> Self {
        self.key_categories = self
            .key_categories
            .into_iter()
            .map(|(key, category)| (key.to_lowercase(), category))
            .collect();
        self
    }
}
