//! Reference data registries
//!
//! - [`objects`]: per-category object definitions with attribute sets
//! - [`datasets`]: enumerated datasets for enum/array-key schema nodes

pub mod datasets;
pub mod objects;

use serde::{Deserialize, Serialize};

pub use datasets::{DatasetProvider, Datasets, EnumDataset, EnumEntryMeta};
pub use objects::{AttributeEntry, ObjectEntry, ObjectRegistry, SKILL_MECHANIC};

/// Category of a script object, selecting the registry it is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    Mechanic,
    Targeter,
    Condition,
    Trigger,
    AiGoal,
    AiTarget,
}

impl ObjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectCategory::Mechanic => "mechanic",
            ObjectCategory::Targeter => "targeter",
            ObjectCategory::Condition => "condition",
            ObjectCategory::Trigger => "trigger",
            ObjectCategory::AiGoal => "ai_goal",
            ObjectCategory::AiTarget => "ai_target",
        }
    }
}

/// All object registries of one reference-data load
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub mechanics: ObjectRegistry,
    pub targeters: ObjectRegistry,
    pub conditions: ObjectRegistry,
    pub triggers: ObjectRegistry,
    pub ai_goals: ObjectRegistry,
    pub ai_targets: ObjectRegistry,
}

impl Registry {
    pub fn category(&self, category: ObjectCategory) -> &ObjectRegistry {
        match category {
            ObjectCategory::Mechanic => &self.mechanics,
            ObjectCategory::Targeter => &self.targeters,
            ObjectCategory::Condition => &self.conditions,
            ObjectCategory::Trigger => &self.triggers,
            ObjectCategory::AiGoal => &self.ai_goals,
            ObjectCategory::AiTarget => &self.ai_targets,
        }
    }

    pub fn category_mut(&mut self, category: ObjectCategory) -> &mut ObjectRegistry {
        match category {
            ObjectCategory::Mechanic => &mut self.mechanics,
            ObjectCategory::Targeter => &mut self.targeters,
            ObjectCategory::Condition => &mut self.conditions,
            ObjectCategory::Trigger => &mut self.triggers,
            ObjectCategory::AiGoal => &mut self.ai_goals,
            ObjectCategory::AiTarget => &mut self.ai_targets,
        }
    }
}
