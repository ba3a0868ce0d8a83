//! Built-in schemas and the per-file-category schema registry
//!
//! Every file category shares one shape: top-level keys are user-chosen internal
//! names and the per-entry schema sits beneath them. [`SchemaRegistry::insert`]
//! wraps a per-entry schema under a wildcard key so that callers always resolve
//! full key paths such as `["SkeletonKing", "Options", "Despawn"]`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::node::{SchemaKind, SchemaMap, SchemaNode, SuffixValues, ValueSuffix};

const WIKI: &str = "https://git.mythiccraft.io/mythiccraft/MythicMobs/-/wikis";

fn boolean(description: &str) -> SchemaNode {
    SchemaNode::new(SchemaKind::Boolean).describe(description)
}

fn string(description: &str) -> SchemaNode {
    SchemaNode::new(SchemaKind::String).describe(description)
}

fn integer(description: &str) -> SchemaNode {
    SchemaNode::new(SchemaKind::Integer).describe(description)
}

fn float(description: &str) -> SchemaNode {
    SchemaNode::new(SchemaKind::Float).describe(description)
}

fn dataset_enum(dataset: &str, description: &str) -> SchemaNode {
    SchemaNode::new(SchemaKind::Enum).with_dataset(dataset).describe(description)
}

/// A list of skill lines; its content is handled by the object resolver
fn skill_list(description: &str) -> SchemaNode {
    SchemaNode::new(SchemaKind::List).describe(description)
}

/// Per-entry schema of achievement files
pub fn achievement_schema() -> SchemaMap {
    SchemaMap::new()
        .key("Display", string("The title shown for the achievement"))
        .key("Description", string("The description shown below the title"))
        .key(
            "Icon",
            SchemaNode::new(SchemaKind::Key).describe("The icon of the achievement").with_keys(
                SchemaMap::new()
                    .key("Material", dataset_enum("MATERIAL", "The material of the icon"))
                    .key("Model", integer("The custom model data of the icon")),
            ),
        )
        .key("Parent", string("The achievement this one is nested under"))
        .key(
            "Frame",
            SchemaNode::new(SchemaKind::Enum)
                .describe("The frame drawn around the icon")
                .with_values(["TASK", "GOAL", "CHALLENGE"]),
        )
        .key("Background", string("The background texture of a root achievement"))
        .key("ShowToast", boolean("Whether a toast is shown on completion"))
        .key("AnnounceToChat", boolean("Whether completion is announced in chat"))
        .key("Hidden", boolean("Whether the achievement is hidden until completed"))
        .key("Criteria", SchemaNode::new(SchemaKind::KeyList).describe("The criteria to complete"))
        .key("Reward", skill_list("Skills executed on completion"))
}

fn bossbar_schema() -> SchemaMap {
    SchemaMap::new()
        .key("Enabled", boolean("Whether the mob has a boss bar"))
        .key("Title", string("The boss bar title"))
        .key("Range", integer("The distance the boss bar is visible from"))
        .key("Color", dataset_enum("BARCOLOR", "The boss bar color"))
        .key("Style", dataset_enum("BARSTYLE", "The boss bar style"))
        .key("CreateFog", boolean("Whether the boss bar creates fog"))
        .key("DarkenSky", boolean("Whether the boss bar darkens the sky"))
        .key("PlayMusic", boolean("Whether the boss bar plays boss music"))
}

fn mob_options_schema() -> SchemaMap {
    SchemaMap::new()
        .key("AlwaysShowName", boolean("Whether the name is always visible"))
        .key(
            "Despawn",
            SchemaNode::new(SchemaKind::Enum)
                .describe("When the mob despawns")
                .with_values(["true", "false", "persistent", "chunk", "never"]),
        )
        .key("FollowRange", float("The range the mob tracks targets within"))
        .key("Invincible", boolean("Whether the mob ignores all damage"))
        .key("KnockbackResistance", float("Knockback resistance between 0 and 1"))
        .key("MovementSpeed", float("The movement speed"))
        .key("NoAI", boolean("Whether the mob has no AI"))
        .key("PreventOtherDrops", boolean("Whether vanilla drops are removed"))
        .key("PreventRandomEquipment", boolean("Whether vanilla random equipment is suppressed"))
        .key("Silent", boolean("Whether the mob makes no sounds"))
}

/// Per-entry schema of mob files
pub fn mob_schema() -> SchemaMap {
    SchemaMap::new()
        .key(
            "Type",
            dataset_enum("ENTITYTYPE", "The entity type of the mob").with_link(format!("{}/Mobs/Mobs", WIKI)),
        )
        .key("Display", string("The display name of the mob"))
        .key("Health", float("The base health of the mob"))
        .key("Damage", float("The base melee damage of the mob"))
        .key("Armor", float("The base armor of the mob"))
        .key("Faction", string("The faction of the mob"))
        .key("Mount", string("The mob this mob rides"))
        .key("Template", string("The mob this mob inherits from"))
        .key(
            "Options",
            SchemaNode::new(SchemaKind::Key).describe("Mob options").with_keys(mob_options_schema()),
        )
        .key(
            "BossBar",
            SchemaNode::new(SchemaKind::Key).describe("Boss bar settings").with_keys(bossbar_schema()),
        )
        .key(
            "LevelModifiers",
            SchemaNode::new(SchemaKind::Key).describe("Per-level stat increases").with_keys(
                SchemaMap::new()
                    .key("Health", float("Health added per level"))
                    .key("Damage", float("Damage added per level"))
                    .key("Armor", float("Armor added per level")),
            ),
        )
        .key("Skills", skill_list("The skills of the mob"))
        .key("AIGoalSelectors", skill_list("The AI goals of the mob"))
        .key("AITargetSelectors", skill_list("The AI target selectors of the mob"))
        .key(
            "Drops",
            SchemaNode::new(SchemaKind::List)
                .describe("The drops of the mob: item, amount and chance")
                .with_entries(vec![
                    dataset_enum("MATERIAL", "The dropped item"),
                    integer("The amount, a number or a range").with_values(["1", "1-3"]),
                    float("The drop chance").with_values(["1", "0.5", "0.1"]),
                ]),
        )
        .key(
            "Equipment",
            SchemaNode::new(SchemaKind::List)
                .describe("The equipment of the mob: item and slot")
                .with_entries(vec![
                    dataset_enum("MATERIAL", "The equipped item"),
                    dataset_enum("EQUIPSLOT", "The slot the item is equipped in"),
                ]),
        )
        .key(
            "DamageModifiers",
            SchemaNode::new(SchemaKind::List)
                .describe("Damage cause multipliers")
                .with_entries(vec![
                    dataset_enum("DAMAGECAUSE", "The damage cause"),
                    float("The damage multiplier").with_values(["0", "0.5", "2"]),
                ]),
        )
        .key("Disguise", string("The disguise of the mob"))
}

/// Per-entry schema of item files
pub fn item_schema() -> SchemaMap {
    SchemaMap::new()
        .key("Id", dataset_enum("MATERIAL", "The material of the item"))
        .key("Material", dataset_enum("MATERIAL", "The material of the item"))
        .key("Display", string("The display name of the item"))
        .key("Lore", SchemaNode::new(SchemaKind::List).describe("The lore lines of the item"))
        .key("Model", integer("The custom model data of the item"))
        .key("Amount", integer("The stack size of the item"))
        .key(
            "Enchantments",
            SchemaNode::new(SchemaKind::List)
                .describe("Enchantments with their level")
                .with_dataset("ENCHANTMENT")
                .with_suffix(ValueSuffix {
                    separator: ":".to_string(),
                    values: SuffixValues::Range { min: 1, max: 5 },
                }),
        )
        .key(
            "Hide",
            SchemaNode::new(SchemaKind::List).describe("Item flags to hide").with_dataset("ITEMFLAG"),
        )
        .key(
            "Attributes",
            SchemaNode::new(SchemaKind::Key)
                .describe("Attribute modifiers per equipment slot")
                .with_keys(SchemaMap::new().array_key(
                    "EQUIPSLOT",
                    SchemaNode::new(SchemaKind::Key)
                        .describe("Attribute modifiers applied in this slot")
                        .with_keys(SchemaMap::new().array_key("ATTRIBUTE", float("The modifier amount"))),
                )),
        )
        .key(
            "Options",
            SchemaNode::new(SchemaKind::Key).describe("Item options").with_keys(
                SchemaMap::new()
                    .key("Unbreakable", boolean("Whether the item is unbreakable"))
                    .key("Color", SchemaNode::new(SchemaKind::Rgb).describe("Leather or potion color"))
                    .key("Glow", boolean("Whether the item glows"))
                    .key("Player", string("The owner of a player head")),
            ),
        )
        .key(
            "Bundle",
            SchemaNode::new(SchemaKind::Key)
                .describe("Items stored in the bundle")
                .depth_closed()
                .with_lazy_keys(|| {
                    SchemaMap::new()
                        .wildcard(SchemaNode::new(SchemaKind::Key).describe("A stored item").with_lazy_keys(item_schema))
                }),
        )
        .key("Skills", skill_list("Skills the item casts"))
}

/// Per-entry schema of metaskill files
pub fn skill_schema() -> SchemaMap {
    SchemaMap::new()
        .key("Cooldown", float("Cooldown in seconds"))
        .key("CancelIfNoTargets", boolean("Whether the skill stops without targets"))
        .key("OnCooldownSkill", string("The skill executed while on cooldown"))
        .key("FailedConditionsSkill", string("The skill executed when conditions fail"))
        .key("Conditions", skill_list("Conditions checked against the caster"))
        .key("TargetConditions", skill_list("Conditions checked against each target"))
        .key("TriggerConditions", skill_list("Conditions checked against the trigger"))
        .key("Skills", skill_list("The mechanics of the skill"))
}

/// Schemas by file category, each wrapped under a wildcard internal-name key
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Lowercased category name -> (category name, wrapped root)
    categories: FxHashMap<String, (String, Arc<SchemaMap>)>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `Mob`, `Item`, `Skill` and `Achievement` schemas
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert("Mob", mob_schema());
        registry.insert("Item", item_schema());
        registry.insert("Skill", skill_schema());
        registry.insert("Achievement", achievement_schema());
        registry
    }

    /// Register `entry_schema` for `category`, replacing a previous one.
    pub fn insert(&mut self, category: impl Into<String>, entry_schema: SchemaMap) {
        let category = category.into();
        let root = SchemaMap::new().wildcard(
            SchemaNode::new(SchemaKind::Key)
                .describe(format!("Internal name of the {}", category.to_lowercase()))
                .with_keys(entry_schema),
        );
        if self
            .categories
            .insert(category.to_lowercase(), (category.clone(), Arc::new(root)))
            .is_some()
        {
            debug!("Replaced schema for file category {}", category);
        }
    }

    /// Root mapping of `category`, case-insensitive
    pub fn get(&self, category: &str) -> Option<&SchemaMap> {
        self.categories.get(&category.to_lowercase()).map(|(_, root)| root.as_ref())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.values().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Datasets, EnumDataset};
    use crate::schema::locate::locate_schema_node;

    #[test]
    fn test_achievement_icon_material() {
        let schema = achievement_schema();
        let found = locate_schema_node(&["Icon", "Material"], &schema, &Datasets::new()).expect("located");
        assert_eq!(found.node.kind, SchemaKind::Enum);
        assert_eq!(found.node.dataset.as_deref(), Some("MATERIAL"));
        assert_eq!(found.depth, 1);
    }

    #[test]
    fn test_registry_wraps_under_internal_name() {
        let registry = SchemaRegistry::builtin();
        let mob = registry.get("mob").expect("mob schema");
        let found = locate_schema_node(&["SkeletonKing", "Options", "Despawn"], mob, &Datasets::new())
            .expect("located");
        assert_eq!(found.node.kind, SchemaKind::Enum);
        assert_eq!(found.depth, 2);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_item_attribute_array_keys() {
        let registry = SchemaRegistry::builtin();
        let item = registry.get("Item").expect("item schema");
        let datasets = Datasets::new()
            .with(EnumDataset::from_keys("EQUIPSLOT", ["HAND", "HEAD"]))
            .with(EnumDataset::from_keys("ATTRIBUTE", ["Damage", "Health"]));

        let found = locate_schema_node(&["Sword", "Attributes", "Hand", "Damage"], item, &datasets).expect("located");
        assert_eq!(found.node.kind, SchemaKind::Float);
        assert!(locate_schema_node(&["Sword", "Attributes", "Wing", "Damage"], item, &datasets).is_none());
    }

    #[test]
    fn test_recursive_bundle_is_depth_closed() {
        let registry = SchemaRegistry::builtin();
        let item = registry.get("Item").expect("item schema");
        let path = ["Pouch", "Bundle", "Inner", "Bundle", "Deeper", "Display"];
        let found = locate_schema_node(&path, item, &Datasets::new()).expect("located");
        assert_eq!(found.node.kind, SchemaKind::String);
        assert_eq!(found.depth, 1);
    }
}
