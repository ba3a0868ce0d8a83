//! Reference data and documents used across tests

use indoc::indoc;
use mythic_analyzer::context::ResolutionContext;
use mythic_analyzer::{DatasetBundle, SharedContext};

/// A small but complete bundle: mechanics with inline-list attributes, a
/// targeter, conditions, triggers, datasets, placeholders and meta keywords.
pub const SAMPLE_BUNDLE: &str = r#"{
    "mechanics": [
        { "name": "damage", "aliases": ["dmg"], "description": "Deals damage",
          "attributes": [
            { "name": "amount", "aliases": ["a"], "type": "number" },
            { "name": "ignorearmor", "aliases": ["ia"], "type": "boolean" }
          ] },
        { "name": "sound", "aliases": ["s"],
          "attributes": [ { "name": "sound", "aliases": ["s"], "dataset": "SOUND" } ] },
        { "name": "skill", "aliases": ["metaskill"],
          "attributes": [
            { "name": "skill", "aliases": ["s", "m"], "type": "metaskill" },
            { "name": "conditions", "aliases": ["cond"], "inline_conditions": true }
          ] },
        { "name": "projectile",
          "attributes": [
            { "name": "onTick", "aliases": ["ot"] },
            { "name": "velocity", "aliases": ["v"], "type": "number" }
          ] }
    ],
    "targeters": [
        { "name": "PlayersInRadius", "aliases": ["PIR"],
          "attributes": [ { "name": "radius", "aliases": ["r"], "type": "number" } ] }
    ],
    "conditions": [
        { "name": "distance",
          "attributes": [ { "name": "distance", "aliases": ["d"], "type": "range" } ] },
        { "name": "health",
          "attributes": [ { "name": "health", "aliases": ["h"] } ] }
    ],
    "triggers": [ { "name": "onTimer" }, { "name": "onDamaged" } ],
    "ai_goals": [ { "name": "meleeattack" } ],
    "ai_targets": [ { "name": "attacker" } ],
    "datasets": {
        "MATERIAL": ["STONE", "DIAMOND_SWORD", { "key": "IRON_INGOT", "description": "Iron" }],
        "ENTITYTYPE": ["ZOMBIE", "SKELETON"],
        "SOUND": ["ENTITY_CAT_PURR"],
        "EQUIPSLOT": ["HAND", "HEAD"],
        "ATTRIBUTE": ["ATTACK_DAMAGE", "MAX_HEALTH"],
        "ENCHANTMENT": ["SHARPNESS", "UNBREAKING"],
        "BARCOLOR": ["RED", "BLUE"],
        "BARSTYLE": ["SOLID"]
    },
    "placeholders": [
        { "path": "caster.name", "return_type": "STRING" },
        { "path": "caster.hp", "return_type": "INTEGER" },
        { "path": "caster.var.{name}", "return_type": "ANY" },
        { "path": "target.l.x" }
    ],
    "meta_keywords": [
        { "path": "toupper", "origin_type": "STRING", "return_type": "STRING" },
        { "path": "add.{integer}", "origin_type": "INTEGER", "return_type": "INTEGER" },
        { "path": "size", "origin_type": "ALL", "return_type": "INTEGER" }
    ]
}"#;

pub fn sample_bundle() -> DatasetBundle {
    DatasetBundle::parse(SAMPLE_BUNDLE).expect("sample bundle parses")
}

pub fn sample_context() -> ResolutionContext {
    ResolutionContext::build(&sample_bundle()).expect("sample context builds")
}

pub fn shared_sample_context() -> SharedContext {
    SharedContext::new(sample_context())
}

/// A mob file exercising skill sections, nested inline lists and sigils
pub const MOB_FILE: &str = indoc! {"
    SkeletalKnight:
      Type: SKELETON
      Health: 40
      Skills:
      - damage{a=10;ia=true} @PIR{r=5} ~onTimer:20 ?distance{d=<5} 0.5
      - skill{conditions=[ - distance{d=1} ]; s=[ - dmg{a=1} ]}
      - projectile{onTick=[ - sound{s=ENTITY_CAT_PURR} ]; v=5}
      Conditions:
      - health{h=>10}
"};

/// Repeat a mob block `count` times under distinct names
pub fn large_mob_file(count: usize) -> String {
    let mut text = String::new();
    for index in 0..count {
        text.push_str(&MOB_FILE.replacen("SkeletalKnight", &format!("Knight{}", index), 1));
    }
    text
}
