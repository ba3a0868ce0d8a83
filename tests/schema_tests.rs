use lsp_types::Position;
use mythic_analyzer::schema::{
    SchemaKind, SchemaMap, achievement_schema, generate_key_completions, locate_schema_node,
};
use test_utils::fixtures::sample_context;

fn labels(candidates: &[mythic_analyzer::Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.label.as_str()).collect()
}

#[test]
fn test_icon_material_is_material_enum() {
    let context = sample_context();
    let schema = achievement_schema();
    let found = locate_schema_node(&["Icon", "Material"], &schema, &context.datasets).expect("node");
    assert_eq!(found.node.kind, SchemaKind::Enum);
    assert_eq!(found.node.dataset.as_deref(), Some("MATERIAL"));
}

/// Every key offered at a level locates through the same path
fn assert_keys_round_trip(map: &SchemaMap, path: &mut Vec<String>, schema: &SchemaMap, remaining_depth: usize) {
    let context = sample_context();
    for candidate in generate_key_completions(map, &context.datasets, &[]) {
        path.push(candidate.label.clone());
        let found = locate_schema_node(path.as_slice(), schema, &context.datasets);
        assert!(found.is_some(), "key path {:?} does not locate", path);
        if remaining_depth > 0 {
            if let Some(children) = found.and_then(|found| found.node.children()) {
                assert_keys_round_trip(children, path, schema, remaining_depth - 1);
            }
        }
        path.pop();
    }
}

#[test]
fn test_completed_keys_locate_for_every_builtin_category() {
    let context = sample_context();
    for category in ["Mob", "Item", "Skill", "Achievement"] {
        let root = context.schemas.get(category).expect("builtin category");
        let entry = root
            .get("AnyInternalName", &context.datasets)
            .and_then(|node| node.children())
            .expect("wildcard entry schema");
        let mut path = vec!["AnyInternalName".to_string()];
        assert_keys_round_trip(entry, &mut path, root, 3);
    }
}

#[test]
fn test_option_keys_skip_existing_siblings() {
    let context = sample_context();
    let document = "Boss:\n  Options:\n    Silent: true\n    \n    NoAI: false\n";
    let candidates = context.complete_schema(document, Position::new(3, 4), "mob");
    let labels = labels(&candidates);
    assert!(labels.contains(&"Despawn"));
    assert!(!labels.contains(&"Silent"));
    assert!(!labels.contains(&"NoAI"));
    assert_eq!(candidates[0].insert_text, format!("{}: ", candidates[0].label));
}

#[test]
fn test_entity_type_values() {
    let context = sample_context();
    let candidates = context.complete_schema("Boss:\n  Type: ", Position::new(1, 8), "Mob");
    assert_eq!(labels(&candidates), vec!["ZOMBIE", "SKELETON"]);
}

#[test]
fn test_drops_positional_entries() {
    let context = sample_context();
    let document = "Boss:\n  Drops:\n  - STONE ";
    let candidates = context.complete_schema(document, Position::new(2, 10), "Mob");
    assert_eq!(labels(&candidates), vec!["1", "1-3"]);
    assert!(candidates.iter().all(|c| c.retrigger));
}

#[test]
fn test_attribute_slots_come_from_datasets() {
    let context = sample_context();
    let document = "Sword:\n  Attributes:\n    HAND:\n      ";
    let candidates = context.complete_schema(document, Position::new(3, 6), "Item");
    assert_eq!(labels(&candidates), vec!["ATTACK_DAMAGE", "MAX_HEALTH"]);
}

#[test]
fn test_bundle_schema_replaces_builtin_category() {
    let bundle = mythic_analyzer::DatasetBundle::parse(
        r#"{
            "datasets": { "PETTYPE": ["CAT", "DOG"] },
            "schemas": {
                "definitions": { "Stats": { "Speed": { "type": "float" } } },
                "categories": {
                    "Mob": { "Kind": { "type": "enum", "dataset": "PETTYPE" }, "Stats": { "ref": "Stats" } }
                }
            }
        }"#,
    )
    .expect("bundle");
    let context = mythic_analyzer::context::ResolutionContext::build(&bundle).expect("context");

    let keys = context.complete_schema("Rex:\n  ", Position::new(1, 2), "Mob");
    assert_eq!(labels(&keys), vec!["Kind", "Stats"]);
    let kinds = context.complete_schema("Rex:\n  Kind: ", Position::new(1, 8), "Mob");
    assert_eq!(labels(&kinds), vec!["CAT", "DOG"]);
    let stats = context.complete_schema("Rex:\n  Stats:\n    ", Position::new(2, 4), "Mob");
    assert_eq!(labels(&stats), vec!["Speed"]);
}
