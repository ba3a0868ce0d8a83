//! JSON schema documents
//!
//! Bundles may carry schemas for file categories the built-in catalog does not
//! cover. The document format:
//!
//! ```json
//! {
//!   "definitions": { "Stats": { "Health": { "type": "float" } } },
//!   "categories": {
//!     "Pet": {
//!       "Type": { "type": "enum", "dataset": "ENTITYTYPE" },
//!       "Stats": { "ref": "Stats" },
//!       "Modifiers": { "type": "key", "keys": { "[ATTRIBUTE]": { "type": "float" } } }
//!     }
//!   }
//! }
//! ```
//!
//! A mapping key `*` (or any `<name>`) is the wildcard key and `[DATASET]` the
//! array key over that dataset. A node with `"ref"` takes its children from the
//! named definition, compiled lazily on first traversal; definitions may refer
//! to themselves.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::node::{ArrayKey, SchemaKind, SchemaMap, SchemaNode, ValueSuffix};
use crate::error::{BundleError, SchemaError};

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    definitions: Map<String, Value>,
    #[serde(default)]
    categories: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: Option<SchemaKind>,
    description: Option<String>,
    link: Option<String>,
    #[serde(default)]
    values: Vec<String>,
    dataset: Option<String>,
    #[serde(default)]
    entries: Vec<Value>,
    keys: Option<Map<String, Value>>,
    #[serde(rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    max_depth: bool,
    suffix: Option<ValueSuffix>,
}

type Definitions = FxHashMap<String, Map<String, Value>>;

enum MappingKey<'a> {
    Literal(&'a str),
    Wildcard,
    Array(&'a str),
}

fn classify(key: &str) -> MappingKey<'_> {
    if key == "*" || (key.len() > 1 && key.starts_with('<') && key.ends_with('>')) {
        MappingKey::Wildcard
    } else if key.len() > 1 && key.starts_with('[') && key.ends_with(']') {
        MappingKey::Array(key[1..key.len() - 1].trim())
    } else {
        MappingKey::Literal(key)
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

struct Compiler {
    definitions: Arc<Definitions>,
}

impl Compiler {
    fn compile_map(&self, raw: &Map<String, Value>, path: &str) -> Result<SchemaMap, BundleError> {
        let mut map = SchemaMap::new();
        for (key, value) in raw {
            let key_path = join(path, key);
            let node = self.compile_node(value, &key_path)?;
            match classify(key) {
                MappingKey::Literal(name) => map.literal.push((name.to_string(), node)),
                MappingKey::Wildcard => {
                    if map.wildcard.is_some() {
                        return Err(SchemaError::DuplicateWildcard { path: key_path }.into());
                    }
                    map.wildcard = Some(Box::new(node));
                }
                MappingKey::Array(dataset) => {
                    if dataset.is_empty() {
                        return Err(SchemaError::MissingArrayDataset { path: key_path }.into());
                    }
                    if map.array_key.is_some() {
                        return Err(SchemaError::DuplicateArrayKey { path: key_path }.into());
                    }
                    map.array_key = Some(ArrayKey {
                        dataset: dataset.to_string(),
                        node: Box::new(node),
                    });
                }
            }
        }
        Ok(map)
    }

    fn compile_node(&self, value: &Value, path: &str) -> Result<SchemaNode, BundleError> {
        let raw = RawNode::deserialize(value)?;
        let default_kind = if raw.reference.is_some() || raw.keys.is_some() {
            SchemaKind::Key
        } else {
            SchemaKind::String
        };

        let mut node = SchemaNode::new(raw.kind.unwrap_or(default_kind));
        node.description = raw.description;
        node.link = raw.link;
        node.values = raw.values;
        node.dataset = raw.dataset;
        node.max_depth = raw.max_depth;
        node.suffix = raw.suffix;
        node.entries = raw
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.compile_node(entry, &format!("{}[{}]", path, index)))
            .collect::<Result<_, _>>()?;

        if let Some(name) = raw.reference {
            if raw.keys.is_some() {
                warn!("Schema node {} has both \"ref\" and \"keys\"; using the reference", path);
            }
            if !self.definitions.contains_key(&name) {
                return Err(SchemaError::UndefinedReference {
                    path: path.to_string(),
                    name,
                }
                .into());
            }
            return Ok(node.with_lazy_keys(deferred_definition(Arc::clone(&self.definitions), name)));
        }

        if let Some(keys) = raw.keys {
            node = node.with_keys(self.compile_map(&keys, path)?);
        }
        Ok(node)
    }
}

/// Thunk compiling definition `name` on first traversal
fn deferred_definition(definitions: Arc<Definitions>, name: String) -> impl Fn() -> SchemaMap + Send + Sync + 'static {
    move || {
        let Some(raw) = definitions.get(&name) else {
            return SchemaMap::new();
        };
        let compiler = Compiler {
            definitions: Arc::clone(&definitions),
        };
        match compiler.compile_map(raw, &name) {
            Ok(map) => map,
            Err(error) => {
                warn!("Failed to compile schema definition {}: {}", name, error);
                SchemaMap::new()
            }
        }
    }
}

/// Compile a schema document into per-entry schemas keyed by file category.
///
/// Every definition is compiled once up front so that undefined references and
/// malformed mappings anywhere in the document fail the load.
pub fn compile_schema_document(document: &Value) -> Result<Vec<(String, SchemaMap)>, BundleError> {
    let raw = RawDocument::deserialize(document)?;

    let mut definitions = Definitions::default();
    for (name, value) in raw.definitions {
        let mapping = Map::<String, Value>::deserialize(value)?;
        definitions.insert(name, mapping);
    }
    let compiler = Compiler {
        definitions: Arc::new(definitions),
    };

    for (name, mapping) in compiler.definitions.iter() {
        compiler.compile_map(mapping, name)?;
    }

    let mut categories = Vec::with_capacity(raw.categories.len());
    for (category, value) in &raw.categories {
        let mapping = Map::<String, Value>::deserialize(value)?;
        let schema = compiler.compile_map(&mapping, category)?;
        debug!("Compiled schema for file category {}", category);
        categories.push((category.clone(), schema));
    }
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Datasets, EnumDataset};
    use crate::schema::locate::locate_schema_node;
    use serde_json::json;

    fn pet_document() -> Value {
        json!({
            "definitions": {
                "Stats": {
                    "Health": { "type": "float" },
                    "Nested": { "ref": "Stats", "max_depth": true }
                }
            },
            "categories": {
                "Pet": {
                    "Type": { "type": "enum", "dataset": "ENTITYTYPE" },
                    "Stats": { "ref": "Stats" },
                    "Modifiers": { "keys": { "[ATTRIBUTE]": { "type": "float" } } },
                    "*": { "type": "key_list" }
                }
            }
        })
    }

    #[test]
    fn test_compiles_categories_in_order() {
        let categories = compile_schema_document(&pet_document()).expect("valid document");
        assert_eq!(categories.len(), 1);
        let (name, pet) = &categories[0];
        assert_eq!(name, "Pet");
        let keys: Vec<&str> = pet.literal.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["Type", "Stats", "Modifiers"]);
        assert!(pet.wildcard.is_some());
    }

    #[test]
    fn test_references_resolve_lazily_and_recursively() {
        let categories = compile_schema_document(&pet_document()).expect("valid document");
        let pet = &categories[0].1;
        let datasets = Datasets::new().with(EnumDataset::from_keys("ATTRIBUTE", ["Armor"]));

        let found = locate_schema_node(&["Stats", "Nested", "Nested", "Health"], pet, &datasets).expect("located");
        assert_eq!(found.node.kind, SchemaKind::Float);
        assert_eq!(found.depth, 1);

        let found = locate_schema_node(&["Modifiers", "armor"], pet, &datasets).expect("located");
        assert_eq!(found.node.kind, SchemaKind::Float);
    }

    #[test]
    fn test_undefined_reference_fails_load() {
        let document = json!({ "categories": { "Pet": { "Stats": { "ref": "Missing" } } } });
        let error = compile_schema_document(&document).expect_err("undefined reference");
        assert!(matches!(
            error,
            BundleError::Schema(SchemaError::UndefinedReference { ref path, ref name })
                if path == "Pet.Stats" && name == "Missing"
        ));
    }

    #[test]
    fn test_undefined_reference_inside_unused_definition_fails_load() {
        let document = json!({ "definitions": { "A": { "B": { "ref": "Nope" } } } });
        assert!(matches!(
            compile_schema_document(&document),
            Err(BundleError::Schema(SchemaError::UndefinedReference { .. }))
        ));
    }

    #[test]
    fn test_duplicate_special_keys() {
        let document = json!({ "categories": { "Pet": { "*": {}, "<name>": {} } } });
        assert!(matches!(
            compile_schema_document(&document),
            Err(BundleError::Schema(SchemaError::DuplicateWildcard { .. }))
        ));

        let document = json!({ "categories": { "Pet": { "[A]": {}, "[B]": {} } } });
        assert!(matches!(
            compile_schema_document(&document),
            Err(BundleError::Schema(SchemaError::DuplicateArrayKey { .. }))
        ));

        let document = json!({ "categories": { "Pet": { "[ ]": {} } } });
        assert!(matches!(
            compile_schema_document(&document),
            Err(BundleError::Schema(SchemaError::MissingArrayDataset { .. }))
        ));
    }

    #[test]
    fn test_unknown_kind_is_a_json_error() {
        let document = json!({ "categories": { "Pet": { "Type": { "type": "colour" } } } });
        assert!(matches!(compile_schema_document(&document), Err(BundleError::Json(_))));
    }
}
