//! Resolution context
//!
//! All reference data one resolution reads (registries, datasets, schemas, the
//! placeholder trie and the engine configuration) is owned by a single immutable
//! [`ResolutionContext`]. Reloading builds a complete new context and swaps it in
//! through [`SharedContext`]; a reader that already holds an `Arc` to the old
//! context keeps a consistent view until it drops it.

use std::sync::Arc;

use lsp_types::Position;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::bundle::DatasetBundle;
use crate::candidate::{Candidate, CandidateKind};
use crate::config::EngineConfig;
use crate::document::{DocumentSnapshot, line_prefix};
use crate::error::BundleError;
use crate::placeholder::{PlaceholderTrie, ScriptedSegments, build_placeholder_trie, complete_placeholder};
use crate::registry::{DatasetProvider, Datasets, ObjectCategory, Registry};
use crate::resolver::{Found, resolve_attribute_owner, resolve_context_owner, resolve_object_category};
use crate::schema::{SchemaRegistry, compile_schema_document, complete_schema};

#[derive(Debug, Default)]
pub struct ResolutionContext {
    pub config: EngineConfig,
    pub registry: Registry,
    pub datasets: Datasets,
    pub schemas: SchemaRegistry,
    pub placeholders: PlaceholderTrie,
}

impl ResolutionContext {
    /// Build a context from a bundle.
    ///
    /// Built-in schemas are registered first; bundle schemas for the same file
    /// category replace them. Fails on malformed schema documents.
    pub fn build(bundle: &DatasetBundle) -> Result<Self, BundleError> {
        let config = bundle.config.clone().unwrap_or_default().normalized();
        let registry = bundle.registry();
        let datasets = bundle.datasets();

        let mut schemas = SchemaRegistry::builtin();
        if let Some(document) = &bundle.schemas {
            for (category, schema) in compile_schema_document(document)? {
                schemas.insert(category, schema);
            }
        }

        let scripted = ScriptedSegments::with_datasets(&datasets);
        let placeholders = build_placeholder_trie(&bundle.placeholders, &bundle.meta_keywords, &scripted);

        info!(
            "Built resolution context: {} mechanics, {} datasets, {} schema categories",
            registry.mechanics.len(),
            datasets.len(),
            schemas.len()
        );
        Ok(Self {
            config,
            registry,
            datasets,
            schemas,
            placeholders,
        })
    }

    /// Object or attribute under the cursor
    pub fn resolve_owner<D: DocumentSnapshot + ?Sized>(&self, document: &D, position: Position) -> Found {
        resolve_attribute_owner(document, position, &self.registry, &self.config)
    }

    pub fn object_category<D: DocumentSnapshot + ?Sized>(
        &self,
        document: &D,
        position: Position,
    ) -> Option<ObjectCategory> {
        resolve_object_category(document, position, &self.registry, &self.config)
    }

    /// File-structure completion for a document of `category` (`Mob`, `Item`, ...)
    pub fn complete_schema<D: DocumentSnapshot + ?Sized>(
        &self,
        document: &D,
        position: Position,
        category: &str,
    ) -> Vec<Candidate> {
        let Some(schema) = self.schemas.get(category) else {
            debug!("No schema registered for file category {}", category);
            return Vec::new();
        };
        complete_schema(document, position, schema, &self.datasets, &self.config)
    }

    /// Completion of the `<...>` placeholder being typed at the cursor
    pub fn complete_placeholder<D: DocumentSnapshot + ?Sized>(&self, document: &D, position: Position) -> Vec<Candidate> {
        line_prefix(document, position)
            .map(|prefix| complete_placeholder(&self.placeholders, &prefix))
            .unwrap_or_default()
    }

    /// Attribute names inside an object's argument block, or values of the
    /// attribute being assigned when it is backed by a dataset or is boolean.
    pub fn complete_attributes<D: DocumentSnapshot + ?Sized>(&self, document: &D, position: Position) -> Vec<Candidate> {
        let Some((owner, attribute)) = resolve_context_owner(document, position, &self.registry, &self.config) else {
            return Vec::new();
        };

        let Some(attribute) = attribute else {
            return owner
                .entry
                .attributes
                .iter()
                .map(|attribute| {
                    let mut candidate = Candidate::new(attribute.name.as_str(), CandidateKind::Key)
                        .with_insert_text(format!("{}=", attribute.name))
                        .with_documentation(attribute.description.clone());
                    if let Some(value_type) = &attribute.value_type {
                        candidate = candidate.with_detail(value_type.as_str());
                    }
                    candidate
                })
                .collect();
        };

        let Some(attribute) = owner.entry.get_attribute_by_name(&attribute) else {
            return Vec::new();
        };
        if let Some(dataset) = attribute.dataset.as_deref().and_then(|name| self.datasets.dataset(name)) {
            return dataset
                .entries()
                .iter()
                .map(|(key, meta)| {
                    Candidate::new(key.as_str(), CandidateKind::EnumMember)
                        .with_detail(dataset.name())
                        .with_documentation(meta.description.clone())
                })
                .collect();
        }
        let is_boolean = attribute
            .value_type
            .as_deref()
            .is_some_and(|value_type| value_type.eq_ignore_ascii_case("boolean"));
        if is_boolean {
            return ["true", "false"]
                .into_iter()
                .map(|value| Candidate::new(value, CandidateKind::Value))
                .collect();
        }
        Vec::new()
    }
}

/// Process-wide handle to the current context with atomic replacement
#[derive(Debug)]
pub struct SharedContext {
    current: RwLock<Arc<ResolutionContext>>,
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::new(ResolutionContext::default())
    }
}

impl SharedContext {
    pub fn new(context: ResolutionContext) -> Self {
        Self {
            current: RwLock::new(Arc::new(context)),
        }
    }

    /// The current context; the read lock is held only while cloning the `Arc`
    pub fn load(&self) -> Arc<ResolutionContext> {
        self.current.read().clone()
    }

    /// Swap in `context`, returning the previous one
    pub fn replace(&self, context: ResolutionContext) -> Arc<ResolutionContext> {
        let next = Arc::new(context);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Rebuild from `bundle` and swap the result in.
    ///
    /// The context is built before the write lock is taken; on failure the
    /// current context stays in place.
    pub fn reload(&self, bundle: &DatasetBundle) -> Result<(), BundleError> {
        let context = ResolutionContext::build(bundle)?;
        self.replace(context);
        info!("Reloaded resolution context");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "mechanics": [{
            "name": "sound",
            "attributes": [
                { "name": "sound", "aliases": ["s"], "dataset": "SOUND" },
                { "name": "repeat", "type": "boolean" }
            ]
        }],
        "datasets": { "SOUND": ["ENTITY_CAT_PURR"] },
        "placeholders": [{ "path": "caster.name" }]
    }"#;

    fn context() -> ResolutionContext {
        ResolutionContext::build(&DatasetBundle::parse(BUNDLE).expect("bundle")).expect("context")
    }

    fn labels(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_attribute_names_and_values() {
        let context = context();
        let names = context.complete_attributes("Skills:\n- sound{", Position::new(1, 8));
        assert_eq!(labels(&names), vec!["sound", "repeat"]);
        assert_eq!(names[0].insert_text, "sound=");

        let values = context.complete_attributes("Skills:\n- sound{s=", Position::new(1, 10));
        assert_eq!(labels(&values), vec!["ENTITY_CAT_PURR"]);

        let values = context.complete_attributes("Skills:\n- sound{s=X;repeat=", Position::new(1, 19));
        assert_eq!(labels(&values), vec!["true", "false"]);
    }

    #[test]
    fn test_placeholder_completion_from_line() {
        let context = context();
        let candidates = context.complete_placeholder("Display: <caster.", Position::new(0, 17));
        assert_eq!(labels(&candidates), vec!["name>"]);
    }

    #[test]
    fn test_unknown_schema_category() {
        assert!(context().complete_schema("A:\n  ", Position::new(1, 2), "Spell").is_empty());
    }

    #[test]
    fn test_reload_swaps_atomically() {
        let shared = SharedContext::default();
        let before = shared.load();
        assert!(before.registry.mechanics.is_empty());

        shared.reload(&DatasetBundle::parse(BUNDLE).expect("bundle")).expect("reload");
        let after = shared.load();
        assert_eq!(after.registry.mechanics.len(), 1);
        // a reader holding the previous context is unaffected
        assert!(before.registry.mechanics.is_empty());
    }

    #[test]
    fn test_failed_reload_keeps_current_context() {
        let shared = SharedContext::new(context());
        let broken = DatasetBundle::parse(r#"{ "schemas": { "categories": { "Pet": { "A": { "ref": "Missing" } } } } }"#)
            .expect("bundle parses");
        assert!(shared.reload(&broken).is_err());
        assert_eq!(shared.load().registry.mechanics.len(), 1);
    }
}
