//! Schema tree resolver
//!
//! File structure (which keys exist, what their values may be) is described by
//! declarative schema trees, one per file category:
//!
//! - [`node`]: the node and mapping model, with lazily built children
//! - [`locate`]: key path → node resolution
//! - [`completion`]: value and key candidates from a located node
//! - [`catalog`]: built-in schemas and the per-category registry
//! - [`loader`]: JSON schema documents supplied with a bundle

pub mod catalog;
pub mod completion;
pub mod loader;
pub mod locate;
pub mod node;

pub use catalog::{SchemaRegistry, achievement_schema, item_schema, mob_schema, skill_schema};
pub use completion::{complete_schema, generate_key_completions, generate_value_completions};
pub use loader::compile_schema_document;
pub use locate::{SchemaMatch, locate_schema_node};
pub use node::{ArrayKey, LazySchema, SchemaKeys, SchemaKind, SchemaMap, SchemaNode, SuffixValues, ValueSuffix};
