//! Placeholder trie
//!
//! A prefix tree over dotted `<a.b.c>` placeholder paths, independent of the
//! YAML scanners.
//!
//! - [`segment`]: scripted segments matched by predicate
//! - [`trie`]: nodes, insertion, lookup and subtree merging
//! - [`meta`]: trie construction with meta-keyword cross-linking
//! - [`completion`]: candidates for the expression being typed

pub mod completion;
pub mod meta;
pub mod segment;
pub mod trie;

pub use completion::{complete_placeholder, node_completions};
pub use meta::{MetaKeyword, PlaceholderEntry, UNIVERSAL_TYPE, build_placeholder_trie};
pub use segment::{DatasetSegment, ScriptedSegment, ScriptedSegments};
pub use trie::{PlaceholderNode, PlaceholderTrie, Segment};
