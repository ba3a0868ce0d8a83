//! Placeholder trie construction and meta-keyword cross-linking
//!
//! Meta keywords are suffixes such as `.size` or `.toupper` that apply to any
//! placeholder of a given type. Each declares the type it applies to
//! (`origin_type`) and the type it produces (`return_type`); `ALL` on either side
//! is the universal type.
//!
//! Three passes link meta keywords to each other, in this order and exactly once
//! each (never iterated to a fixed point):
//!
//! 1. keywords with origin `ALL` are grafted beneath every other keyword's terminal;
//! 2. keywords with return `ALL` receive every other keyword beneath their terminal;
//! 3. for every ordered pair where `a.origin_type == b.return_type`, `a` is
//!    grafted beneath `b`'s terminal. A keyword may pair with itself.
//!
//! Each pass reads a snapshot taken when the pass starts, so grafts made during a
//! pass never cascade within it. Finally every placeholder with a return type
//! receives the keywords whose origin is that type or `ALL`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::segment::ScriptedSegments;
use super::trie::{PlaceholderNode, PlaceholderTrie, Segment, split_path};

/// Type tag matching every other type
pub const UNIVERSAL_TYPE: &str = "ALL";

/// One placeholder path, e.g. `caster.var.{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
    pub path: String,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PlaceholderEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            return_type: None,
            description: None,
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }
}

/// A type-directed placeholder suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaKeyword {
    pub path: String,
    pub origin_type: String,
    pub return_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl MetaKeyword {
    pub fn new(path: impl Into<String>, origin_type: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            origin_type: origin_type.into(),
            return_type: return_type.into(),
            description: None,
        }
    }
}

fn is_universal(type_tag: &str) -> bool {
    type_tag.eq_ignore_ascii_case(UNIVERSAL_TYPE)
}

fn same_type(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A meta keyword's own sub-trie: a root holding its path chain
#[derive(Debug, Clone)]
struct MetaTrie {
    keyword: MetaKeyword,
    segments: Vec<Segment>,
    root: PlaceholderNode,
}

impl MetaTrie {
    fn new(keyword: &MetaKeyword, scripted: &ScriptedSegments) -> Self {
        let segments = split_path(&keyword.path, scripted);
        let mut root = PlaceholderNode::root();
        root.insert_segments(&segments)
            .set_description(keyword.description.clone());
        Self {
            keyword: keyword.clone(),
            segments,
            root,
        }
    }

    fn terminal_mut(&mut self) -> Option<&mut PlaceholderNode> {
        if self.segments.is_empty() {
            return None;
        }
        self.root.descend_mut(&self.segments)
    }

    /// Graft `source`'s chain beneath this keyword's terminal
    fn graft(&mut self, source: &MetaTrie) {
        if let Some(terminal) = self.terminal_mut() {
            terminal.merge_subtree(&source.root);
        }
    }
}

/// Run the three cross-linking passes over `keywords`
fn link_meta_keywords(keywords: &[MetaKeyword], scripted: &ScriptedSegments) -> Vec<MetaTrie> {
    let mut tries: Vec<MetaTrie> = keywords.iter().map(|keyword| MetaTrie::new(keyword, scripted)).collect();

    // Pass 1: origin ALL beneath every other keyword
    let snapshot = tries.clone();
    for (source_index, source) in snapshot.iter().enumerate() {
        if !is_universal(&source.keyword.origin_type) {
            continue;
        }
        for (target_index, target) in tries.iter_mut().enumerate() {
            if target_index != source_index {
                target.graft(source);
            }
        }
    }

    // Pass 2: return ALL receives every other keyword
    let snapshot = tries.clone();
    for (target_index, target) in tries.iter_mut().enumerate() {
        if !is_universal(&target.keyword.return_type) {
            continue;
        }
        for (source_index, source) in snapshot.iter().enumerate() {
            if source_index != target_index {
                target.graft(source);
            }
        }
    }

    // Pass 3: type-directed chaining, self-pairs included
    let snapshot = tries.clone();
    for source in &snapshot {
        for target in tries.iter_mut() {
            if same_type(&source.keyword.origin_type, &target.keyword.return_type) {
                trace!("Chaining meta keyword {} beneath {}", source.keyword.path, target.keyword.path);
                target.graft(source);
            }
        }
    }

    tries
}

/// Build the placeholder trie from entries and meta keywords.
pub fn build_placeholder_trie(
    entries: &[PlaceholderEntry],
    keywords: &[MetaKeyword],
    scripted: &ScriptedSegments,
) -> PlaceholderTrie {
    let metas = link_meta_keywords(keywords, scripted);
    let mut root = PlaceholderNode::root();

    for entry in entries {
        if entry.path.trim().is_empty() {
            debug!("Skipping placeholder entry with empty path");
            continue;
        }
        let terminal = root.insert_path(&entry.path, scripted);
        terminal.set_description(entry.description.clone());

        let Some(return_type) = entry.return_type.as_deref() else {
            continue;
        };
        for meta in &metas {
            let origin = meta.keyword.origin_type.as_str();
            if same_type(origin, return_type) || is_universal(origin) {
                terminal.merge_subtree(&meta.root);
            }
        }
    }

    debug!(
        "Built placeholder trie from {} entries and {} meta keywords ({} nodes)",
        entries.len(),
        keywords.len(),
        root.size()
    );
    PlaceholderTrie::from_root(root)
}
