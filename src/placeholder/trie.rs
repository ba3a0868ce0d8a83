//! Placeholder path trie
//!
//! Placeholders are dotted paths (`caster.var.{name}`). Each node holds one path
//! segment; children are kept in insertion order with an index keyed by segment
//! identity (the lowercased literal, or `{name}` for scripted segments).
//!
//! Lookup tries the literal index first and then each scripted child's
//! `owns()` predicate in insertion order, descending into the first match
//! without backtracking.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::segment::{ScriptedSegment, ScriptedSegments};

#[derive(Clone)]
pub enum Segment {
    Literal(String),
    Scripted(Arc<dyn ScriptedSegment>),
}

impl Segment {
    /// Map a raw path element to a scripted segment when one is registered under it
    pub fn parse(raw: &str, scripted: &ScriptedSegments) -> Self {
        match scripted.get(raw) {
            Some(segment) => Segment::Scripted(segment),
            None => Segment::Literal(raw.to_string()),
        }
    }

    /// Identity used for child uniqueness and merging
    pub fn key(&self) -> String {
        match self {
            Segment::Literal(text) => text.to_lowercase(),
            Segment::Scripted(segment) => format!("{{{}}}", segment.name().to_lowercase()),
        }
    }

    /// Text shown to users
    pub fn label(&self) -> String {
        match self {
            Segment::Literal(text) => text.clone(),
            Segment::Scripted(segment) => format!("{{{}}}", segment.name()),
        }
    }

    pub fn is_scripted(&self) -> bool {
        matches!(self, Segment::Scripted(_))
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "Literal({:?})", text),
            Segment::Scripted(segment) => write!(f, "Scripted({{{}}})", segment.name()),
        }
    }
}

/// Split a dotted path into segments, dropping empty elements
pub fn split_path(path: &str, scripted: &ScriptedSegments) -> Vec<Segment> {
    path.split('.')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| Segment::parse(raw, scripted))
        .collect()
}

#[derive(Debug, Clone)]
pub struct PlaceholderNode {
    segment: Segment,
    children: Vec<PlaceholderNode>,
    /// Segment key -> index into `children`
    index: FxHashMap<String, usize>,
    is_end: bool,
    description: Option<String>,
}

impl PlaceholderNode {
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            children: Vec::new(),
            index: FxHashMap::default(),
            is_end: false,
            description: None,
        }
    }

    /// A root: its segment is never matched
    pub fn root() -> Self {
        Self::new(Segment::Literal(String::new()))
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn children(&self) -> &[PlaceholderNode] {
        &self.children
    }

    pub fn is_end(&self) -> bool {
        self.is_end
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        if description.is_some() {
            self.description = description;
        }
    }

    /// Child with the same segment identity
    pub fn child(&self, key: &str) -> Option<&PlaceholderNode> {
        self.index.get(key).map(|&position| &self.children[position])
    }

    fn child_mut_or_insert(&mut self, segment: &Segment) -> &mut PlaceholderNode {
        let key = segment.key();
        let position = match self.index.get(&key).copied() {
            Some(position) => position,
            None => {
                self.children.push(PlaceholderNode::new(segment.clone()));
                let position = self.children.len() - 1;
                self.index.insert(key, position);
                position
            }
        };
        &mut self.children[position]
    }

    /// Insert a dotted path below this node and return its terminal node.
    ///
    /// Existing children are matched by segment identity, not by `owns()`. The
    /// terminal is marked as a complete placeholder.
    pub fn insert_path(&mut self, path: &str, scripted: &ScriptedSegments) -> &mut PlaceholderNode {
        let segments = split_path(path, scripted);
        self.insert_segments(&segments)
    }

    pub fn insert_segments(&mut self, segments: &[Segment]) -> &mut PlaceholderNode {
        let Some((head, rest)) = segments.split_first() else {
            return self;
        };
        let child = self.child_mut_or_insert(head);
        if rest.is_empty() {
            child.is_end = true;
            child
        } else {
            child.insert_segments(rest)
        }
    }

    /// The child matching one typed path element.
    ///
    /// Only literal children match through the index; a scripted child is reached
    /// through its `owns()` predicate, never by typing its `{name}` label.
    pub fn find_child(&self, value: &str) -> Option<&PlaceholderNode> {
        if let Some(child) = self
            .child(&value.to_lowercase())
            .filter(|child| !child.segment.is_scripted())
        {
            return Some(child);
        }
        self.children.iter().find(|child| match &child.segment {
            Segment::Scripted(segment) => segment.owns(value),
            Segment::Literal(_) => false,
        })
    }

    /// Follow typed path elements; `None` as soon as one has no match.
    pub fn lookup_segments<S: AsRef<str>>(&self, path: &[S]) -> Option<&PlaceholderNode> {
        let mut node = self;
        for value in path {
            node = node.find_child(value.as_ref())?;
        }
        Some(node)
    }

    /// Follow a dotted path, e.g. `caster.var.counter`
    pub fn lookup(&self, path: &str) -> Option<&PlaceholderNode> {
        let elements: Vec<&str> = path.split('.').collect();
        let found = self.lookup_segments(&elements);
        trace!("Placeholder lookup {:?}: {}", path, if found.is_some() { "hit" } else { "miss" });
        found
    }

    /// Node reached by segment identity, for grafting onto a known terminal
    pub fn descend_mut(&mut self, segments: &[Segment]) -> Option<&mut PlaceholderNode> {
        let mut node = self;
        for segment in segments {
            let position = *node.index.get(&segment.key())?;
            node = &mut node.children[position];
        }
        Some(node)
    }

    /// Graft every child of `source` onto this node.
    ///
    /// Children present on both sides merge recursively; others are attached
    /// wholesale. Merging a copy of a node into itself changes nothing.
    pub fn merge_subtree(&mut self, source: &PlaceholderNode) {
        for source_child in &source.children {
            let key = source_child.segment.key();
            match self.index.get(&key).copied() {
                Some(position) => {
                    let target = &mut self.children[position];
                    target.is_end |= source_child.is_end;
                    if target.description.is_none() {
                        target.description = source_child.description.clone();
                    }
                    target.merge_subtree(source_child);
                }
                None => {
                    self.children.push(source_child.clone());
                    self.index.insert(key, self.children.len() - 1);
                }
            }
        }
    }

    /// Number of nodes in this subtree, this node included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PlaceholderNode::size).sum::<usize>()
    }
}

/// The complete placeholder trie of one reference-data load
#[derive(Debug, Clone)]
pub struct PlaceholderTrie {
    root: PlaceholderNode,
}

impl Default for PlaceholderTrie {
    fn default() -> Self {
        Self {
            root: PlaceholderNode::root(),
        }
    }
}

impl PlaceholderTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: PlaceholderNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PlaceholderNode {
        &self.root
    }

    pub fn insert_path(&mut self, path: &str, scripted: &ScriptedSegments) -> &mut PlaceholderNode {
        self.root.insert_path(path, scripted)
    }

    pub fn lookup(&self, path: &str) -> Option<&PlaceholderNode> {
        self.root.lookup(path)
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}
