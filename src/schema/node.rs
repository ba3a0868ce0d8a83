//! Schema node model
//!
//! A schema is a tree of [`SchemaMap`]s (the keys valid at one level) whose values
//! are [`SchemaNode`]s (what a key's value may be). Child mappings are either
//! built up front or deferred behind a [`LazySchema`] that is forced once, on first
//! traversal, and cached; recursive schemas (an item whose `Bundle` holds items)
//! are only finite because of that.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::registry::DatasetProvider;

/// Value kinds a schema node can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Boolean,
    String,
    Integer,
    Float,
    /// `x,y,z`
    Vector,
    /// `r,g,b`
    Rgb,
    /// A YAML list; items described by `dataset`, `entries`, `values` or `keys`
    List,
    /// A nested mapping described by `keys`
    Key,
    /// Open-ended `key: value` pairs
    KeyList,
    /// Several positional values on one line
    EntryList,
    /// One member of `dataset`
    Enum,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Boolean => "boolean",
            SchemaKind::String => "string",
            SchemaKind::Integer => "integer",
            SchemaKind::Float => "float",
            SchemaKind::Vector => "vector",
            SchemaKind::Rgb => "rgb",
            SchemaKind::List => "list",
            SchemaKind::Key => "key",
            SchemaKind::KeyList => "key_list",
            SchemaKind::EntryList => "entry_list",
            SchemaKind::Enum => "enum",
        }
    }
}

/// Values that may follow a dataset entry, e.g. the `:2` of `DIAMOND:2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixValues {
    Choices(Vec<String>),
    Range { min: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSuffix {
    pub separator: String,
    pub values: SuffixValues,
}

/// Child mapping computed on first use and cached afterwards
pub struct LazySchema {
    cell: OnceCell<SchemaMap>,
    init: Box<dyn Fn() -> SchemaMap + Send + Sync>,
}

impl LazySchema {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> SchemaMap + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Box::new(init),
        }
    }

    pub fn get(&self) -> &SchemaMap {
        self.cell.get_or_init(|| {
            trace!("Forcing lazy schema mapping");
            (self.init)()
        })
    }

    pub fn is_forced(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema")
            .field("forced", &self.is_forced())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum SchemaKeys {
    Inline(Arc<SchemaMap>),
    Deferred(Arc<LazySchema>),
}

impl SchemaKeys {
    pub fn get(&self) -> &SchemaMap {
        match self {
            SchemaKeys::Inline(map) => map,
            SchemaKeys::Deferred(lazy) => lazy.get(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Fixed candidate values
    pub values: Vec<String>,
    /// Enumerated dataset the values come from
    pub dataset: Option<String>,
    /// Positional sub-nodes of a multi-value line
    pub entries: Vec<SchemaNode>,
    pub keys: Option<SchemaKeys>,
    /// Children of this node do not add to the reported depth
    pub max_depth: bool,
    pub suffix: Option<ValueSuffix>,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            link: None,
            values: Vec::new(),
            dataset: None,
            entries: Vec::new(),
            keys: None,
            max_depth: false,
            suffix: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn with_entries(mut self, entries: Vec<SchemaNode>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_keys(mut self, keys: SchemaMap) -> Self {
        self.keys = Some(SchemaKeys::Inline(Arc::new(keys)));
        self
    }

    pub fn with_lazy_keys<F>(mut self, init: F) -> Self
    where
        F: Fn() -> SchemaMap + Send + Sync + 'static,
    {
        self.keys = Some(SchemaKeys::Deferred(Arc::new(LazySchema::new(init))));
        self
    }

    pub fn with_suffix(mut self, suffix: ValueSuffix) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn depth_closed(mut self) -> Self {
        self.max_depth = true;
        self
    }

    /// Nested mapping, forcing a deferred one
    pub fn children(&self) -> Option<&SchemaMap> {
        self.keys.as_ref().map(SchemaKeys::get)
    }

    /// `list` without nested keys, and `key_list`, end resolution
    pub fn is_leaf_container(&self) -> bool {
        match self.kind {
            SchemaKind::KeyList => true,
            SchemaKind::List => self.keys.is_none(),
            _ => false,
        }
    }
}

/// Key matching only names drawn from an enumerated dataset
#[derive(Debug, Clone)]
pub struct ArrayKey {
    pub dataset: String,
    pub node: Box<SchemaNode>,
}

/// The keys valid at one level of a schema
#[derive(Debug, Clone, Default)]
pub struct SchemaMap {
    pub literal: Vec<(String, SchemaNode)>,
    pub wildcard: Option<Box<SchemaNode>>,
    pub array_key: Option<ArrayKey>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.literal.push((name.into(), node));
        self
    }

    pub fn wildcard(mut self, node: SchemaNode) -> Self {
        self.wildcard = Some(Box::new(node));
        self
    }

    pub fn array_key(mut self, dataset: impl Into<String>, node: SchemaNode) -> Self {
        self.array_key = Some(ArrayKey {
            dataset: dataset.into(),
            node: Box::new(node),
        });
        self
    }

    /// Literal key, case-insensitive
    pub fn get_literal(&self, name: &str) -> Option<&SchemaNode> {
        self.literal
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, node)| node)
    }

    /// Node for key `name`: literal, then array-key membership, then wildcard.
    pub fn get<D: DatasetProvider + ?Sized>(&self, name: &str, datasets: &D) -> Option<&SchemaNode> {
        if let Some(node) = self.get_literal(name) {
            return Some(node);
        }
        if let Some(array_key) = &self.array_key {
            let is_member = datasets
                .dataset(&array_key.dataset)
                .is_some_and(|dataset| dataset.contains(name));
            if is_member {
                return Some(&array_key.node);
            }
        }
        self.wildcard.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.literal.is_empty() && self.wildcard.is_none() && self.array_key.is_none()
    }
}
