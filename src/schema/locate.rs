//! Key path resolution against a schema tree

use tracing::trace;

use super::node::{SchemaMap, SchemaNode};
use crate::registry::DatasetProvider;

/// A located node and the key depth it was found at
#[derive(Debug, Clone, Copy)]
pub struct SchemaMatch<'a> {
    pub node: &'a SchemaNode,
    /// Number of key levels descended below the root mapping. Levels below a
    /// `max_depth` node are not counted.
    pub depth: usize,
}

/// Walk `path` (outermost key first) down `schema`.
///
/// Each element is looked up literal → array key → wildcard. A `list` without
/// nested keys or a `key_list` ends the walk even if path elements remain, since
/// whatever follows is user content inside that container. An empty path, or an
/// element with no match and no fallback, is `None`.
pub fn locate_schema_node<'a, S, D>(path: &[S], schema: &'a SchemaMap, datasets: &D) -> Option<SchemaMatch<'a>>
where
    S: AsRef<str>,
    D: DatasetProvider + ?Sized,
{
    let mut map = schema;
    let mut depth = 0;
    let mut closed = false;
    let mut remaining = path;

    loop {
        let (head, rest) = remaining.split_first()?;
        let node = map.get(head.as_ref(), datasets)?;
        trace!("Schema path element {:?} matched a {} node", head.as_ref(), node.kind.as_str());

        if rest.is_empty() || node.is_leaf_container() {
            return Some(SchemaMatch { node, depth });
        }

        map = node.children()?;
        closed |= node.max_depth;
        if !closed {
            depth += 1;
        }
        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Datasets;
    use crate::schema::node::SchemaKind;

    fn recursive() -> SchemaMap {
        SchemaMap::new()
            .key("Name", SchemaNode::new(SchemaKind::String))
            .key(
                "Nested",
                SchemaNode::new(SchemaKind::Key).depth_closed().with_lazy_keys(recursive),
            )
    }

    #[test]
    fn test_depth_counts_levels() {
        let schema = SchemaMap::new().key(
            "Options",
            SchemaNode::new(SchemaKind::Key).with_keys(
                SchemaMap::new().key("Inner", SchemaNode::new(SchemaKind::Key).with_keys(
                    SchemaMap::new().key("Leaf", SchemaNode::new(SchemaKind::Integer)),
                )),
            ),
        );
        let found = locate_schema_node(&["Options", "Inner", "Leaf"], &schema, &Datasets::new()).expect("located");
        assert_eq!(found.node.kind, SchemaKind::Integer);
        assert_eq!(found.depth, 2);
    }

    #[test]
    fn test_max_depth_closes_depth() {
        let schema = recursive();
        let path = ["Nested", "Nested", "Nested", "Name"];
        let found = locate_schema_node(&path, &schema, &Datasets::new()).expect("located");
        assert_eq!(found.node.kind, SchemaKind::String);
        assert_eq!(found.depth, 0);
    }

    #[test]
    fn test_leaf_containers_absorb_rest_of_path() {
        let schema = SchemaMap::new()
            .key("Skills", SchemaNode::new(SchemaKind::List))
            .key("Options", SchemaNode::new(SchemaKind::KeyList));
        let datasets = Datasets::new();
        assert_eq!(
            locate_schema_node(&["Skills", "whatever"], &schema, &datasets).map(|m| m.node.kind),
            Some(SchemaKind::List)
        );
        assert_eq!(
            locate_schema_node(&["Options", "a", "b"], &schema, &datasets).map(|m| m.node.kind),
            Some(SchemaKind::KeyList)
        );
    }

    #[test]
    fn test_unmatched_and_empty_paths() {
        let schema = SchemaMap::new().key("Type", SchemaNode::new(SchemaKind::Enum));
        let empty: [&str; 0] = [];
        assert!(locate_schema_node(&empty, &schema, &Datasets::new()).is_none());
        assert!(locate_schema_node(&["Display"], &schema, &Datasets::new()).is_none());
        // `Type` has no children to descend into
        assert!(locate_schema_node(&["Type", "Inner"], &schema, &Datasets::new()).is_none());
    }
}
