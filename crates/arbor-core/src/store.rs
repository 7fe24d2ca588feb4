#![forbid(unsafe_code)]

//! Flat, copy-on-write node store.
//!
//! [`NodeStore`] normalizes nested [`ApiNode`] payloads into an id-keyed map
//! with explicit parent/child references. Every change produces a new store;
//! the previous value stays valid and fully consistent.
//!
//! # Invariants
//!
//! 1. Every id in any node's `child_ids` is a key of the map.
//! 2. Nodes are never removed, only added or replaced.
//! 3. Nodes outside a merged subtree keep their `Arc` (checked with
//!    [`Arc::ptr_eq`]), so consumers can detect change cheaply.
//!
//! # Structural sharing
//!
//! The map is an [`im::HashMap`] of `Arc<Node>`, so cloning the store and
//! replacing a handful of entries costs O(changed · log n) rather than a
//! full copy of a 600k-node map.

use std::sync::Arc;

use ahash::AHashSet;

use crate::node::{ApiNode, ChildrenState, Node, NodeId};

/// Node map plus ordered root list.
#[derive(Clone, Default)]
pub struct NodeStore {
    nodes: im::HashMap<NodeId, Arc<Node>>,
    root_ids: Arc<[NodeId]>,
}

impl std::fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStore")
            .field("nodes", &self.nodes.len())
            .field("root_ids", &self.root_ids)
            .finish()
    }
}

impl NodeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a nested bootstrap response.
    ///
    /// Top-level records become roots in payload order. Parents are derived
    /// from nesting position, at any depth.
    #[must_use]
    pub fn initialize(nested: &[ApiNode]) -> Self {
        let mut nodes = im::HashMap::new();
        ingest(&mut nodes, nested, None);

        let mut seen = AHashSet::with_capacity(nested.len());
        let root_ids: Arc<[NodeId]> = nested
            .iter()
            .filter(|api| seen.insert(api.id.as_str()))
            .map(|api| NodeId::new(&api.id))
            .collect();

        tracing::debug!(
            target: "arbor.store",
            roots = root_ids.len(),
            nodes = nodes.len(),
            "store initialized"
        );
        Self { nodes, root_ids }
    }

    /// Return a new store where `parent_id`'s children are exactly `children`.
    ///
    /// Nested descendants of each child are flattened in as well, and the
    /// parent is marked [`ChildrenState::Loaded`] even when `children` is
    /// empty. An unknown `parent_id` returns a store identical to `self`.
    #[must_use]
    pub fn merge_children(&self, parent_id: &str, children: &[ApiNode]) -> Self {
        let Some(parent) = self.nodes.get(parent_id) else {
            tracing::debug!(
                target: "arbor.store",
                parent = parent_id,
                "merge for unknown parent ignored"
            );
            return self.clone();
        };
        let parent = Arc::clone(parent);

        let mut nodes = self.nodes.clone();
        ingest(&mut nodes, children, Some(parent.id()));

        let child_ids = child_ids_of(children);
        let updated = Node::clone(&parent).with_children(child_ids);
        nodes.insert(parent.id().clone(), Arc::new(updated));

        tracing::debug!(
            target: "arbor.store",
            parent = parent_id,
            children = children.len(),
            nodes = nodes.len(),
            "children merged"
        );
        Self {
            nodes,
            root_ids: Arc::clone(&self.root_ids),
        }
    }

    /// Look up a node by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Node>> {
        self.nodes.get(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Ordered root ids.
    #[inline]
    #[must_use]
    pub fn root_ids(&self) -> &[NodeId] {
        &self.root_ids
    }

    /// Number of nodes in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether opening `id` should fetch its children.
    ///
    /// False for unknown ids.
    #[must_use]
    pub fn needs_children(&self, id: &str) -> bool {
        self.get(id).is_some_and(|node| node.needs_children())
    }

    /// Iterate over all nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes.values()
    }

    /// Whether both stores share the same underlying map and root list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.nodes.ptr_eq(&other.nodes) && Arc::ptr_eq(&self.root_ids, &other.root_ids)
    }
}

/// Flatten `top` (and everything nested beneath it) into `nodes`.
///
/// Uses an explicit stack so payload depth never touches the call stack.
/// A record that re-delivers an existing node without children keeps the
/// children already known for it; an unchanged record keeps its `Arc`.
fn ingest(nodes: &mut im::HashMap<NodeId, Arc<Node>>, top: &[ApiNode], parent: Option<&NodeId>) {
    let mut stack: Vec<(&ApiNode, Option<NodeId>)> =
        top.iter().rev().map(|api| (api, parent.cloned())).collect();

    while let Some((api, parent)) = stack.pop() {
        let id = NodeId::new(&api.id);
        let nested = api.children();

        let replacement = match nodes.get(api.id.as_str()) {
            Some(existing) if nested.is_empty() => {
                if existing.display_label() == api.display_name
                    && existing.parent_id() == parent.as_ref()
                {
                    None
                } else {
                    let mut node = Node::new(id.clone(), api.display_name.as_str())
                        .with_parent(parent);
                    if existing.children_state() == ChildrenState::Loaded {
                        node = node.with_children(existing.child_ids().to_vec());
                    }
                    Some(node)
                }
            }
            _ => {
                let node = Node::new(id.clone(), api.display_name.as_str()).with_parent(parent);
                if nested.is_empty() {
                    Some(node)
                } else {
                    Some(node.with_children(child_ids_of(nested)))
                }
            }
        };

        if let Some(node) = replacement {
            nodes.insert(id.clone(), Arc::new(node));
        }
        for child in nested.iter().rev() {
            stack.push((child, Some(id.clone())));
        }
    }
}

/// Ids of `children` in payload order, first occurrence wins.
fn child_ids_of(children: &[ApiNode]) -> Vec<NodeId> {
    let mut seen = AHashSet::with_capacity(children.len());
    children
        .iter()
        .filter(|api| seen.insert(api.id.as_str()))
        .map(|api| NodeId::new(&api.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ApiNode> {
        vec![
            ApiNode::branch(
                "a",
                "A",
                vec![
                    ApiNode::branch("b", "B", Vec::new()),
                    ApiNode::branch("c", "C", vec![ApiNode::leaf("c1", "C1")]),
                ],
            ),
            ApiNode::leaf("z", "Z"),
        ]
    }

    fn assert_no_dangling(store: &NodeStore) {
        for node in store.iter() {
            for child in node.child_ids() {
                assert!(store.contains(child.as_str()), "dangling child {child}");
            }
        }
    }

    #[test]
    fn initialize_flattens_and_derives_parents() {
        let store = NodeStore::initialize(&sample());
        assert_eq!(store.len(), 5);
        assert_eq!(store.root_ids(), &[NodeId::new("a"), NodeId::new("z")]);
        assert_eq!(store.get("c1").unwrap().parent_id(), Some(&NodeId::new("c")));
        assert_eq!(store.get("b").unwrap().parent_id(), Some(&NodeId::new("a")));
        assert!(store.get("a").unwrap().parent_id().is_none());
        assert_eq!(
            store.get("a").unwrap().child_ids(),
            &[NodeId::new("b"), NodeId::new("c")]
        );
        assert_no_dangling(&store);
    }

    #[test]
    fn initialize_handles_deep_nesting() {
        let mut api = ApiNode::leaf("n-1000", "leaf");
        for depth in (0..1000).rev() {
            api = ApiNode::branch(format!("n-{depth}"), "x", vec![api]);
        }
        let store = NodeStore::initialize(&[api]);
        assert_eq!(store.len(), 1001);
        assert_eq!(
            store.get("n-1000").unwrap().parent_id(),
            Some(&NodeId::new("n-999"))
        );
    }

    #[test]
    fn initialize_dedups_root_ids() {
        let store = NodeStore::initialize(&[ApiNode::leaf("r", "R"), ApiNode::leaf("r", "R")]);
        assert_eq!(store.root_ids(), &[NodeId::new("r")]);
    }

    #[test]
    fn merge_replaces_placeholder_children() {
        let store = NodeStore::initialize(&sample());
        assert!(store.needs_children("b"));

        let merged = store.merge_children(
            "b",
            &[ApiNode::branch("d", "D", vec![ApiNode::leaf("d1", "D1")])],
        );
        let b = merged.get("b").unwrap();
        assert_eq!(b.child_ids(), &[NodeId::new("d")]);
        assert_eq!(b.children_state(), ChildrenState::Loaded);
        assert_eq!(merged.get("d1").unwrap().parent_id(), Some(&NodeId::new("d")));
        assert_no_dangling(&merged);

        // The previous snapshot is untouched.
        assert!(store.get("d").is_none());
        assert!(store.needs_children("b"));
    }

    #[test]
    fn merge_with_unknown_parent_is_identity() {
        let store = NodeStore::initialize(&sample());
        let merged = store.merge_children("nope", &[ApiNode::leaf("x", "X")]);
        assert!(merged.ptr_eq(&store));
        assert!(!merged.contains("x"));
    }

    #[test]
    fn merge_keeps_untouched_nodes_identical() {
        let store = NodeStore::initialize(&sample());
        let merged = store.merge_children("b", &[ApiNode::leaf("d", "D")]);
        for id in ["a", "c", "c1", "z"] {
            assert!(
                Arc::ptr_eq(store.get(id).unwrap(), merged.get(id).unwrap()),
                "{id} should be shared"
            );
        }
        assert!(!Arc::ptr_eq(store.get("b").unwrap(), merged.get("b").unwrap()));
    }

    #[test]
    fn empty_merge_marks_leaf_loaded() {
        let store = NodeStore::initialize(&sample());
        let merged = store.merge_children("b", &[]);
        assert!(!merged.needs_children("b"));
        assert!(merged.get("b").unwrap().child_ids().is_empty());
    }

    #[test]
    fn redelivered_child_keeps_known_descendants() {
        let store = NodeStore::initialize(&sample());
        // A depth-1 refetch of "a" delivers "c" without its children.
        let merged = store.merge_children(
            "a",
            &[ApiNode::branch("b", "B", Vec::new()), ApiNode::branch("c", "C", Vec::new())],
        );
        assert_eq!(merged.get("c").unwrap().child_ids(), &[NodeId::new("c1")]);
        assert!(Arc::ptr_eq(store.get("c").unwrap(), merged.get("c").unwrap()));
        assert_no_dangling(&merged);
    }

    #[test]
    fn repeated_child_id_is_listed_once() {
        let store = NodeStore::initialize(&sample());
        let merged = store.merge_children("b", &[ApiNode::leaf("d", "D"), ApiNode::leaf("d", "D")]);
        assert_eq!(merged.get("b").unwrap().child_ids(), &[NodeId::new("d")]);
    }

    #[test]
    fn needs_children_false_for_unknown() {
        assert!(!NodeStore::new().needs_children("ghost"));
    }
}
