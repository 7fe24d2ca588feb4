#![forbid(unsafe_code)]

//! Node identity, node records, and the wire shape they are built from.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stable, globally unique node identifier.
///
/// Backed by a shared `Arc<str>` so that ids can be copied into child lists,
/// expansion sets, and loading flags without reallocating.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create an id from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Whether a node's children are known.
///
/// An empty child list alone cannot tell "never asked" apart from "asked and
/// there are none", so the store tracks it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildrenState {
    /// No children delivered and no fetch has targeted this node yet.
    Unfetched,
    /// `child_ids` is authoritative, possibly empty.
    Loaded,
}

/// A single addressable entity in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    id: NodeId,
    display_label: String,
    child_ids: Vec<NodeId>,
    parent_id: Option<NodeId>,
    children: ChildrenState,
}

impl Node {
    /// Create a node with no known children.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, display_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_label: display_label.into(),
            child_ids: Vec::new(),
            parent_id: None,
            children: ChildrenState::Unfetched,
        }
    }

    /// Set the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: Option<NodeId>) -> Self {
        self.parent_id = parent;
        self
    }

    /// Set an authoritative child list.
    #[must_use]
    pub fn with_children(mut self, child_ids: Vec<NodeId>) -> Self {
        self.child_ids = child_ids;
        self.children = ChildrenState::Loaded;
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    #[inline]
    #[must_use]
    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }

    #[inline]
    #[must_use]
    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn children_state(&self) -> ChildrenState {
        self.children
    }

    /// Whether the node has at least one known child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }

    /// Whether opening this node should trigger a child fetch.
    #[must_use]
    pub fn needs_children(&self) -> bool {
        self.children == ChildrenState::Unfetched && self.child_ids.is_empty()
    }

    /// Build a detached node from a wire record, ignoring nesting.
    ///
    /// Used for flat search results, which never enter the store.
    #[must_use]
    pub fn from_api(api: &ApiNode) -> Self {
        let node = Self::new(api.id.as_str(), api.display_name.as_str());
        match api.children.as_deref() {
            Some(children) if !children.is_empty() => {
                node.with_children(children.iter().map(|c| NodeId::new(&c.id)).collect())
            }
            _ => node,
        }
    }
}

/// Node record as delivered by the remote source.
///
/// Nesting is only meaningful at the ingestion boundary; the store flattens
/// it immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiNode {
    #[serde(rename = "VID", alias = "id")]
    pub id: String,
    #[serde(rename = "DisplayName", alias = "displayName")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ApiNode>>,
}

impl ApiNode {
    /// Leaf record with no `children` field.
    #[must_use]
    pub fn leaf(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            children: None,
        }
    }

    /// Record with nested children.
    #[must_use]
    pub fn branch(
        id: impl Into<String>,
        display_name: impl Into<String>,
        children: Vec<ApiNode>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            children: Some(children),
        }
    }

    /// Nested children, empty when the field was absent.
    #[must_use]
    pub fn children(&self) -> &[ApiNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_borrows_as_str() {
        let id = NodeId::new("abc");
        let as_str: &str = id.borrow();
        assert_eq!(as_str, "abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(format!("{id:?}"), "\"abc\"");
    }

    #[test]
    fn api_node_reads_wire_spelling() {
        let json = r#"[{"VID":"a","DisplayName":"A","children":[{"VID":"b","DisplayName":"B","children":[]}]}]"#;
        let nodes: Vec<ApiNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].id, "a");
        assert_eq!(nodes[0].children()[0].display_name, "B");
        assert!(nodes[0].children()[0].children().is_empty());
    }

    #[test]
    fn api_node_reads_camel_case_spelling() {
        let json = r#"{"id":"x","displayName":"X"}"#;
        let node: ApiNode = serde_json::from_str(json).unwrap();
        assert_eq!(node, ApiNode::leaf("x", "X"));
    }

    #[test]
    fn api_node_rejects_missing_id() {
        let json = r#"{"DisplayName":"X"}"#;
        assert!(serde_json::from_str::<ApiNode>(json).is_err());
    }

    #[test]
    fn from_api_keeps_child_ids_only() {
        let api = ApiNode::branch("p", "P", vec![ApiNode::leaf("c1", "C1"), ApiNode::leaf("c2", "C2")]);
        let node = Node::from_api(&api);
        assert_eq!(node.child_ids(), &[NodeId::new("c1"), NodeId::new("c2")]);
        assert_eq!(node.children_state(), ChildrenState::Loaded);
        assert!(node.parent_id().is_none());
    }

    #[test]
    fn empty_children_stay_unfetched() {
        let node = Node::from_api(&ApiNode::branch("p", "P", Vec::new()));
        assert!(node.needs_children());
        let loaded = Node::new("q", "Q").with_children(Vec::new());
        assert!(!loaded.needs_children());
        assert!(!loaded.has_children());
    }
}
