#![forbid(unsafe_code)]

//! Projection of store + expansion state into visible rows.
//!
//! The result is the ordered row list a windowed renderer indexes into.
//! Only expanded nodes with known children are descended into, so the cost
//! is proportional to the number of visible rows, never to the store size.

use std::ops::Range;
use std::sync::Arc;

use crate::expansion::ExpansionSet;
use crate::node::Node;
use crate::store::NodeStore;

/// One row of the flattened tree.
#[derive(Debug, Clone)]
pub struct VisibleRow {
    pub node: Arc<Node>,
    /// Indentation level; roots are 0.
    pub depth: usize,
}

impl VisibleRow {
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        self.node.id().as_str()
    }
}

impl PartialEq for VisibleRow {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && Arc::ptr_eq(&self.node, &other.node)
    }
}

/// Depth-first pre-order walk from the roots.
///
/// Children follow their parent at `depth + 1` iff the parent is expanded and
/// has a non-empty `child_ids`. Ids absent from the store are skipped, as is
/// any child that already appears among its own ancestors.
#[must_use]
pub fn flatten(store: &NodeStore, expanded: &ExpansionSet) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&str, usize)> = store
        .root_ids()
        .iter()
        .rev()
        .map(|id| (id.as_str(), 0))
        .collect();
    // Ancestors of the row being visited, indexed by depth.
    let mut path: Vec<&str> = Vec::new();

    while let Some((id, depth)) = stack.pop() {
        path.truncate(depth);
        if path.contains(&id) {
            continue;
        }
        let Some(node) = store.get(id) else {
            continue;
        };
        rows.push(VisibleRow {
            node: Arc::clone(node),
            depth,
        });
        if node.has_children() && expanded.contains(id) {
            path.push(id);
            stack.extend(
                node.child_ids()
                    .iter()
                    .rev()
                    .map(|child| (child.as_str(), depth + 1)),
            );
        }
    }

    tracing::trace!(target: "arbor.flatten", rows = rows.len(), "flattened");
    rows
}

/// Rows strictly below `rows[index]` in its subtree.
///
/// Empty when `index` is out of bounds or the row shows no descendants.
#[must_use]
pub fn descendant_run(rows: &[VisibleRow], index: usize) -> Range<usize> {
    let Some(row) = rows.get(index) else {
        return index..index;
    };
    let start = index + 1;
    let len = rows[start..]
        .iter()
        .take_while(|r| r.depth > row.depth)
        .count();
    start..start + len
}
