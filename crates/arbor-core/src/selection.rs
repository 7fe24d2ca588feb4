#![forbid(unsafe_code)]

//! Membership toggling against an externally owned selection list.
//!
//! The host owns the ordered list and its uniqueness. The core only computes
//! the next list (handed back through a callback) and keeps a derived id set
//! for O(1) "is selected" checks per row.

use std::sync::Arc;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::node::Node;

/// One selected entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub id: String,
    pub display_label: String,
}

impl SelectionEntry {
    #[must_use]
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            display_label: node.display_label().to_string(),
        }
    }
}

/// The host's list, shared by reference.
pub type SelectionList = Arc<[SelectionEntry]>;

/// Add `node` if absent, remove it if present, and pass the result on.
pub fn toggle(list: &[SelectionEntry], node: &Node, on_change: impl FnOnce(SelectionList)) {
    let id = node.id().as_str();
    if list.iter().any(|entry| entry.id == id) {
        remove(list, id, on_change);
    } else {
        let next: SelectionList = list
            .iter()
            .cloned()
            .chain(std::iter::once(SelectionEntry::from_node(node)))
            .collect();
        on_change(next);
    }
}

/// Remove `id`; the callback is not invoked when `id` is absent.
pub fn remove(list: &[SelectionEntry], id: &str, on_change: impl FnOnce(SelectionList)) {
    if !list.iter().any(|entry| entry.id == id) {
        return;
    }
    let next: SelectionList = list.iter().filter(|entry| entry.id != id).cloned().collect();
    on_change(next);
}

/// Id set derived from the host's list.
///
/// [`sync`](Self::sync) recomputes only when handed a different list
/// allocation than last time.
#[derive(Debug, Default)]
pub struct SelectedIds {
    source: Option<SelectionList>,
    ids: AHashSet<String>,
}

impl SelectedIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from `list`. Returns whether the set was rebuilt.
    pub fn sync(&mut self, list: &SelectionList) -> bool {
        if self
            .source
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, list))
        {
            return false;
        }
        self.ids = list.iter().map(|entry| entry.id.clone()).collect();
        self.source = Some(Arc::clone(list));
        true
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
