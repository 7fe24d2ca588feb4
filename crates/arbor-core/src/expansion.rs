#![forbid(unsafe_code)]

//! Set of open node ids.

use crate::node::NodeId;

/// Persistent set of expanded node ids.
///
/// Membership means "render children if known". It says nothing about
/// whether those children have been loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    open: im::HashSet<NodeId>,
}

impl ExpansionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`, returning the new set.
    #[must_use]
    pub fn toggle(&self, id: &NodeId) -> Self {
        if self.open.contains(id) {
            self.without(id)
        } else {
            self.with(id)
        }
    }

    /// Set with `id` open.
    #[must_use]
    pub fn with(&self, id: &NodeId) -> Self {
        Self {
            open: self.open.update(id.clone()),
        }
    }

    /// Set with `id` closed.
    #[must_use]
    pub fn without(&self, id: &NodeId) -> Self {
        Self {
            open: self.open.without(id),
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.open.iter()
    }
}

impl FromIterator<NodeId> for ExpansionSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            open: iter.into_iter().collect(),
        }
    }
}
