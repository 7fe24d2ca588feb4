#![forbid(unsafe_code)]

//! Deterministic generated hierarchy for offline use.
//!
//! Every node has `branching` children, forever. A node at level `n` below
//! `parent` is `"{parent}-{n}-{i}"` and is labelled `"Node {id}"`; the top
//! level hangs off `"root"`. A fetch of depth `d` nests `d` levels, and the
//! deepest level carries an empty `children` list so the engine loads it on
//! demand.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use arbor_core::{ApiNode, CancellationToken, FetchError, TreeSource};

/// Default fan-out.
pub const DEFAULT_BRANCHING: usize = 3;
/// Levels below the roots that search walks.
pub const DEFAULT_SEARCH_DEPTH: u32 = 4;
/// Cap on search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Debug)]
pub struct MockSource {
    branching: usize,
    search_depth: u32,
    search_limit: usize,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            branching: DEFAULT_BRANCHING,
            search_depth: DEFAULT_SEARCH_DEPTH,
            search_limit: DEFAULT_SEARCH_LIMIT,
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching;
        self
    }

    #[must_use]
    pub fn with_search_depth(mut self, depth: u32) -> Self {
        self.search_depth = depth;
        self
    }

    /// Make child fetches for `id` fail with a 500.
    #[must_use]
    pub fn failing_on(mut self, id: impl Into<String>) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Number of remote calls served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Generate `depth` nested levels beneath `parent`.
    #[must_use]
    pub fn generate(&self, parent: &str, depth: u32) -> Vec<ApiNode> {
        self.level(parent, 1, depth)
    }

    fn level(&self, parent: &str, current: u32, depth: u32) -> Vec<ApiNode> {
        (0..self.branching)
            .map(|i| {
                let id = format!("{parent}-{current}-{i}");
                let children = if current < depth {
                    self.level(&id, current + 1, depth)
                } else {
                    Vec::new()
                };
                ApiNode::branch(id.clone(), format!("Node {id}"), children)
            })
            .collect()
    }
}

impl TreeSource for MockSource {
    fn fetch_children(&self, node_id: &str, depth: u32) -> Result<Vec<ApiNode>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(node_id) {
            tracing::debug!(target: "arbor.remote", node = node_id, "mock failure injected");
            return Err(FetchError::Status { status: 500 });
        }
        Ok(self.generate(node_id, depth))
    }

    fn search(&self, term: &str, cancel: &CancellationToken) -> Result<Vec<ApiNode>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let needle = term.trim().to_lowercase();
        let mut found = Vec::new();
        let mut stack = self.generate("root", self.search_depth);
        stack.reverse();

        while let Some(mut node) = stack.pop() {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if found.len() >= self.search_limit {
                break;
            }
            let children = node.children.take().unwrap_or_default();
            stack.extend(children.into_iter().rev());
            if node.display_name.to_lowercase().contains(&needle) {
                found.push(ApiNode::leaf(node.id, node.display_name));
            }
        }
        Ok(found)
    }
}
