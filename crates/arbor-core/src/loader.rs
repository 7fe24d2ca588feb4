#![forbid(unsafe_code)]

//! On-demand child loading with per-node single-flight.
//!
//! # Protocol
//!
//! ```text
//! begin(store, id) ──▶ Some(ChildRequest)   flag[id] = true
//!        │                    │
//!        │ (again, pending)   ▼ host runs fetch_children(id, 1)
//!        ▼                    │
//!      None            complete(store, req, result)
//!                             │
//!                ┌────────────┴────────────┐
//!                ▼ Ok(children)            ▼ Err(e)
//!          Merged(store')            Failed(ChildFetch)
//!          flag cleared              flag cleared, store untouched
//! ```
//!
//! A completion is matched against the outstanding request by ticket, so a
//! completion for a request the loader no longer tracks is [`LoadOutcome::Ignored`].

use crate::error::{FetchError, TreeError};
use crate::node::{ApiNode, NodeId};
use crate::store::NodeStore;

/// Depth requested when loading one node's children.
pub const CHILD_FETCH_DEPTH: u32 = 1;

/// A child fetch the host must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRequest {
    pub node_id: NodeId,
    pub depth: u32,
    pub ticket: u64,
}

/// Ids with an outstanding child fetch.
///
/// Absent ids read as "not loading".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    inflight: im::HashMap<NodeId, u64>,
}

impl LoadingFlags {
    #[inline]
    #[must_use]
    pub fn is_loading(&self, id: &str) -> bool {
        self.inflight.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }

    /// Ids currently loading, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.inflight.keys()
    }

    fn ticket(&self, id: &str) -> Option<u64> {
        self.inflight.get(id).copied()
    }
}

/// Result of feeding a completion to the loader.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Children merged; replace the host's store with this one.
    Merged(NodeStore),
    /// The fetch failed; the store is unchanged.
    Failed(TreeError),
    /// The completion does not belong to an outstanding request.
    Ignored,
}

/// Single-flight child loader.
#[derive(Debug, Default)]
pub struct LazyLoader {
    flags: LoadingFlags,
    next_ticket: u64,
}

impl LazyLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn flags(&self) -> &LoadingFlags {
        &self.flags
    }

    #[must_use]
    pub fn is_loading(&self, id: &str) -> bool {
        self.flags.is_loading(id)
    }

    /// Start loading `id`'s children if it needs them and nothing is pending.
    pub fn begin(&mut self, store: &NodeStore, id: &str) -> Option<ChildRequest> {
        if self.flags.is_loading(id) {
            tracing::trace!(target: "arbor.loader", node = id, "fetch already pending");
            return None;
        }
        let node = store.get(id)?;
        if !node.needs_children() {
            return None;
        }

        self.next_ticket += 1;
        let request = ChildRequest {
            node_id: node.id().clone(),
            depth: CHILD_FETCH_DEPTH,
            ticket: self.next_ticket,
        };
        self.flags.inflight.insert(request.node_id.clone(), request.ticket);
        tracing::debug!(
            target: "arbor.loader",
            node = id,
            ticket = request.ticket,
            "child fetch started"
        );
        Some(request)
    }

    /// Settle an outstanding request.
    pub fn complete(
        &mut self,
        store: &NodeStore,
        request: &ChildRequest,
        result: Result<Vec<ApiNode>, FetchError>,
    ) -> LoadOutcome {
        let id = request.node_id.as_str();
        if self.flags.ticket(id) != Some(request.ticket) {
            tracing::debug!(
                target: "arbor.loader",
                node = id,
                ticket = request.ticket,
                "stale child completion dropped"
            );
            return LoadOutcome::Ignored;
        }
        self.flags.inflight.remove(id);

        match result {
            Ok(children) => {
                tracing::debug!(
                    target: "arbor.loader",
                    node = id,
                    children = children.len(),
                    "child fetch completed"
                );
                LoadOutcome::Merged(store.merge_children(id, &children))
            }
            Err(source) => {
                let error = TreeError::ChildFetch {
                    node_id: request.node_id.clone(),
                    source,
                };
                tracing::warn!(target: "arbor.loader", node = id, error = %error, "child fetch failed");
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Forget every outstanding request; their completions become stale.
    pub fn reset(&mut self) {
        self.flags = LoadingFlags::default();
    }
}
