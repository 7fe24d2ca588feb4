#![forbid(unsafe_code)]

//! The tree engine: one owner for store, expansion, loading, and search.
//!
//! The engine never performs I/O. Actions return [`Effect`]s describing remote
//! work; the host runs them (inline with [`Effect::run`] or on worker threads)
//! and feeds each [`Completion`] back through [`TreeEngine::apply`] on the
//! thread that owns the engine.
//!
//! # Example
//!
//! ```ignore
//! let mut engine = TreeEngine::new(&TreeConfig::default());
//! if let Some(effect) = engine.bootstrap() {
//!     engine.apply(effect.run(&source));
//! }
//! for row in engine.visible_rows() {
//!     println!("{}{}", "  ".repeat(row.depth), row.node.display_label());
//! }
//! ```

use std::sync::Arc;

use web_time::Instant;

use crate::config::{BOOTSTRAP_DEPTH, BOOTSTRAP_ROOT_ID, TreeConfig};
use crate::error::{FetchError, TreeError};
use crate::expansion::ExpansionSet;
use crate::flatten::{VisibleRow, flatten};
use crate::loader::{ChildRequest, LazyLoader, LoadOutcome, LoadingFlags};
use crate::node::{ApiNode, Node, NodeId};
use crate::search::{SearchController, SearchRequest, SettleOutcome};
use crate::source::TreeSource;
use crate::store::NodeStore;

// ---------------------------------------------------------------------------
// Effects and completions
// ---------------------------------------------------------------------------

/// The initial root fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRequest {
    pub root_id: NodeId,
    pub depth: u32,
    pub ticket: u64,
}

/// Remote work requested by the engine.
#[derive(Debug, Clone)]
pub enum Effect {
    Bootstrap(BootstrapRequest),
    FetchChildren(ChildRequest),
    Search(SearchRequest),
}

/// The outcome of an [`Effect`], fed back with [`TreeEngine::apply`].
#[derive(Debug, Clone)]
pub enum Completion {
    Bootstrap {
        request: BootstrapRequest,
        result: Result<Vec<ApiNode>, FetchError>,
    },
    Children {
        request: ChildRequest,
        result: Result<Vec<ApiNode>, FetchError>,
    },
    Search {
        session: u64,
        result: Result<Vec<ApiNode>, FetchError>,
    },
}

impl Effect {
    /// Run the effect against `source` on the current thread.
    pub fn run<S: TreeSource + ?Sized>(self, source: &S) -> Completion {
        match self {
            Self::Bootstrap(request) => {
                let result = source.fetch_children(request.root_id.as_str(), request.depth);
                Completion::Bootstrap { request, result }
            }
            Self::FetchChildren(request) => {
                let result = source.fetch_children(request.node_id.as_str(), request.depth);
                Completion::Children { request, result }
            }
            Self::Search(request) => {
                let result = if request.token.is_cancelled() {
                    Err(FetchError::Cancelled)
                } else {
                    source.search(&request.term, &request.token)
                };
                Completion::Search {
                    session: request.session,
                    result,
                }
            }
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bootstrap(_) => "bootstrap",
            Self::FetchChildren(_) => "fetch_children",
            Self::Search(_) => "search",
        }
    }
}

// ---------------------------------------------------------------------------
// Read-side views
// ---------------------------------------------------------------------------

/// Progress of the initial root fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    /// Not requested yet.
    Pending,
    Loading { ticket: u64 },
    Ready,
    /// The last attempt failed; [`TreeEngine::bootstrap`] retries.
    Failed(TreeError),
}

/// What the list area should show.
#[derive(Debug, Clone, Copy)]
pub enum Display<'a> {
    /// The flattened lazily loaded tree.
    Tree(&'a [VisibleRow]),
    /// Flat search output. Replaces the tree while a term is set.
    Search {
        results: &'a [Arc<Node>],
        searching: bool,
        error: Option<&'a TreeError>,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TreeEngine {
    store: NodeStore,
    expanded: ExpansionSet,
    loader: LazyLoader,
    search: SearchController,
    bootstrap: BootstrapState,
    next_bootstrap_ticket: u64,
    rows: Vec<VisibleRow>,
}

impl TreeEngine {
    #[must_use]
    pub fn new(config: &TreeConfig) -> Self {
        Self {
            store: NodeStore::new(),
            expanded: ExpansionSet::new(),
            loader: LazyLoader::new(),
            search: SearchController::new(config.search_debounce),
            bootstrap: BootstrapState::Pending,
            next_bootstrap_ticket: 0,
            rows: Vec::new(),
        }
    }

    // -- reads --------------------------------------------------------------

    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    #[must_use]
    pub fn root_ids(&self) -> &[NodeId] {
        self.store.root_ids()
    }

    #[must_use]
    pub fn expanded(&self) -> &ExpansionSet {
        &self.expanded
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingFlags {
        self.loader.flags()
    }

    #[must_use]
    pub fn is_loading(&self, id: &str) -> bool {
        self.loader.is_loading(id)
    }

    #[must_use]
    pub fn bootstrap_state(&self) -> &BootstrapState {
        &self.bootstrap
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.raw_term()
    }

    #[must_use]
    pub fn search_results(&self) -> &[Arc<Node>] {
        self.search.results()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.search.is_searching()
    }

    #[must_use]
    pub fn search_error(&self) -> Option<&TreeError> {
        self.search.error()
    }

    #[must_use]
    pub fn search_active(&self) -> bool {
        self.search.is_active()
    }

    /// Flattened tree rows, current as of the last change.
    #[must_use]
    pub fn visible_rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    #[must_use]
    pub fn display(&self) -> Display<'_> {
        if self.search.is_active() {
            Display::Search {
                results: self.search.results(),
                searching: self.search.is_searching(),
                error: self.search.error(),
            }
        } else {
            Display::Tree(&self.rows)
        }
    }

    /// When the host should next call [`poll`](Self::poll).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.next_deadline()
    }

    // -- actions ------------------------------------------------------------

    /// Request the root fetch. `None` while one is already outstanding.
    pub fn bootstrap(&mut self) -> Option<Effect> {
        if matches!(self.bootstrap, BootstrapState::Loading { .. }) {
            return None;
        }
        self.next_bootstrap_ticket += 1;
        let ticket = self.next_bootstrap_ticket;
        self.bootstrap = BootstrapState::Loading { ticket };
        tracing::debug!(target: "arbor.loader", ticket, "bootstrap started");
        Some(Effect::Bootstrap(BootstrapRequest {
            root_id: NodeId::new(BOOTSTRAP_ROOT_ID),
            depth: BOOTSTRAP_DEPTH,
            ticket,
        }))
    }

    /// Flip `id`'s expansion. Opening a node whose children are unknown also
    /// starts a child fetch.
    pub fn toggle_expanded(&mut self, id: &str) -> Option<Effect> {
        let Some(node) = self.store.get(id) else {
            tracing::debug!(target: "arbor.loader", node = id, "toggle for unknown node ignored");
            return None;
        };
        let node_id = node.id().clone();
        self.expanded = self.expanded.toggle(&node_id);
        self.refresh_rows();

        if self.expanded.contains(id) {
            self.fetch_children(id)
        } else {
            None
        }
    }

    /// Start a child fetch for `id` if it needs one and none is pending.
    pub fn fetch_children(&mut self, id: &str) -> Option<Effect> {
        self.loader.begin(&self.store, id).map(Effect::FetchChildren)
    }

    /// Record the search box contents.
    pub fn set_search_term(&mut self, term: &str, now: Instant) {
        self.search.set_term(term, now);
    }

    /// Advance timers; returns a search request once its debounce elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Effect> {
        self.search.poll(now).map(Effect::Search)
    }

    /// Feed back the outcome of an effect. Returns whether anything a reader
    /// can observe changed.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Bootstrap { request, result } => self.apply_bootstrap(&request, result),
            Completion::Children { request, result } => {
                match self.loader.complete(&self.store, &request, result) {
                    LoadOutcome::Merged(store) => {
                        self.store = store;
                        self.refresh_rows();
                        true
                    }
                    LoadOutcome::Failed(_) => {
                        // Closed so a single toggle retries.
                        self.expanded = self.expanded.without(&request.node_id);
                        self.refresh_rows();
                        true
                    }
                    LoadOutcome::Ignored => false,
                }
            }
            Completion::Search { session, result } => !matches!(
                self.search.settle(session, result),
                SettleOutcome::Stale | SettleOutcome::Cancelled
            ),
        }
    }

    fn apply_bootstrap(
        &mut self,
        request: &BootstrapRequest,
        result: Result<Vec<ApiNode>, FetchError>,
    ) -> bool {
        if self.bootstrap != (BootstrapState::Loading { ticket: request.ticket }) {
            tracing::debug!(target: "arbor.loader", ticket = request.ticket, "stale bootstrap dropped");
            return false;
        }
        match result {
            Ok(nodes) => {
                self.store = NodeStore::initialize(&nodes);
                self.loader.reset();
                self.bootstrap = BootstrapState::Ready;
                tracing::info!(
                    target: "arbor.loader",
                    roots = self.store.root_ids().len(),
                    nodes = self.store.len(),
                    "bootstrap completed"
                );
            }
            Err(source) => {
                let error = TreeError::Bootstrap { source };
                tracing::warn!(target: "arbor.loader", error = %error, "bootstrap failed");
                self.bootstrap = BootstrapState::Failed(error);
            }
        }
        self.refresh_rows();
        true
    }

    fn refresh_rows(&mut self) {
        self.rows = flatten(&self.store, &self.expanded);
    }
}
