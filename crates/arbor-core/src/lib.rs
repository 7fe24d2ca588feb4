#![forbid(unsafe_code)]

//! Core: lazily loaded, virtualized browsing of very large hierarchies.
//!
//! # Role in Arbor
//! `arbor-core` holds all tree state and the rules for changing it. It does
//! no I/O: remote calls are described as [`Effect`]s and their outcomes come
//! back as [`Completion`]s.
//!
//! # Primary responsibilities
//! - **NodeStore**: flat copy-on-write map normalized from nested payloads.
//! - **ExpansionSet**: which nodes are open.
//! - **LazyLoader**: single-flight child fetches merged into the store.
//! - **Flatten**: store + expansion projected into visible rows.
//! - **RowWindow**: the slice of rows a fixed-height viewport paints.
//! - **SearchController**: debounced, cancellable, last-writer-wins search.
//! - **Selection**: membership toggling against a host-owned list.
//!
//! # How it fits in the system
//! `arbor-remote` implements [`TreeSource`] and runs effects on worker
//! threads; `arbor-cli` drives a [`TreeEngine`] from the command line.

pub mod cancellation;
pub mod config;
pub mod engine;
pub mod error;
pub mod expansion;
pub mod flatten;
pub mod loader;
pub mod node;
pub mod search;
pub mod selection;
pub mod source;
pub mod store;
pub mod window;

pub use cancellation::{CancellationSource, CancellationToken};
pub use config::TreeConfig;
pub use engine::{BootstrapRequest, BootstrapState, Completion, Display, Effect, TreeEngine};
pub use error::{FetchError, TreeError};
pub use expansion::ExpansionSet;
pub use flatten::{VisibleRow, descendant_run, flatten};
pub use loader::{CHILD_FETCH_DEPTH, ChildRequest, LazyLoader, LoadOutcome, LoadingFlags};
pub use node::{ApiNode, ChildrenState, Node, NodeId};
pub use search::{SearchController, SearchRequest, SettleOutcome};
pub use selection::{SelectedIds, SelectionEntry, SelectionList};
pub use source::TreeSource;
pub use store::NodeStore;
pub use window::{RowWindow, WindowConfig};
