#![forbid(unsafe_code)]

//! The remote data source seam.

use crate::cancellation::CancellationToken;
use crate::error::FetchError;
use crate::node::ApiNode;

/// Read-only remote hierarchy.
///
/// Implementations block; hosts that cannot block run them on worker threads.
pub trait TreeSource: Send + Sync {
    /// Children of `node_id`, nested `depth` levels deep.
    ///
    /// `("root", 3)` is the bootstrap call and returns the top-level nodes.
    fn fetch_children(&self, node_id: &str, depth: u32) -> Result<Vec<ApiNode>, FetchError>;

    /// Flat list of nodes matching `term`.
    ///
    /// Implementations should return [`FetchError::Cancelled`] once `cancel`
    /// fires instead of delivering results.
    fn search(&self, term: &str, cancel: &CancellationToken) -> Result<Vec<ApiNode>, FetchError>;
}

impl<S: TreeSource + ?Sized> TreeSource for std::sync::Arc<S> {
    fn fetch_children(&self, node_id: &str, depth: u32) -> Result<Vec<ApiNode>, FetchError> {
        (**self).fetch_children(node_id, depth)
    }

    fn search(&self, term: &str, cancel: &CancellationToken) -> Result<Vec<ApiNode>, FetchError> {
        (**self).search(term, cancel)
    }
}
