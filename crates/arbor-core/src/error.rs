use thiserror::Error;

use crate::node::NodeId;

/// Outcome of a single failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request was superseded. Not a failure; never surfaced.
    #[error("request cancelled")]
    Cancelled,

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("request failed with status {status}")]
    Status { status: u16 },

    /// The payload did not have the expected shape.
    #[error("malformed response: {message}")]
    Malformed { message: String },
}

impl FetchError {
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::malformed(error.to_string())
    }
}

/// A failure scoped to one node or one search session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("bootstrap failed: {source}")]
    Bootstrap { source: FetchError },

    #[error("loading children of {node_id} failed: {source}")]
    ChildFetch { node_id: NodeId, source: FetchError },

    #[error("search for {term:?} failed: {source}")]
    SearchFetch { term: String, source: FetchError },
}

impl TreeError {
    /// The underlying remote failure.
    #[must_use]
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            Self::Bootstrap { source }
            | Self::ChildFetch { source, .. }
            | Self::SearchFetch { source, .. } => source,
        }
    }
}
