use arbor_core::TreeError;
use arbor_remote::RemoteError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("unknown node id: {id}")]
    UnknownNode { id: String },

    #[error("timed out waiting for {pending} remote call(s)")]
    Timeout { pending: usize },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownNode { .. } => 2,
            Self::Tree(_) => 3,
            Self::Timeout { .. } => 4,
            _ => 1,
        }
    }
}
