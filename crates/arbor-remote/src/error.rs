use thiserror::Error;

/// Failure constructing a source. Per-request failures are
/// [`FetchError`](arbor_core::FetchError)s.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid endpoint {url:?}: {message}")]
    InvalidEndpoint { url: String, message: String },
}

impl RemoteError {
    #[must_use]
    pub fn invalid_endpoint(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            message: message.into(),
        }
    }
}
