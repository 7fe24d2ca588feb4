#![forbid(unsafe_code)]

//! Blocking HTTP tree source.
//!
//! Tree: `GET {tree_url}?rootId={id}&TreeDepth={depth}`.
//! Search: `GET {search_endpoint}?name={term}`.
//! Both send `accept: text/plain` and an `AppToken` header and expect a JSON
//! array of node records in the body.

use arbor_core::{ApiNode, CancellationToken, FetchError, TreeConfig, TreeSource};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use std::time::Duration;

use crate::error::RemoteError;

const APP_TOKEN_HEADER: &str = "AppToken";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    tree_url: Url,
    tree_app_token: String,
    search_url: Url,
    search_app_token: String,
}

impl HttpSource {
    /// Build a source from resolved configuration.
    pub fn new(config: &TreeConfig) -> Result<Self, RemoteError> {
        let tree_url = parse_endpoint(&config.tree_url())?;
        let search_url = parse_endpoint(&config.search_endpoint)?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout))
            .timeout(config.request_timeout)
            .build()?;

        tracing::debug!(
            target: "arbor.remote",
            tree_url = %tree_url,
            search_url = %search_url,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "http source ready"
        );
        Ok(Self {
            client,
            tree_url,
            tree_app_token: config.tree_app_token.clone(),
            search_url,
            search_app_token: config.search_app_token.clone(),
        })
    }

    #[must_use]
    pub fn tree_url(&self) -> &Url {
        &self.tree_url
    }

    #[must_use]
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    fn get_nodes(request: RequestBuilder, what: &str) -> Result<Vec<ApiNode>, FetchError> {
        let response = request
            .header(ACCEPT, "text/plain")
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(target: "arbor.remote", what, status = status.as_u16(), "non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(transport)?;
        let nodes: Vec<ApiNode> = serde_json::from_str(&body)?;
        tracing::trace!(target: "arbor.remote", what, nodes = nodes.len(), bytes = body.len(), "response decoded");
        Ok(nodes)
    }
}

impl TreeSource for HttpSource {
    fn fetch_children(&self, node_id: &str, depth: u32) -> Result<Vec<ApiNode>, FetchError> {
        let depth = depth.to_string();
        let request = self
            .client
            .get(self.tree_url.clone())
            .query(&[("rootId", node_id), ("TreeDepth", depth.as_str())])
            .header(APP_TOKEN_HEADER, &self.tree_app_token);
        Self::get_nodes(request, "tree")
    }

    fn search(&self, term: &str, cancel: &CancellationToken) -> Result<Vec<ApiNode>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let request = self
            .client
            .get(self.search_url.clone())
            .query(&[("name", term)])
            .header(APP_TOKEN_HEADER, &self.search_app_token);
        let result = Self::get_nodes(request, "search");

        // A blocking call cannot be interrupted; report a superseded call as
        // cancelled whatever it returned.
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        result
    }
}

fn transport(error: reqwest::Error) -> FetchError {
    FetchError::transport(error.to_string())
}

fn parse_endpoint(raw: &str) -> Result<Url, RemoteError> {
    let url = Url::parse(raw).map_err(|error| RemoteError::invalid_endpoint(raw, error.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RemoteError::invalid_endpoint(
            raw,
            format!("unsupported scheme {other:?}"),
        )),
    }
}
