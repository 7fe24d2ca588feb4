#![forbid(unsafe_code)]

//! Environment-overridable configuration with fixed defaults.

use web_time::Duration;

/// Default quiet period before a search is sent.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 350;
/// Upper bound for the search debounce.
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Depth of the initial root fetch.
pub const BOOTSTRAP_DEPTH: u32 = 3;
/// Node id the bootstrap fetch is issued for.
pub const BOOTSTRAP_ROOT_ID: &str = "root";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TREE_ROUTE: &str = "/tree";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://replace-with-real-api/tree-search";
pub const DEFAULT_APP_TOKEN: &str = "dev-app-token";

/// Remote endpoints, credentials, and timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Base URL the tree route is resolved against.
    pub api_base_url: String,
    /// Tree route; an absolute `http(s)://` URL is used as-is.
    pub tree_route: String,
    /// `AppToken` header sent with tree requests.
    pub tree_app_token: String,
    /// Full URL of the search endpoint.
    pub search_endpoint: String,
    /// `AppToken` header sent with search requests.
    pub search_app_token: String,
    /// Quiet period before a typed term is sent.
    pub search_debounce: Duration,
    /// Per-request timeout for remote calls.
    pub request_timeout: Duration,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            tree_route: DEFAULT_TREE_ROUTE.to_string(),
            tree_app_token: DEFAULT_APP_TOKEN.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            search_app_token: DEFAULT_APP_TOKEN.to_string(),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl TreeConfig {
    /// Set the search debounce.
    #[must_use]
    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    /// Load config from environment variables.
    ///
    /// Reads:
    /// - `ARBOR_API_BASE_URL`: base URL for tree requests
    /// - `ARBOR_TREE_ROUTE`: tree route or absolute URL
    /// - `ARBOR_TREE_APP_TOKEN`: token for tree requests
    /// - `ARBOR_SEARCH_ENDPOINT`: search URL
    /// - `ARBOR_SEARCH_APP_TOKEN`: token for search requests
    /// - `ARBOR_SEARCH_DEBOUNCE_MS`: debounce in milliseconds
    /// - `ARBOR_REQUEST_TIMEOUT_MS`: request timeout in milliseconds
    ///
    /// Unset, blank, or unparsable values keep their defaults; numeric values
    /// are clamped by [`validated`](Self::validated).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = text("ARBOR_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(route) = text("ARBOR_TREE_ROUTE") {
            config.tree_route = route;
        }
        if let Some(token) = text("ARBOR_TREE_APP_TOKEN") {
            config.tree_app_token = token;
        }
        if let Some(url) = text("ARBOR_SEARCH_ENDPOINT") {
            config.search_endpoint = url;
        }
        if let Some(token) = text("ARBOR_SEARCH_APP_TOKEN") {
            config.search_app_token = token;
        }
        if let Some(value) = text("ARBOR_SEARCH_DEBOUNCE_MS")
            && let Ok(ms) = value.parse::<u64>()
        {
            config.search_debounce = Duration::from_millis(ms);
        }
        if let Some(value) = text("ARBOR_REQUEST_TIMEOUT_MS")
            && let Ok(ms) = value.parse::<u64>()
        {
            config.request_timeout = Duration::from_millis(ms);
        }

        config.validated()
    }

    /// Clamp timing values to their supported ranges.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let debounce_ms = (self.search_debounce.as_millis() as u64).min(MAX_SEARCH_DEBOUNCE_MS);
        self.search_debounce = Duration::from_millis(debounce_ms);

        let timeout_ms = (self.request_timeout.as_millis() as u64)
            .clamp(MIN_REQUEST_TIMEOUT_MS, MAX_REQUEST_TIMEOUT_MS);
        self.request_timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// URL of the tree route, without query string.
    #[must_use]
    pub fn tree_url(&self) -> String {
        let route = self.tree_route.as_str();
        let lower = route.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            route.to_string()
        } else if route.starts_with('/') {
            format!("{}{route}", self.api_base_url)
        } else {
            format!("{}/{route}", self.api_base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = TreeConfig::from_lookup(|_| None);
        assert_eq!(config, TreeConfig::default());
        assert_eq!(config.search_debounce, Duration::from_millis(350));
        assert_eq!(config.tree_url(), "http://127.0.0.1:8000/tree");
    }

    #[test]
    fn env_overrides_apply() {
        let config = TreeConfig::from_lookup(lookup(&[
            ("ARBOR_API_BASE_URL", "https://api.example.test/"),
            ("ARBOR_TREE_ROUTE", "v2/tree"),
            ("ARBOR_SEARCH_ENDPOINT", "https://search.example.test/q"),
            ("ARBOR_SEARCH_APP_TOKEN", "s3cret"),
            ("ARBOR_SEARCH_DEBOUNCE_MS", "120"),
        ]));
        assert_eq!(config.tree_url(), "https://api.example.test/v2/tree");
        assert_eq!(config.search_endpoint, "https://search.example.test/q");
        assert_eq!(config.search_app_token, "s3cret");
        assert_eq!(config.tree_app_token, DEFAULT_APP_TOKEN);
        assert_eq!(config.search_debounce, Duration::from_millis(120));
    }

    #[test]
    fn absolute_tree_route_wins() {
        let config = TreeConfig::from_lookup(lookup(&[(
            "ARBOR_TREE_ROUTE",
            "HTTPS://tree.example.test/nodes",
        )]));
        assert_eq!(config.tree_url(), "HTTPS://tree.example.test/nodes");
    }

    #[test]
    fn bad_values_keep_defaults_and_clamp() {
        let config = TreeConfig::from_lookup(lookup(&[
            ("ARBOR_SEARCH_DEBOUNCE_MS", "soon"),
            ("ARBOR_REQUEST_TIMEOUT_MS", "5"),
            ("ARBOR_SEARCH_APP_TOKEN", "   "),
        ]));
        assert_eq!(config.search_debounce, Duration::from_millis(350));
        assert_eq!(config.request_timeout, Duration::from_millis(MIN_REQUEST_TIMEOUT_MS));
        assert_eq!(config.search_app_token, DEFAULT_APP_TOKEN);

        let clamped = TreeConfig::default()
            .with_search_debounce(Duration::from_secs(60))
            .validated();
        assert_eq!(clamped.search_debounce, Duration::from_millis(MAX_SEARCH_DEBOUNCE_MS));
    }
}
