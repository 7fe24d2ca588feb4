#![forbid(unsafe_code)]

//! Debounced, cancellable remote search.
//!
//! # State Machine
//!
//! ```text
//!                    set_term(non-empty, changed)
//!   ┌──────┐ ───────────────────────────────────▶ ┌─────────────┐
//!   │ Idle │                                      │ Debouncing  │◀─┐ set_term(changed)
//!   └──────┘ ◀─────────────────────────────────── └─────────────┘ ─┘ deadline restarts
//!      ▲         set_term(empty): clear all              │
//!      │                                                 │ poll(now >= deadline)
//!      │  settle(session, ..)                            ▼
//!      └─────────────────────────────────────────── ┌──────────┐
//!         Ok: replace results, clear error          │ Fetching │
//!         Err: clear results, set error             └──────────┘
//! ```
//!
//! Each issued request carries a fresh session number. Only a settlement for
//! the session currently being fetched is applied; anything else is stale.
//! Changing the term cancels the outstanding request's token.

use std::sync::Arc;

use web_time::{Duration, Instant};

use crate::cancellation::{CancellationSource, CancellationToken};
use crate::error::{FetchError, TreeError};
use crate::node::{ApiNode, Node};

/// A search the host must run.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub session: u64,
    /// Trimmed, non-empty term.
    pub term: String,
    /// Cancelled once the request is superseded.
    pub token: CancellationToken,
}

/// Result of feeding a settlement to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Results replaced.
    Applied { results: usize },
    /// Error recorded, results cleared.
    Failed,
    /// Settlement for a superseded session; nothing changed.
    Stale,
    /// The current request reported cancellation; nothing recorded.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Debouncing { deadline: Instant },
    Fetching { session: u64 },
}

/// Debounced search controller.
#[derive(Debug)]
pub struct SearchController {
    debounce: Duration,
    raw_term: String,
    term: String,
    phase: Phase,
    session: u64,
    inflight: Option<CancellationSource>,
    results: Vec<Arc<Node>>,
    error: Option<TreeError>,
}

impl SearchController {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            raw_term: String::new(),
            term: String::new(),
            phase: Phase::Idle,
            session: 0,
            inflight: None,
            results: Vec::new(),
            error: None,
        }
    }

    /// Record what the user typed.
    ///
    /// Every call made while debouncing pushes the deadline back. Once a
    /// request is out, an unchanged trimmed term is a no-op. An empty
    /// trimmed term clears results and error immediately.
    pub fn set_term(&mut self, term: &str, now: Instant) {
        self.raw_term.clear();
        self.raw_term.push_str(term);

        let trimmed = term.trim();
        if trimmed == self.term {
            if let Phase::Debouncing { .. } = self.phase {
                self.phase = Phase::Debouncing {
                    deadline: now + self.debounce,
                };
            }
            return;
        }
        self.term = trimmed.to_string();
        self.cancel_inflight();

        if self.term.is_empty() {
            self.phase = Phase::Idle;
            self.results.clear();
            self.error = None;
            tracing::debug!(target: "arbor.search", "search cleared");
            return;
        }

        let deadline = now + self.debounce;
        self.phase = Phase::Debouncing { deadline };
        tracing::trace!(
            target: "arbor.search",
            term = %self.term,
            debounce_ms = self.debounce.as_millis() as u64,
            "search debouncing"
        );
    }

    /// Issue the pending search once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        let Phase::Debouncing { deadline } = self.phase else {
            return None;
        };
        if now < deadline {
            return None;
        }

        self.cancel_inflight();
        self.session += 1;
        let source = CancellationSource::new();
        let request = SearchRequest {
            session: self.session,
            term: self.term.clone(),
            token: source.token(),
        };
        self.inflight = Some(source);
        self.phase = Phase::Fetching {
            session: self.session,
        };
        tracing::debug!(
            target: "arbor.search",
            session = request.session,
            term = %request.term,
            "search issued"
        );
        Some(request)
    }

    /// Apply the outcome of session `session`.
    pub fn settle(&mut self, session: u64, result: Result<Vec<ApiNode>, FetchError>) -> SettleOutcome {
        if self.phase != (Phase::Fetching { session }) {
            tracing::debug!(
                target: "arbor.search",
                session,
                current = self.session,
                "stale search settlement dropped"
            );
            return SettleOutcome::Stale;
        }
        self.phase = Phase::Idle;
        self.inflight = None;

        match result {
            Ok(found) => {
                self.results = found.iter().map(|api| Arc::new(Node::from_api(api))).collect();
                self.error = None;
                tracing::debug!(
                    target: "arbor.search",
                    session,
                    results = self.results.len(),
                    "search settled"
                );
                SettleOutcome::Applied {
                    results: self.results.len(),
                }
            }
            Err(FetchError::Cancelled) => SettleOutcome::Cancelled,
            Err(source) => {
                let error = TreeError::SearchFetch {
                    term: self.term.clone(),
                    source,
                };
                tracing::warn!(target: "arbor.search", session, error = %error, "search failed");
                self.results.clear();
                self.error = Some(error);
                SettleOutcome::Failed
            }
        }
    }

    /// When the host should next call [`poll`](Self::poll).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Debouncing { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// The term as last typed, untrimmed.
    #[must_use]
    pub fn raw_term(&self) -> &str {
        &self.raw_term
    }

    /// The trimmed term driving the current session.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn results(&self) -> &[Arc<Node>] {
        &self.results
    }

    #[must_use]
    pub fn error(&self) -> Option<&TreeError> {
        self.error.as_ref()
    }

    /// True only while a request is outstanding.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self.phase, Phase::Fetching { .. })
    }

    /// Whether search output replaces the tree.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    fn cancel_inflight(&mut self) {
        if let Some(source) = self.inflight.take() {
            source.cancel();
            tracing::trace!(target: "arbor.search", session = self.session, "search cancelled");
        }
    }
}
