#![forbid(unsafe_code)]

//! Owns one engine plus the executor that runs its effects.

use std::sync::Arc;
use std::time::Duration;

use arbor_core::{BootstrapState, Effect, TreeConfig, TreeEngine, TreeSource};
use arbor_remote::{Executor, HttpSource, MockSource};

use crate::error::{CliError, Result};

/// Slack on top of the request timeout before giving up on a worker.
const WAIT_MARGIN: Duration = Duration::from_secs(1);

/// Pick the source a command runs against.
pub fn open_source(mock: bool, config: &TreeConfig) -> Result<Arc<dyn TreeSource>> {
    if mock {
        tracing::info!(target: "arbor.remote", "using generated mock hierarchy");
        Ok(Arc::new(MockSource::new()))
    } else {
        Ok(Arc::new(HttpSource::new(config)?))
    }
}

#[derive(Debug)]
pub struct Driver {
    engine: TreeEngine,
    executor: Executor,
    wait: Duration,
    issued: usize,
}

impl Driver {
    pub fn new(config: &TreeConfig, source: Arc<dyn TreeSource>) -> Self {
        Self {
            engine: TreeEngine::new(config),
            executor: Executor::new(source),
            wait: config.request_timeout + WAIT_MARGIN,
            issued: 0,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &TreeEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TreeEngine {
        &mut self.engine
    }

    /// Effects handed to the executor so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn submit(&mut self, effect: Option<Effect>) {
        if let Some(effect) = effect {
            self.issued += 1;
            self.executor.submit(effect);
        }
    }

    /// Apply completions until nothing is outstanding.
    pub fn settle(&mut self) -> Result<()> {
        while self.executor.pending() > 0 {
            let Some(completion) = self.executor.recv_timeout(self.wait) else {
                return Err(CliError::Timeout {
                    pending: self.executor.pending(),
                });
            };
            self.engine.apply(completion);
        }
        Ok(())
    }

    /// Bootstrap and wait for the roots.
    pub fn bootstrap(&mut self) -> Result<()> {
        let effect = self.engine.bootstrap();
        self.submit(effect);
        self.settle()?;
        match self.engine.bootstrap_state() {
            BootstrapState::Failed(error) => Err(CliError::Tree(error.clone())),
            _ => Ok(()),
        }
    }

    /// Expand `id` and wait for its children if they had to be fetched.
    pub fn expand(&mut self, id: &str) -> Result<()> {
        if !self.engine.store().contains(id) {
            return Err(CliError::UnknownNode { id: id.to_string() });
        }
        if self.engine.is_expanded(id) {
            return Ok(());
        }
        let effect = self.engine.toggle_expanded(id);
        self.submit(effect);
        self.settle()
    }
}
