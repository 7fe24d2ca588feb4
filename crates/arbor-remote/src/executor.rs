#![forbid(unsafe_code)]

//! Runs engine effects on worker threads.
//!
//! Each submitted [`Effect`] runs on its own thread against the shared
//! source. Workers never touch engine state; they only post a
//! [`Completion`] back over a channel, and the thread that owns the engine
//! drains the channel and calls `apply`.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use arbor_core::{Completion, Effect, TreeSource};

pub struct Executor {
    source: Arc<dyn TreeSource>,
    sender: mpsc::Sender<Completion>,
    receiver: mpsc::Receiver<Completion>,
    pending: usize,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("pending", &self.pending)
            .finish()
    }
}

impl Executor {
    pub fn new(source: Arc<dyn TreeSource>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source,
            sender,
            receiver,
            pending: 0,
        }
    }

    /// Start running `effect` in the background.
    pub fn submit(&mut self, effect: Effect) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let kind = effect.kind();
        tracing::debug!(target: "arbor.remote", kind, pending = self.pending + 1, "effect submitted");

        thread::spawn(move || {
            let completion = effect.run(source.as_ref());
            // The executor may be gone; nothing to deliver to then.
            let _ = sender.send(completion);
        });
        self.pending += 1;
    }

    /// Submit every effect in `effects`.
    pub fn submit_all(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.submit(effect);
        }
    }

    /// Effects submitted but not yet drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Completions that have already arrived, without blocking.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.receiver.try_recv() {
            completions.push(completion);
        }
        self.pending = self.pending.saturating_sub(completions.len());
        completions
    }

    /// Wait up to `timeout` for the next completion.
    ///
    /// Returns `None` on timeout or when nothing is pending.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.receiver.recv_timeout(timeout).ok()?;
        self.pending -= 1;
        Some(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSource;
    use arbor_core::{ChildRequest, NodeId};

    fn child_effect(id: &str, ticket: u64) -> Effect {
        Effect::FetchChildren(ChildRequest {
            node_id: NodeId::new(id),
            depth: 1,
            ticket,
        })
    }

    #[test]
    fn completions_come_back_over_channel() {
        let mut executor = Executor::new(Arc::new(MockSource::new()));
        executor.submit_all([child_effect("a", 1), child_effect("b", 2)]);
        assert_eq!(executor.pending(), 2);

        let mut tickets = Vec::new();
        while let Some(completion) = executor.recv_timeout(Duration::from_secs(5)) {
            let Completion::Children { request, result } = completion else {
                panic!("expected child completion");
            };
            assert_eq!(result.unwrap().len(), 3);
            tickets.push(request.ticket);
        }
        tickets.sort_unstable();
        assert_eq!(tickets, vec![1, 2]);
        assert_eq!(executor.pending(), 0);
    }

    #[test]
    fn nothing_pending_returns_immediately() {
        let mut executor = Executor::new(Arc::new(MockSource::new()));
        assert!(executor.recv_timeout(Duration::from_secs(60)).is_none());
        assert!(executor.drain().is_empty());
    }
}
