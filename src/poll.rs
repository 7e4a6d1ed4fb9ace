//! Periodic Polling
//!
//! Cancellable periodic tasks plus the validity tokens loaders check before
//! mutating their state.
//!
//! Every tick spawns its fetch as an independent task, so a slow backend
//! call never delays the next cycle. Stopping a poller advances its
//! [`Generation`]; fetches issued before the stop see a stale guard and drop
//! their result instead of writing it.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shared, monotonically increasing validity counter
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation value
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Invalidate every outstanding guard
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Capture the current generation before issuing a request
    pub fn guard(&self) -> GenerationGuard {
        GenerationGuard {
            generation: self.clone(),
            issued: self.current(),
        }
    }
}

/// Snapshot of a [`Generation`] taken when a request was issued
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    generation: Generation,
    issued: u64,
}

impl GenerationGuard {
    /// Whether the owner is still interested in this request's result
    pub fn is_current(&self) -> bool {
        self.generation.current() == self.issued
    }
}

/// Handle to a running poller; stops it on drop
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    generation: Generation,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Poller name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the timer task is still scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Cancel the timer and invalidate in-flight fetches
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            self.generation.advance();
            task.abort();
            tracing::debug!(poller = self.name, "Poller stopped");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns periodic fetch loops
pub struct Poller;

impl Poller {
    /// Run `tick` now and then every `period` until the handle is stopped.
    ///
    /// `generation` is the owner's validity counter; it is advanced when the
    /// handle stops.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        generation: Generation,
        mut tick: F,
    ) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                tracing::trace!(poller = name, "Poll tick");
                tokio::spawn(tick());
            }
        });

        tracing::debug!(poller = name, ?period, "Poller started");

        PollHandle {
            name,
            generation,
            task: Some(task),
        }
    }
}
