//! History data loader
//!
//! Polls `GET /api/history/` for the selected interval and device and keeps
//! the latest result as `{loading, error, points}`.

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::interval::HistoryInterval;
use super::normalize::filter_to_latest_day;
use crate::api::{ApiResult, HistoryPoint, SharedApi};
use crate::poll::{Generation, GenerationGuard, PollHandle, Poller};

/// Error flag shown when the history endpoint fails
pub const HISTORY_UNREACHABLE: &str = "history-unreachable";

/// Loader state exposed to the view
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    pub loading: bool,
    pub error: Option<String>,
    pub points: Vec<HistoryPoint>,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            points: Vec::new(),
        }
    }
}

impl HistoryState {
    fn loaded(points: Vec<HistoryPoint>) -> Self {
        Self {
            loading: false,
            error: None,
            points,
        }
    }

    fn unreachable() -> Self {
        Self {
            loading: false,
            error: Some(HISTORY_UNREACHABLE.to_string()),
            points: Vec::new(),
        }
    }
}

/// Interval and device the history view is showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySelection {
    pub interval: HistoryInterval,
    /// Device address; empty means all devices
    pub address: String,
}

impl HistorySelection {
    pub fn new(interval: HistoryInterval, address: impl Into<String>) -> Self {
        Self {
            interval,
            address: address.into(),
        }
    }
}

/// Polling loader for history points
#[derive(Clone)]
pub struct HistoryLoader {
    api: SharedApi,
    limit: u32,
    state: Arc<RwLock<HistoryState>>,
    generation: Generation,
}

impl HistoryLoader {
    pub fn new(api: SharedApi, limit: u32) -> Self {
        Self {
            api,
            limit,
            state: Arc::new(RwLock::new(HistoryState::default())),
            generation: Generation::new(),
        }
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> HistoryState {
        self.state.read().await.clone()
    }

    /// Fetch and normalize points for `selection` without touching state
    pub async fn fetch(&self, selection: &HistorySelection) -> ApiResult<Vec<HistoryPoint>> {
        let query = selection.interval.query(self.limit, &selection.address);
        let points = self.api.history(&query).await?;

        Ok(match selection.interval {
            HistoryInterval::Day => filter_to_latest_day(points, &Local),
            _ => points,
        })
    }

    /// Fetch once and store the result
    pub async fn refresh(&self, selection: &HistorySelection) {
        self.refresh_guarded(selection, self.generation.guard()).await;
    }

    async fn refresh_guarded(&self, selection: &HistorySelection, guard: GenerationGuard) {
        let result = self.fetch(selection).await;

        let mut state = self.state.write().await;
        if !guard.is_current() {
            tracing::debug!(
                interval = %selection.interval,
                address = %selection.address,
                "Discarding superseded history response"
            );
            return;
        }

        let next = match result {
            Ok(points) => {
                tracing::debug!(count = points.len(), interval = %selection.interval, "History loaded");
                HistoryState::loaded(points)
            }
            Err(e) => {
                tracing::warn!("History request failed: {}", e);
                HistoryState::unreachable()
            }
        };

        *state = next;
    }

    /// Poll `selection` every `period`.
    ///
    /// Stopping the returned handle discards responses still in flight, so a
    /// new selection can never be overwritten by an older one.
    pub fn start(&self, selection: HistorySelection, period: Duration) -> PollHandle {
        let loader = self.clone();
        let generation = self.generation.clone();

        Poller::spawn("history", period, self.generation.clone(), move || {
            let guard = generation.guard();
            let loader = loader.clone();
            let selection = selection.clone();
            async move { loader.refresh_guarded(&selection, guard).await }
        })
    }
}
