//! Backend health polling

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::SharedApi;
use crate::poll::{Generation, GenerationGuard, PollHandle, Poller};

/// Last known backend liveness
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HealthStatus {
    /// No response yet
    #[default]
    Checking,
    /// Status string reported by `GET /api/health/`
    Reported(String),
    /// The request failed
    Unreachable,
}

/// Colour of the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Green,
    Grey,
    Red,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Green => "green",
            Indicator::Grey => "grey",
            Indicator::Red => "red",
        }
    }
}

impl HealthStatus {
    pub fn indicator(&self) -> Indicator {
        match self {
            HealthStatus::Reported(status) if status == "ok" => Indicator::Green,
            HealthStatus::Checking => Indicator::Grey,
            _ => Indicator::Red,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Checking => write!(f, "checking..."),
            HealthStatus::Reported(status) if status.is_empty() => write!(f, "unknown"),
            HealthStatus::Reported(status) => write!(f, "{}", status),
            HealthStatus::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Polls the health endpoint
#[derive(Clone)]
pub struct HealthMonitor {
    api: SharedApi,
    status: Arc<RwLock<HealthStatus>>,
    generation: Generation,
}

impl HealthMonitor {
    pub fn new(api: SharedApi) -> Self {
        Self {
            api,
            status: Arc::new(RwLock::new(HealthStatus::Checking)),
            generation: Generation::new(),
        }
    }

    pub async fn status(&self) -> HealthStatus {
        self.status.read().await.clone()
    }

    /// Query the backend once
    pub async fn refresh(&self) {
        self.refresh_guarded(self.generation.guard()).await;
    }

    async fn refresh_guarded(&self, guard: GenerationGuard) {
        let next = match self.api.health().await {
            Ok(body) => HealthStatus::Reported(body.status.unwrap_or_default()),
            Err(e) => {
                tracing::debug!("Health check failed: {}", e);
                HealthStatus::Unreachable
            }
        };

        let mut status = self.status.write().await;
        if guard.is_current() {
            *status = next;
        }
    }

    pub fn start(&self, period: Duration) -> PollHandle {
        let monitor = self.clone();
        let generation = self.generation.clone();

        Poller::spawn("health", period, self.generation.clone(), move || {
            let guard = generation.guard();
            let monitor = monitor.clone();
            async move { monitor.refresh_guarded(guard).await }
        })
    }
}
