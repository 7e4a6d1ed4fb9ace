//! # Govee Dashboard
//!
//! Terminal dashboard and client library for a Govee temperature/humidity
//! telemetry backend.
//!
//! ## Features
//!
//! - **Polling loaders**: health, history and devices refresh on timers
//! - **Stale response protection**: generation guards drop superseded results
//! - **Charts**: index-based SVG geometry and a time-scaled axis chart
//! - **Device aliases**: buffered alias edits that polling never overwrites
//! - **Sessions**: login/logout with CSRF token handling
//!
//! ## Modules
//!
//! - [`api`]: Backend HTTP client
//! - [`history`]: Interval selection, normalization and the history loader
//! - [`chart`]: Chart geometry, axis domains and SVG output
//! - [`dashboard`]: View shell, text rendering and shell commands
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use govee_dashboard::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let api = Arc::new(ApiClient::new(&config.api)?);
//!
//!     let mut dashboard = Dashboard::new(api, config);
//!     dashboard.mount().await;
//!     dashboard.refresh().await;
//!
//!     println!("{}", render(&dashboard.snapshot().await));
//!
//!     dashboard.unmount();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod devices;
pub mod health;
pub mod history;
pub mod notify;
pub mod poll;

// Re-export top-level types for convenience
pub use api::{
    ApiClient, ApiError, ApiResult, AuthSession, DashboardApi, Device, HistoryPoint, HistoryQuery,
    SharedApi,
};

pub use auth::{ensure_csrf_token, AuthController, LoginOutcome, LogoutOutcome};

pub use chart::{
    build_axis_chart, build_chart, padded_domain, render_svg, AxisChart, ChartError,
    ChartGeometry, PlotPoint, ValueRange, XDomain,
};

pub use config::{ApiConfig, ChartConfig, Config, ConfigError, LoggingConfig, PollingConfig};

pub use dashboard::{render, Command, CommandError, Dashboard, DashboardSnapshot, Section, ViewState};

pub use devices::{DeviceRegistry, DevicesState, SaveStatus, DEVICES_UNREACHABLE};

pub use health::{HealthMonitor, HealthStatus, Indicator};

pub use history::{
    chart_records, filter_to_latest_day, ChartRecord, HistoryInterval, HistoryLoader,
    HistorySelection, HistoryState, HISTORY_UNREACHABLE,
};

pub use notify::Notifier;

pub use poll::{Generation, GenerationGuard, PollHandle, Poller};
