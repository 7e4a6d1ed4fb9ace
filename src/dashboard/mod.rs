//! Dashboard
//!
//! The view shell: owns the navigation state and the pollers, composes the
//! loaders, and produces immutable snapshots for rendering.
//!
//! ## Lifecycle
//!
//! - [`Dashboard::mount`] starts the health, devices and history pollers and
//!   loads the session.
//! - Changing the interval or device restarts the history poller; responses
//!   for the previous selection are discarded.
//! - [`Dashboard::unmount`] (or dropping the dashboard) stops every poller.

pub mod command;
pub mod menu;
pub mod render;

pub use command::{Command, CommandError};
pub use menu::Section;
pub use render::{render, render_with_tz, sparkline};

use chrono::Local;
use std::path::Path;

use crate::api::{AuthSession, SharedApi};
use crate::auth::{AuthController, LoginOutcome, LogoutOutcome};
use crate::chart::{build_chart, render_svg, ChartError};
use crate::config::{ChartConfig, Config};
use crate::devices::{DeviceRegistry, DevicesState, SaveStatus};
use crate::health::{HealthMonitor, HealthStatus};
use crate::history::{chart_records, HistoryInterval, HistoryLoader, HistorySelection, HistoryState};
use crate::notify::Notifier;
use crate::poll::PollHandle;

/// Navigation and history selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub section: Section,
    pub interval: HistoryInterval,
    /// Selected device address; empty for all devices
    pub address: String,
}

impl ViewState {
    pub fn selection(&self) -> HistorySelection {
        HistorySelection::new(self.interval, self.address.clone())
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub view: ViewState,
    pub health: HealthStatus,
    pub session: AuthSession,
    pub history: HistoryState,
    pub devices: DevicesState,
    pub message: Option<String>,
    pub chart: ChartConfig,
}

pub struct Dashboard {
    config: Config,
    notifier: Notifier,
    health: HealthMonitor,
    history: HistoryLoader,
    devices: DeviceRegistry,
    auth: AuthController,
    view: ViewState,
    health_poll: Option<PollHandle>,
    devices_poll: Option<PollHandle>,
    history_poll: Option<PollHandle>,
}

impl Dashboard {
    pub fn new(api: SharedApi, config: Config) -> Self {
        let notifier = Notifier::new();

        let view = ViewState {
            section: Section::History,
            interval: HistoryInterval::parse_lenient(&config.history.default_interval),
            address: config.history.default_address.trim().to_string(),
        };

        Self {
            health: HealthMonitor::new(api.clone()),
            history: HistoryLoader::new(api.clone(), config.history.limit),
            devices: DeviceRegistry::new(api.clone(), notifier.clone()),
            auth: AuthController::new(api, notifier.clone()),
            notifier,
            config,
            view,
            health_poll: None,
            devices_poll: None,
            history_poll: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn is_mounted(&self) -> bool {
        self.health_poll.is_some()
    }

    /// Start polling and load the session
    pub async fn mount(&mut self) {
        if self.is_mounted() {
            return;
        }

        let polling = &self.config.polling;
        self.health_poll = Some(self.health.start(polling.health_period()));
        self.devices_poll = Some(self.devices.start(polling.devices_period()));
        self.history_poll = Some(
            self.history
                .start(self.view.selection(), polling.history_period()),
        );

        tracing::info!(interval = %self.view.interval, "Dashboard mounted");

        self.load_session().await;
    }

    /// Stop every poller; late responses are dropped
    pub fn unmount(&mut self) {
        for handle in [
            self.health_poll.take(),
            self.devices_poll.take(),
            self.history_poll.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.stop();
        }
        self.auth.invalidate();
        tracing::info!("Dashboard unmounted");
    }

    /// Re-read the session: logged in leaves the view (login turns into
    /// history), logged out forces the login view
    pub async fn load_session(&mut self) {
        match self.auth.load_session().await {
            Some(true) => {
                if self.view.section == Section::Login {
                    self.view.section = Section::History;
                }
            }
            Some(false) => self.view.section = Section::Login,
            None => {}
        }
    }

    /// Whether `section` is usable with the current session; a refusal is
    /// reported through the notifier
    async fn allows(&self, section: Section) -> bool {
        let logged_in = self.auth.session().await.logged_in;
        if !section.is_enabled(logged_in) {
            tracing::debug!(section = section.key(), "Section disabled");
            self.notifier
                .show(format!("{} requires login", section.label()))
                .await;
            return false;
        }
        true
    }

    /// Navigate to `section`. Returns false when the entry is disabled.
    /// Selecting logout performs the logout.
    pub async fn select_section(&mut self, section: Section) -> bool {
        if !self.allows(section).await {
            return false;
        }

        if section == Section::Logout {
            self.logout().await;
        } else {
            self.view.section = section;
        }
        true
    }

    pub fn set_interval(&mut self, interval: HistoryInterval) {
        if self.view.interval != interval {
            self.view.interval = interval;
            self.restart_history();
        }
    }

    pub fn set_address(&mut self, address: &str) {
        let address = address.trim();
        if self.view.address != address {
            self.view.address = address.to_string();
            self.restart_history();
        }
    }

    fn restart_history(&mut self) {
        if let Some(handle) = self.history_poll.take() {
            handle.stop();
            self.history_poll = Some(self.history.start(
                self.view.selection(),
                self.config.polling.history_period(),
            ));
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        let outcome = self.auth.login(username, password).await;
        if outcome.is_success() {
            self.view.section = Section::History;
        }
        outcome
    }

    pub async fn logout(&mut self) -> LogoutOutcome {
        let outcome = self.auth.logout().await;
        if outcome == LogoutOutcome::LoggedOut {
            self.view.section = Section::Login;
        }
        outcome
    }

    /// Buffer an alias edit. Returns false while the devices entry is
    /// disabled.
    pub async fn set_alias_input(&self, address: &str, alias: &str) -> bool {
        if !self.allows(Section::Devices).await {
            return false;
        }
        self.devices.set_alias_input(address, alias).await;
        true
    }

    /// Submit the buffered alias; `None` while the devices entry is disabled
    pub async fn save_alias(&self, address: &str) -> Option<SaveStatus> {
        if !self.allows(Section::Devices).await {
            return None;
        }
        Some(self.devices.save_alias(address).await)
    }

    /// Fetch everything once, outside the poll schedule
    pub async fn refresh(&self) {
        let selection = self.view.selection();
        futures_util::join!(
            self.health.refresh(),
            self.devices.refresh(),
            self.history.refresh(&selection),
        );
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            view: self.view.clone(),
            health: self.health.status().await,
            session: self.auth.session().await,
            history: self.history.state().await,
            devices: self.devices.state().await,
            message: self.notifier.latest().await,
            chart: self.config.chart,
        }
    }

    /// Current history as an SVG document
    pub async fn history_svg(&self) -> Result<String, ChartError> {
        let state = self.history.state().await;
        let records = chart_records(&state.points, &Local);
        render_svg(&build_chart(&records, &self.config.chart), &self.config.chart)
    }

    /// Write the history chart to `path` and report the result
    pub async fn write_history_svg(&self, path: &Path) -> bool {
        let message = match self.history_svg().await {
            Ok(svg) => match tokio::fs::write(path, svg).await {
                Ok(()) => {
                    self.notifier
                        .show(format!("Chart written to {}", path.display()))
                        .await;
                    return true;
                }
                Err(e) => format!("Failed to write {}: {}", path.display(), e),
            },
            Err(e) => e.to_string(),
        };
        tracing::warn!("{}", message);
        self.notifier.show(message).await;
        false
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.auth.invalidate();
    }
}
