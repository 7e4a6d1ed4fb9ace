//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Poll periods for each data source
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,

    #[serde(default = "default_history_interval")]
    pub history_interval_secs: u64,

    #[serde(default = "default_devices_interval")]
    pub devices_interval_secs: u64,

    /// How often the interactive shell redraws
    #[serde(default = "default_redraw_interval")]
    pub redraw_interval_secs: u64,
}

fn default_health_interval() -> u64 {
    5
}

fn default_history_interval() -> u64 {
    60
}

fn default_devices_interval() -> u64 {
    60
}

fn default_redraw_interval() -> u64 {
    5
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            health_interval_secs: default_health_interval(),
            history_interval_secs: default_history_interval(),
            devices_interval_secs: default_devices_interval(),
            redraw_interval_secs: default_redraw_interval(),
        }
    }
}

impl PollingConfig {
    pub fn health_period(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }

    pub fn history_period(&self) -> Duration {
        Duration::from_secs(self.history_interval_secs.max(1))
    }

    pub fn devices_period(&self) -> Duration {
        Duration::from_secs(self.devices_interval_secs.max(1))
    }

    pub fn redraw_period(&self) -> Duration {
        Duration::from_secs(self.redraw_interval_secs.max(1))
    }
}

/// History loader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Result cap sent with every history request
    #[serde(default = "default_history_limit")]
    pub limit: u32,

    /// Interval selected on startup (day, week, month, year)
    #[serde(default = "default_interval")]
    pub default_interval: String,

    /// Device selected on startup (empty = all devices)
    #[serde(default)]
    pub default_address: String,
}

fn default_history_limit() -> u32 {
    10_000
}

fn default_interval() -> String {
    "day".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
            default_interval: default_interval(),
            default_address: String::new(),
        }
    }
}

/// Plot area used by the raw chart mapper and the SVG renderer
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: f64,

    #[serde(default = "default_chart_height")]
    pub height: f64,

    #[serde(default = "default_chart_padding")]
    pub padding: f64,
}

fn default_chart_width() -> f64 {
    700.0
}

fn default_chart_height() -> f64 {
    240.0
}

fn default_chart_padding() -> f64 {
    16.0
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            padding: default_chart_padding(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Logs go to
    /// stderr so they never interleave with rendered dashboard output.
    pub fn init(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("govee_dashboard={}", self.level)));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if self.format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("govee-dashboard").join("config.toml")),
            Some(PathBuf::from("/etc/govee-dashboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("GOVEE_DASHBOARD_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(limit) = std::env::var("GOVEE_DASHBOARD_HISTORY_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.history.limit = l;
            }
        }

        if let Ok(level) = std::env::var("GOVEE_DASHBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("GOVEE_DASHBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Govee Dashboard Configuration
#
# Environment variables override these settings:
# - GOVEE_DASHBOARD_API_URL
# - GOVEE_DASHBOARD_HISTORY_LIMIT
# - GOVEE_DASHBOARD_LOG_LEVEL
# - GOVEE_DASHBOARD_LOG_FORMAT

[api]
# Backend base URL (the /api/... paths are appended)
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 10

[polling]
# Backend health check period (seconds)
health_interval_secs = 5

# History and device list refresh periods (seconds)
history_interval_secs = 60
devices_interval_secs = 60

# Interactive shell redraw period (seconds)
redraw_interval_secs = 5

[history]
# Maximum number of points requested per refresh
limit = 10000

# Interval shown on startup: day, week, month or year
default_interval = "day"

# Device shown on startup (empty = all devices)
default_address = ""

[chart]
# SVG plot area and padding
width = 700.0
height = 240.0
padding = 16.0

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
