//! Govee CLI
//!
//! One-shot commands against the telemetry backend:
//! - Check backend health
//! - Print history and write the chart as SVG
//! - List devices and save aliases

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use govee_dashboard::api::AliasRequest;
use govee_dashboard::config::generate_default_config;
use govee_dashboard::history::HistorySelection;
use govee_dashboard::*;

#[derive(Parser)]
#[command(name = "govee-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query a Govee telemetry backend from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show backend health
    Health,

    /// Print sensor history
    History {
        /// day, week, month or year (default: from config)
        #[arg(short, long)]
        interval: Option<HistoryInterval>,
        /// Device address (default: all devices)
        #[arg(short, long)]
        address: Option<String>,
        /// Also write the chart as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// List known devices
    Devices,

    /// Save a device alias
    Alias {
        /// Device address
        address: String,
        /// New alias (empty clears it)
        alias: Vec<String>,
        /// Log in first
        #[arg(short, long, requires = "password")]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    config.logging.init();

    match cli.command {
        Commands::Config { output } => {
            write_output(output.as_ref(), &generate_default_config())?;
        }

        Commands::Health => match connect(&config)?.health().await {
            Ok(body) => {
                let status = HealthStatus::Reported(body.status.unwrap_or_default());
                println!("Backend {}: {}", config.api.base_url, status);
            }
            Err(e) => {
                eprintln!("Cannot reach backend at {}", config.api.base_url);
                bail!(e);
            }
        },

        Commands::History {
            interval,
            address,
            svg,
        } => {
            let interval = interval
                .unwrap_or_else(|| HistoryInterval::parse_lenient(&config.history.default_interval));
            let address = address.unwrap_or_else(|| config.history.default_address.clone());
            let selection = HistorySelection::new(interval, address);

            let loader = HistoryLoader::new(connect(&config)?, config.history.limit);
            let points = loader
                .fetch(&selection)
                .await
                .context(HISTORY_UNREACHABLE)?;

            print!("{}", history_table(&points));

            if let Some(path) = svg {
                let records = chart_records(&points, &chrono::Local);
                let geometry = build_chart(&records, &config.chart);
                std::fs::write(&path, render_svg(&geometry, &config.chart)?)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                eprintln!("Chart written to {:?}", path);
            }
        }

        Commands::Devices => {
            let devices = connect(&config)?.devices().await.context(DEVICES_UNREACHABLE)?;

            if devices.is_empty() {
                println!("No devices yet. Run a read command first.");
            } else {
                println!("{:<20} {:<24} {:<24} {}", "Address", "Name", "Alias", "Updated");
                println!("{}", "-".repeat(90));
                for device in devices {
                    println!(
                        "{:<20} {:<24} {:<24} {}",
                        device.address,
                        device.label(),
                        device.alias,
                        device.updated_at.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Alias {
            address,
            alias,
            username,
            password,
        } => {
            let api = connect(&config)?;
            if let (Some(username), Some(password)) = (username, password) {
                let auth = AuthController::new(api.clone(), Notifier::new());
                let outcome = auth.login(&username, &password).await;
                if !outcome.is_success() {
                    bail!("{}", outcome);
                }
                eprintln!("{}", outcome);
            }

            let request = AliasRequest {
                address,
                alias: alias.join(" ").trim().to_string(),
            };
            let device = api
                .save_alias(&request)
                .await
                .context("Alias save failed")?;
            println!("Alias saved: {} -> {}", device.address, device.label());
        }
    }

    Ok(())
}

fn connect(config: &Config) -> anyhow::Result<SharedApi> {
    Ok(Arc::new(ApiClient::new(&config.api)?))
}

fn history_table(points: &[HistoryPoint]) -> String {
    if points.is_empty() {
        return "No history data yet.\n".to_string();
    }

    let mut out = format!(
        "{:<28} {:<20} {:>10} {:>10}\n{}\n",
        "Measured at",
        "Address",
        "Temp (°C)",
        "Hum (%)",
        "-".repeat(71)
    );
    for point in points {
        out.push_str(&format!(
            "{:<28} {:<20} {:>10.1} {:>10.1}\n",
            point.measured_at, point.address, point.temperature_c, point.humidity_pct
        ));
    }
    out.push_str(&format!("\nPoints: {}\n", points.len()));
    out
}

fn write_output(path: Option<&PathBuf>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Written to {:?}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}
