//! Govee Dashboard
//!
//! Interactive terminal dashboard. Polls the backend in the background,
//! redraws periodically and reads shell commands from stdin.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use govee_dashboard::dashboard::command::HELP;
use govee_dashboard::*;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser)]
#[command(name = "govee-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal dashboard for Govee temperature and humidity history")]
struct Args {
    /// Config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend URL (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Initial history interval
    #[arg(short, long)]
    interval: Option<HistoryInterval>,

    /// Render a single frame and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    config.logging.init();

    tracing::info!("Govee Dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend: {}", config.api.base_url);

    let api: SharedApi = Arc::new(ApiClient::new(&config.api)?);
    let redraw_period = config.polling.redraw_period();

    let mut dashboard = Dashboard::new(api, config);
    if let Some(interval) = args.interval {
        dashboard.set_interval(interval);
    }

    if args.once {
        dashboard.load_session().await;
        dashboard.refresh().await;
        print!("{}", render(&dashboard.snapshot().await));
        return Ok(());
    }

    dashboard.mount().await;

    let mut messages = dashboard.notifier().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = tokio::time::interval(redraw_period);
    // Help text and parse errors stay visible until the next input line
    let mut held = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                held = false;
                if line.trim().is_empty() {
                    draw(&dashboard).await;
                    continue;
                }

                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) if command.holds_screen() => {
                        draw(&dashboard).await;
                        execute(&mut dashboard, command).await;
                        held = true;
                    }
                    Ok(command) => {
                        execute(&mut dashboard, command).await;
                        draw(&dashboard).await;
                    }
                    Err(e) => {
                        draw(&dashboard).await;
                        println!("{}", e);
                        held = true;
                    }
                }
            }
            _ = redraw.tick() => {
                if !held {
                    draw(&dashboard).await;
                }
            }
            message = messages.recv() => match message {
                Ok(_) if held => {}
                Ok(_) => draw(&dashboard).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Notifications dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!("Shutting down...");
    dashboard.unmount();
    Ok(())
}

async fn draw(dashboard: &Dashboard) {
    print!("{}{}", CLEAR_SCREEN, render(&dashboard.snapshot().await));
    println!("\nType 'help' for commands.");
}

/// Run one shell command. Feedback goes through the notifier and shows up
/// as the message line of the next frame.
async fn execute(dashboard: &mut Dashboard, command: Command) {
    match command {
        Command::Help => println!("\n{}", HELP),
        Command::Show(section) => {
            dashboard.select_section(section).await;
        }
        Command::Interval(interval) => dashboard.set_interval(interval),
        Command::Device(address) => dashboard.set_address(address.as_deref().unwrap_or("")),
        Command::Alias { address, alias } => {
            if dashboard.set_alias_input(&address, &alias).await {
                dashboard.save_alias(&address).await;
            }
        }
        Command::Login { username, password } => {
            dashboard.login(&username, &password).await;
        }
        Command::Logout => {
            dashboard.select_section(Section::Logout).await;
        }
        Command::Svg(path) => {
            dashboard.write_history_svg(&path).await;
        }
        Command::Refresh => dashboard.refresh().await,
        Command::Quit => {}
    }
}
