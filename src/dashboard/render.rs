//! Text rendering of a dashboard snapshot

use chrono::{Local, TimeZone};
use std::fmt::{Display, Write};

use super::menu::Section;
use super::DashboardSnapshot;
use crate::chart::{build_axis_chart, build_chart, format_axis_value, format_x_tick, PlotPoint};
use crate::config::ChartConfig;

const TITLE: &str = "Govee Dashboard";
const SPARK_WIDTH: usize = 60;
const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render `snapshot` using the local time zone
pub fn render(snapshot: &DashboardSnapshot) -> String {
    render_with_tz(snapshot, &Local)
}

pub fn render_with_tz<Tz: TimeZone>(snapshot: &DashboardSnapshot, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let mut out = String::new();

    render_header(&mut out, snapshot);
    render_menu(&mut out, snapshot);
    out.push('\n');

    match snapshot.view.section {
        Section::History => render_history(&mut out, snapshot, tz),
        Section::Devices => render_devices(&mut out, snapshot),
        Section::Login | Section::Logout => render_login(&mut out, snapshot),
        Section::About => render_about(&mut out),
    }

    if let Some(message) = &snapshot.message {
        let _ = writeln!(out, "\n» {}", message);
    }

    out
}

fn render_header(out: &mut String, snapshot: &DashboardSnapshot) {
    let user = if snapshot.session.logged_in {
        snapshot.session.username.as_str()
    } else {
        "not logged in"
    };

    let _ = writeln!(
        out,
        "{}    Backend: {} ({})    User: {}",
        TITLE,
        snapshot.health,
        snapshot.health.indicator().as_str(),
        user
    );
}

fn render_menu(out: &mut String, snapshot: &DashboardSnapshot) {
    let entries: Vec<String> = Section::ALL
        .iter()
        .map(|section| {
            if *section == snapshot.view.section {
                format!("[{}]", section.label())
            } else if !section.is_enabled(snapshot.session.logged_in) {
                format!("({})", section.label())
            } else {
                section.label().to_string()
            }
        })
        .collect();

    let _ = writeln!(out, "{}", entries.join(" | "));
}

fn render_history<Tz: TimeZone>(out: &mut String, snapshot: &DashboardSnapshot, tz: &Tz)
where
    Tz::Offset: Display,
{
    let view = &snapshot.view;
    let history = &snapshot.history;

    let device = if view.address.is_empty() {
        "all devices".to_string()
    } else {
        snapshot
            .devices
            .device(&view.address)
            .map(|d| d.label().to_string())
            .unwrap_or_else(|| view.address.clone())
    };

    let _ = writeln!(out, "{}", Section::History.label());
    let _ = writeln!(out, "Interval: {}    Device: {}", view.interval.label(), device);

    if history.loading {
        let _ = writeln!(out, "Loading history...");
        return;
    }
    if let Some(error) = &history.error {
        let _ = writeln!(out, "History: {}", error);
        return;
    }
    if history.points.is_empty() {
        let _ = writeln!(out, "No history data yet.");
        return;
    }

    let axis = build_axis_chart(&history.points, view.interval, tz);
    let records = crate::history::chart_records(&history.points, tz);
    let geometry = build_chart(&records, &snapshot.chart);

    let _ = writeln!(out, "Points: {}", history.points.len());

    if let Some((start, end)) = axis.x_bounds() {
        let _ = writeln!(
            out,
            "Window: {} - {}",
            format_x_tick(start, view.interval, tz),
            format_x_tick(end, view.interval, tz)
        );
    }

    let (t_lo, t_hi) = axis.temperature_domain;
    let _ = writeln!(
        out,
        "Temperature (°C, {} .. {})",
        format_axis_value(t_lo),
        format_axis_value(t_hi)
    );
    let _ = writeln!(out, "  {}", sparkline(&geometry.temperature_line, &snapshot.chart, SPARK_WIDTH));

    let (h_lo, h_hi) = axis.humidity_domain;
    let _ = writeln!(
        out,
        "Humidity (%, {} .. {})",
        format_axis_value(h_lo),
        format_axis_value(h_hi)
    );
    let _ = writeln!(out, "  {}", sparkline(&geometry.humidity_line, &snapshot.chart, SPARK_WIDTH));

    let _ = writeln!(
        out,
        "Temp range: {:.1}°C → {:.1}°C",
        geometry.temperature.min, geometry.temperature.max
    );
    let _ = writeln!(
        out,
        "Humidity range: {:.1}% → {:.1}%",
        geometry.humidity.min, geometry.humidity.max
    );
}

fn render_devices(out: &mut String, snapshot: &DashboardSnapshot) {
    let state = &snapshot.devices;
    let _ = writeln!(out, "{}", Section::Devices.label());

    if state.loading {
        let _ = writeln!(out, "Loading devices...");
        return;
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Devices: {}", error);
        return;
    }
    if state.devices.is_empty() {
        let _ = writeln!(out, "No devices yet. Run a read command first.");
        return;
    }

    let _ = writeln!(out, "{:<24} {:<24} {:<10} {}", "Name", "Alias", "Status", "Address");
    for device in &state.devices {
        let status = state
            .save_status
            .get(&device.address)
            .map(|s| s.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<24} {:<24} {:<10} {}",
            device.label(),
            state.alias_input(&device.address),
            status,
            device.address
        );
    }
}

fn render_login(out: &mut String, snapshot: &DashboardSnapshot) {
    let _ = writeln!(out, "{}", Section::Login.label());
    if snapshot.session.logged_in {
        let _ = writeln!(out, "You are logged in as {}.", snapshot.session.username);
    } else {
        let _ = writeln!(out, "Type: login <username> <password>");
    }
}

fn render_about(out: &mut String) {
    let _ = writeln!(out, "{}", Section::About.label());
    let _ = writeln!(out, "Govee dashboard for historical temperature and humidity data.");
    let _ = writeln!(out, "Use the Device Names section to assign human-friendly names.");
}

/// Compress a plotted line into block characters, at most `width` wide
pub fn sparkline(line: &[PlotPoint], frame: &ChartConfig, width: usize) -> String {
    if line.is_empty() || width == 0 {
        return String::new();
    }

    let usable = (frame.height - frame.padding * 2.0).max(f64::EPSILON);
    let count = line.len().min(width);

    (0..count)
        .map(|i| {
            let index = if count == 1 {
                0
            } else {
                i * (line.len() - 1) / (count - 1)
            };
            let level = ((frame.height - frame.padding - line[index].y) / usable).clamp(0.0, 1.0);
            SPARK_BARS[(level * 7.0).round() as usize]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthSession, Device, HistoryPoint};
    use crate::dashboard::ViewState;
    use crate::devices::{DevicesState, SaveStatus};
    use crate::health::HealthStatus;
    use crate::history::{HistoryInterval, HistoryState};
    use chrono::Utc;

    fn snapshot(section: Section) -> DashboardSnapshot {
        DashboardSnapshot {
            view: ViewState {
                section,
                interval: HistoryInterval::Day,
                address: String::new(),
            },
            health: HealthStatus::Reported("ok".into()),
            session: AuthSession::logged_in("alice"),
            history: HistoryState::default(),
            devices: DevicesState::default(),
            message: None,
            chart: ChartConfig::default(),
        }
    }

    fn loaded(points: Vec<HistoryPoint>) -> HistoryState {
        HistoryState {
            loading: false,
            error: None,
            points,
        }
    }

    #[test]
    fn test_header_and_menu() {
        let mut snap = snapshot(Section::About);
        let text = render_with_tz(&snap, &Utc);
        assert!(text.starts_with("Govee Dashboard    Backend: ok (green)    User: alice"));
        assert!(text.contains("Historical Data | Device Names | Login | Logout | [About]"));
        assert!(text.contains("Govee dashboard for historical temperature and humidity data."));

        snap.session = AuthSession::logged_out();
        snap.view.section = Section::Login;
        snap.health = HealthStatus::Unreachable;
        let text = render_with_tz(&snap, &Utc);
        assert!(text.contains("Backend: unreachable (red)"));
        assert!(text.contains("(Historical Data) | (Device Names) | [Login] | (Logout) | (About)"));
        assert!(text.contains("login <username> <password>"));
    }

    #[test]
    fn test_history_states() {
        let mut snap = snapshot(Section::History);
        assert!(render_with_tz(&snap, &Utc).contains("Loading history..."));

        snap.history = HistoryState {
            loading: false,
            error: Some("history-unreachable".into()),
            points: Vec::new(),
        };
        assert!(render_with_tz(&snap, &Utc).contains("History: history-unreachable"));

        snap.history = loaded(Vec::new());
        assert!(render_with_tz(&snap, &Utc).contains("No history data yet."));
    }

    #[test]
    fn test_history_chart_text() {
        let mut snap = snapshot(Section::History);
        snap.history = loaded(vec![
            HistoryPoint::new("AA", "2026-02-10T06:00:00+00:00", 20.0, 50.0),
            HistoryPoint::new("AA", "2026-02-10T12:00:00+00:00", 21.0, 45.0),
            HistoryPoint::new("AA", "2026-02-10T18:00:00+00:00", 22.0, 40.0),
        ]);
        snap.message = Some("Alias saved".into());

        let text = render_with_tz(&snap, &Utc);
        assert!(text.contains("Points: 3"));
        assert!(text.contains("Window: 00:00 - 23:59"));
        assert!(text.contains("Temperature (°C, 19.8 .. 22.2)"));
        assert!(text.contains("  ▁▅█"));
        assert!(text.contains("  █▅▁"));
        assert!(text.contains("Temp range: 20.0°C → 22.0°C"));
        assert!(text.contains("Humidity range: 40.0% → 50.0%"));
        assert!(text.contains("» Alias saved"));
    }

    #[test]
    fn test_devices_table() {
        let mut snap = snapshot(Section::Devices);
        snap.devices.loading = false;
        snap.devices.devices = vec![Device {
            address: "AA".into(),
            alias: "Kitchen".into(),
            detected_name: "GVH5075".into(),
            display_name: String::new(),
            updated_at: None,
        }];
        snap.devices.alias_inputs.insert("AA".into(), "Office".into());
        snap.devices.save_status.insert("AA".into(), SaveStatus::Saving);

        let text = render_with_tz(&snap, &Utc);
        let row = text.lines().find(|l| l.starts_with("GVH5075")).unwrap();
        assert!(row.contains("Office"));
        assert!(row.contains("saving..."));
        assert!(row.ends_with("AA"));

        snap.devices.devices.clear();
        assert!(render_with_tz(&snap, &Utc).contains("No devices yet."));
    }

    #[test]
    fn test_sparkline_sampling() {
        let frame = ChartConfig::default();
        let line: Vec<PlotPoint> = (0..200)
            .map(|i| PlotPoint { x: i as f64, y: 120.0 })
            .collect();

        let spark = sparkline(&line, &frame, 60);
        assert_eq!(spark.chars().count(), 60);
        assert!(spark.chars().all(|c| c == '▅'));
        assert_eq!(sparkline(&[], &frame, 60), "");
    }
}
