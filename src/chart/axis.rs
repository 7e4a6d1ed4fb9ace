//! Axis chart
//!
//! Time-scaled variant of the history chart: records keyed by timestamp,
//! padded value domains so a flat line never touches the plot edge, and a
//! fixed calendar-day x domain for the "day" interval.

use chrono::{DateTime, TimeZone, Utc};

use super::mapper::ValueRange;
use crate::api::HistoryPoint;
use crate::history::{chart_records, ChartRecord, DayWindow, HistoryInterval};

/// Horizontal extent of the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XDomain {
    /// From the first to the last record
    Data,
    /// Fixed bounds in epoch milliseconds (inclusive)
    Fixed { start_ms: i64, end_ms: i64 },
}

/// Chart-ready records with their axis domains
#[derive(Debug, Clone, PartialEq)]
pub struct AxisChart {
    pub records: Vec<ChartRecord>,
    pub temperature: ValueRange,
    pub humidity: ValueRange,
    pub temperature_domain: (f64, f64),
    pub humidity_domain: (f64, f64),
    pub x_domain: XDomain,
}

impl AxisChart {
    /// Normalize `points` and derive domains for `interval`
    pub fn build<Tz: TimeZone>(points: &[HistoryPoint], interval: HistoryInterval, tz: &Tz) -> Self {
        let records = chart_records(points, tz);

        let temperature = ValueRange::of(records.iter().map(|r| r.temperature_c));
        let humidity = ValueRange::of(records.iter().map(|r| r.humidity_pct));

        let x_domain = match (interval, records.last()) {
            (HistoryInterval::Day, Some(latest)) => DayWindow::containing(latest.measured_at_ms, tz)
                .map(|day| XDomain::Fixed {
                    start_ms: day.start_ms,
                    end_ms: day.end_ms,
                })
                .unwrap_or(XDomain::Data),
            _ => XDomain::Data,
        };

        Self {
            temperature_domain: padded_domain(temperature.min, temperature.max),
            humidity_domain: padded_domain(humidity.min, humidity.max),
            records,
            temperature,
            humidity,
            x_domain,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolved x bounds; `None` for an empty data-driven chart
    pub fn x_bounds(&self) -> Option<(i64, i64)> {
        match self.x_domain {
            XDomain::Fixed { start_ms, end_ms } => Some((start_ms, end_ms)),
            XDomain::Data => {
                let min = self.records.iter().map(|r| r.measured_at_ms).min()?;
                let max = self.records.iter().map(|r| r.measured_at_ms).max()?;
                Some((min, max))
            }
        }
    }
}

/// Shorthand for [`AxisChart::build`]
pub fn build_axis_chart<Tz: TimeZone>(points: &[HistoryPoint], interval: HistoryInterval, tz: &Tz) -> AxisChart {
    AxisChart::build(points, interval, tz)
}

/// Pad a value domain so the line keeps clear of the plot edges.
///
/// Spread is padded by max(8%, 0.2); a flat series by max(5% of its
/// magnitude, 0.5). Non-finite bounds fall back to `0..1`.
pub fn padded_domain(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    if min == max {
        let padding = (min.abs() * 0.05).max(0.5);
        return (min - padding, max + padding);
    }

    let padding = ((max - min) * 0.08).max(0.2);
    (min - padding, max + padding)
}

/// X tick label: time of day for the day view, date and time otherwise
pub fn format_x_tick<Tz: TimeZone>(ms: i64, interval: HistoryInterval, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(instant) = DateTime::<Utc>::from_timestamp_millis(ms) else {
        return String::new();
    };
    let local = instant.with_timezone(tz);

    match interval {
        HistoryInterval::Day => local.format("%H:%M").to_string(),
        _ => local.format("%b %d %H:%M").to_string(),
    }
}

/// Tooltip label for a single record
pub fn format_timestamp<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|instant| instant.with_timezone(tz).format("%b %d %H:%M").to_string())
        .unwrap_or_default()
}

/// Axis value label with one decimal
pub fn format_axis_value(value: f64) -> String {
    format!("{:.1}", value)
}
