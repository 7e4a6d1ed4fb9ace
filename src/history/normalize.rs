//! History normalization
//!
//! Turns raw backend points into plot-safe records and applies the calendar
//! day window used by the "day" interval. Functions take the time zone
//! explicitly; the dashboard passes [`chrono::Local`].

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::api::HistoryPoint;

/// Offset-less formats accepted besides RFC 3339; interpreted as local time
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a backend timestamp into milliseconds since the epoch
pub fn parse_timestamp_ms<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    NAIVE_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(value, format).ok()?;
        Some(local_to_utc(tz, naive, false).timestamp_millis())
    })
}

/// A calendar day in some time zone, as inclusive epoch-millisecond bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Local midnight
    pub start_ms: i64,
    /// Local 23:59:59.999
    pub end_ms: i64,
}

impl DayWindow {
    /// The local calendar day containing `instant_ms`
    pub fn containing<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> Option<Self> {
        let instant = DateTime::<Utc>::from_timestamp_millis(instant_ms)?;
        let date = instant.with_timezone(tz).date_naive();
        let midnight = date.and_time(NaiveTime::MIN);
        let last_milli = midnight + Duration::milliseconds(86_399_999);

        Some(Self {
            start_ms: local_to_utc(tz, midnight, false).timestamp_millis(),
            end_ms: local_to_utc(tz, last_milli, true).timestamp_millis(),
        })
    }

    pub fn contains(&self, ms: i64) -> bool {
        ms >= self.start_ms && ms <= self.end_ms
    }
}

/// Resolve a local wall-clock time; times skipped by a DST gap are read as UTC
fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, latest: bool) -> DateTime<Utc> {
    let resolved = tz.from_local_datetime(&naive);
    let local = if latest {
        resolved.latest()
    } else {
        resolved.earliest()
    };

    match local {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Keep only points on the calendar day of the latest point.
///
/// The latest point is the last one in backend order. If its timestamp does
/// not parse, nothing is kept.
pub fn filter_to_latest_day<Tz: TimeZone>(points: Vec<HistoryPoint>, tz: &Tz) -> Vec<HistoryPoint> {
    let window = points
        .last()
        .and_then(|latest| parse_timestamp_ms(&latest.measured_at, tz))
        .and_then(|ms| DayWindow::containing(ms, tz));

    let Some(window) = window else {
        return Vec::new();
    };

    points
        .into_iter()
        .filter(|point| {
            parse_timestamp_ms(&point.measured_at, tz)
                .map(|ms| window.contains(ms))
                .unwrap_or(false)
        })
        .collect()
}

/// A history point with a parsed timestamp, ready for plotting
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRecord {
    pub id: String,
    pub measured_at: String,
    pub measured_at_ms: i64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// Convert points into chart records, dropping unparsable timestamps.
///
/// Input order is preserved; the backend already sorts ascending.
pub fn chart_records<Tz: TimeZone>(points: &[HistoryPoint], tz: &Tz) -> Vec<ChartRecord> {
    points
        .iter()
        .filter_map(|point| {
            let measured_at_ms = parse_timestamp_ms(&point.measured_at, tz)?;
            let address = if point.address.is_empty() {
                "device"
            } else {
                point.address.as_str()
            };

            Some(ChartRecord {
                id: format!("{}-{}", address, point.measured_at),
                measured_at: point.measured_at.clone(),
                measured_at_ms,
                temperature_c: point.temperature_c,
                humidity_pct: point.humidity_pct,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn point(measured_at: &str, temperature_c: f64) -> HistoryPoint {
        HistoryPoint::new("AA:BB:CC:DD:EE:01", measured_at, temperature_c, 45.0)
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            parse_timestamp_ms("1970-01-01T00:00:01+00:00", &Utc),
            Some(1000)
        );
        assert_eq!(
            parse_timestamp_ms("1970-01-01T01:00:00.5+01:00", &Utc),
            Some(500)
        );
        assert_eq!(parse_timestamp_ms("", &Utc), None);
        assert_eq!(parse_timestamp_ms("yesterday", &Utc), None);
    }

    #[test]
    fn test_parse_naive_uses_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_timestamp_ms("1970-01-01T02:00:00", &plus_two),
            Some(0)
        );
        assert_eq!(parse_timestamp_ms("1970-01-01 00:00:00", &Utc), Some(0));
    }

    #[test]
    fn test_day_window_bounds() {
        // 2026-02-10T18:00:00Z
        let latest = parse_timestamp_ms("2026-02-10T18:00:00+00:00", &Utc).unwrap();
        let window = DayWindow::containing(latest, &Utc).unwrap();

        assert_eq!(
            Some(window.start_ms),
            parse_timestamp_ms("2026-02-10T00:00:00+00:00", &Utc)
        );
        assert_eq!(
            Some(window.end_ms),
            parse_timestamp_ms("2026-02-10T23:59:59.999+00:00", &Utc)
        );
        assert!(window.contains(latest));
        assert!(!window.contains(window.end_ms + 1));
    }

    #[test]
    fn test_day_window_follows_zone() {
        // 23:30 UTC is already the next day at +02:00
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let latest = parse_timestamp_ms("2026-02-10T23:30:00+00:00", &Utc).unwrap();
        let window = DayWindow::containing(latest, &plus_two).unwrap();

        assert_eq!(
            Some(window.start_ms),
            parse_timestamp_ms("2026-02-11T00:00:00+02:00", &Utc)
        );
    }

    #[test]
    fn test_filter_to_latest_day() {
        let points = vec![
            point("2026-02-09T22:00:00+00:00", 19.0),
            point("not a time", 19.5),
            point("2026-02-10T00:00:00+00:00", 20.0),
            point("2026-02-10T18:00:00+00:00", 22.3),
        ];

        let kept = filter_to_latest_day(points, &Utc);
        let temps: Vec<f64> = kept.iter().map(|p| p.temperature_c).collect();
        assert_eq!(temps, vec![20.0, 22.3]);
    }

    #[test]
    fn test_filter_with_unparsable_latest() {
        let points = vec![point("2026-02-10T06:00:00+00:00", 20.0), point("garbage", 21.0)];
        assert!(filter_to_latest_day(points, &Utc).is_empty());
        assert!(filter_to_latest_day(Vec::new(), &Utc).is_empty());
    }

    #[test]
    fn test_chart_records_drop_unparsable() {
        let mut anonymous = point("2026-02-10T07:00:00+00:00", 21.0);
        anonymous.address.clear();

        let points = vec![
            point("2026-02-10T06:00:00+00:00", 20.0),
            point("", 20.5),
            anonymous,
        ];

        let records = chart_records(&points, &Utc);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "AA:BB:CC:DD:EE:01-2026-02-10T06:00:00+00:00");
        assert_eq!(records[1].id, "device-2026-02-10T07:00:00+00:00");
        assert!(records[0].measured_at_ms < records[1].measured_at_ms);
    }
}
