//! Raw chart mapper
//!
//! Maps chart records onto a fixed plot area: x by index, y linearly and
//! inverted (higher values sit closer to the top).

use crate::config::ChartConfig;
use crate::history::ChartRecord;

/// Min/max of one measured quantity; zero for an empty series
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over the finite values; empty input yields `0..0`
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if min.is_finite() && max.is_finite() {
            Self { min, max }
        } else {
            Self::default()
        }
    }

    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_flat(&self) -> bool {
        self.min == self.max
    }
}

/// A position inside the plot area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Plot geometry for the temperature and humidity lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartGeometry {
    pub temperature_line: Vec<PlotPoint>,
    pub humidity_line: Vec<PlotPoint>,
    pub temperature: ValueRange,
    pub humidity: ValueRange,
}

impl ChartGeometry {
    /// True when there is nothing to plot
    pub fn is_empty(&self) -> bool {
        self.temperature_line.is_empty() && self.humidity_line.is_empty()
    }

    /// SVG `points` attribute: `x,y x,y ...`
    pub fn polyline(points: &[PlotPoint]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Horizontal position of the `index`-th of `count` points
pub fn x_for_index(index: usize, count: usize, frame: &ChartConfig) -> f64 {
    if count <= 1 {
        return frame.width / 2.0;
    }
    let ratio = index as f64 / (count - 1) as f64;
    frame.padding + ratio * (frame.width - frame.padding * 2.0)
}

/// Vertical position of `value` within `range`; a flat range sits at the middle
pub fn y_for_value(value: f64, range: &ValueRange, frame: &ChartConfig) -> f64 {
    if range.is_flat() {
        return frame.height / 2.0;
    }
    let ratio = (value - range.min) / range.spread();
    frame.height - frame.padding - ratio * (frame.height - frame.padding * 2.0)
}

/// Build plot geometry for `records`. Never mutates its input.
pub fn build_chart(records: &[ChartRecord], frame: &ChartConfig) -> ChartGeometry {
    if records.is_empty() {
        return ChartGeometry::default();
    }

    let temperature = ValueRange::of(records.iter().map(|r| r.temperature_c));
    let humidity = ValueRange::of(records.iter().map(|r| r.humidity_pct));

    ChartGeometry {
        temperature_line: plot_line(records, &temperature, frame, |r| r.temperature_c),
        humidity_line: plot_line(records, &humidity, frame, |r| r.humidity_pct),
        temperature,
        humidity,
    }
}

/// One line of the chart; records with a non-finite value leave a gap
fn plot_line<F>(records: &[ChartRecord], range: &ValueRange, frame: &ChartConfig, value: F) -> Vec<PlotPoint>
where
    F: Fn(&ChartRecord) -> f64,
{
    let count = records.len();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| value(*record).is_finite())
        .map(|(index, record)| PlotPoint {
            x: x_for_index(index, count, frame),
            y: y_for_value(value(record), range, frame),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: i64, temperature_c: f64, humidity_pct: f64) -> ChartRecord {
        ChartRecord {
            id: format!("device-{index}"),
            measured_at: String::new(),
            measured_at_ms: index * 60_000,
            temperature_c,
            humidity_pct,
        }
    }

    #[test]
    fn test_empty_input_is_degenerate() {
        let geometry = build_chart(&[], &ChartConfig::default());
        assert!(geometry.is_empty());
        assert_eq!(geometry.temperature, ValueRange { min: 0.0, max: 0.0 });
        assert_eq!(geometry.humidity, ValueRange { min: 0.0, max: 0.0 });
        assert_eq!(ChartGeometry::polyline(&geometry.temperature_line), "");
    }

    #[test]
    fn test_single_point_is_centered() {
        let frame = ChartConfig::default();
        let geometry = build_chart(&[record(0, 21.0, 40.0)], &frame);

        assert_eq!(geometry.temperature_line.len(), 1);
        assert_eq!(geometry.temperature_line[0].x, 350.0);
        // A single point is also a flat range
        assert_eq!(geometry.temperature_line[0].y, 120.0);
        assert_eq!(geometry.humidity_line[0], PlotPoint { x: 350.0, y: 120.0 });
    }

    #[test]
    fn test_linear_mapping_is_inverted() {
        let frame = ChartConfig::default();
        let records = [record(0, 20.0, 50.0), record(1, 21.0, 45.0), record(2, 22.0, 40.0)];
        let geometry = build_chart(&records, &frame);

        let xs: Vec<f64> = geometry.temperature_line.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![16.0, 350.0, 684.0]);

        let ys: Vec<f64> = geometry.temperature_line.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![224.0, 120.0, 16.0]);

        let ys: Vec<f64> = geometry.humidity_line.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![16.0, 120.0, 224.0]);

        assert_eq!(geometry.temperature, ValueRange { min: 20.0, max: 22.0 });
        assert_eq!(
            ChartGeometry::polyline(&geometry.temperature_line),
            "16,224 350,120 684,16"
        );
    }

    #[test]
    fn test_flat_series_sits_mid_height() {
        let frame = ChartConfig::default();
        let records = [record(0, 21.0, 40.0), record(1, 21.0, 41.0)];
        let geometry = build_chart(&records, &frame);

        assert!(geometry.temperature.is_flat());
        assert!(geometry.temperature_line.iter().all(|p| p.y == 120.0));
        assert!(!geometry.humidity.is_flat());
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let frame = ChartConfig::default();
        let records = [record(0, 20.0, f64::NAN), record(1, 22.0, 41.0)];
        let geometry = build_chart(&records, &frame);

        assert_eq!(geometry.temperature_line.len(), 2);
        assert_eq!(geometry.humidity_line.len(), 1);
        assert_eq!(geometry.humidity_line[0].x, 684.0);
        assert_eq!(geometry.humidity, ValueRange { min: 41.0, max: 41.0 });
    }

    #[test]
    fn test_input_is_not_mutated() {
        let records = vec![record(0, 20.0, 40.0), record(1, 25.0, 45.0)];
        let before = records.clone();
        let _ = build_chart(&records, &ChartConfig::default());
        assert_eq!(records, before);
    }
}
