//! History
//!
//! Interval selection, normalization of backend points and the polling
//! loader behind the history view.

pub mod interval;
pub mod loader;
pub mod normalize;

pub use interval::HistoryInterval;
pub use loader::{HistoryLoader, HistorySelection, HistoryState, HISTORY_UNREACHABLE};
pub use normalize::{chart_records, filter_to_latest_day, parse_timestamp_ms, ChartRecord, DayWindow};
