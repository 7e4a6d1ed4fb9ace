//! History interval selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::HistoryQuery;

/// Time window shown by the history view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryInterval {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl HistoryInterval {
    pub const ALL: [HistoryInterval; 4] = [
        HistoryInterval::Day,
        HistoryInterval::Week,
        HistoryInterval::Month,
        HistoryInterval::Year,
    ];

    /// Look-back window in hours
    pub fn hours(&self) -> u32 {
        match self {
            HistoryInterval::Day => 24,
            HistoryInterval::Week => 24 * 7,
            HistoryInterval::Month => 24 * 30,
            HistoryInterval::Year => 24 * 365,
        }
    }

    /// Backend aggregation granularity; longer windows get coarser buckets
    pub fn bucket_minutes(&self) -> u32 {
        match self {
            HistoryInterval::Day => 5,
            HistoryInterval::Week => 30,
            HistoryInterval::Month => 120,
            HistoryInterval::Year => 720,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryInterval::Day => "day",
            HistoryInterval::Week => "week",
            HistoryInterval::Month => "month",
            HistoryInterval::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HistoryInterval::Day => "Days",
            HistoryInterval::Week => "Weeks",
            HistoryInterval::Month => "Months",
            HistoryInterval::Year => "Years",
        }
    }

    /// Parse a user or config value, falling back to [`HistoryInterval::Day`]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::debug!("Unknown history interval {:?}, using day", value);
            HistoryInterval::Day
        })
    }

    /// Build the backend query for this interval.
    ///
    /// Day omits `hours`: the loader fetches the most recent `limit` rows and
    /// keeps the calendar day of the latest one, because the backend windows
    /// by elapsed hours rather than by calendar boundaries.
    pub fn query(&self, limit: u32, address: &str) -> HistoryQuery {
        let address = address.trim();
        HistoryQuery {
            hours: match self {
                HistoryInterval::Day => None,
                other => Some(other.hours()),
            },
            limit,
            bucket_minutes: self.bucket_minutes(),
            address: (!address.is_empty()).then(|| address.to_string()),
        }
    }
}

impl fmt::Display for HistoryInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" | "d" => Ok(HistoryInterval::Day),
            "week" | "weeks" | "w" => Ok(HistoryInterval::Week),
            "month" | "months" | "m" => Ok(HistoryInterval::Month),
            "year" | "years" | "y" => Ok(HistoryInterval::Year),
            other => Err(format!(
                "unknown interval '{}' (expected day, week, month or year)",
                other
            )),
        }
    }
}
