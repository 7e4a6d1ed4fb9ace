//! Data Transfer Objects
//!
//! Request and response types for the backend endpoints.
//! Decoding is lenient: the backend is an external collaborator and the
//! dashboard coerces missing or malformed fields to empty defaults.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================
// HISTORY DTOs
// ============================================

/// A single (possibly bucketed) temperature/humidity reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Device MAC address
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    /// Device name at measurement time (alias applied by the backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ISO 8601 measurement timestamp
    #[serde(default, deserialize_with = "lenient_string")]
    pub measured_at: String,
    /// Temperature in degrees Celsius
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub temperature_c: f64,
    /// Relative humidity in percent
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub humidity_pct: f64,
}

impl HistoryPoint {
    pub fn new(
        address: impl Into<String>,
        measured_at: impl Into<String>,
        temperature_c: f64,
        humidity_pct: f64,
    ) -> Self {
        Self {
            address: address.into(),
            name: None,
            measured_at: measured_at.into(),
            temperature_c,
            humidity_pct,
        }
    }
}

/// Query parameters for `GET /api/history/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryQuery {
    /// Look-back window; omitted to fetch the most recent `limit` rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    /// Result cap
    pub limit: u32,
    /// Backend aggregation granularity
    pub bucket_minutes: u32,
    /// Restrict to a single device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// ============================================
// DEVICE DTOs
// ============================================

/// A known device and its alias, as returned by `GET /api/devices/`
/// and by the alias `POST`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub alias: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub detected_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Device {
    /// Human-readable name: display name, then detected name, then address
    pub fn label(&self) -> &str {
        [&self.display_name, &self.detected_name]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or(&self.address)
    }
}

/// Alias save request body
#[derive(Debug, Clone, Serialize)]
pub struct AliasRequest {
    pub address: String,
    pub alias: String,
}

// ============================================
// AUTH DTOs
// ============================================

/// Session as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
}

impl AuthSession {
    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn logged_in(username: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            username: username.into(),
        }
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `GET /api/auth/csrf/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsrfResponse {
    #[serde(default, rename = "csrfToken")]
    pub csrf_token: Option<String>,
}

/// Body of `GET /api/health/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================
// LENIENT DECODING
// ============================================

/// Extract `key` from a JSON object as a list of `T`.
///
/// A missing, null or non-array field yields an empty list; elements that do
/// not decode are skipped.
pub fn array_field<T: DeserializeOwned>(body: &Value, key: &str) -> Vec<T> {
    let Some(items) = body.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Skipping undecodable {} entry: {}", key, e);
                None
            }
        })
        .collect()
}

fn nan() -> f64 {
    f64::NAN
}

/// Accept a JSON number or a numeric string; anything else becomes NaN
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

/// Accept a string; null becomes empty, scalars are stringified
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}
