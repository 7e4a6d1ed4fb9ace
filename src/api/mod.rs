//! Backend API
//!
//! Client side of the telemetry backend's HTTP API.
//!
//! # Endpoints
//!
//! - `GET /api/health/` - Liveness status
//! - `GET /api/history/?hours&limit&bucket_minutes&address` - Sensor history
//! - `GET /api/devices/` - Known devices and aliases
//! - `POST /api/devices/` - Save an alias
//! - `GET /api/auth/session/` - Current session
//! - `GET /api/auth/csrf/` - Issue a CSRF cookie/token
//! - `POST /api/auth/login/` - Log in (`X-CSRFToken` header)
//! - `POST /api/auth/logout/` - Log out (`X-CSRFToken` header)

pub mod client;
pub mod dto;
pub mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{read_cookie, ApiClient, DashboardApi, SharedApi, CSRF_COOKIE, CSRF_HEADER};
pub use dto::{
    AliasRequest, AuthSession, CsrfResponse, Device, HealthResponse, HistoryPoint, HistoryQuery,
    LoginRequest,
};
pub use error::{ApiError, ApiResult};
