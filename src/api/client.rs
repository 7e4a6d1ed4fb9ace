//! Backend REST API Client
//!
//! HTTP client for the telemetry backend. A single cookie jar is shared by
//! every request so the session cookie and `csrftoken` survive between calls.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{
    array_field, AliasRequest, AuthSession, CsrfResponse, Device, HealthResponse, HistoryPoint,
    HistoryQuery, LoginRequest,
};
use super::error::{ApiError, ApiResult};
use crate::config::ApiConfig;

/// Name of the anti-forgery cookie set by the backend
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header carrying the anti-forgery token on state-changing requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Operations the dashboard needs from the backend
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/health/`
    async fn health(&self) -> ApiResult<HealthResponse>;

    /// `GET /api/history/`
    async fn history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryPoint>>;

    /// `GET /api/devices/`
    async fn devices(&self) -> ApiResult<Vec<Device>>;

    /// `POST /api/devices/`, returns the canonical device row
    async fn save_alias(&self, request: &AliasRequest) -> ApiResult<Device>;

    /// `GET /api/auth/session/`
    async fn session(&self) -> ApiResult<AuthSession>;

    /// Current value of the `csrftoken` cookie, if set
    fn csrf_cookie(&self) -> Option<String>;

    /// `GET /api/auth/csrf/`; also sets the cookie as a side effect
    async fn fetch_csrf(&self) -> ApiResult<CsrfResponse>;

    /// `POST /api/auth/login/`
    async fn login(&self, csrf_token: &str, request: &LoginRequest) -> ApiResult<AuthSession>;

    /// `POST /api/auth/logout/`
    async fn logout(&self, csrf_token: &str) -> ApiResult<()>;
}

/// Backend handle shared by every loader
pub type SharedApi = Arc<dyn DashboardApi>;

/// reqwest-backed implementation of [`DashboardApi`]
pub struct ApiClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
    origin: Url,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let origin =
            Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url,
            origin,
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and fail on transport errors or non-success status
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(ApiError::from_transport)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Backend rejected request");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn json(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = self.send(request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn health(&self) -> ApiResult<HealthResponse> {
        let body = self.json(self.client.get(self.url("/api/health/"))).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryPoint>> {
        let request = self.client.get(self.url("/api/history/")).query(query);
        let body = self.json(request).await?;
        Ok(array_field(&body, "points"))
    }

    async fn devices(&self) -> ApiResult<Vec<Device>> {
        let body = self.json(self.client.get(self.url("/api/devices/"))).await?;
        Ok(array_field(&body, "devices"))
    }

    async fn save_alias(&self, request: &AliasRequest) -> ApiResult<Device> {
        let mut builder = self.client.post(self.url("/api/devices/")).json(request);
        if let Some(token) = self.csrf_cookie() {
            builder = builder.header(CSRF_HEADER, token);
        }
        let body = self.json(builder).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn session(&self) -> ApiResult<AuthSession> {
        let body = self
            .json(self.client.get(self.url("/api/auth/session/")))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    fn csrf_cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let cookies = header.to_str().ok()?;
        read_cookie(cookies, CSRF_COOKIE)
    }

    async fn fetch_csrf(&self) -> ApiResult<CsrfResponse> {
        let body = self
            .json(self.client.get(self.url("/api/auth/csrf/")))
            .await?;
        // A non-object body still counts as a successful token fetch
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    async fn login(&self, csrf_token: &str, request: &LoginRequest) -> ApiResult<AuthSession> {
        let builder = self
            .client
            .post(self.url("/api/auth/login/"))
            .header(CSRF_HEADER, csrf_token)
            .json(request);
        let body = self.json(builder).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn logout(&self, csrf_token: &str) -> ApiResult<()> {
        let builder = self
            .client
            .post(self.url("/api/auth/logout/"))
            .header(CSRF_HEADER, csrf_token);
        self.send(builder).await?;
        Ok(())
    }
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`).
///
/// Empty values count as absent.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
        .filter(|value| !value.is_empty())
}
