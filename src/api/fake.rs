//! In-memory backend used by loader and controller tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::client::DashboardApi;
use super::dto::{
    AliasRequest, AuthSession, CsrfResponse, Device, HealthResponse, HistoryPoint, HistoryQuery,
    LoginRequest,
};
use super::error::{ApiError, ApiResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

fn unavailable<T>() -> ApiResult<T> {
    Err(ApiError::Unavailable)
}

fn status<T>(code: u16) -> ApiResult<T> {
    Err(ApiError::Status {
        status: code,
        message: String::new(),
    })
}

/// One scripted history response: wait, then answer
pub(crate) struct HistoryReply {
    pub delay: Duration,
    pub points: Option<Vec<HistoryPoint>>,
}

pub(crate) struct FakeApi {
    /// `None` makes the health endpoint unreachable
    pub health: Mutex<Option<String>>,
    /// Default history answer; `None` fails
    pub history: Mutex<Option<Vec<HistoryPoint>>>,
    /// Scripted answers consumed before falling back to `history`
    pub history_script: Mutex<VecDeque<HistoryReply>>,
    pub history_queries: Mutex<Vec<HistoryQuery>>,
    pub devices: Mutex<Option<Vec<Device>>>,
    /// `None` fails the alias POST
    pub alias_reply: Mutex<Option<Device>>,
    /// Wait before answering the alias POST
    pub alias_delay: Mutex<Duration>,
    pub alias_requests: Mutex<Vec<AliasRequest>>,
    /// `None` fails the session endpoint
    pub session: Mutex<Option<AuthSession>>,
    pub cookie: Mutex<Option<String>>,
    /// Cookie value the token endpoint sets as a side effect
    pub cookie_from_endpoint: Mutex<Option<String>>,
    /// `None` fails the token endpoint
    pub csrf_body: Mutex<Option<CsrfResponse>>,
    pub csrf_fetches: AtomicUsize,
    /// 200 accepts the login with `login_username`
    pub login_status: Mutex<u16>,
    pub login_username: Mutex<String>,
    pub login_tokens: Mutex<Vec<String>>,
    pub logout_status: Mutex<u16>,
}

impl FakeApi {
    /// A healthy backend with no data and no session
    pub fn new() -> Self {
        Self {
            health: Mutex::new(Some("ok".to_string())),
            history: Mutex::new(Some(Vec::new())),
            history_script: Mutex::new(VecDeque::new()),
            history_queries: Mutex::new(Vec::new()),
            devices: Mutex::new(Some(Vec::new())),
            alias_reply: Mutex::new(None),
            alias_delay: Mutex::new(Duration::ZERO),
            alias_requests: Mutex::new(Vec::new()),
            session: Mutex::new(Some(AuthSession::logged_out())),
            cookie: Mutex::new(None),
            cookie_from_endpoint: Mutex::new(Some("cookie-token".to_string())),
            csrf_body: Mutex::new(Some(CsrfResponse {
                csrf_token: Some("body-token".to_string()),
            })),
            csrf_fetches: AtomicUsize::new(0),
            login_status: Mutex::new(200),
            login_username: Mutex::new(String::new()),
            login_tokens: Mutex::new(Vec::new()),
            logout_status: Mutex::new(200),
        }
    }

    pub fn set<T>(field: &Mutex<T>, value: T) {
        *lock(field) = value;
    }

    pub fn history_calls(&self) -> usize {
        lock(&self.history_queries).len()
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn health(&self) -> ApiResult<HealthResponse> {
        match lock(&self.health).clone() {
            Some(status) => Ok(HealthResponse {
                status: Some(status),
            }),
            None => unavailable(),
        }
    }

    async fn history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryPoint>> {
        lock(&self.history_queries).push(query.clone());
        let scripted = lock(&self.history_script).pop_front();
        let (delay, points) = match scripted {
            Some(reply) => (reply.delay, reply.points),
            None => (Duration::ZERO, lock(&self.history).clone()),
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        points.map_or_else(unavailable, Ok)
    }

    async fn devices(&self) -> ApiResult<Vec<Device>> {
        lock(&self.devices).clone().map_or_else(unavailable, Ok)
    }

    async fn save_alias(&self, request: &AliasRequest) -> ApiResult<Device> {
        lock(&self.alias_requests).push(request.clone());
        let delay = *lock(&self.alias_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        lock(&self.alias_reply).clone().map_or_else(unavailable, Ok)
    }

    async fn session(&self) -> ApiResult<AuthSession> {
        lock(&self.session).clone().map_or_else(unavailable, Ok)
    }

    fn csrf_cookie(&self) -> Option<String> {
        lock(&self.cookie).clone()
    }

    async fn fetch_csrf(&self) -> ApiResult<CsrfResponse> {
        self.csrf_fetches.fetch_add(1, Ordering::SeqCst);
        let body = lock(&self.csrf_body).clone();
        match body {
            Some(body) => {
                let set_cookie = lock(&self.cookie_from_endpoint).clone();
                if set_cookie.is_some() {
                    *lock(&self.cookie) = set_cookie;
                }
                Ok(body)
            }
            None => status(500),
        }
    }

    async fn login(&self, csrf_token: &str, _request: &LoginRequest) -> ApiResult<AuthSession> {
        lock(&self.login_tokens).push(csrf_token.to_string());
        let code = *lock(&self.login_status);
        if code == 200 {
            let username = lock(&self.login_username).clone();
            Ok(AuthSession {
                logged_in: true,
                username,
            })
        } else {
            status(code)
        }
    }

    async fn logout(&self, _csrf_token: &str) -> ApiResult<()> {
        let code = *lock(&self.logout_status);
        if code == 200 {
            Ok(())
        } else {
            status(code)
        }
    }
}
