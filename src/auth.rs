//! Session and authentication
//!
//! Keeps a local copy of the backend session and performs login/logout.
//! State-changing requests need a CSRF token, which is taken from the
//! `csrftoken` cookie when present; otherwise the token endpoint is asked to
//! issue one (setting the cookie) and its body token is the last resort.
//!
//! The controller reports outcomes; moving between views is up to the caller.

use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{ApiError, ApiResult, AuthSession, DashboardApi, LoginRequest, SharedApi};
use crate::notify::Notifier;
use crate::poll::Generation;

/// Obtain a CSRF token: cookie, then the token endpoint's cookie, then its body
pub async fn ensure_csrf_token(api: &dyn DashboardApi) -> ApiResult<String> {
    if let Some(token) = api.csrf_cookie() {
        return Ok(token);
    }

    let body = api.fetch_csrf().await?;

    if let Some(token) = api.csrf_cookie() {
        return Ok(token);
    }

    match body.csrf_token.filter(|t| !t.is_empty()) {
        Some(token) => {
            tracing::debug!("Using CSRF token from response body");
            Ok(token)
        }
        None => Err(ApiError::MissingCsrfToken),
    }
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(String),
    MissingCredentials,
    InvalidCredentials,
    Failed,
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::LoggedIn(_))
    }
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginOutcome::LoggedIn(name) => write!(f, "Logged in as {}", name),
            LoginOutcome::MissingCredentials => write!(f, "Enter username and password"),
            LoginOutcome::InvalidCredentials => write!(f, "Invalid username or password"),
            LoginOutcome::Failed => write!(f, "Login failed"),
        }
    }
}

/// Result of a logout attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    Failed,
}

impl fmt::Display for LogoutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutOutcome::LoggedOut => write!(f, "Logged out"),
            LogoutOutcome::Failed => write!(f, "Logout failed"),
        }
    }
}

#[derive(Clone)]
pub struct AuthController {
    api: SharedApi,
    notifier: Notifier,
    session: Arc<RwLock<AuthSession>>,
    generation: Generation,
}

impl AuthController {
    pub fn new(api: SharedApi, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            session: Arc::new(RwLock::new(AuthSession::logged_out())),
            generation: Generation::new(),
        }
    }

    pub async fn session(&self) -> AuthSession {
        self.session.read().await.clone()
    }

    /// Drop the result of a session load still in flight
    pub fn invalidate(&self) {
        self.generation.advance();
    }

    /// Fetch the backend session. Returns whether the user is logged in;
    /// `None` if the result arrived after [`invalidate`](Self::invalidate).
    pub async fn load_session(&self) -> Option<bool> {
        let guard = self.generation.guard();
        let result = self.api.session().await;

        if !guard.is_current() {
            return None;
        }

        let session = match result {
            Ok(session) if session.logged_in => AuthSession::logged_in(session.username),
            Ok(_) => AuthSession::logged_out(),
            Err(e) => {
                tracing::warn!("Session request failed: {}", e);
                AuthSession::logged_out()
            }
        };

        let logged_in = session.logged_in;
        *self.session.write().await = session;
        Some(logged_in)
    }

    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        let username = username.trim();

        let outcome = if username.is_empty() || password.is_empty() {
            LoginOutcome::MissingCredentials
        } else {
            match self.try_login(username, password).await {
                Ok(session) => {
                    let name = if session.username.is_empty() {
                        username.to_string()
                    } else {
                        session.username.clone()
                    };
                    *self.session.write().await = session;
                    LoginOutcome::LoggedIn(name)
                }
                Err(e) if e.is_unauthorized() => LoginOutcome::InvalidCredentials,
                Err(e) => {
                    tracing::warn!("Login failed: {}", e);
                    LoginOutcome::Failed
                }
            }
        };

        self.notifier.show(outcome.to_string()).await;
        outcome
    }

    async fn try_login(&self, username: &str, password: &str) -> ApiResult<AuthSession> {
        let token = ensure_csrf_token(self.api.as_ref()).await?;
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.api.login(&token, &request).await
    }

    /// Log out; the local session is only cleared when the backend agrees
    pub async fn logout(&self) -> LogoutOutcome {
        let result = async {
            let token = ensure_csrf_token(self.api.as_ref()).await?;
            self.api.logout(&token).await
        }
        .await;

        let outcome = match result {
            Ok(()) => {
                *self.session.write().await = AuthSession::logged_out();
                LogoutOutcome::LoggedOut
            }
            Err(e) => {
                tracing::warn!("Logout failed: {}", e);
                LogoutOutcome::Failed
            }
        };

        self.notifier.show(outcome.to_string()).await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::api::CsrfResponse;
    use std::sync::atomic::Ordering;

    fn controller(api: &Arc<FakeApi>) -> (AuthController, Notifier) {
        let notifier = Notifier::new();
        (AuthController::new(api.clone(), notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn test_csrf_prefers_existing_cookie() {
        let api = FakeApi::new();
        FakeApi::set(&api.cookie, Some("existing".to_string()));

        assert_eq!(ensure_csrf_token(&api).await.unwrap(), "existing");
        assert_eq!(api.csrf_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_csrf_reads_cookie_set_by_endpoint() {
        let api = FakeApi::new();

        assert_eq!(ensure_csrf_token(&api).await.unwrap(), "cookie-token");
        assert_eq!(api.csrf_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_csrf_falls_back_to_body() {
        let api = FakeApi::new();
        FakeApi::set(&api.cookie_from_endpoint, None);

        assert_eq!(ensure_csrf_token(&api).await.unwrap(), "body-token");
    }

    #[tokio::test]
    async fn test_csrf_missing_everywhere() {
        let api = FakeApi::new();
        FakeApi::set(&api.cookie_from_endpoint, None);
        FakeApi::set(&api.csrf_body, Some(CsrfResponse::default()));

        assert!(matches!(
            ensure_csrf_token(&api).await,
            Err(ApiError::MissingCsrfToken)
        ));
    }

    #[tokio::test]
    async fn test_load_session() {
        let api = Arc::new(FakeApi::new());
        let (auth, _) = controller(&api);

        assert_eq!(auth.load_session().await, Some(false));

        FakeApi::set(&api.session, Some(AuthSession::logged_in("alice")));
        assert_eq!(auth.load_session().await, Some(true));
        assert_eq!(auth.session().await, AuthSession::logged_in("alice"));

        FakeApi::set(&api.session, None);
        assert_eq!(auth.load_session().await, Some(false));
        assert_eq!(auth.session().await, AuthSession::logged_out());
    }

    #[tokio::test]
    async fn test_login_success() {
        let api = Arc::new(FakeApi::new());
        FakeApi::set(&api.login_username, "alice".to_string());
        let (auth, notifier) = controller(&api);

        let outcome = auth.login("  alice ", "secret").await;
        assert_eq!(outcome, LoginOutcome::LoggedIn("alice".to_string()));
        assert_eq!(notifier.latest().await.as_deref(), Some("Logged in as alice"));
        assert!(auth.session().await.logged_in);
        assert_eq!(api.login_tokens.lock().unwrap().clone(), vec!["cookie-token"]);
    }

    #[tokio::test]
    async fn test_login_name_falls_back_to_submitted() {
        let api = Arc::new(FakeApi::new());
        let (auth, _) = controller(&api);

        assert_eq!(
            auth.login("bob", "pw").await,
            LoginOutcome::LoggedIn("bob".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_rejections() {
        let api = Arc::new(FakeApi::new());
        let (auth, notifier) = controller(&api);

        assert_eq!(auth.login("   ", "pw").await, LoginOutcome::MissingCredentials);
        assert_eq!(auth.login("alice", "").await, LoginOutcome::MissingCredentials);
        assert!(api.login_tokens.lock().unwrap().is_empty());

        FakeApi::set(&api.login_status, 401);
        assert_eq!(auth.login("alice", "bad").await, LoginOutcome::InvalidCredentials);
        assert_eq!(
            notifier.latest().await.as_deref(),
            Some("Invalid username or password")
        );

        FakeApi::set(&api.login_status, 500);
        assert_eq!(auth.login("alice", "pw").await, LoginOutcome::Failed);
        assert!(!auth.session().await.logged_in);
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let api = Arc::new(FakeApi::new());
        FakeApi::set(&api.csrf_body, None);
        let (auth, _) = controller(&api);

        assert_eq!(auth.login("alice", "pw").await, LoginOutcome::Failed);
    }

    #[tokio::test]
    async fn test_logout() {
        let api = Arc::new(FakeApi::new());
        FakeApi::set(&api.session, Some(AuthSession::logged_in("alice")));
        let (auth, notifier) = controller(&api);
        auth.load_session().await;

        FakeApi::set(&api.logout_status, 500);
        assert_eq!(auth.logout().await, LogoutOutcome::Failed);
        assert_eq!(notifier.latest().await.as_deref(), Some("Logout failed"));
        assert_eq!(auth.session().await, AuthSession::logged_in("alice"));

        FakeApi::set(&api.logout_status, 200);
        assert_eq!(auth.logout().await, LogoutOutcome::LoggedOut);
        assert_eq!(notifier.latest().await.as_deref(), Some("Logged out"));
        assert_eq!(auth.session().await, AuthSession::logged_out());
    }
}
