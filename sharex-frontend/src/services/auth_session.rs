//! Per-browser-session auth state.
//!
//! `AuthSession` is built once when a browser session first reaches the web
//! client and lives as long as that session. Its own methods are the only
//! writers of the state; pages read snapshots.

use crate::models::User;
use crate::services::api_client::ApiClient;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_logged_in: bool,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_logged_in: false,
            loading: true,
        }
    }
}

/// What a page should render for the current auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthView {
    Loading,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn view(&self) -> AuthView {
        if self.loading {
            return AuthView::Loading;
        }
        match (&self.user, self.is_logged_in) {
            (Some(user), true) => AuthView::Authenticated(user.clone()),
            _ => AuthView::Anonymous,
        }
    }
}

pub struct AuthSession {
    api: Arc<ApiClient>,
    state: RwLock<AuthState>,
}

impl AuthSession {
    /// New session in the `loading` state. Call `refresh_auth` to settle it.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Construct and run the mount-time refresh.
    pub async fn init(api: Arc<ApiClient>) -> Self {
        let session = Self::new(api);
        session.refresh_auth().await;
        session
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.read().await.is_logged_in
    }

    /// Local transition only; call after a successful login/register API call.
    pub async fn login(&self, user: User) {
        tracing::info!(user_id = %user.user_id, username = %user.username, "Session logged in");

        let mut state = self.state.write().await;
        state.user = Some(user);
        state.is_logged_in = true;
    }

    /// Best-effort server logout; local state is cleared regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::error!(error = %e, "Logout error");
        }

        self.clear().await;
    }

    /// Ask the API who we are. Failures of any kind mean "logged out".
    pub async fn refresh_auth(&self) {
        self.state.write().await.loading = true;

        let current = match self.api.profile().await {
            Ok(profile) => Some(User::from(profile)),
            Err(e) => {
                tracing::debug!(error = %e, "Auth refresh found no active session");
                None
            }
        };

        let mut state = self.state.write().await;
        state.is_logged_in = current.is_some();
        state.user = current;
        state.loading = false;
    }

    /// Drop the local user without contacting the API, e.g. after the API
    /// rejected an authenticated call with 401.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.user = None;
        state.is_logged_in = false;
    }
}
