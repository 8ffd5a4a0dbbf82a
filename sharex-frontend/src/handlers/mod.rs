pub mod app;
pub mod auth;
pub mod download;
pub mod metrics;
pub mod profile;
pub mod upload;

use crate::models::session::BrowserClient;
use crate::services::auth_session::AuthView;

/// Header navigation shared by every page.
pub struct Nav {
    pub username: Option<String>,
}

impl Nav {
    pub async fn of(client: &BrowserClient) -> Self {
        let username = match client.context.auth().state().await.view() {
            AuthView::Authenticated(user) => Some(user.username),
            AuthView::Loading | AuthView::Anonymous => None,
        };
        Self { username }
    }

    pub fn anonymous() -> Self {
        Self { username: None }
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }
}
