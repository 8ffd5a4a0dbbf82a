use crate::services::client_context::ClientContext;
use crate::AppState;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sharex_core::error::AppError;
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

pub const CLIENT_ID_KEY: &str = "client_id";

/// The client context bound to the requesting browser session. Mounted on
/// the session's first request and reused until the session goes idle.
#[derive(Clone)]
pub struct BrowserClient {
    pub id: Uuid,
    pub session: Session,
    pub context: Arc<ClientContext>,
}

#[async_trait]
impl<S> FromRequestParts<S> for BrowserClient
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::SessionError(msg.to_string()))?;

        let stored: Option<Uuid> = session
            .get(CLIENT_ID_KEY)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))?;

        let (id, context) = app_state
            .registry
            .get_or_mount(stored)
            .await
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

        if stored != Some(id) {
            session
                .insert(CLIENT_ID_KEY, id)
                .await
                .map_err(|e| AppError::SessionError(e.to_string()))?;
        }

        Ok(BrowserClient {
            id,
            session,
            context,
        })
    }
}
