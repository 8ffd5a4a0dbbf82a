use crate::models::session::BrowserClient;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Pages behind this layer need a logged-in browser session.
pub async fn auth_middleware(client: BrowserClient, request: Request, next: Next) -> Response {
    if !client.context.auth().is_logged_in().await {
        tracing::debug!(client_id = %client.id, path = %request.uri().path(), "Redirecting anonymous session to login");
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}
