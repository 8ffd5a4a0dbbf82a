use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use sharex_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use sharex_core::observability::REQUEST_ID_HEADER;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, index, not_found},
    auth::{login_handler, login_page, logout_handler, register_handler, register_page},
    download::{download_handler, file_page},
    metrics::metrics,
    profile::{delete_file_handler, profile_page},
    upload::upload_handler,
};
use crate::middleware::auth::auth_middleware;
use crate::models::upload::MAX_FILE_SIZE;
use crate::AppState;

/// Room for the multipart framing and text fields on top of the file itself.
const UPLOAD_BODY_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState, session_idle_minutes: i64) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::minutes(session_idle_minutes)));

    let profile_routes = Router::new()
        .route("/profile", get(profile_page))
        .route("/profile/files/:id/delete", post(delete_file_handler))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/register", get(register_page).post(register_handler))
        .route("/logout", post(logout_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(
                MAX_FILE_SIZE as usize + UPLOAD_BODY_OVERHEAD,
            )),
        )
        .route("/file/:id", get(file_page))
        .route("/file/:id/download", post(download_handler))
        .merge(profile_routes)
        .fallback(not_found)
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the span above sees the id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
