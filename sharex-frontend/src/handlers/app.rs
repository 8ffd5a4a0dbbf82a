use crate::handlers::upload::{IndexTemplate, UploadView};
use crate::handlers::Nav;
use crate::models::session::BrowserClient;
use askama::Template;
use axum::{http::StatusCode, response::IntoResponse};

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub nav: Nav,
}

pub async fn index(client: BrowserClient) -> impl IntoResponse {
    IndexTemplate {
        nav: Nav::of(&client).await,
        form: UploadView::new(),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn not_found(client: BrowserClient) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            nav: Nav::of(&client).await,
        },
    )
}
