use crate::handlers::Nav;
use crate::models::download::{DownloadFailure, DownloadPage, ReadyPage};
use crate::models::session::BrowserClient;
use crate::models::upload::share_url;
use crate::utils::content_disposition::attachment_header;
use crate::utils::format::{format_date, format_date_time, format_file_size};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "file.html")]
pub struct FileTemplate {
    pub nav: Nav,
    pub file: FileView,
}

#[derive(Template)]
#[template(path = "file_not_found.html")]
pub struct FileNotFoundTemplate {
    pub nav: Nav,
}

/// File page values, formatted for display.
pub struct FileView {
    pub download_action: String,
    pub file_name: String,
    pub size: String,
    pub is_protected: bool,
    pub needs_password: bool,
    pub downloads: String,
    pub expires: Option<String>,
    pub uploaded: Option<String>,
    pub error: Option<String>,
    pub terminal: bool,
    pub share_url: String,
}

impl FileView {
    fn new(page: &ReadyPage, public_url: &str) -> Self {
        let metadata = &page.metadata;
        let downloads = match metadata.download_limit {
            Some(limit) => format!("{} / {}", metadata.download_count, limit),
            None => metadata.download_count.to_string(),
        };

        Self {
            download_action: format!("/file/{}/download", urlencoding::encode(&page.file_id)),
            file_name: metadata.original_file_name.clone(),
            size: format_file_size(metadata.file_size),
            is_protected: metadata.is_password_protected,
            needs_password: page.needs_password,
            downloads,
            expires: metadata.expiry_date.as_deref().map(format_date_time),
            uploaded: metadata.created_at.as_deref().map(format_date),
            error: page.failure.as_ref().map(|f| f.message().to_string()),
            terminal: page.failure.as_ref().is_some_and(DownloadFailure::is_terminal),
            share_url: share_url(public_url, &page.file_id),
        }
    }
}

#[derive(Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub password: Option<String>,
}

fn render(nav: Nav, page: DownloadPage, public_url: &str) -> Response {
    match page {
        DownloadPage::NotFound => {
            (StatusCode::NOT_FOUND, FileNotFoundTemplate { nav }).into_response()
        }
        DownloadPage::Ready(page) => FileTemplate {
            nav,
            file: FileView::new(&page, public_url),
        }
        .into_response(),
    }
}

pub async fn file_page(
    State(state): State<AppState>,
    client: BrowserClient,
    Path(file_id): Path<String>,
) -> Response {
    let page = client.context.load_download_page(&file_id).await;
    render(Nav::of(&client).await, page, &state.public_url)
}

/// Download the file and hand it to the browser as an attachment; on failure
/// re-render the file page with the reason.
pub async fn download_handler(
    State(state): State<AppState>,
    client: BrowserClient,
    Path(file_id): Path<String>,
    Form(request): Form<DownloadRequest>,
) -> Response {
    let nav = Nav::of(&client).await;

    let mut page = match client.context.load_download_page(&file_id).await {
        DownloadPage::Ready(page) => page,
        DownloadPage::NotFound => return render(nav, DownloadPage::NotFound, &state.public_url),
    };

    let password = request.password.as_deref();
    if !page.can_download(password) {
        page.apply_failure(DownloadFailure::PasswordRequired);
        return render(nav, DownloadPage::Ready(page), &state.public_url);
    }

    match client
        .context
        .download(&file_id, Some(&page.metadata), password)
        .await
    {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, file.content_type),
                (header::CONTENT_DISPOSITION, attachment_header(&file.filename)),
            ],
            file.data,
        )
            .into_response(),
        Err(failure) => {
            page.apply_failure(failure);
            render(nav, DownloadPage::Ready(page), &state.public_url)
        }
    }
}
