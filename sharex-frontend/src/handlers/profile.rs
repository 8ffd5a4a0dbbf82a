use crate::handlers::Nav;
use crate::models::profile::{DeleteOutcome, ProfileView, PROFILE_LOAD_FAILED};
use crate::models::session::BrowserClient;
use crate::models::FileInfo;
use crate::utils::format::{format_date, format_date_time};
use askama::Template;
use axum::{
    extract::Path,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::collections::HashSet;

pub const FILE_DELETED: &str = "File deleted successfully";

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub nav: Nav,
    pub profile: Option<ProfileSummary>,
    pub files: Vec<FileRow>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

pub struct ProfileSummary {
    pub username: String,
    pub email: String,
    pub member_since: Option<String>,
    pub file_count: usize,
}

pub struct FileRow {
    pub file_id: String,
    pub file_name: String,
    pub link: String,
    pub delete_action: String,
    pub is_protected: bool,
    pub downloads: String,
    pub expires: String,
    pub uploaded: String,
    pub deleting: bool,
}

impl FileRow {
    fn new(file: &FileInfo, deleting: &HashSet<String>) -> Self {
        let downloads = match file.download_limit {
            Some(limit) => format!("{} / {}", file.download_count, limit),
            None => file.download_count.to_string(),
        };

        let encoded_id = urlencoding::encode(&file.file_id);

        Self {
            link: format!("/file/{}", encoded_id),
            delete_action: format!("/profile/files/{}/delete", encoded_id),
            file_id: file.file_id.clone(),
            file_name: file.original_file_name.clone(),
            is_protected: file.is_password_protected,
            downloads,
            expires: file
                .expiry_date
                .as_deref()
                .map(format_date_time)
                .unwrap_or_else(|| "Never".to_string()),
            uploaded: file.created_at.as_deref().map(format_date).unwrap_or_default(),
            deleting: deleting.contains(&file.file_id),
        }
    }
}

impl ProfileTemplate {
    async fn build(client: &BrowserClient, view: Option<ProfileView>) -> Self {
        let deleting = client.context.deleting().snapshot();
        let (profile, files) = match view {
            Some(view) => {
                let files: Vec<FileRow> = view
                    .files
                    .iter()
                    .map(|file| FileRow::new(file, &deleting))
                    .collect();
                let summary = ProfileSummary {
                    username: view.profile.username,
                    email: view.profile.email,
                    member_since: view.profile.created_at.as_deref().map(format_date),
                    file_count: files.len(),
                };
                (Some(summary), files)
            }
            None => (None, Vec::new()),
        };

        Self {
            nav: Nav::of(client).await,
            profile,
            files,
            error: None,
            notice: None,
        }
    }
}

pub async fn profile_page(client: BrowserClient) -> Response {
    match client.context.load_profile().await {
        Ok(view) => ProfileTemplate::build(&client, Some(view)).await.into_response(),
        Err(e) if e.is_unauthorized() => Redirect::to("/login").into_response(),
        Err(e) => {
            tracing::error!(client_id = %client.id, error = %e, "Failed to load profile");
            let mut page = ProfileTemplate::build(&client, None).await;
            page.error = Some(PROFILE_LOAD_FAILED.to_string());
            page.into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub confirmed: Option<String>,
}

pub async fn delete_file_handler(
    client: BrowserClient,
    Path(file_id): Path<String>,
    Form(request): Form<DeleteRequest>,
) -> Response {
    let confirmed = request.confirmed.as_deref() == Some("true");

    match client.context.delete_file(&file_id, confirmed).await {
        DeleteOutcome::Cancelled | DeleteOutcome::AlreadyDeleting => {
            Redirect::to("/profile").into_response()
        }
        DeleteOutcome::Unauthorized => Redirect::to("/login").into_response(),
        DeleteOutcome::Deleted(view) => {
            let mut page = ProfileTemplate::build(&client, Some(view)).await;
            page.notice = Some(FILE_DELETED.to_string());
            page.into_response()
        }
        DeleteOutcome::DeletedReloadFailed => {
            let mut page = ProfileTemplate::build(&client, None).await;
            page.notice = Some(FILE_DELETED.to_string());
            page.error = Some(PROFILE_LOAD_FAILED.to_string());
            page.into_response()
        }
        DeleteOutcome::Failed(message) => {
            // The file is still there; show the current list with the reason.
            let view = client.context.load_profile().await.ok();
            let mut page = ProfileTemplate::build(&client, view).await;
            page.error = Some(message);
            page.into_response()
        }
    }
}
