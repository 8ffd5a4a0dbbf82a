//! Everything one browser session owns: its API client (and so its API
//! cookie), its auth store, and its in-flight deletes.

use crate::config::ApiSettings;
use crate::models::download::{DownloadFailure, DownloadPage, ReadyPage, SavedFile};
use crate::models::profile::{DeleteOutcome, DeletingSet, ProfileView, DELETE_FAILED};
use crate::models::upload::{share_url, UploadForm, UploadState};
use crate::models::{FileMetadata, User};
use crate::services::api_client::{ApiClient, ApiError};
use crate::services::auth_session::AuthSession;
use crate::utils::content_disposition::resolve_filename;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Result of submitting the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSubmission {
    /// Not logged in; nothing was sent.
    LoginRequired,
    Finished(UploadState),
}

pub struct ClientContext {
    api: Arc<ApiClient>,
    auth: AuthSession,
    deleting: DeletingSet,
    last_seen: Mutex<Instant>,
}

impl ClientContext {
    /// Build the context and settle its auth state against the API.
    pub async fn mount(settings: &ApiSettings) -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::new(settings)?);
        let auth = AuthSession::init(api.clone()).await;

        Ok(Self {
            api,
            auth,
            deleting: DeletingSet::default(),
            last_seen: Mutex::new(Instant::now()),
        })
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn deleting(&self) -> &DeletingSet {
        &self.deleting
    }

    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let response = self.api.login(username, password).await?;
        let user = response.into_user("");
        self.auth.login(user.clone()).await;
        Ok(user)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let response = self.api.register(username, email, password).await?;
        let user = response.into_user(email);
        self.auth.login(user.clone()).await;
        Ok(user)
    }

    /// Check login, validate, then post the multipart upload.
    pub async fn submit_upload(&self, form: UploadForm, public_url: &str) -> UploadSubmission {
        if !self.auth.is_logged_in().await {
            return UploadSubmission::LoginRequired;
        }

        let request = match form.into_request() {
            Ok(request) => request,
            Err(errors) => {
                return UploadSubmission::Finished(record_upload(UploadState::ValidationError(
                    errors,
                )))
            }
        };

        let file_name = request.file.file_name.clone();
        let size = request.file.size();

        let state = match self.api.upload(request.into_payload()).await {
            Ok(response) => {
                tracing::info!(file_id = %response.file_id, file_name = %file_name, size, "File uploaded");
                UploadState::Success {
                    share_url: share_url(public_url, &response.file_id),
                    file_id: response.file_id,
                }
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(file_name = %file_name, "Upload rejected, session no longer valid");
                self.auth.clear().await;
                return UploadSubmission::LoginRequired;
            }
            Err(e) => {
                tracing::error!(file_name = %file_name, error = %e, "Upload failed");
                UploadState::from_api_error(&e)
            }
        };

        UploadSubmission::Finished(record_upload(state))
    }

    /// Fetch metadata for the file page. Any failure means "not found".
    pub async fn load_download_page(&self, file_id: &str) -> DownloadPage {
        match self.api.file_metadata(file_id).await {
            Ok(metadata) => DownloadPage::Ready(ReadyPage::new(file_id, metadata)),
            Err(e) => {
                tracing::info!(file_id = %file_id, error = %e, "File metadata unavailable");
                DownloadPage::NotFound
            }
        }
    }

    /// Download the file bytes and settle on a filename.
    pub async fn download(
        &self,
        file_id: &str,
        metadata: Option<&FileMetadata>,
        password: Option<&str>,
    ) -> Result<SavedFile, DownloadFailure> {
        let password = password.filter(|p| !p.is_empty());

        let result = match self.api.download(file_id, password).await {
            Ok(file) => {
                let filename =
                    resolve_filename(file.content_disposition.as_deref(), metadata, file_id);
                tracing::info!(file_id = %file_id, filename = %filename, size = file.data.len(), "File downloaded");
                Ok(SavedFile {
                    filename,
                    content_type: file
                        .content_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    data: file.data,
                })
            }
            Err(e) => {
                let failure = DownloadFailure::from_api_error(&e);
                tracing::warn!(file_id = %file_id, error = %e, outcome = failure.outcome_label(), "Download failed");
                Err(failure)
            }
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(failure) => failure.outcome_label(),
        };
        metrics::counter!("sharex_downloads_total", "outcome" => outcome).increment(1);

        result
    }

    /// Profile and file list fetched together; either failing fails both.
    pub async fn load_profile(&self) -> Result<ProfileView, ApiError> {
        let (profile, files) = tokio::join!(self.api.profile(), self.api.user_files());

        let result = match (profile, files) {
            (Ok(profile), Ok(files)) => Ok(ProfileView { profile, files }),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.auth.clear().await;
            }
        }
        result
    }

    /// Delete one file. Only a `204` counts as deleted, after which the
    /// whole profile is reloaded.
    pub async fn delete_file(&self, file_id: &str, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            return DeleteOutcome::Cancelled;
        }

        let Some(_guard) = self.deleting.begin(file_id) else {
            return DeleteOutcome::AlreadyDeleting;
        };

        let outcome = match self.api.delete_file(file_id).await {
            Ok(StatusCode::NO_CONTENT) => {
                tracing::info!(file_id = %file_id, "File deleted");
                match self.load_profile().await {
                    Ok(view) => DeleteOutcome::Deleted(view),
                    Err(e) => {
                        tracing::error!(file_id = %file_id, error = %e, "Profile reload after delete failed");
                        DeleteOutcome::DeletedReloadFailed
                    }
                }
            }
            Ok(status) => {
                tracing::warn!(file_id = %file_id, status = %status, "Unexpected delete status");
                DeleteOutcome::Failed(DELETE_FAILED.to_string())
            }
            Err(e) if e.is_unauthorized() => {
                self.auth.clear().await;
                DeleteOutcome::Unauthorized
            }
            Err(e) => {
                tracing::error!(file_id = %file_id, error = %e, "Delete failed");
                DeleteOutcome::Failed(e.user_message())
            }
        };

        metrics::counter!("sharex_deletes_total", "outcome" => outcome.outcome_label())
            .increment(1);
        outcome
    }
}

fn record_upload(state: UploadState) -> UploadState {
    metrics::counter!("sharex_uploads_total", "outcome" => state.outcome_label()).increment(1);
    state
}
