//! Download page state and the failure policy for download attempts.

use crate::models::FileMetadata;
use crate::services::api_client::ApiError;
use axum::body::Bytes;
use reqwest::StatusCode;

pub const PASSWORD_REQUIRED: &str = "Password required or incorrect";
pub const FILE_EXPIRED: &str = "This file has expired";
pub const LIMIT_REACHED: &str = "Download limit has been reached";
pub const NETWORK_ERROR: &str = "Network error occurred";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    /// 401: the password is missing or wrong.
    PasswordRequired,
    /// 410
    Expired,
    /// 429
    LimitReached,
    /// Any other status, carrying the API's message.
    Server(String),
    /// The request never got an answer.
    Network,
}

impl DownloadFailure {
    pub fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => match *status {
                StatusCode::UNAUTHORIZED => DownloadFailure::PasswordRequired,
                StatusCode::GONE => DownloadFailure::Expired,
                StatusCode::TOO_MANY_REQUESTS => DownloadFailure::LimitReached,
                _ => DownloadFailure::Server(message.clone()),
            },
            ApiError::Transport(_) | ApiError::InvalidBody(_) | ApiError::Client(_) => {
                DownloadFailure::Network
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DownloadFailure::PasswordRequired => PASSWORD_REQUIRED,
            DownloadFailure::Expired => FILE_EXPIRED,
            DownloadFailure::LimitReached => LIMIT_REACHED,
            DownloadFailure::Server(message) => message,
            DownloadFailure::Network => NETWORK_ERROR,
        }
    }

    /// Expired and exhausted files cannot be retried from the page.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadFailure::Expired | DownloadFailure::LimitReached)
    }

    pub fn outcome_label(&self) -> &'static str {
        match self {
            DownloadFailure::PasswordRequired => "password_required",
            DownloadFailure::Expired => "expired",
            DownloadFailure::LimitReached => "limit_reached",
            DownloadFailure::Server(_) => "server_error",
            DownloadFailure::Network => "network_error",
        }
    }
}

/// File page after metadata loading.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadPage {
    NotFound,
    Ready(ReadyPage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyPage {
    pub file_id: String,
    pub metadata: FileMetadata,
    pub needs_password: bool,
    pub failure: Option<DownloadFailure>,
}

impl ReadyPage {
    pub fn new(file_id: impl Into<String>, metadata: FileMetadata) -> Self {
        Self {
            needs_password: metadata.is_password_protected,
            file_id: file_id.into(),
            metadata,
            failure: None,
        }
    }

    /// Record a failed attempt. A 401 reveals the password field even when
    /// the metadata did not flag the file as protected.
    pub fn apply_failure(&mut self, failure: DownloadFailure) {
        if failure == DownloadFailure::PasswordRequired {
            self.needs_password = true;
        }
        self.failure = Some(failure);
    }

    /// The download action is disabled while a required password is blank.
    pub fn can_download(&self, password: Option<&str>) -> bool {
        !self.needs_password || password.is_some_and(|p| !p.is_empty())
    }
}

/// Bytes ready to hand to the browser under `filename`.
#[derive(Debug, Clone)]
pub struct SavedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}
