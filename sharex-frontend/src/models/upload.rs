//! Upload form: validation, the multipart field contract, and how API
//! failures map back onto the form.

use crate::services::api_client::{ApiError, UploadPayload};
use crate::utils::FieldErrors;
use axum::body::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use reqwest::StatusCode;

/// 100 MiB.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const FILE_REQUIRED: &str = "File is required!";
pub const FILE_TOO_LARGE: &str = "File size should be less than 100 MB!";
pub const DOWNLOAD_LIMIT_TOO_LOW: &str = "Must be at least 1";
pub const INVALID_EXPIRY_DATE: &str = "Enter a valid date";
pub const UPLOAD_FAILED: &str = "Error! Please, try again...";

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Raw form input. Blank optional inputs are `None`.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<SelectedFile>,
    pub password: Option<String>,
    pub download_limit: Option<String>,
    pub expiry_date: Option<String>,
}

/// Optional upload settings after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub password: Option<String>,
    pub download_limit: Option<u32>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl UploadOptions {
    /// Multipart text fields in send order. Absent options are omitted.
    pub fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(password) = &self.password {
            fields.push(("password", password.clone()));
        }
        if let Some(limit) = self.download_limit {
            fields.push(("downloadLimit", limit.to_string()));
        }
        if let Some(expiry) = &self.expiry_date {
            fields.push((
                "expiryDate",
                expiry.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        fields
    }
}

/// A validated upload ready to be sent.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: SelectedFile,
    pub options: UploadOptions,
}

impl UploadRequest {
    pub fn into_payload(self) -> UploadPayload {
        UploadPayload {
            fields: self.options.multipart_fields(),
            file_name: self.file.file_name,
            content_type: self.file.content_type,
            data: self.file.data,
        }
    }
}

impl UploadForm {
    /// Check every field and convert into an `UploadRequest`, or one
    /// message per failing field.
    pub fn into_request(self) -> Result<UploadRequest, FieldErrors> {
        let mut errors = FieldErrors::default();

        match &self.file {
            None => errors.insert("file", FILE_REQUIRED),
            Some(file) => {
                if let Err(message) = check_file_size(file.size()) {
                    errors.insert("file", message);
                }
            }
        }

        let download_limit = self.download_limit.as_deref().and_then(|raw| {
            let limit = parse_download_limit(raw);
            if limit.is_none() {
                errors.insert("download_limit", DOWNLOAD_LIMIT_TOO_LOW);
            }
            limit
        });

        let expiry_date = self.expiry_date.as_deref().and_then(|raw| {
            let expiry = parse_expiry_date(raw);
            if expiry.is_none() {
                errors.insert("expiry_date", INVALID_EXPIRY_DATE);
            }
            expiry
        });

        match self.file {
            Some(file) if errors.is_empty() => Ok(UploadRequest {
                file,
                options: UploadOptions {
                    password: self.password,
                    download_limit,
                    expiry_date,
                },
            }),
            _ => Err(errors),
        }
    }
}

/// Where an upload attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Success { file_id: String, share_url: String },
    ValidationError(FieldErrors),
    ServerError(String),
}

impl UploadState {
    /// Map an API failure onto the form.
    pub fn from_api_error(err: &ApiError) -> Self {
        match err.status() {
            Some(StatusCode::BAD_REQUEST) => {
                UploadState::ValidationError(FieldErrors::single("file", FILE_REQUIRED))
            }
            Some(StatusCode::PAYLOAD_TOO_LARGE) => {
                UploadState::ValidationError(FieldErrors::single("file", FILE_TOO_LARGE))
            }
            _ => UploadState::ServerError(UPLOAD_FAILED.to_string()),
        }
    }

    pub fn outcome_label(&self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::Success { .. } => "success",
            UploadState::ValidationError(_) => "validation_error",
            UploadState::ServerError(_) => "server_error",
        }
    }
}

/// Share link for an uploaded file.
pub fn share_url(public_url: &str, file_id: &str) -> String {
    format!(
        "{}/file/{}",
        public_url.trim_end_matches('/'),
        urlencoding::encode(file_id)
    )
}

pub fn check_file_size(size: u64) -> Result<(), &'static str> {
    if size <= MAX_FILE_SIZE {
        Ok(())
    } else {
        Err(FILE_TOO_LARGE)
    }
}

/// Whole number ≥ 1.
pub fn parse_download_limit(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|limit| *limit >= 1)
}

/// Accepts RFC 3339 timestamps, `datetime-local` input values (with or
/// without seconds) and plain dates. Values without an offset are UTC.
pub fn parse_expiry_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
