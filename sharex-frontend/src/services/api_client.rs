//! HTTP client for the ShareX REST API.
//!
//! One `ApiClient` exists per browser session. Its credentialed client keeps
//! the API session cookie in a private jar, the same way a browser sends
//! `credentials: 'include'`. File metadata and downloads go through a second
//! client that never carries cookies.

use crate::config::ApiSettings;
use crate::models::{AuthResponse, FileInfo, FileMetadata, UploadResponse, UserProfile};
use axum::body::Bytes;
use reqwest::{
    header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE},
    multipart::{Form, Part},
    Client, Method, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use sharex_core::observability::{TracedClientExt, TracedRequest};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const UNKNOWN_ERROR: &str = "Unknown error";
const DOWNLOAD_FAILED: &str = "Download failed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response arrived: connection refused, DNS failure, timeout.
    #[error("HTTP request failed: {0}")]
    Transport(reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A success response whose body could not be read or decoded.
    #[error("Invalid response body: {0}")]
    InvalidBody(reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Transport(_) => "Network error occurred".to_string(),
            ApiError::InvalidBody(_) | ApiError::Client(_) => UNKNOWN_ERROR.to_string(),
        }
    }
}

/// Request payload. Only multipart bodies skip the JSON content type so
/// reqwest can write the boundary itself.
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// File chosen for upload plus the optional form fields, already validated.
pub struct UploadPayload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    pub fields: Vec<(&'static str, String)>,
}

/// Raw successful download.
#[derive(Debug)]
pub struct DownloadedFile {
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

pub struct ApiClient {
    base_url: String,
    client: Client,
    anonymous: Client,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(settings.timeout_seconds);
        let jar = Arc::new(reqwest::cookie::Jar::default());

        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        let anonymous = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            client,
            anonymous,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a credentialed request and turn non-success statuses into
    /// `ApiError::Status` carrying the API's `message` (or `error`) field.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
    ) -> Result<Response, ApiError> {
        let url = self.url(endpoint);
        let request = TracedRequest::new(self.client.request(method.clone(), &url));

        let request = match body {
            RequestBody::Empty => request.header(CONTENT_TYPE.as_str(), "application/json"),
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await.map_err(|e| {
            tracing::error!(method = %method, url = %url, error = %e, "ShareX API request failed");
            ApiError::Transport(e)
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        self.request(method, endpoint, body)
            .await?
            .json::<T>()
            .await
            .map_err(ApiError::InvalidBody)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.request_json(
            Method::POST,
            "/api/users/login",
            RequestBody::Json(serde_json::json!({
                "username": username,
                "password": password,
            })),
        )
        .await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.request_json(
            Method::POST,
            "/api/users/register",
            RequestBody::Json(serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.request(Method::POST, "/api/users/logout", RequestBody::Empty)
            .await
            .map(|_| ())
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.request_json(Method::GET, "/api/users/profile", RequestBody::Empty)
            .await
    }

    pub async fn upload(&self, payload: UploadPayload) -> Result<UploadResponse, ApiError> {
        let size = payload.data.len() as u64;
        let file_part = Part::stream_with_length(reqwest::Body::from(payload.data), size)
            .file_name(payload.file_name)
            .mime_str(&payload.content_type)
            .map_err(ApiError::Client)?;

        let form = payload
            .fields
            .into_iter()
            .fold(Form::new().part("file", file_part), |form, (name, value)| {
                form.text(name, value)
            });

        self.request_json(
            Method::POST,
            "/api/files/upload",
            RequestBody::Multipart(form),
        )
        .await
    }

    /// Files owned by the logged-in user. A `null` body is an empty list.
    pub async fn user_files(&self) -> Result<Vec<FileInfo>, ApiError> {
        let files: Option<Vec<FileInfo>> = self
            .request_json(Method::GET, "/api/files/user", RequestBody::Empty)
            .await?;
        Ok(files.unwrap_or_default())
    }

    pub async fn file_metadata(&self, file_id: &str) -> Result<FileMetadata, ApiError> {
        let url = self.url(&format!("/api/files/{}/metadata", urlencoding::encode(file_id)));

        let response = self
            .anonymous
            .traced_get(&url)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        response.json().await.map_err(ApiError::InvalidBody)
    }

    /// Fetch file bytes. The password, when given, is forwarded untouched.
    pub async fn download(
        &self,
        file_id: &str,
        password: Option<&str>,
    ) -> Result<DownloadedFile, ApiError> {
        let url = self.url(&format!("/api/files/download/{}", urlencoding::encode(file_id)));

        let mut request = self.anonymous.traced_get(&url);
        if let Some(password) = password {
            request = request.query(&[("password", password)]);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(file_id = %file_id, error = %e, "Download request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<serde_json::Value>().await {
                Ok(body) => body_message(&body).unwrap_or_else(|| DOWNLOAD_FAILED.to_string()),
                Err(_) => DOWNLOAD_FAILED.to_string(),
            };
            return Err(ApiError::Status { status, message });
        }

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        let content_disposition = header(CONTENT_DISPOSITION);
        let content_type = header(CONTENT_TYPE);

        let data = response.bytes().await.map_err(ApiError::Transport)?;

        Ok(DownloadedFile {
            content_disposition,
            content_type,
            data,
        })
    }

    /// Delete a file. Returns the success status so callers can tell `204`
    /// apart from other 2xx answers.
    pub async fn delete_file(&self, file_id: &str) -> Result<StatusCode, ApiError> {
        let response = self
            .request(
                Method::DELETE,
                &format!("/file/{}", urlencoding::encode(file_id)),
                RequestBody::Empty,
            )
            .await?;
        Ok(response.status())
    }
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        Err(_) => UNKNOWN_ERROR.to_string(),
    };

    ApiError::Status { status, message }
}

/// `message` wins over `error`; empty strings count as absent.
fn body_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}
