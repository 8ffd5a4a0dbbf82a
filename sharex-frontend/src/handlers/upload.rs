use crate::handlers::Nav;
use crate::models::session::BrowserClient;
use crate::models::upload::{
    SelectedFile, UploadForm, UploadState, FILE_TOO_LARGE, MAX_FILE_SIZE, UPLOAD_FAILED,
};
use crate::services::client_context::UploadSubmission;
use crate::utils::format::pretty_size;
use crate::utils::FieldErrors;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub nav: Nav,
    pub form: UploadView,
}

/// Upload form as rendered: retained input, per-field errors, and the
/// result of the last submit.
#[derive(Debug, Default)]
pub struct UploadView {
    pub password: String,
    pub download_limit: String,
    pub expiry_date: String,
    pub advanced_open: bool,
    pub file_error: Option<String>,
    pub download_limit_error: Option<String>,
    pub expiry_date_error: Option<String>,
    pub toast: Option<String>,
    pub share_url: Option<String>,
    pub max_size_label: String,
}

impl UploadView {
    pub fn new() -> Self {
        Self {
            max_size_label: pretty_size(MAX_FILE_SIZE),
            ..Self::default()
        }
    }

    fn retaining(input: &RawUploadInput) -> Self {
        let mut view = Self::new();
        view.password = input.password.clone();
        view.download_limit = input.download_limit.clone();
        view.expiry_date = input.expiry_date.clone();
        view.advanced_open =
            !(view.password.is_empty() && view.download_limit.is_empty() && view.expiry_date.is_empty());
        view
    }

    fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.file_error = errors.get("file").map(str::to_string);
        self.download_limit_error = errors.get("download_limit").map(str::to_string);
        self.expiry_date_error = errors.get("expiry_date").map(str::to_string);
        if self.download_limit_error.is_some() || self.expiry_date_error.is_some() {
            self.advanced_open = true;
        }
        self
    }
}

/// Text inputs as typed, kept for re-rendering the form.
#[derive(Debug, Default)]
struct RawUploadInput {
    file: Option<SelectedFile>,
    password: String,
    download_limit: String,
    expiry_date: String,
}

impl RawUploadInput {
    fn to_form(&self) -> UploadForm {
        fn non_blank(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| value.to_string())
        }

        UploadForm {
            file: self.file.clone(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            download_limit: non_blank(&self.download_limit),
            expiry_date: non_blank(&self.expiry_date),
        }
    }
}

async fn read_upload_input(mut multipart: Multipart) -> Result<RawUploadInput, MultipartError> {
    let mut input = RawUploadInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;

                // Browsers send an empty, unnamed part when nothing was chosen.
                if !(file_name.is_empty() && data.is_empty()) {
                    input.file = Some(SelectedFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            "password" => input.password = field.text().await?,
            "downloadLimit" => input.download_limit = field.text().await?,
            "expiryDate" => input.expiry_date = field.text().await?,
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    Ok(input)
}

pub async fn upload_handler(
    State(state): State<AppState>,
    client: BrowserClient,
    multipart: Multipart,
) -> Response {
    if !client.context.auth().is_logged_in().await {
        return Redirect::to("/login").into_response();
    }

    let nav = Nav::of(&client).await;

    let input = match read_upload_input(multipart).await {
        Ok(input) => input,
        Err(e) => {
            let mut form = UploadView::new();
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                form.file_error = Some(FILE_TOO_LARGE.to_string());
            } else {
                tracing::warn!(client_id = %client.id, error = %e, "Malformed upload form");
                form.toast = Some(UPLOAD_FAILED.to_string());
            }
            metrics::counter!("sharex_uploads_total", "outcome" => "rejected").increment(1);
            return IndexTemplate { nav, form }.into_response();
        }
    };

    let form = match client
        .context
        .submit_upload(input.to_form(), &state.public_url)
        .await
    {
        UploadSubmission::LoginRequired => return Redirect::to("/login").into_response(),
        UploadSubmission::Finished(UploadState::Success { share_url, .. }) => {
            // Fresh form, advanced options collapsed.
            let mut form = UploadView::new();
            form.share_url = Some(share_url);
            form
        }
        UploadSubmission::Finished(UploadState::ValidationError(errors)) => {
            UploadView::retaining(&input).with_errors(&errors)
        }
        UploadSubmission::Finished(UploadState::ServerError(message)) => {
            let mut form = UploadView::retaining(&input);
            form.toast = Some(message);
            form
        }
        UploadSubmission::Finished(UploadState::Idle) => UploadView::new(),
    };

    IndexTemplate { nav, form }.into_response()
}
