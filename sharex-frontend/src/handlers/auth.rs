use crate::handlers::Nav;
use crate::models::session::BrowserClient;
use crate::models::{LoginForm, RegisterForm};
use crate::utils::{field_messages, FieldErrors};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use validator::Validate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub username: String,
    pub error: Option<String>,
    pub username_error: Option<String>,
    pub password_error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
    pub username_error: Option<String>,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
}

impl LoginTemplate {
    fn empty() -> Self {
        Self {
            nav: Nav::anonymous(),
            username: String::new(),
            error: None,
            username_error: None,
            password_error: None,
        }
    }

    fn with_errors(username: String, errors: &FieldErrors) -> Self {
        Self {
            username,
            username_error: errors.get("username").map(str::to_string),
            password_error: errors.get("password").map(str::to_string),
            ..Self::empty()
        }
    }
}

impl RegisterTemplate {
    fn empty() -> Self {
        Self {
            nav: Nav::anonymous(),
            username: String::new(),
            email: String::new(),
            error: None,
            username_error: None,
            email_error: None,
            password_error: None,
        }
    }

    fn with_errors(username: String, email: String, errors: &FieldErrors) -> Self {
        Self {
            username,
            email,
            username_error: errors.get("username").map(str::to_string),
            email_error: errors.get("email").map(str::to_string),
            password_error: errors.get("password").map(str::to_string),
            ..Self::empty()
        }
    }
}

pub async fn login_page(client: BrowserClient) -> Response {
    if client.context.auth().is_logged_in().await {
        return Redirect::to("/").into_response();
    }
    LoginTemplate::empty().into_response()
}

pub async fn register_page(client: BrowserClient) -> Response {
    if client.context.auth().is_logged_in().await {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate::empty().into_response()
}

pub async fn login_handler(client: BrowserClient, Form(payload): Form<LoginForm>) -> Response {
    if let Err(e) = payload.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate::with_errors(payload.username, &field_messages(&e)),
        )
            .into_response();
    }

    match client
        .context
        .login(&payload.username, &payload.password)
        .await
    {
        Ok(user) => {
            tracing::info!(client_id = %client.id, user_id = %user.user_id, "User logged in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(client_id = %client.id, username = %payload.username, error = %e, "Login failed");
            (
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    username: payload.username,
                    error: Some(e.user_message()),
                    ..LoginTemplate::empty()
                },
            )
                .into_response()
        }
    }
}

pub async fn register_handler(
    client: BrowserClient,
    Form(payload): Form<RegisterForm>,
) -> Response {
    if let Err(e) = payload.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            RegisterTemplate::with_errors(payload.username, payload.email, &field_messages(&e)),
        )
            .into_response();
    }

    match client
        .context
        .register(&payload.username, &payload.email, &payload.password)
        .await
    {
        Ok(user) => {
            tracing::info!(client_id = %client.id, user_id = %user.user_id, "User registered");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(client_id = %client.id, username = %payload.username, error = %e, "Registration failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                RegisterTemplate {
                    username: payload.username,
                    email: payload.email,
                    error: Some(e.user_message()),
                    ..RegisterTemplate::empty()
                },
            )
                .into_response()
        }
    }
}

/// Logs out against the API, then forgets the session's client context so
/// the next visit starts with an empty cookie jar.
pub async fn logout_handler(State(state): State<AppState>, client: BrowserClient) -> Response {
    client.context.auth().logout().await;

    state.registry.remove(&client.id);
    if let Err(e) = client.session.flush().await {
        tracing::error!(client_id = %client.id, error = %e, "Failed to flush session on logout");
    }

    Redirect::to("/").into_response()
}
