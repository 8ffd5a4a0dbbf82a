#![allow(dead_code)]

use serde_json::json;
use sharex_frontend::config::ApiSettings;
use sharex_frontend::services::client_context::ClientContext;
use sharex_frontend::services::client_registry::ClientRegistry;
use sharex_frontend::startup::build_router;
use sharex_frontend::AppState;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PUBLIC_URL: &str = "http://localhost:3000";
pub const SESSION_COOKIE: &str = "JSESSIONID=test-session";

pub fn api_settings(api: &MockServer) -> ApiSettings {
    ApiSettings {
        url: api.uri(),
        timeout_seconds: 1,
    }
}

pub fn profile_body() -> serde_json::Value {
    json!({
        "userId": "u-1",
        "username": "ola",
        "email": "ola@example.com",
        "createdAt": "2026-10-01T08:30:00",
        "fileCount": 1
    })
}

pub fn metadata_body(file_id: &str, protected: bool) -> serde_json::Value {
    json!({
        "fileId": file_id,
        "originalFileName": "report.pdf",
        "fileSize": 2048,
        "isPasswordProtected": protected,
        "downloadLimit": 5,
        "downloadCount": 1,
        "expiryDate": null,
        "createdAt": "2026-10-01T08:30:00"
    })
}

/// Profile answers 200 for any caller.
pub async fn mount_profile_ok(api: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(api)
        .await;
}

/// Profile answers 200 only for callers carrying the session cookie.
pub async fn mount_cookie_guarded_profile(api: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .with_priority(1)
        .mount(api)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Not authenticated"})),
        )
        .mount(api)
        .await;
}

pub async fn mount_login_ok(api: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=test-session; Path=/; HttpOnly")
                .set_body_json(json!({
                    "message": "Login successful",
                    "userId": "u-1",
                    "username": "ola"
                })),
        )
        .mount(api)
        .await;
}

/// A context whose mount-time refresh found a logged-in user.
pub async fn logged_in_context(api: &MockServer) -> ClientContext {
    mount_profile_ok(api).await;
    let context = ClientContext::mount(&api_settings(api))
        .await
        .expect("Failed to mount client context");
    assert!(context.auth().is_logged_in().await);
    context
}

pub struct TestApp {
    pub address: String,
    pub api: MockServer,
    pub client: reqwest::Client,
    pub registry: Arc<ClientRegistry>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let api = MockServer::start().await;
        let registry = Arc::new(ClientRegistry::new(api_settings(&api)));
        let state = AppState::new(registry.clone(), PUBLIC_URL);
        let app = build_router(state, 60);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: format!("http://127.0.0.1:{}", port),
            api,
            client,
            registry,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log the browser in through the login form.
    pub async fn login(&self) {
        mount_cookie_guarded_profile(&self.api).await;
        mount_login_ok(&self.api).await;

        let response = self
            .client
            .post(self.url("/login"))
            .form(&[("username", "ola"), ("password", "secret-password")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));
    }
}

pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
