mod common;

use axum::body::Bytes;
use common::{api_settings, mount_login_ok, SESSION_COOKIE};
use reqwest::StatusCode;
use serde_json::json;
use sharex_frontend::config::ApiSettings;
use sharex_frontend::services::api_client::{ApiClient, ApiError, UploadPayload};
use wiremock::matchers::{body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(api: &MockServer) -> ApiClient {
    ApiClient::new(&api_settings(api)).expect("Failed to build API client")
}

async fn login_error(api: &MockServer, response: ResponseTemplate) -> ApiError {
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(response)
        .mount(api)
        .await;

    client_for(api)
        .await
        .login("ola", "wrong")
        .await
        .expect_err("login should fail")
}

#[tokio::test]
async fn error_message_comes_from_message_field() {
    let api = MockServer::start().await;
    let err = login_error(
        &api,
        ResponseTemplate::new(400).set_body_json(json!({"message": "Username already taken"})),
    )
    .await;

    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.to_string(), "Username already taken");
}

#[tokio::test]
async fn error_message_falls_back_to_error_field() {
    let api = MockServer::start().await;
    let err = login_error(
        &api,
        ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
    )
    .await;

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn json_without_message_reports_status_code() {
    let api = MockServer::start().await;
    let err = login_error(&api, ResponseTemplate::new(500).set_body_json(json!({}))).await;
    assert_eq!(err.to_string(), "HTTP 500");
}

#[tokio::test]
async fn non_json_error_body_is_unknown_error() {
    let api = MockServer::start().await;
    let err = login_error(&api, ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>")).await;
    assert_eq!(err.to_string(), "Unknown error");
}

#[tokio::test]
async fn unreachable_api_is_a_network_error() {
    let client = ApiClient::new(&ApiSettings {
        url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 1,
    })
    .unwrap();

    let err = client.profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message(), "Network error occurred");
}

#[tokio::test]
async fn json_calls_send_json_content_type() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .and(header("content-type", "application/json"))
        .and(body_string_contains("\"email\":\"ola@example.com\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "User registered",
            "userId": "u-1",
            "username": "ola"
        })))
        .expect(1)
        .mount(&api)
        .await;

    let response = client_for(&api)
        .await
        .register("ola", "ola@example.com", "secret-password")
        .await
        .unwrap();
    assert_eq!(response.user_id, "u-1");
}

#[tokio::test]
async fn upload_lets_transport_set_multipart_boundary() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/files/upload"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"downloadLimit\"\r\n\r\n5\r\n"))
        .and(body_string_contains("filename=\"notes.txt\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileId": "f-9",
            "message": "File uploaded successfully"
        })))
        .expect(1)
        .mount(&api)
        .await;

    let response = client_for(&api)
        .await
        .upload(UploadPayload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: Bytes::from_static(b"hello"),
            fields: vec![("downloadLimit", "5".to_string())],
        })
        .await
        .unwrap();

    assert_eq!(response.file_id, "f-9");
}

#[tokio::test]
async fn session_cookie_is_sent_on_credentialed_calls_only() {
    let api = MockServer::start().await;
    mount_login_ok(&api).await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::profile_body()))
        .expect(1)
        .mount(&api)
        .await;

    // Metadata is fetched anonymously; a cookie here would trip `expect(0)`.
    Mock::given(method("GET"))
        .and(path("/api/files/f-1/metadata"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .expect(0)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/f-1/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::metadata_body("f-1", false)))
        .expect(1)
        .mount(&api)
        .await;

    let client = client_for(&api).await;
    client.login("ola", "secret-password").await.unwrap();

    let profile = client.profile().await.unwrap();
    assert_eq!(profile.username, "ola");

    let metadata = client.file_metadata("f-1").await.unwrap();
    assert_eq!(metadata.original_file_name, "report.pdf");
}

#[tokio::test]
async fn null_file_list_is_empty() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&api)
        .await;

    let files = client_for(&api).await.user_files().await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn download_forwards_password_and_headers() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files/download/f-1"))
        .and(query_param("password", "s3cret&more"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"report.pdf\"")
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .expect(1)
        .mount(&api)
        .await;

    let file = client_for(&api)
        .await
        .download("f-1", Some("s3cret&more"))
        .await
        .unwrap();

    assert_eq!(file.content_disposition.as_deref(), Some("attachment; filename=\"report.pdf\""));
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(&file.data[..], b"%PDF-1.7");
}

#[tokio::test]
async fn download_failure_without_message_is_download_failed() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files/download/f-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&api)
        .await;

    let err = client_for(&api).await.download("f-1", None).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.to_string(), "Download failed");
}

#[tokio::test]
async fn delete_reports_success_status() {
    let api = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/file/f-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&api)
        .await;

    let status = client_for(&api).await.delete_file("f-1").await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}
