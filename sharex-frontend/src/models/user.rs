use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identity of the logged-in user as reported by the ShareX API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Body of a successful login or register call. The API does not echo the
/// email back.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub user_id: String,
    pub username: String,
}

impl AuthResponse {
    pub fn into_user(self, email: impl Into<String>) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub file_count: Option<u64>,
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        User {
            user_id: profile.user_id,
            username: profile.username,
            email: profile.email,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_parses_api_body() {
        let body = r#"{"message":"Login successful","userId":"u-1","username":"ola"}"#;
        let response: AuthResponse = serde_json::from_str(body).unwrap();

        let user = response.into_user("");
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.username, "ola");
        assert!(user.email.is_empty());
    }

    #[test]
    fn profile_parses_with_extra_fields() {
        let body = r#"{"userId":"u-1","username":"ola","email":"ola@example.com",
                       "createdAt":"2025-03-01T10:00:00","fileCount":3}"#;
        let profile: UserProfile = serde_json::from_str(body).unwrap();

        assert_eq!(profile.file_count, Some(3));
        let user = User::from(profile);
        assert_eq!(user.email, "ola@example.com");
    }

    #[test]
    fn register_form_enforces_password_length() {
        let form = RegisterForm {
            username: "ola".to_string(),
            email: "ola@example.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let form = RegisterForm {
            password: "123456".to_string(),
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn register_form_rejects_bad_email() {
        let form = RegisterForm {
            username: "ola".to_string(),
            email: "not-an-email".to_string(),
            password: "secret-password".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn login_form_requires_both_fields() {
        let form = LoginForm {
            username: String::new(),
            password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }
}
