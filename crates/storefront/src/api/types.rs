//! Wire types for the upstream REST API.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use boutique_core::{Credentials, RegistrationInput};

/// Body of `POST /auth/signup`.
///
/// New accounts always start unverified, non-staff and active.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewAccount<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
    pub email_verified: bool,
    pub is_staff: bool,
    pub is_active: bool,
}

impl<'a> NewAccount<'a> {
    pub(super) fn new(input: &'a RegistrationInput) -> Self {
        Self {
            first_name: &input.first_name,
            last_name: &input.last_name,
            email: &input.email,
            phone: &input.phone,
            password: input.password.expose_secret(),
            email_verified: false,
            is_staff: false,
            is_active: true,
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        }
    }
}

/// The part of a login response the storefront cares about.
#[derive(Deserialize)]
pub(super) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Error body returned by the upstream on non-2xx responses.
#[derive(Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<ServerMessage>,
}

/// `message` is either a sentence or a list of validation messages.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum ServerMessage {
    One(String),
    Many(Vec<String>),
}

impl ServerMessage {
    /// Flatten into one user-facing sentence; blank messages count as absent.
    pub(super) fn into_text(self) -> Option<String> {
        let text = match self {
            Self::One(message) => message,
            Self::Many(messages) => messages
                .into_iter()
                .filter(|m| !m.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Extract the server-supplied message from an error body, if it has one.
pub(super) fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()?
        .message?
        .into_text()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_string() {
        assert_eq!(
            server_message(r#"{"message":"Invalid credentials","statusCode":401}"#).as_deref(),
            Some("Invalid credentials")
        );
    }

    #[test]
    fn test_server_message_list() {
        assert_eq!(
            server_message(r#"{"message":["email must be an email","phone should not be empty"]}"#)
                .as_deref(),
            Some("email must be an email, phone should not be empty")
        );
    }

    #[test]
    fn test_server_message_absent() {
        assert_eq!(server_message(""), None);
        assert_eq!(server_message("Internal Server Error"), None);
        assert_eq!(server_message(r#"{"error":"boom"}"#), None);
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message(r#"{"message":null}"#), None);
        assert_eq!(server_message(r#"{"message":42}"#), None);
    }

    #[test]
    fn test_login_request_writes_password() {
        let credentials = Credentials::new("a@b.com", "secret1");
        assert!(!format!("{credentials:?}").contains("secret1"));

        let json = serde_json::to_value(LoginRequest::from(&credentials)).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com", "password": "secret1"}));
    }

    #[test]
    fn test_new_account_adds_fixed_flags() {
        let input = RegistrationInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "5550100".to_string(),
            password: "engine1".into(),
        };
        let json = serde_json::to_value(NewAccount::new(&input)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "5550100",
                "password": "engine1",
                "emailVerified": false,
                "isStaff": false,
                "isActive": true,
            })
        );
    }
}
