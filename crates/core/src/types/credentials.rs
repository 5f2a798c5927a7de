//! Login credentials and the credential validator.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

use super::email::Email;
use super::validation::{Field, ValidationError};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub(crate) const INVALID_EMAIL: &str = "Invalid email address";
pub(crate) const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

/// An email/password pair as submitted by a visitor.
///
/// Transient: built per submission and dropped once the login call returns.
/// The password is only exposed where it is written to the wire.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Check the shape of the credentials.
    ///
    /// Returns the value unchanged when the email is a syntactically valid
    /// address and the password has at least [`MIN_PASSWORD_LENGTH`]
    /// characters. Both fields are checked so every offending field is
    /// reported at once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each offending field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();
        check_email(&mut errors, &self.email);
        check_password(
            &mut errors,
            Field::Password,
            self.password.expose_secret(),
            PASSWORD_TOO_SHORT,
        );
        errors.into_result(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub(crate) fn check_email(errors: &mut ValidationError, email: &str) {
    if Email::parse(email).is_err() {
        errors.push(Field::Email, INVALID_EMAIL);
    }
}

pub(crate) fn check_password(
    errors: &mut ValidationError,
    field: Field,
    password: &str,
    message: &str,
) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(field, message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials_pass_through_unchanged() {
        let creds = Credentials::new("a@b.com", "secret1").validate().unwrap();
        assert_eq!(creds.email, "a@b.com");
        assert_eq!(creds.password.expose_secret(), "secret1");
    }

    #[test]
    fn test_invalid_email_is_reported() {
        for email in ["", "plainaddress", "a@b", "a @b.com", "a@b.com "] {
            let err = Credentials::new(email, "secret1").validate().unwrap_err();
            assert_eq!(err.message_for(Field::Email), Some("Invalid email address"));
            assert!(!err.has(Field::Password));
        }
    }

    #[test]
    fn test_short_password_mentions_minimum_length() {
        for password in ["", "a", "12345", "äöüßé"] {
            let err = Credentials::new("a@b.com", password).validate().unwrap_err();
            let message = err.message_for(Field::Password).unwrap();
            assert!(message.contains("at least 6 characters"));
        }
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(Credentials::new("a@b.com", "äöüßéè").validate().is_ok());
    }

    #[test]
    fn test_both_fields_reported_together() {
        let err = Credentials::new("nope", "123").validate().unwrap_err();
        let fields: Vec<Field> = err.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Email, Field::Password]);
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("a@b.com", "hunter22"));
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter22"));
    }
}
