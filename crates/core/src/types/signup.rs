//! Signup form schema and the registration input it produces.

use core::fmt;

use secrecy::SecretString;
use serde::Deserialize;

use super::credentials::{Credentials, PASSWORD_TOO_SHORT, check_email, check_password};
use super::validation::{Field, ValidationError};

/// Raw signup form values as posted by the browser.
#[derive(Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl SignupForm {
    /// Run the signup schema.
    ///
    /// On success the confirmation field is dropped and the remaining values
    /// become a [`RegistrationInput`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each offending field.
    pub fn validate(self) -> Result<RegistrationInput, ValidationError> {
        let mut errors = ValidationError::default();

        if self.first_name.is_empty() {
            errors.push(Field::FirstName, "First name is required");
        }
        if self.last_name.is_empty() {
            errors.push(Field::LastName, "Last name is required");
        }
        check_email(&mut errors, &self.email);
        if self.phone.is_empty() {
            errors.push(Field::Phone, "Phone number is required");
        } else if !self.phone.chars().all(|c| c.is_ascii_digit()) {
            errors.push(Field::Phone, "Phone number must be numeric");
        }
        check_password(&mut errors, Field::Password, &self.password, PASSWORD_TOO_SHORT);
        check_password(
            &mut errors,
            Field::ConfirmPassword,
            &self.confirm_password,
            "Confirm password is required",
        );
        if self.password != self.confirm_password {
            errors.push(Field::ConfirmPassword, "Passwords don't match");
        }

        errors.into_result(RegistrationInput {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            password: SecretString::from(self.password),
        })
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}

/// Account details sent to the registration endpoint.
#[derive(Clone)]
pub struct RegistrationInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
}

impl RegistrationInput {
    /// The credentials to sign in with once the account exists.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn valid_form() -> SignupForm {
        SignupForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "5550100".to_string(),
            password: "engine1".to_string(),
            confirm_password: "engine1".to_string(),
        }
    }

    #[test]
    fn test_valid_form_drops_confirmation() {
        let input = valid_form().validate().unwrap();
        assert_eq!(input.email, "ada@example.com");
        assert_eq!(input.first_name, "Ada");
        assert_eq!(input.last_name, "Lovelace");
        assert_eq!(input.password.expose_secret(), "engine1");
        assert!(!format!("{input:?}").contains("engine1"));
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let err = SignupForm::default().validate().unwrap_err();
        assert_eq!(err.message_for(Field::FirstName), Some("First name is required"));
        assert_eq!(err.message_for(Field::LastName), Some("Last name is required"));
        assert_eq!(err.message_for(Field::Email), Some("Invalid email address"));
        assert_eq!(err.message_for(Field::Phone), Some("Phone number is required"));
        assert_eq!(
            err.message_for(Field::Password),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            err.message_for(Field::ConfirmPassword),
            Some("Confirm password is required")
        );
    }

    #[test]
    fn test_phone_must_be_numeric() {
        let form = SignupForm {
            phone: "+1 555".to_string(),
            ..valid_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.message_for(Field::Phone), Some("Phone number must be numeric"));
    }

    #[test]
    fn test_mismatched_passwords_reported_on_confirmation() {
        let form = SignupForm {
            confirm_password: "engine2".to_string(),
            ..valid_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(
            err.message_for(Field::ConfirmPassword),
            Some("Passwords don't match")
        );
    }

    #[test]
    fn test_credentials_reuse_email_and_password() {
        let creds = valid_form().validate().unwrap().credentials();
        assert_eq!(creds.email, "ada@example.com");
        assert_eq!(creds.password.expose_secret(), "engine1");
    }
}
