//! Field-level validation errors shared by every form schema.

use core::fmt;

use serde::Serialize;

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Password,
    ConfirmPassword,
}

impl Field {
    /// The HTML form name of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One offending field and the message to show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// A schema check failed on one or more fields.
///
/// Fields are listed in the order the schema checks them, at most one
/// message per field (the first failing rule wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Record a failure for `field` unless that field already has one.
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        if self.message_for(field).is_none() {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    /// Returns `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// The message recorded for `field`, if any.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// All offending fields, in schema order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(&error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut err = ValidationError::default();
        err.push(Field::Phone, "Phone number is required");
        err.push(Field::Phone, "Phone number must be numeric");

        assert_eq!(err.errors().len(), 1);
        assert_eq!(
            err.message_for(Field::Phone),
            Some("Phone number is required")
        );
    }

    #[test]
    fn test_display_joins_messages_in_order() {
        let mut err = ValidationError::default();
        err.push(Field::Email, "Invalid email address");
        err.push(Field::Password, "Password must be at least 6 characters");

        assert_eq!(
            err.to_string(),
            "Invalid email address; Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationError::default().into_result(7), Ok(7));

        let mut err = ValidationError::default();
        err.push(Field::Email, "Invalid email address");
        assert!(err.into_result(7).is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::ConfirmPassword.name(), "confirm_password");
        assert_eq!(Field::FirstName.to_string(), "first_name");
    }
}
