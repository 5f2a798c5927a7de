//! Core types for Boutique.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod credentials;
pub mod email;
pub mod price;
pub mod product;
pub mod signup;
pub mod validation;

pub use credentials::{Credentials, MIN_PASSWORD_LENGTH};
pub use email::{Email, EmailError};
pub use price::{CurrencyCode, Price};
pub use product::{CUSTOM_SIZE, CartLabel, Product, ProductVariant, VariantSelection};
pub use signup::{RegistrationInput, SignupForm};
pub use validation::{Field, FieldError, ValidationError};
