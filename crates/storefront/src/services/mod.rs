//! Business logic services for the storefront.
//!
//! - `auth` - Sign-in and sign-up against the upstream API

pub mod auth;
