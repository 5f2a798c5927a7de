//! Boutique Core - Shared types library.
//!
//! This crate provides the domain types used across all Boutique components:
//! - `storefront` - Server-rendered storefront in front of the upstream REST API
//! - `cli` - Command-line tools for migrations and auth smoke checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session handling. Everything here is deterministic given its
//! inputs, which keeps validation and product derivation trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Email, credentials, signup schema, products and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
