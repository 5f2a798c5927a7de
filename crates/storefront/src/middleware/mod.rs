//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing, one request id per span)
//! 3. Session layer (tower-sessions, `PostgreSQL` or in-memory store)
//! 4. Rate limiting on `/auth` (governor)

pub mod rate_limit;
pub mod session;

pub use rate_limit::auth_rate_limiter;
pub use session::create_session_layer;
