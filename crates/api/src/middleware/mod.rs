//! HTTP middleware stack for the store API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS
//! 4. Rate limiting (governor, auth routes only)

pub mod rate_limit;

pub use rate_limit::auth_rate_limiter;
