//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Passwordless sign-in with emailed one-time codes
//! - `email` - Transactional email (sign-in codes, order confirmations,
//!   contact form relay)

pub mod auth;
pub mod email;
