//! One-time passcode record.

use chrono::{DateTime, Utc};

use meridian_core::Email;

/// A live one-time passcode bound to an email address.
///
/// Only the argon2 hash of the code is ever stored; the plaintext exists on
/// the stack between generation and SMTP hand-off and nowhere else. At most
/// one record exists per email (issuing a new code deletes the old record).
#[derive(Debug, Clone)]
pub struct OtpRecord {
    /// Normalized email address the code was issued to.
    pub email: Email,
    /// Argon2 hash of the 6-digit code.
    pub code_hash: String,
    /// Failed verification attempts against this record.
    pub attempts: i32,
    /// Hard expiry; issuance time + [`OtpRecord::TTL_SECONDS`].
    pub expires_at: DateTime<Utc>,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Lifetime of a code, in seconds (10 minutes).
    pub const TTL_SECONDS: i64 = 600;

    /// Wrong-code attempts allowed before the record is invalidated.
    pub const MAX_ATTEMPTS: i32 = 5;

    /// Whether the code has passed its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whether failed attempts have exhausted this record.
    #[must_use]
    pub const fn attempts_exhausted(&self) -> bool {
        self.attempts >= Self::MAX_ATTEMPTS
    }

    /// Wrong-code attempts remaining before exhaustion; never negative.
    #[must_use]
    pub const fn attempts_left(&self) -> i32 {
        let left = Self::MAX_ATTEMPTS - self.attempts;
        if left > 0 { left } else { 0 }
    }
}
