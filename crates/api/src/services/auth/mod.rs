//! Authentication service.
//!
//! Passwordless sign-in: a 6-digit code is emailed to the address, stored
//! only as an argon2 hash, and exchanged for a user account on successful
//! verification. Codes are single-use, expire after ten minutes, and lock
//! out after five wrong guesses; issuance is capped per address with a
//! rolling one-hour window.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use meridian_core::Email;

use crate::db::otps::OtpRepository;
use crate::db::users::UserRepository;
use crate::models::{OtpRecord, User};
use crate::services::email::EmailService;

/// Maximum code requests per address inside the rolling window.
const MAX_REQUESTS_PER_WINDOW: i64 = 5;

/// Width of the issuance rate-limit window, in minutes.
const REQUEST_WINDOW_MINUTES: i64 = 60;

/// Authentication service.
///
/// Issues and verifies emailed one-time codes.
pub struct AuthService<'a> {
    otps: OtpRepository<'a>,
    users: UserRepository<'a>,
    email: &'a EmailService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self {
            otps: OtpRepository::new(pool),
            users: UserRepository::new(pool),
            email,
        }
    }

    /// Generate a fresh code for this address and email it.
    ///
    /// Any previously active code for the address is replaced. If the email
    /// can't be delivered the stored code is removed again so a later retry
    /// starts clean.
    ///
    /// Returns the code lifetime in seconds, for the client's countdown.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the address doesn't parse.
    /// Returns `AuthError::RateLimited` if the address has hit the issuance cap.
    /// Returns `AuthError::Dispatch` if the email fails to send.
    pub async fn send_code(&self, email: &str) -> Result<i64, AuthError> {
        let email = Email::parse(email)?;

        let window = Duration::minutes(REQUEST_WINDOW_MINUTES);
        let recent = self.otps.recent_request_count(&email, window).await?;
        if recent >= MAX_REQUESTS_PER_WINDOW {
            return Err(AuthError::RateLimited);
        }

        let code = generate_code();
        let code_hash = hash_code(&code)?;
        let expires_at = Utc::now() + Duration::seconds(OtpRecord::TTL_SECONDS);

        self.otps.record_request(&email).await?;
        self.otps.replace(&email, &code_hash, expires_at).await?;

        if let Err(e) = self.email.send_otp_code(email.as_ref(), &code).await {
            self.otps.delete(&email).await?;
            return Err(AuthError::Dispatch(e));
        }

        Ok(OtpRecord::TTL_SECONDS)
    }

    /// Verify a submitted code and sign the user in.
    ///
    /// On success the code is consumed and the account is created or
    /// refreshed with the given name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the address doesn't parse.
    /// Returns `AuthError::CodeNotFound` if no code is active for the address.
    /// Returns `AuthError::CodeExpired` if the active code has expired.
    /// Returns `AuthError::TooManyAttempts` if the attempt budget ran out.
    /// Returns `AuthError::WrongCode` if the code doesn't match.
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let code = code.trim();

        let record = self
            .otps
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::CodeNotFound)?;

        if record.is_expired() {
            self.otps.delete(&email).await?;
            return Err(AuthError::CodeExpired);
        }

        if record.attempts_exhausted() {
            self.otps.delete(&email).await?;
            return Err(AuthError::TooManyAttempts);
        }

        if !code_matches(code, &record.code_hash)? {
            let attempts = self.otps.increment_attempts(&email).await?;
            let spent = OtpRecord { attempts, ..record };
            return Err(AuthError::WrongCode {
                attempts_left: spent.attempts_left(),
            });
        }

        // Single-use: consume the code before touching the account.
        self.otps.delete(&email).await?;

        let user = self.users.upsert_login(&email, name.trim()).await?;
        Ok(user)
    }
}

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

/// Hash a code with argon2 for at-rest storage.
fn hash_code(code: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hash)
}

/// Check a submitted code against a stored hash.
fn code_matches(code: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::Hash)?;
    match Argon2::default().verify_password(code.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(AuthError::Hash),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_format() {
        let code = generate_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_code().parse().unwrap();
            assert!((100_000..1_000_000).contains(&code));
        }
    }

    #[test]
    fn test_hash_then_match() {
        let hash = hash_code("483920").unwrap();
        assert_ne!(hash, "483920");
        assert!(code_matches("483920", &hash).unwrap());
        assert!(!code_matches("483921", &hash).unwrap());
    }

    #[test]
    fn test_code_matches_rejects_garbage_hash() {
        assert!(code_matches("483920", "not-a-phc-string").is_err());
    }
}

#[cfg(all(test, feature = "pg-tests"))]
#[allow(clippy::unwrap_used)]
mod pg_tests {
    use super::*;

    async fn plant_code(pool: &PgPool, address: &str, code: &str) {
        let email = Email::parse(address).unwrap();
        let hash = hash_code(code).unwrap();
        let expires_at = Utc::now() + Duration::seconds(OtpRecord::TTL_SECONDS);
        OtpRepository::new(pool)
            .replace(&email, &hash, expires_at)
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn test_verified_code_cannot_be_used_twice(pool: PgPool) {
        let email_service = EmailService::new(None).unwrap();
        let auth = AuthService::new(&pool, &email_service);
        plant_code(&pool, "user@example.com", "123456").await;

        let user = auth
            .verify_code("user@example.com", "123456", "Test User")
            .await
            .unwrap();
        assert_eq!(user.email.as_ref(), "user@example.com");
        assert_eq!(user.name, "Test User");

        // The code was consumed on success.
        let second = auth
            .verify_code("user@example.com", "123456", "Test User")
            .await;
        assert!(matches!(second, Err(AuthError::CodeNotFound)));
    }

    #[sqlx::test]
    async fn test_wrong_code_burns_an_attempt(pool: PgPool) {
        let email_service = EmailService::new(None).unwrap();
        let auth = AuthService::new(&pool, &email_service);
        plant_code(&pool, "user@example.com", "123456").await;

        let wrong = auth
            .verify_code("user@example.com", "000000", "Test User")
            .await;
        assert!(matches!(
            wrong,
            Err(AuthError::WrongCode { attempts_left: 4 })
        ));

        // The right code still works after a miss.
        auth.verify_code("user@example.com", "123456", "Test User")
            .await
            .unwrap();
    }
}
