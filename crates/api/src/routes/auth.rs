//! Passwordless sign-in handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// The submitted code; frontends send it as either a string or a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CodeField {
    Text(String),
    Number(u64),
}

impl CodeField {
    fn as_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    otp: Option<CodeField>,
    #[serde(default)]
    name: Option<String>,
}

/// POST /api/auth/send-otp
pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<Value>> {
    let email = body.email.unwrap_or_default();

    let service = AuthService::new(state.pool(), state.email());
    let expires_in = service.send_code(&email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Verification code sent to your email",
        "expiresIn": expires_in,
    })))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<Value>> {
    let (Some(email), Some(otp)) = (body.email, body.otp) else {
        return Err(AppError::BadRequest("Email and OTP are required".into()));
    };

    let name = body.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }

    let service = AuthService::new(state.pool(), state.email());
    let user = service
        .verify_code(&email, &otp.as_string(), &name)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Verification successful",
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
        },
    })))
}
