//! Contact form handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use meridian_core::Email;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// POST /api/contact/submit
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> Result<Json<Value>> {
    let (Some(name), Some(email), Some(subject), Some(message)) =
        (body.name, body.email, body.subject, body.message)
    else {
        return Err(AppError::BadRequest("All fields are required".into()));
    };
    if [&name, &email, &subject, &message]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::BadRequest("All fields are required".into()));
    }

    let email = Email::parse(&email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address".into()))?;

    state
        .email()
        .send_contact_message(&name, email.as_ref(), &subject, &message)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Your message was sent successfully. Thank you!",
    })))
}
