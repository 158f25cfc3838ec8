// handlers/public/contact.rs - POST /api/contact

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::NewContact;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{is_valid_email, non_blank, normalize_email, Required, INVALID_EMAIL};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Store a contact-form message with triage status `new`.
pub async fn submit(store: &dyn Store, req: ContactRequest) -> ApiResult<Value> {
    Required::new()
        .text("name", &req.name)
        .text("email", &req.email)
        .text("message", &req.message)
        .check()?;

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request(INVALID_EMAIL));
    }

    let submission = store
        .create_contact(NewContact {
            name: non_blank(req.name).unwrap_or_default(),
            email,
            phone: non_blank(req.phone),
            subject: non_blank(req.subject),
            message: non_blank(req.message).unwrap_or_default(),
        })
        .await?;

    tracing::info!("Contact submission {} received", submission.id);

    Ok(ApiResponse::created(json!({
        "submission_id": submission.id,
        "message": "Thank you for contacting us. We will get back to you soon!",
    })))
}
