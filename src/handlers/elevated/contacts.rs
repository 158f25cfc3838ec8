// handlers/elevated/contacts.rs - GET /api/admin/contacts, PUT /api/admin/contacts/:id

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::ContactStatus;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{parse_choice, query_filter, Required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct ContactStatusRequest {
    pub status: Option<String>,
}

pub async fn list(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let status: Option<ContactStatus> = query_filter(query, "status", "Invalid status")?;
    let submissions = store.list_contacts(status).await?;
    Ok(ApiResponse::success(json!({ "submissions": submissions })))
}

pub async fn update(
    store: &dyn Store,
    admin: &AuthUser,
    id: i64,
    req: ContactStatusRequest,
) -> ApiResult<Value> {
    Required::new().text("status", &req.status).check()?;
    let status: ContactStatus =
        parse_choice(req.status.as_deref().unwrap_or_default(), "Invalid status")?;

    let submission = store
        .update_contact_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Submission not found"))?;

    tracing::info!("Admin {} marked contact {} as {}", admin.id, submission.id, submission.status);
    Ok(ApiResponse::success(json!({ "submission": submission })))
}
