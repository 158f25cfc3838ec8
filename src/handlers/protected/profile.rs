// handlers/protected/profile.rs - GET /api/auth/me, PUT /api/auth/profile

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::ProfileUpdate;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::NO_FIELDS;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub const USER_NOT_FOUND: &str = "User not found";

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub business_name: Option<String>,
}

pub async fn me(store: &dyn Store, user: &AuthUser) -> ApiResult<Value> {
    let account = store
        .find_account(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    Ok(ApiResponse::success(json!({ "user": account })))
}

/// Omitted fields keep their stored value. `full_name` may not be blanked.
pub async fn update(store: &dyn Store, user: &AuthUser, req: ProfileRequest) -> ApiResult<Value> {
    let trim = |v: Option<String>| v.map(|s| s.trim().to_string());

    let update = ProfileUpdate {
        full_name: trim(req.full_name),
        phone: trim(req.phone),
        address: trim(req.address),
        city: trim(req.city),
        business_name: trim(req.business_name),
    };

    if update.is_empty() {
        return Err(ApiError::bad_request(NO_FIELDS));
    }
    if matches!(update.full_name.as_deref(), Some("")) {
        return Err(ApiError::bad_request("Full name cannot be empty"));
    }

    let account = store
        .update_profile(user.id, update)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    tracing::info!("Account {} updated profile", account.id);
    Ok(ApiResponse::success(json!({ "user": account })))
}
