// handlers/elevated/users.rs - GET /api/admin/users, PUT /api/admin/users/:id

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{AccountFlagsUpdate, PageRequest, Pagination, Role, MAX_PAGE};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{parse_choice, query_filter, NO_FIELDS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Newest first. `limit` is clamped to 1..=100 (default 20), `page` starts at 1.
pub async fn list(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let page: Option<i64> = query_filter(query, "page", "Invalid page")?;
    if matches!(page, Some(p) if p > MAX_PAGE) {
        return Err(ApiError::bad_request("Invalid page"));
    }
    let page = PageRequest::new(page, query_filter(query, "limit", "Invalid limit")?);
    let (users, total) = store.list_accounts(page).await?;

    Ok(ApiResponse::success(json!({
        "users": users,
        "pagination": Pagination::new(page, total),
    })))
}

/// Change an account's role or active flag.
///
/// Deactivation is the only removal; accounts are never deleted. An admin
/// cannot demote or deactivate itself.
pub async fn update(
    store: &dyn Store,
    admin: &AuthUser,
    id: i64,
    req: UpdateUserRequest,
) -> ApiResult<Value> {
    let role = req
        .role
        .as_deref()
        .map(|r| parse_choice::<Role>(r, "Invalid role"))
        .transpose()?;

    if role.is_none() && req.is_active.is_none() {
        return Err(ApiError::bad_request(NO_FIELDS));
    }
    if id == admin.id && (req.is_active == Some(false) || matches!(role, Some(Role::User))) {
        return Err(ApiError::bad_request(
            "Administrators cannot demote or deactivate themselves",
        ));
    }

    let account = store
        .update_account_flags(
            id,
            AccountFlagsUpdate {
                role,
                is_active: req.is_active,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(
        "Admin {} updated account {} (role={}, active={})",
        admin.id,
        account.id,
        account.role,
        account.is_active
    );
    Ok(ApiResponse::success(json!({ "user": account })))
}
