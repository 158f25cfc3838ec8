// handlers/elevated/providers.rs - GET /api/admin/providers, PUT /api/admin/providers/:id

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{ProviderStatus, ProviderStatusUpdate};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{non_blank, parse_choice, query_filter, Required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct ProviderStatusRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

pub async fn list(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let status: Option<ProviderStatus> = query_filter(query, "status", "Invalid status")?;
    let providers = store.list_providers(status).await?;
    Ok(ApiResponse::success(json!({ "providers": providers })))
}

pub async fn update(
    store: &dyn Store,
    admin: &AuthUser,
    id: i64,
    req: ProviderStatusRequest,
) -> ApiResult<Value> {
    Required::new().text("status", &req.status).check()?;
    let status: ProviderStatus =
        parse_choice(req.status.as_deref().unwrap_or_default(), "Invalid status")?;

    let provider = store
        .update_provider_status(
            id,
            ProviderStatusUpdate {
                status,
                notes: non_blank(req.notes),
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Provider not found"))?;

    tracing::info!("Admin {} set provider {} to {}", admin.id, provider.id, provider.status);
    Ok(ApiResponse::success(json!({ "provider": provider })))
}
