// handlers/public/health.rs - GET /api/health

use serde_json::{json, Value};

use crate::database::store::Store;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn check(store: &dyn Store) -> ApiResult<Value> {
    store.health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Database temporarily unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
