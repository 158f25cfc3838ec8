// handlers/elevated/stats.rs - GET /api/admin/stats (alias: /api/admin/dashboard)

use serde_json::{json, Value};

use crate::database::store::Store;
use crate::middleware::{ApiResponse, ApiResult};

/// Account, catalog, booking, provider and contact counts plus the ten most
/// recent bookings.
pub async fn dashboard(store: &dyn Store) -> ApiResult<Value> {
    let stats = store.dashboard_stats().await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}
