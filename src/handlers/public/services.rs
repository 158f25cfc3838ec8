// handlers/public/services.rs - Read-only catalog endpoints

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::database::models::{
    Audience, CategoryWithServices, PricingFilter, PricingType, ServiceFilter, ServiceMode,
};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::query_filter;
use crate::middleware::{ApiResponse, ApiResult};

pub const SERVICE_NOT_FOUND: &str = "Service not found";

fn audience_filter(query: &HashMap<String, String>) -> Result<Option<Audience>, ApiError> {
    query_filter(query, "audience", "Invalid audience")
}

/// GET /api/services/categories
pub async fn categories(store: &dyn Store) -> ApiResult<Value> {
    let categories = store.list_categories().await?;
    Ok(ApiResponse::success(json!({ "categories": categories })))
}

/// GET /api/services?audience=&category=
///
/// `audience` matches services for that audience plus those marked `both`.
pub async fn list(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let filter = ServiceFilter {
        audience: audience_filter(query)?,
        category_id: query_filter(query, "category", "Invalid category")?,
    };

    let services = store.list_services(&filter).await?;
    Ok(ApiResponse::success(json!({ "services": services })))
}

/// GET /api/services/:id
pub async fn get(store: &dyn Store, id: i64) -> ApiResult<Value> {
    let service = store
        .find_service(id)
        .await?
        .ok_or_else(|| ApiError::not_found(SERVICE_NOT_FOUND))?;
    Ok(ApiResponse::success(json!({ "service": service })))
}

/// GET /api/services/:id/pricing?type=&mode=
pub async fn pricing(
    store: &dyn Store,
    service_id: i64,
    query: &HashMap<String, String>,
) -> ApiResult<Value> {
    let filter = PricingFilter {
        pricing_type: query_filter::<PricingType>(query, "type", "Invalid pricing type")?,
        service_mode: query_filter::<ServiceMode>(query, "mode", "Invalid service mode")?,
    };

    if store.find_service(service_id).await?.is_none() {
        return Err(ApiError::not_found(SERVICE_NOT_FOUND));
    }

    let pricing = store.list_pricing(service_id, &filter).await?;
    Ok(ApiResponse::success(json!({ "pricing": pricing })))
}

/// GET /api/services/grouped/by-category?audience=
///
/// Categories in display order, each carrying its matching services.
/// Categories left with no services are dropped.
pub async fn grouped(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let filter = ServiceFilter {
        audience: audience_filter(query)?,
        category_id: None,
    };

    let categories = store.list_categories().await?;
    let mut services = store.list_services(&filter).await?;

    let grouped: Vec<CategoryWithServices> = categories
        .into_iter()
        .filter_map(|category| {
            let (mine, rest): (Vec<_>, Vec<_>) = services
                .drain(..)
                .partition(|s| s.service.category_id == category.id);
            services = rest;
            (!mine.is_empty()).then(|| CategoryWithServices {
                category,
                services: mine,
            })
        })
        .collect();

    Ok(ApiResponse::success(json!({ "categories": grouped })))
}
