// handlers/elevated/catalog.rs - Admin service and pricing management

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{PricingUpdate, ServiceUpdate};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{non_blank, query_filter, NO_FIELDS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct ServiceUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PricingUpdateRequest {
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Prices are stored as NUMERIC(10, 2).
const PRICE_SCALE: u32 = 2;
const PRICE_DIGITS: u32 = 10;

fn check_price(price: Decimal) -> Result<(), ApiError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ApiError::bad_request("Price cannot be negative"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ApiError::bad_request("Price cannot have more than 2 decimal places"));
    }
    let limit = Decimal::from(10_i64.pow(PRICE_DIGITS - PRICE_SCALE));
    if price >= limit {
        return Err(ApiError::bad_request(format!("Price must be less than {}", limit)));
    }
    Ok(())
}

/// GET /api/admin/services - includes inactive services
pub async fn list_services(store: &dyn Store) -> ApiResult<Value> {
    let services = store.list_all_services().await?;
    Ok(ApiResponse::success(json!({ "services": services })))
}

/// PUT /api/admin/services/:id
pub async fn update_service(
    store: &dyn Store,
    admin: &AuthUser,
    id: i64,
    req: ServiceUpdateRequest,
) -> ApiResult<Value> {
    if matches!(req.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(ApiError::bad_request("Service name cannot be empty"));
    }

    let update = ServiceUpdate {
        name: non_blank(req.name),
        description: req.description.map(|d| d.trim().to_string()),
        is_active: req.is_active,
    };
    if update.name.is_none() && update.description.is_none() && update.is_active.is_none() {
        return Err(ApiError::bad_request(NO_FIELDS));
    }

    let service = store
        .update_service(id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Service not found"))?;

    tracing::info!("Admin {} updated service {}", admin.id, service.id);
    Ok(ApiResponse::success(json!({ "service": service })))
}

/// GET /api/admin/pricing?service_id=
pub async fn list_pricing(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let service_id: Option<i64> = query_filter(query, "service_id", "Invalid service_id")?;
    let pricing = store.list_all_pricing(service_id).await?;
    Ok(ApiResponse::success(json!({ "pricing": pricing })))
}

/// PUT /api/admin/pricing/:id
///
/// Existing bookings keep the price they were created with.
pub async fn update_pricing(
    store: &dyn Store,
    admin: &AuthUser,
    id: i64,
    req: PricingUpdateRequest,
) -> ApiResult<Value> {
    if let Some(price) = req.price {
        check_price(price)?;
    }

    let update = PricingUpdate {
        price: req.price,
        description: req.description.map(|d| d.trim().to_string()),
        is_active: req.is_active,
    };
    if update.price.is_none() && update.description.is_none() && update.is_active.is_none() {
        return Err(ApiError::bad_request(NO_FIELDS));
    }

    let tier = store
        .update_pricing(id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Pricing option not found"))?;

    tracing::info!("Admin {} updated pricing {} to {}", admin.id, tier.id, tier.price);
    Ok(ApiResponse::success(json!({ "pricing": tier })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn prices_fit_the_column() {
        assert!(check_price(price("0")).is_ok());
        assert!(check_price(price("150.50")).is_ok());
        assert!(check_price(price("150.500")).is_ok());
        assert!(check_price(price("99999999.99")).is_ok());

        assert!(check_price(price("-0.01")).is_err());
        assert!(check_price(price("10.005")).is_err());
        assert!(check_price(price("100000000")).is_err());
        assert!(check_price(price("1000000000000")).is_err());
    }
}
