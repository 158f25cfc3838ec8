// handlers/elevated/bookings.rs - GET /api/admin/bookings, PUT /api/admin/bookings/:id

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{AdminBookingUpdate, BookingStatus, UpdateOutcome};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::protected::bookings::BOOKING_NOT_FOUND;
use crate::handlers::validate::{lenient_id, non_blank, parse_choice, query_filter, Required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub const INVALID_TRANSITION: &str = "Invalid status transition";

#[derive(Debug, Default, Deserialize)]
pub struct AdminBookingRequest {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub assigned_provider_id: Option<i64>,
    pub notes: Option<String>,
}

/// GET /api/admin/bookings?status=
pub async fn list(store: &dyn Store, query: &HashMap<String, String>) -> ApiResult<Value> {
    let status: Option<BookingStatus> = query_filter(query, "status", "Invalid status")?;
    let bookings = store.list_bookings(None, status).await?;
    Ok(ApiResponse::success(json!({ "bookings": bookings })))
}

/// PUT /api/admin/bookings/:id
///
/// Moves follow the booking lifecycle: forward along
/// pending → confirmed → in_progress → completed, or to cancelled from any
/// open state. Re-sending the current status only updates provider/notes.
pub async fn update(
    store: &dyn Store,
    admin: &AuthUser,
    id: i64,
    req: AdminBookingRequest,
) -> ApiResult<Value> {
    Required::new().text("status", &req.status).check()?;
    let status: BookingStatus =
        parse_choice(req.status.as_deref().unwrap_or_default(), "Invalid status")?;

    if let Some(provider_id) = req.assigned_provider_id {
        if store.find_provider(provider_id).await?.is_none() {
            return Err(ApiError::bad_request("Assigned provider does not exist"));
        }
    }

    let update = AdminBookingUpdate {
        status,
        assigned_provider_id: req.assigned_provider_id,
        notes: non_blank(req.notes),
    };

    match store.admin_update_booking(id, update).await? {
        UpdateOutcome::Applied(booking) => {
            tracing::info!("Admin {} set booking {} to {}", admin.id, booking.id, booking.status);
            Ok(ApiResponse::success(json!({ "booking": booking })))
        }
        UpdateOutcome::NotFound => Err(ApiError::not_found(BOOKING_NOT_FOUND)),
        UpdateOutcome::Rejected => Err(ApiError::bad_request(INVALID_TRANSITION)),
    }
}
