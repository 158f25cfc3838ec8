// handlers/protected/bookings.rs - Owner-scoped booking endpoints
//
// The owner's id is part of every query predicate, so another account's
// booking is reported exactly like a missing one.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{
    BookingDetailsUpdate, BookingStatus, NewBooking, PricingType, ServiceMode, UpdateOutcome,
};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{
    lenient_id, non_blank, parse_choice, parse_date, query_filter, Required, NO_FIELDS,
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub const BOOKING_NOT_FOUND: &str = "Booking not found";
pub const INVALID_PRICING: &str = "Invalid pricing option";
pub const NOT_CANCELLABLE: &str = "Cannot cancel this booking";
pub const NOT_EDITABLE: &str = "Booking can no longer be modified";

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub service_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub pricing_id: Option<i64>,
    pub booking_type: Option<String>,
    pub service_mode: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_info: Option<Value>,
    pub service_address: Option<String>,
    pub special_requirements: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingRequest {
    pub service_address: Option<String>,
    pub special_requirements: Option<String>,
}

/// POST /api/bookings
///
/// Expected Input:
/// ```json
/// { "service_id": 1, "pricing_id": 2, "booking_type": "visit",
///   "service_mode": "non_resident", "start_date": "2026-11-01",
///   "service_address": "1 Main St" }
/// ```
///
/// `total_price` is taken from the pricing tier and frozen on the booking.
pub async fn create(store: &dyn Store, user: &AuthUser, req: CreateBookingRequest) -> ApiResult<Value> {
    Required::new()
        .value("service_id", &req.service_id)
        .value("pricing_id", &req.pricing_id)
        .text("booking_type", &req.booking_type)
        .text("service_mode", &req.service_mode)
        .text("start_date", &req.start_date)
        .text("service_address", &req.service_address)
        .check()?;

    let booking_type: PricingType =
        parse_choice(req.booking_type.as_deref().unwrap_or_default(), "Invalid booking type")?;
    let service_mode: ServiceMode =
        parse_choice(req.service_mode.as_deref().unwrap_or_default(), "Invalid service mode")?;
    let start_date = parse_date(req.start_date.as_deref().unwrap_or_default(), "start_date")?;
    let end_date = non_blank(req.end_date)
        .map(|d| parse_date(&d, "end_date"))
        .transpose()?;

    if matches!(end_date, Some(end) if end < start_date) {
        return Err(ApiError::bad_request("end_date cannot be before start_date"));
    }

    let booking = store
        .create_booking(NewBooking {
            user_id: user.id,
            service_id: req.service_id.unwrap_or_default(),
            pricing_id: req.pricing_id.unwrap_or_default(),
            booking_type,
            service_mode,
            start_date,
            end_date,
            duration_info: req.duration_info.filter(|v| !v.is_null()),
            service_address: non_blank(req.service_address).unwrap_or_default(),
            special_requirements: non_blank(req.special_requirements),
        })
        .await?
        .ok_or_else(|| ApiError::bad_request(INVALID_PRICING))?;

    tracing::info!(
        "Account {} created booking {} at {}",
        user.id,
        booking.id,
        booking.total_price
    );

    Ok(ApiResponse::created(json!({
        "booking_id": booking.id,
        "booking": booking,
    })))
}

/// GET /api/bookings?status=
pub async fn list(
    store: &dyn Store,
    user: &AuthUser,
    query: &HashMap<String, String>,
) -> ApiResult<Value> {
    let status: Option<BookingStatus> = query_filter(query, "status", "Invalid status")?;
    let bookings = store.list_bookings(Some(user.id), status).await?;
    Ok(ApiResponse::success(json!({ "bookings": bookings })))
}

/// GET /api/bookings/:id
pub async fn get(store: &dyn Store, user: &AuthUser, id: i64) -> ApiResult<Value> {
    let booking = store
        .find_booking(id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(BOOKING_NOT_FOUND))?;
    Ok(ApiResponse::success(json!({ "booking": booking })))
}

/// PUT /api/bookings/:id - change address or requirements before work starts
pub async fn update(
    store: &dyn Store,
    user: &AuthUser,
    id: i64,
    req: UpdateBookingRequest,
) -> ApiResult<Value> {
    let update = BookingDetailsUpdate {
        service_address: non_blank(req.service_address),
        special_requirements: req.special_requirements.map(|s| s.trim().to_string()),
    };
    if update.service_address.is_none() && update.special_requirements.is_none() {
        return Err(ApiError::bad_request(NO_FIELDS));
    }

    match store.update_booking_details(id, user.id, update).await? {
        UpdateOutcome::Applied(booking) => {
            tracing::info!("Account {} updated booking {}", user.id, booking.id);
            Ok(ApiResponse::success(json!({ "booking": booking })))
        }
        UpdateOutcome::NotFound => Err(ApiError::not_found(BOOKING_NOT_FOUND)),
        UpdateOutcome::Rejected => Err(ApiError::bad_request(NOT_EDITABLE)),
    }
}

/// PUT /api/bookings/:id/cancel
///
/// One conditional update; a finished or already-cancelled booking is left
/// untouched and reported as 400.
pub async fn cancel(store: &dyn Store, user: &AuthUser, id: i64) -> ApiResult<Value> {
    match store.cancel_booking(id, user.id).await? {
        UpdateOutcome::Applied(booking) => {
            tracing::info!("Account {} cancelled booking {}", user.id, booking.id);
            Ok(ApiResponse::success(json!({
                "booking": booking,
                "message": "Booking cancelled successfully",
            })))
        }
        UpdateOutcome::NotFound => Err(ApiError::not_found(BOOKING_NOT_FOUND)),
        UpdateOutcome::Rejected => Err(ApiError::bad_request(NOT_CANCELLABLE)),
    }
}
