use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use super::{PricingType, ServiceMode};

text_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl BookingStatus {
    /// Position along the forward path. `Cancelled` sits off the path.
    fn rank(&self) -> Option<u8> {
        match self {
            BookingStatus::Pending => Some(0),
            BookingStatus::Confirmed => Some(1),
            BookingStatus::InProgress => Some(2),
            BookingStatus::Completed => Some(3),
            BookingStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Owners may cancel anything that has not finished.
    pub fn is_cancellable(&self) -> bool {
        !self.is_terminal()
    }

    /// Owners may edit address and requirements before work starts.
    pub fn is_editable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        if *self == to {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), to.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    /// Every status from which `to` is reachable in one step.
    pub fn allowed_predecessors(to: BookingStatus) -> Vec<BookingStatus> {
        BookingStatus::ALL
            .iter()
            .copied()
            .filter(|from| from.can_transition_to(to))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub pricing_id: i64,
    pub booking_type: PricingType,
    pub service_mode: ServiceMode,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub duration_info: Option<Value>,
    /// Copied from the pricing tier at creation and never recomputed.
    pub total_price: Decimal,
    pub service_address: String,
    pub special_requirements: Option<String>,
    pub notes: Option<String>,
    pub assigned_provider_id: Option<i64>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking joined with display fields from its service, tier, owner and provider.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub booking: Booking,
    pub service_name: String,
    pub category_name: String,
    /// Current tier price, which may differ from `total_price`.
    pub price: Decimal,
    pub duration_type: Option<String>,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub provider_name: Option<String>,
    pub provider_phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub service_id: i64,
    pub pricing_id: i64,
    pub booking_type: PricingType,
    pub service_mode: ServiceMode,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub duration_info: Option<Value>,
    pub service_address: String,
    pub special_requirements: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingDetailsUpdate {
    pub service_address: Option<String>,
    pub special_requirements: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdminBookingUpdate {
    pub status: BookingStatus,
    pub assigned_provider_id: Option<i64>,
    pub notes: Option<String>,
}

/// Result of a conditional single-row update.
#[derive(Debug, Clone)]
pub enum UpdateOutcome<T> {
    Applied(T),
    /// No row with that id (within the caller's scope).
    NotFound,
    /// The row exists but its current state forbids the update.
    Rejected,
}
