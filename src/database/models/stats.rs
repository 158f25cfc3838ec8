use std::collections::BTreeMap;

use serde::Serialize;

use super::BookingView;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusBreakdown {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}

impl StatusBreakdown {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let by_status: BTreeMap<String, i64> = counts.into_iter().collect();
        Self {
            total: by_status.values().sum(),
            by_status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_services: i64,
    pub bookings: StatusBreakdown,
    pub providers: StatusBreakdown,
    pub new_contacts: i64,
    pub recent_bookings: Vec<BookingView>,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page number accepted; keeps `offset()` far inside `i64`.
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp raw query values: page to 1..=MAX_PAGE, limit to 1..=100.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: (total + request.limit - 1) / request.limit,
        }
    }
}
