use async_trait::async_trait;
use thiserror::Error;

use super::models::*;

/// Errors from a [`Store`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule on an email column was violated. Carries the client message.
    #[error("{0}")]
    DuplicateEmail(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub const DUPLICATE_ACCOUNT_EMAIL: &str = "Email already registered";
pub const DUPLICATE_PROVIDER_EMAIL: &str = "This email is already registered";

/// Persistence collaborator. One method per query shape the handlers need.
///
/// Owner-scoped methods take the owner's id and apply it in the same predicate
/// that selects the row, so a foreign row is indistinguishable from a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    // Accounts
    async fn email_registered(&self, email: &str) -> Result<bool, StoreError>;
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;
    /// Active accounts only.
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    /// Active accounts only.
    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError>;
    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<Account>, StoreError>;
    async fn list_accounts(&self, page: PageRequest) -> Result<(Vec<Account>, i64), StoreError>;
    async fn update_account_flags(
        &self,
        id: i64,
        update: AccountFlagsUpdate,
    ) -> Result<Option<Account>, StoreError>;

    // Catalog
    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, StoreError>;
    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceListing>, StoreError>;
    async fn find_service(&self, id: i64) -> Result<Option<ServiceListing>, StoreError>;
    async fn list_pricing(
        &self,
        service_id: i64,
        filter: &PricingFilter,
    ) -> Result<Vec<ServicePricing>, StoreError>;
    /// Every service, active or not.
    async fn list_all_services(&self) -> Result<Vec<ServiceListing>, StoreError>;
    async fn update_service(
        &self,
        id: i64,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, StoreError>;
    /// Every tier, active or not, optionally for one service.
    async fn list_all_pricing(
        &self,
        service_id: Option<i64>,
    ) -> Result<Vec<ServicePricing>, StoreError>;
    async fn update_pricing(
        &self,
        id: i64,
        update: PricingUpdate,
    ) -> Result<Option<ServicePricing>, StoreError>;

    // Bookings
    /// Prices the booking from its tier. `None` when the tier is missing or
    /// inactive, belongs to another service, or its type/mode differ from the
    /// booking's.
    async fn create_booking(&self, booking: NewBooking) -> Result<Option<Booking>, StoreError>;
    /// `owner = None` lists every booking.
    async fn list_bookings(
        &self,
        owner: Option<i64>,
        status: Option<BookingStatus>,
    ) -> Result<Vec<BookingView>, StoreError>;
    async fn find_booking(&self, id: i64, owner: i64) -> Result<Option<BookingView>, StoreError>;
    async fn update_booking_details(
        &self,
        id: i64,
        owner: i64,
        update: BookingDetailsUpdate,
    ) -> Result<UpdateOutcome<Booking>, StoreError>;
    async fn cancel_booking(&self, id: i64, owner: i64) -> Result<UpdateOutcome<Booking>, StoreError>;
    async fn admin_update_booking(
        &self,
        id: i64,
        update: AdminBookingUpdate,
    ) -> Result<UpdateOutcome<Booking>, StoreError>;

    // Providers
    async fn create_provider(&self, provider: NewProvider) -> Result<ServiceProvider, StoreError>;
    async fn find_provider(&self, id: i64) -> Result<Option<ServiceProvider>, StoreError>;
    async fn list_providers(
        &self,
        status: Option<ProviderStatus>,
    ) -> Result<Vec<ServiceProvider>, StoreError>;
    async fn update_provider_status(
        &self,
        id: i64,
        update: ProviderStatusUpdate,
    ) -> Result<Option<ServiceProvider>, StoreError>;

    // Contact submissions
    async fn create_contact(&self, contact: NewContact) -> Result<ContactSubmission, StoreError>;
    async fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactSubmission>, StoreError>;
    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<Option<ContactSubmission>, StoreError>;

    // Dashboard
    async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError>;
}
