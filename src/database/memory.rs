//! In-process [`Store`] used by tests and `serve --memory-store`.
//!
//! Mirrors the Postgres predicates (ownership, active flags, ordering) over
//! plain vectors guarded by one lock. Every mutation takes the write lock for
//! its whole check-and-set, which gives the same single-statement atomicity
//! the SQL store relies on.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::models::*;
use super::store::{Store, StoreError, DUPLICATE_ACCOUNT_EMAIL, DUPLICATE_PROVIDER_EMAIL};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    accounts: Vec<Account>,
    categories: Vec<ServiceCategory>,
    services: Vec<Service>,
    pricing: Vec<ServicePricing>,
    bookings: Vec<Booking>,
    providers: Vec<ServiceProvider>,
    contacts: Vec<ContactSubmission>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn listing(&self, service: &Service) -> Option<ServiceListing> {
        let category = self.categories.iter().find(|c| c.id == service.category_id)?;
        Some(ServiceListing {
            service: service.clone(),
            category_name: category.name.clone(),
            category_icon: category.icon.clone(),
        })
    }

    fn category_order(&self, listing: &ServiceListing) -> i32 {
        self.categories
            .iter()
            .find(|c| c.id == listing.service.category_id)
            .map(|c| c.display_order)
            .unwrap_or_default()
    }

    fn sort_listings(&self, listings: &mut [ServiceListing]) {
        listings.sort_by(|a, b| {
            self.category_order(a)
                .cmp(&self.category_order(b))
                .then_with(|| a.service.name.cmp(&b.service.name))
        });
    }

    /// Inner joins on service, category, tier and owner; left join on provider.
    fn view(&self, booking: &Booking) -> Option<BookingView> {
        let service = self.services.iter().find(|s| s.id == booking.service_id)?;
        let category = self.categories.iter().find(|c| c.id == service.category_id)?;
        let tier = self.pricing.iter().find(|p| p.id == booking.pricing_id)?;
        let owner = self.accounts.iter().find(|a| a.id == booking.user_id)?;
        let provider = booking
            .assigned_provider_id
            .and_then(|id| self.providers.iter().find(|p| p.id == id));

        Some(BookingView {
            booking: booking.clone(),
            service_name: service.name.clone(),
            category_name: category.name.clone(),
            price: tier.price,
            duration_type: tier.duration_type.clone(),
            user_name: owner.full_name.clone(),
            user_email: owner.email.clone(),
            user_phone: owner.phone.clone(),
            provider_name: provider.map(|p| p.full_name.clone()),
            provider_phone: provider.map(|p| p.phone.clone()),
        })
    }

    /// Newest first, id as the tiebreaker for rows created in the same instant.
    fn newest_views<'a>(&self, bookings: impl Iterator<Item = &'a Booking>) -> Vec<BookingView> {
        let mut rows: Vec<&Booking> = bookings.collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.into_iter().filter_map(|b| self.view(b)).collect()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_category(&self, name: &str, display_order: i32) -> ServiceCategory {
        let mut t = self.tables.write().await;
        let category = ServiceCategory {
            id: t.next_id(),
            name: name.to_string(),
            name_ar: None,
            description: None,
            icon: None,
            display_order,
            is_active: true,
            created_at: Utc::now(),
        };
        t.categories.push(category.clone());
        category
    }

    pub async fn seed_service(&self, category_id: i64, name: &str, audience: Audience) -> Service {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let service = Service {
            id: t.next_id(),
            category_id,
            name: name.to_string(),
            name_ar: None,
            description: None,
            target_audience: audience,
            service_type: ServiceType::Both,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.services.push(service.clone());
        service
    }

    pub async fn seed_pricing(
        &self,
        service_id: i64,
        pricing_type: PricingType,
        service_mode: ServiceMode,
        price: Decimal,
    ) -> ServicePricing {
        let mut t = self.tables.write().await;
        let tier = ServicePricing {
            id: t.next_id(),
            service_id,
            pricing_type,
            service_mode,
            duration_type: None,
            price,
            currency: "SAR".to_string(),
            description: None,
            is_active: true,
            created_at: Utc::now(),
        };
        t.pricing.push(tier.clone());
        tier
    }

    /// A small catalog so a fresh in-memory server has something to browse.
    pub async fn seed_demo_catalog(&self) {
        let cleaning = self.seed_category("Cleaning", 1).await;
        let care = self.seed_category("Home Care", 2).await;

        let house = self.seed_service(cleaning.id, "House Cleaning", Audience::Both).await;
        self.seed_pricing(house.id, PricingType::Visit, ServiceMode::NonResident, Decimal::new(150, 0))
            .await;
        self.seed_pricing(house.id, PricingType::Contract, ServiceMode::Resident, Decimal::new(2500, 0))
            .await;

        let office = self.seed_service(cleaning.id, "Office Cleaning", Audience::Business).await;
        self.seed_pricing(office.id, PricingType::Visit, ServiceMode::NonResident, Decimal::new(300, 0))
            .await;

        let elderly = self.seed_service(care.id, "Elderly Care", Audience::Individual).await;
        self.seed_pricing(elderly.id, PricingType::Contract, ServiceMode::Resident, Decimal::new(3200, 0))
            .await;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        let t = self.tables.read().await;
        Ok(t.accounts.iter().any(|a| a.is_active && a.email == email))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut t = self.tables.write().await;
        if t.accounts.iter().any(|a| a.is_active && a.email == account.email) {
            return Err(StoreError::DuplicateEmail(DUPLICATE_ACCOUNT_EMAIL.to_string()));
        }

        let now = Utc::now();
        let row = Account {
            id: t.next_id(),
            email: account.email,
            password_hash: account.password_hash,
            full_name: account.full_name,
            role: account.role,
            account_type: account.account_type,
            business_name: account.business_name,
            business_registration: account.business_registration,
            phone: account.phone,
            address: account.address,
            city: account.city,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.accounts.push(row.clone());
        Ok(row)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.accounts.iter().find(|a| a.is_active && a.email == email).cloned())
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.accounts.iter().find(|a| a.is_active && a.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(account) = t.accounts.iter_mut().find(|a| a.is_active && a.id == id) else {
            return Ok(None);
        };

        if let Some(v) = update.full_name {
            account.full_name = v;
        }
        if let Some(v) = update.phone {
            account.phone = Some(v);
        }
        if let Some(v) = update.address {
            account.address = Some(v);
        }
        if let Some(v) = update.city {
            account.city = Some(v);
        }
        if let Some(v) = update.business_name {
            account.business_name = Some(v);
        }
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn list_accounts(&self, page: PageRequest) -> Result<(Vec<Account>, i64), StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<&Account> = t.accounts.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = rows.len() as i64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update_account_flags(
        &self,
        id: i64,
        update: AccountFlagsUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let mut t = self.tables.write().await;

        // Reactivating must not produce two active accounts with one email.
        if update.is_active == Some(true) {
            let email = t.accounts.iter().find(|a| a.id == id).map(|a| a.email.clone());
            if let Some(email) = email {
                if t.accounts.iter().any(|a| a.id != id && a.is_active && a.email == email) {
                    return Err(StoreError::DuplicateEmail(DUPLICATE_ACCOUNT_EMAIL.to_string()));
                }
            }
        }

        let Some(account) = t.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(role) = update.role {
            account.role = role;
        }
        if let Some(active) = update.is_active {
            account.is_active = active;
        }
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServiceCategory> =
            t.categories.iter().filter(|c| c.is_active).cloned().collect();
        rows.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceListing>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServiceListing> = t
            .services
            .iter()
            .filter(|s| s.is_active)
            .filter(|s| filter.audience.map_or(true, |a| s.target_audience.serves(a)))
            .filter(|s| filter.category_id.map_or(true, |c| s.category_id == c))
            .filter_map(|s| t.listing(s))
            .collect();
        t.sort_listings(&mut rows);
        Ok(rows)
    }

    async fn find_service(&self, id: i64) -> Result<Option<ServiceListing>, StoreError> {
        let t = self.tables.read().await;
        Ok(t
            .services
            .iter()
            .find(|s| s.id == id && s.is_active)
            .and_then(|s| t.listing(s)))
    }

    async fn list_pricing(
        &self,
        service_id: i64,
        filter: &PricingFilter,
    ) -> Result<Vec<ServicePricing>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServicePricing> = t
            .pricing
            .iter()
            .filter(|p| p.service_id == service_id && p.is_active)
            .filter(|p| filter.pricing_type.map_or(true, |v| p.pricing_type == v))
            .filter(|p| filter.service_mode.map_or(true, |v| p.service_mode == v))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn list_all_services(&self) -> Result<Vec<ServiceListing>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServiceListing> =
            t.services.iter().filter_map(|s| t.listing(s)).collect();
        t.sort_listings(&mut rows);
        Ok(rows)
    }

    async fn update_service(
        &self,
        id: i64,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(service) = t.services.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.name {
            service.name = v;
        }
        if let Some(v) = update.description {
            service.description = Some(v);
        }
        if let Some(v) = update.is_active {
            service.is_active = v;
        }
        service.updated_at = Utc::now();
        Ok(Some(service.clone()))
    }

    async fn list_all_pricing(
        &self,
        service_id: Option<i64>,
    ) -> Result<Vec<ServicePricing>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServicePricing> = t
            .pricing
            .iter()
            .filter(|p| service_id.map_or(true, |s| p.service_id == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.service_id
                .cmp(&b.service_id)
                .then(a.price.cmp(&b.price))
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn update_pricing(
        &self,
        id: i64,
        update: PricingUpdate,
    ) -> Result<Option<ServicePricing>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(tier) = t.pricing.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.price {
            tier.price = v;
        }
        if let Some(v) = update.description {
            tier.description = Some(v);
        }
        if let Some(v) = update.is_active {
            tier.is_active = v;
        }
        Ok(Some(tier.clone()))
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Option<Booking>, StoreError> {
        let mut t = self.tables.write().await;
        let price = t
            .pricing
            .iter()
            .find(|p| {
                p.id == booking.pricing_id
                    && p.service_id == booking.service_id
                    && p.is_active
                    && p.pricing_type == booking.booking_type
                    && p.service_mode == booking.service_mode
            })
            .map(|p| p.price);
        let Some(total_price) = price else {
            return Ok(None);
        };

        let now = Utc::now();
        let row = Booking {
            id: t.next_id(),
            user_id: booking.user_id,
            service_id: booking.service_id,
            pricing_id: booking.pricing_id,
            booking_type: booking.booking_type,
            service_mode: booking.service_mode,
            start_date: booking.start_date,
            end_date: booking.end_date,
            duration_info: booking.duration_info,
            total_price,
            service_address: booking.service_address,
            special_requirements: booking.special_requirements,
            notes: None,
            assigned_provider_id: None,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.bookings.push(row.clone());
        Ok(Some(row))
    }

    async fn list_bookings(
        &self,
        owner: Option<i64>,
        status: Option<BookingStatus>,
    ) -> Result<Vec<BookingView>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.newest_views(
            t.bookings
                .iter()
                .filter(|b| owner.map_or(true, |o| b.user_id == o))
                .filter(|b| status.map_or(true, |s| b.status == s)),
        ))
    }

    async fn find_booking(&self, id: i64, owner: i64) -> Result<Option<BookingView>, StoreError> {
        let t = self.tables.read().await;
        Ok(t
            .bookings
            .iter()
            .find(|b| b.id == id && b.user_id == owner)
            .and_then(|b| t.view(b)))
    }

    async fn update_booking_details(
        &self,
        id: i64,
        owner: i64,
        update: BookingDetailsUpdate,
    ) -> Result<UpdateOutcome<Booking>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(booking) = t.bookings.iter_mut().find(|b| b.id == id && b.user_id == owner) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if !booking.status.is_editable() {
            return Ok(UpdateOutcome::Rejected);
        }

        if let Some(v) = update.service_address {
            booking.service_address = v;
        }
        if let Some(v) = update.special_requirements {
            booking.special_requirements = Some(v);
        }
        booking.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied(booking.clone()))
    }

    async fn cancel_booking(&self, id: i64, owner: i64) -> Result<UpdateOutcome<Booking>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(booking) = t.bookings.iter_mut().find(|b| b.id == id && b.user_id == owner) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if !booking.status.is_cancellable() {
            return Ok(UpdateOutcome::Rejected);
        }

        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied(booking.clone()))
    }

    async fn admin_update_booking(
        &self,
        id: i64,
        update: AdminBookingUpdate,
    ) -> Result<UpdateOutcome<Booking>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(booking) = t.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if !booking.status.can_transition_to(update.status) {
            return Ok(UpdateOutcome::Rejected);
        }

        booking.status = update.status;
        if let Some(provider) = update.assigned_provider_id {
            booking.assigned_provider_id = Some(provider);
        }
        if let Some(notes) = update.notes {
            booking.notes = Some(notes);
        }
        booking.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied(booking.clone()))
    }

    async fn create_provider(&self, provider: NewProvider) -> Result<ServiceProvider, StoreError> {
        let mut t = self.tables.write().await;
        if t.providers.iter().any(|p| p.email == provider.email) {
            return Err(StoreError::DuplicateEmail(DUPLICATE_PROVIDER_EMAIL.to_string()));
        }

        let now = Utc::now();
        let row = ServiceProvider {
            id: t.next_id(),
            full_name: provider.full_name,
            email: provider.email,
            phone: provider.phone,
            address: provider.address,
            city: provider.city,
            date_of_birth: provider.date_of_birth,
            national_id: provider.national_id,
            skills: provider.skills,
            experience_years: provider.experience_years,
            availability: provider.availability,
            status: ProviderStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        t.providers.push(row.clone());
        Ok(row)
    }

    async fn find_provider(&self, id: i64) -> Result<Option<ServiceProvider>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.providers.iter().find(|p| p.id == id).cloned())
    }

    async fn list_providers(
        &self,
        status: Option<ProviderStatus>,
    ) -> Result<Vec<ServiceProvider>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServiceProvider> = t
            .providers
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update_provider_status(
        &self,
        id: i64,
        update: ProviderStatusUpdate,
    ) -> Result<Option<ServiceProvider>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(provider) = t.providers.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        provider.status = update.status;
        if let Some(notes) = update.notes {
            provider.notes = Some(notes);
        }
        provider.updated_at = Utc::now();
        Ok(Some(provider.clone()))
    }

    async fn create_contact(&self, contact: NewContact) -> Result<ContactSubmission, StoreError> {
        let mut t = self.tables.write().await;
        let row = ContactSubmission {
            id: t.next_id(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            subject: contact.subject,
            message: contact.message,
            status: ContactStatus::New,
            created_at: Utc::now(),
        };
        t.contacts.push(row.clone());
        Ok(row)
    }

    async fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactSubmission>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<ContactSubmission> = t
            .contacts
            .iter()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(contact) = t.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        contact.status = status;
        Ok(Some(contact.clone()))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let t = self.tables.read().await;

        let count_by = |statuses: Vec<String>| {
            let mut counts = std::collections::BTreeMap::<String, i64>::new();
            for s in statuses {
                *counts.entry(s).or_default() += 1;
            }
            StatusBreakdown::from_counts(counts)
        };

        let mut recent = t.newest_views(t.bookings.iter());
        recent.truncate(10);

        Ok(DashboardStats {
            total_users: t.accounts.iter().filter(|a| a.role == Role::User).count() as i64,
            active_services: t.services.iter().filter(|s| s.is_active).count() as i64,
            bookings: count_by(t.bookings.iter().map(|b| b.status.to_string()).collect()),
            providers: count_by(t.providers.iter().map(|p| p.status.to_string()).collect()),
            new_contacts: t
                .contacts
                .iter()
                .filter(|c| c.status == ContactStatus::New)
                .count() as i64,
            recent_bookings: recent,
        })
    }
}
