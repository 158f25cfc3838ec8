use async_trait::async_trait;
use sqlx::PgPool;

use super::models::*;
use super::store::{Store, StoreError, DUPLICATE_ACCOUNT_EMAIL, DUPLICATE_PROVIDER_EMAIL};

const BOOKING_VIEW_SELECT: &str = r#"
    SELECT
        b.*,
        s.name AS service_name,
        sc.name AS category_name,
        sp.price,
        sp.duration_type,
        u.full_name AS user_name,
        u.email AS user_email,
        u.phone AS user_phone,
        prov.full_name AS provider_name,
        prov.phone AS provider_phone
    FROM bookings b
    JOIN services s ON b.service_id = s.id
    JOIN service_categories sc ON s.category_id = sc.id
    JOIN service_pricing sp ON b.pricing_id = sp.id
    JOIN users u ON b.user_id = u.id
    LEFT JOIN service_providers prov ON b.assigned_provider_id = prov.id
"#;

const SERVICE_LISTING_SELECT: &str = r#"
    SELECT s.*, sc.name AS category_name, sc.icon AS category_icon
    FROM services s
    JOIN service_categories sc ON s.category_id = sc.id
"#;

/// Map a unique-constraint violation to the client-facing duplicate message.
fn unique_violation(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateEmail(message.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

/// [`Store`] backed by a Postgres pool. Every value reaches SQL as a bound parameter.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Outcome of a conditional booking update that matched no row: the booking
    /// is either absent (for this owner) or in a state the update does not accept.
    async fn unmatched_booking(
        &self,
        id: i64,
        owner: Option<i64>,
    ) -> Result<UpdateOutcome<Booking>, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2))",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(if exists {
            UpdateOutcome::Rejected
        } else {
            UpdateOutcome::NotFound
        })
    }

    async fn status_counts(&self, table: StatusTable) -> Result<StatusBreakdown, StoreError> {
        let sql = match table {
            StatusTable::Bookings => "SELECT status, COUNT(*) FROM bookings GROUP BY status",
            StatusTable::Providers => "SELECT status, COUNT(*) FROM service_providers GROUP BY status",
        };
        let rows = sqlx::query_as::<_, (String, i64)>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(StatusBreakdown::from_counts(rows))
    }

    async fn count(&self, sql: &str) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await?)
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusTable {
    Bookings,
    Providers,
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND is_active)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (
                email, password_hash, full_name, role, account_type,
                business_name, business_registration, phone, address, city
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.full_name)
        .bind(account.role.as_str())
        .bind(account.account_type.as_str())
        .bind(&account.business_name)
        .bind(&account.business_registration)
        .bind(&account.phone)
        .bind(&account.address)
        .bind(&account.city)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_ACCOUNT_EMAIL))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM users WHERE email = $1 AND is_active",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                business_name = COALESCE($6, business_name),
                updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.full_name)
        .bind(update.phone)
        .bind(update.address)
        .bind(update.city)
        .bind(update.business_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn list_accounts(&self, page: PageRequest) -> Result<(Vec<Account>, i64), StoreError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let total = self.count("SELECT COUNT(*) FROM users").await?;
        Ok((accounts, total))
    }

    async fn update_account_flags(
        &self,
        id: i64,
        update: AccountFlagsUpdate,
    ) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE users SET
                role = COALESCE($2, role),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_ACCOUNT_EMAIL))
    }

    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, StoreError> {
        let categories = sqlx::query_as::<_, ServiceCategory>(
            "SELECT * FROM service_categories WHERE is_active ORDER BY display_order, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceListing>, StoreError> {
        let sql = format!(
            "{} WHERE s.is_active \
               AND ($1::TEXT IS NULL OR s.target_audience = $1 OR s.target_audience = 'both') \
               AND ($2::BIGINT IS NULL OR s.category_id = $2) \
             ORDER BY sc.display_order, s.name",
            SERVICE_LISTING_SELECT
        );
        let services = sqlx::query_as::<_, ServiceListing>(&sql)
            .bind(filter.audience.map(|a| a.as_str()))
            .bind(filter.category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    async fn find_service(&self, id: i64) -> Result<Option<ServiceListing>, StoreError> {
        let sql = format!("{} WHERE s.id = $1 AND s.is_active", SERVICE_LISTING_SELECT);
        let service = sqlx::query_as::<_, ServiceListing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(service)
    }

    async fn list_pricing(
        &self,
        service_id: i64,
        filter: &PricingFilter,
    ) -> Result<Vec<ServicePricing>, StoreError> {
        let pricing = sqlx::query_as::<_, ServicePricing>(
            r#"
            SELECT * FROM service_pricing
            WHERE service_id = $1 AND is_active
              AND ($2::TEXT IS NULL OR pricing_type = $2)
              AND ($3::TEXT IS NULL OR service_mode = $3)
            ORDER BY price ASC, id
            "#,
        )
        .bind(service_id)
        .bind(filter.pricing_type.map(|t| t.as_str()))
        .bind(filter.service_mode.map(|m| m.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(pricing)
    }

    async fn list_all_services(&self) -> Result<Vec<ServiceListing>, StoreError> {
        let sql = format!("{} ORDER BY sc.display_order, s.name", SERVICE_LISTING_SELECT);
        let services = sqlx::query_as::<_, ServiceListing>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    async fn update_service(
        &self,
        id: i64,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, StoreError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    async fn list_all_pricing(
        &self,
        service_id: Option<i64>,
    ) -> Result<Vec<ServicePricing>, StoreError> {
        let pricing = sqlx::query_as::<_, ServicePricing>(
            r#"
            SELECT * FROM service_pricing
            WHERE ($1::BIGINT IS NULL OR service_id = $1)
            ORDER BY service_id, price ASC, id
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pricing)
    }

    async fn update_pricing(
        &self,
        id: i64,
        update: PricingUpdate,
    ) -> Result<Option<ServicePricing>, StoreError> {
        // Bookings keep their own total_price; nothing here touches them.
        let tier = sqlx::query_as::<_, ServicePricing>(
            r#"
            UPDATE service_pricing SET
                price = COALESCE($2, price),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.price)
        .bind(update.description)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tier)
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Option<Booking>, StoreError> {
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                user_id, service_id, pricing_id, booking_type, service_mode,
                start_date, end_date, duration_info, total_price,
                service_address, special_requirements, status
            )
            SELECT $1, sp.service_id, sp.id, $4, $5, $6, $7, $8, sp.price, $9, $10, 'pending'
            FROM service_pricing sp
            WHERE sp.id = $3 AND sp.service_id = $2 AND sp.is_active
              AND sp.pricing_type = $4 AND sp.service_mode = $5
            RETURNING *
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.service_id)
        .bind(booking.pricing_id)
        .bind(booking.booking_type.as_str())
        .bind(booking.service_mode.as_str())
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.duration_info)
        .bind(booking.service_address)
        .bind(booking.special_requirements)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_bookings(
        &self,
        owner: Option<i64>,
        status: Option<BookingStatus>,
    ) -> Result<Vec<BookingView>, StoreError> {
        let sql = format!(
            "{} WHERE ($1::BIGINT IS NULL OR b.user_id = $1) \
               AND ($2::TEXT IS NULL OR b.status = $2) \
             ORDER BY b.created_at DESC, b.id DESC",
            BOOKING_VIEW_SELECT
        );
        let bookings = sqlx::query_as::<_, BookingView>(&sql)
            .bind(owner)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(bookings)
    }

    async fn find_booking(&self, id: i64, owner: i64) -> Result<Option<BookingView>, StoreError> {
        let sql = format!("{} WHERE b.id = $1 AND b.user_id = $2", BOOKING_VIEW_SELECT);
        let booking = sqlx::query_as::<_, BookingView>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    async fn update_booking_details(
        &self,
        id: i64,
        owner: i64,
        update: BookingDetailsUpdate,
    ) -> Result<UpdateOutcome<Booking>, StoreError> {
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                service_address = COALESCE($3, service_address),
                special_requirements = COALESCE($4, special_requirements),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status IN ('pending', 'confirmed')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(update.service_address)
        .bind(update.special_requirements)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(booking) => Ok(UpdateOutcome::Applied(booking)),
            None => self.unmatched_booking(id, Some(owner)).await,
        }
    }

    async fn cancel_booking(&self, id: i64, owner: i64) -> Result<UpdateOutcome<Booking>, StoreError> {
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status NOT IN ('completed', 'cancelled')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(booking) => Ok(UpdateOutcome::Applied(booking)),
            None => self.unmatched_booking(id, Some(owner)).await,
        }
    }

    async fn admin_update_booking(
        &self,
        id: i64,
        update: AdminBookingUpdate,
    ) -> Result<UpdateOutcome<Booking>, StoreError> {
        let predecessors: Vec<String> = BookingStatus::allowed_predecessors(update.status)
            .into_iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                status = $2,
                assigned_provider_id = COALESCE($3, assigned_provider_id),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.assigned_provider_id)
        .bind(update.notes)
        .bind(predecessors)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(booking) => Ok(UpdateOutcome::Applied(booking)),
            None => self.unmatched_booking(id, None).await,
        }
    }

    async fn create_provider(&self, provider: NewProvider) -> Result<ServiceProvider, StoreError> {
        sqlx::query_as::<_, ServiceProvider>(
            r#"
            INSERT INTO service_providers (
                full_name, email, phone, address, city, date_of_birth,
                national_id, skills, experience_years, availability, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
            RETURNING *
            "#,
        )
        .bind(provider.full_name)
        .bind(provider.email)
        .bind(provider.phone)
        .bind(provider.address)
        .bind(provider.city)
        .bind(provider.date_of_birth)
        .bind(provider.national_id)
        .bind(provider.skills)
        .bind(provider.experience_years)
        .bind(provider.availability)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_PROVIDER_EMAIL))
    }

    async fn find_provider(&self, id: i64) -> Result<Option<ServiceProvider>, StoreError> {
        let provider =
            sqlx::query_as::<_, ServiceProvider>("SELECT * FROM service_providers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(provider)
    }

    async fn list_providers(
        &self,
        status: Option<ProviderStatus>,
    ) -> Result<Vec<ServiceProvider>, StoreError> {
        let providers = sqlx::query_as::<_, ServiceProvider>(
            r#"
            SELECT * FROM service_providers
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(providers)
    }

    async fn update_provider_status(
        &self,
        id: i64,
        update: ProviderStatusUpdate,
    ) -> Result<Option<ServiceProvider>, StoreError> {
        let provider = sqlx::query_as::<_, ServiceProvider>(
            r#"
            UPDATE service_providers SET
                status = $2,
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(provider)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<ContactSubmission, StoreError> {
        let submission = sqlx::query_as::<_, ContactSubmission>(
            r#"
            INSERT INTO contact_submissions (name, email, phone, subject, message, status)
            VALUES ($1, $2, $3, $4, $5, 'new')
            RETURNING *
            "#,
        )
        .bind(contact.name)
        .bind(contact.email)
        .bind(contact.phone)
        .bind(contact.subject)
        .bind(contact.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(submission)
    }

    async fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactSubmission>, StoreError> {
        let submissions = sqlx::query_as::<_, ContactSubmission>(
            r#"
            SELECT * FROM contact_submissions
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        let submission = sqlx::query_as::<_, ContactSubmission>(
            "UPDATE contact_submissions SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(submission)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let recent_sql = format!(
            "{} ORDER BY b.created_at DESC, b.id DESC LIMIT 10",
            BOOKING_VIEW_SELECT
        );
        let recent_bookings = sqlx::query_as::<_, BookingView>(&recent_sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(DashboardStats {
            total_users: self.count("SELECT COUNT(*) FROM users WHERE role = 'user'").await?,
            active_services: self.count("SELECT COUNT(*) FROM services WHERE is_active").await?,
            bookings: self.status_counts(StatusTable::Bookings).await?,
            providers: self.status_counts(StatusTable::Providers).await?,
            new_contacts: self
                .count("SELECT COUNT(*) FROM contact_submissions WHERE status = 'new'")
                .await?,
            recent_bookings,
        })
    }
}
