use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

text_enum!(Role {
    User => "user",
    Admin => "admin",
});

text_enum!(AccountType {
    Individual => "individual",
    Business => "business",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub account_type: AccountType,
    pub business_name: Option<String>,
    pub business_registration: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub account_type: AccountType,
    pub business_name: Option<String>,
    pub business_registration: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub business_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.business_name.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountFlagsUpdate {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
