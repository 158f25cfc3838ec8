use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

text_enum!(ProviderStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Suspended => "suspended",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceProvider {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub availability: Option<Value>,
    pub status: ProviderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProvider {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub availability: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ProviderStatusUpdate {
    pub status: ProviderStatus,
    pub notes: Option<String>,
}
