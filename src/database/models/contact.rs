use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

text_enum!(
    /// Admin triage state of a contact message.
    ContactStatus {
        New => "new",
        Read => "read",
        Responded => "responded",
    }
);

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}
