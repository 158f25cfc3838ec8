use anyhow::bail;
use serde_json::json;

use crate::auth::password::hash_password_blocking;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{AccountType, NewAccount, Role};
use crate::database::{DatabaseManager, PgStore, Store};
use crate::handlers::public::auth::MIN_PASSWORD_LEN;
use crate::handlers::validate::{is_valid_email, normalize_email};

/// Registration only creates `user` accounts; this is the way to get an admin.
pub async fn handle(
    email: String,
    password: String,
    full_name: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        bail!("Invalid email address: {}", email);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    let full_name = full_name.trim().to_string();
    if full_name.is_empty() {
        bail!("Full name cannot be empty");
    }

    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect(&config.database).await?;
    let store = PgStore::new(pool);

    if store.email_registered(&email).await? {
        bail!("Email already registered: {}", email);
    }

    let account = store
        .create_account(NewAccount {
            email,
            password_hash: hash_password_blocking(password).await?,
            full_name,
            role: Role::Admin,
            account_type: AccountType::Individual,
            business_name: None,
            business_registration: None,
            phone: None,
            address: None,
            city: None,
        })
        .await?;

    tracing::info!("Created admin account {}", account.id);
    output_format.success(
        &format!("Created admin {} (id {})", account.email, account.id),
        json!({ "user": account }),
    )
}
