// handlers/public/auth.rs - POST /api/auth/register, POST /api/auth/login

use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::{Identity, TokenService};
use crate::database::models::{Account, AccountType, NewAccount, Role};
use crate::database::store::{Store, DUPLICATE_ACCOUNT_EMAIL};
use crate::error::ApiError;
use crate::handlers::validate::{is_valid_email, non_blank, normalize_email, parse_choice, Required, INVALID_EMAIL};
use crate::middleware::{ApiResponse, ApiResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub account_type: Option<String>,
    pub business_name: Option<String>,
    pub business_registration: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn identity_of(account: &Account) -> Identity {
    Identity {
        account_id: account.id,
        email: account.email.clone(),
        role: account.role,
    }
}

/// POST /api/auth/register - Create a `user` account and sign it in
///
/// Expected Input:
/// ```json
/// { "email": "a@x.com", "password": "secret1", "full_name": "A",
///   "account_type": "individual|business", "business_name": "required for business" }
/// ```
///
/// Responds 201 with `{ "token": "...", "user": { ... } }`.
pub async fn register(
    store: &dyn Store,
    tokens: &TokenService,
    req: RegisterRequest,
) -> ApiResult<Value> {
    Required::new()
        .text("email", &req.email)
        .text("password", &req.password)
        .text("full_name", &req.full_name)
        .check()?;

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request(INVALID_EMAIL));
    }

    let password = req.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let account_type = match non_blank(req.account_type) {
        Some(v) => parse_choice::<AccountType>(&v, "Invalid account type")?,
        None => AccountType::Individual,
    };
    let business_name = non_blank(req.business_name);
    if account_type == AccountType::Business && business_name.is_none() {
        return Err(ApiError::bad_request(
            "Business name is required for business accounts",
        ));
    }

    if store.email_registered(&email).await? {
        return Err(ApiError::bad_request(DUPLICATE_ACCOUNT_EMAIL));
    }

    let password_hash = hash_password_blocking(password).await?;

    // The unique index catches a concurrent registration of the same email.
    let account = store
        .create_account(NewAccount {
            email,
            password_hash,
            full_name: non_blank(req.full_name).unwrap_or_default(),
            role: Role::User,
            account_type,
            business_name,
            business_registration: non_blank(req.business_registration),
            phone: non_blank(req.phone),
            address: non_blank(req.address),
            city: non_blank(req.city),
        })
        .await?;

    tracing::info!("Registered account {} ({})", account.id, account.account_type);

    let token = tokens.issue(&identity_of(&account))?;
    Ok(ApiResponse::created(json!({
        "token": token,
        "user": account,
    })))
}

/// POST /api/auth/login - Exchange credentials for a bearer token
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(store: &dyn Store, tokens: &TokenService, req: LoginRequest) -> ApiResult<Value> {
    Required::new()
        .text("email", &req.email)
        .text("password", &req.password)
        .check()?;

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();

    let account = store.find_account_by_email(&email).await?;
    let verified = match &account {
        Some(a) => verify_password_blocking(password, a.password_hash.clone()).await,
        None => false,
    };

    let account = match account {
        Some(account) if verified => account,
        _ => {
            tracing::warn!("Rejected login attempt");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    tracing::info!("Account {} logged in", account.id);

    let token = tokens.issue(&identity_of(&account))?;
    Ok(ApiResponse::success(json!({
        "token": token,
        "user": account,
    })))
}
