// handlers/public/providers.rs - POST /api/providers/apply

use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::NewProvider;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::validate::{
    is_valid_email, non_blank, normalize_email, parse_date, Required, INVALID_EMAIL,
};
use crate::middleware::{ApiResponse, ApiResult};

/// Skills arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Text(String),
}

impl SkillsInput {
    /// Trimmed, non-empty, first occurrence kept.
    pub fn into_set(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            SkillsInput::List(items) => items,
            SkillsInput::Text(text) => text.split(',').map(str::to_string).collect(),
        };

        let mut skills: Vec<String> = Vec::with_capacity(raw.len());
        for skill in raw.into_iter().map(|s| s.trim().to_string()) {
            if !skill.is_empty() && !skills.contains(&skill) {
                skills.push(skill);
            }
        }
        skills
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderApplication {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<String>,
    pub national_id: Option<String>,
    pub skills: Option<SkillsInput>,
    pub experience_years: Option<i32>,
    pub availability: Option<Value>,
}

/// Record a provider application with status `pending`.
///
/// The email is unique across applications; a repeat is a 400.
pub async fn apply(store: &dyn Store, req: ProviderApplication) -> ApiResult<Value> {
    let skills = req.skills.map(SkillsInput::into_set).filter(|s| !s.is_empty());

    Required::new()
        .text("full_name", &req.full_name)
        .text("email", &req.email)
        .text("phone", &req.phone)
        .value("skills", &skills)
        .check()?;

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request(INVALID_EMAIL));
    }

    if matches!(req.experience_years, Some(years) if years < 0) {
        return Err(ApiError::bad_request("experience_years cannot be negative"));
    }

    let date_of_birth = non_blank(req.date_of_birth)
        .map(|d| parse_date(&d, "date_of_birth"))
        .transpose()?;

    let provider = store
        .create_provider(NewProvider {
            full_name: non_blank(req.full_name).unwrap_or_default(),
            email,
            phone: non_blank(req.phone).unwrap_or_default(),
            address: non_blank(req.address),
            city: non_blank(req.city),
            date_of_birth,
            national_id: non_blank(req.national_id),
            skills: skills.unwrap_or_default(),
            experience_years: req.experience_years,
            availability: req.availability.filter(|v| !v.is_null()),
        })
        .await?;

    tracing::info!("Provider application {} submitted", provider.id);

    Ok(ApiResponse::created(json!({
        "application_id": provider.id,
        "message": "Your application has been submitted successfully. We will review it and contact you soon!",
    })))
}
