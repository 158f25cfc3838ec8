//! Input checks shared by the handlers.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const NO_FIELDS: &str = "No fields to update";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Trimmed and lowercased; emails compare case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Collects missing required fields and reports them in one error.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    /// A text field counts as missing when absent or blank.
    pub fn text(mut self, field: &'static str, value: &Option<String>) -> Self {
        if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
            self.missing.push(field);
        }
        self
    }

    pub fn value<T>(mut self, field: &'static str, value: &Option<T>) -> Self {
        if value.is_none() {
            self.missing.push(field);
        }
        self
    }

    pub fn check(self) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            return Ok(());
        }

        let field_errors: HashMap<String, String> = self
            .missing
            .iter()
            .map(|f| (f.to_string(), "This field is required".to_string()))
            .collect();
        Err(ApiError::validation_error(
            format!("Missing required fields: {}", self.missing.join(", ")),
            Some(field_errors),
        ))
    }
}

/// Parse a text value into an enum, mapping failure to a 400 with `message`.
pub fn parse_choice<T: FromStr>(value: &str, message: &str) -> Result<T, ApiError> {
    value.trim().parse().map_err(|_| ApiError::bad_request(message))
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid {} (expected YYYY-MM-DD)", field)))
}

/// Optional query filter. Blank values mean "no filter"; anything else must parse.
pub fn query_filter<T: FromStr>(
    query: &HashMap<String, String>,
    key: &str,
    message: &str,
) -> Result<Option<T>, ApiError> {
    match query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(v) => parse_choice(v, message).map(Some),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Accept an id as a JSON number or a numeric string; blank means absent.
///
/// Use with `#[serde(default, deserialize_with = "lenient_id")]`.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
