use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::Uri;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routing::RouteMatch;

/// Per-request inputs handed from the dispatcher to handler calls.
#[derive(Debug)]
pub struct RequestContext {
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Bytes,
    pub user: Option<AuthUser>,
}

impl RequestContext {
    pub fn new<H>(matched: &RouteMatch<H>, uri: &Uri, body: Bytes, user: Option<AuthUser>) -> Self {
        let query = url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect();

        Self {
            params: matched.params.clone(),
            query,
            body,
            user,
        }
    }

    /// Numeric route parameter. Missing means the route table and the handler
    /// disagree, which is reported as 404.
    pub fn id(&self, name: &str) -> Result<i64, ApiError> {
        self.params
            .get(name)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ApiError::not_found("Route not found"))
    }

    pub fn user(&self) -> Result<&AuthUser, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized(crate::middleware::auth::MISSING_TOKEN))
    }

    /// Decode the JSON body. An empty body decodes as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let raw: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            &b"{}"[..]
        } else {
            &self.body[..]
        };

        serde_json::from_slice(raw).map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            ApiError::invalid_json(format!("Invalid JSON body: {}", e))
        })
    }
}
