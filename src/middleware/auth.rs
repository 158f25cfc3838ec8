use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{Identity, TokenService};
use crate::database::models::Role;
use crate::error::ApiError;

pub const MISSING_TOKEN: &str = "No authorization token provided";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const ADMIN_REQUIRED: &str = "Admin access required";

/// Access requirement attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    /// Identity attached when a valid token is present; never rejects.
    Optional,
    Authenticated,
    Admin,
}

/// Authenticated user context extracted from the bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.account_id,
            email: identity.email,
            role: identity.role,
        }
    }
}

/// Apply a route's guard to the request headers.
///
/// Returns the caller's identity when one was established. `Public` never
/// looks at the headers.
pub fn authorize(
    guard: Guard,
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<Option<AuthUser>, ApiError> {
    match guard {
        Guard::Public => Ok(None),
        Guard::Optional => Ok(extract_jwt_from_headers(headers)
            .and_then(|token| tokens.verify(token).ok())
            .map(AuthUser::from)),
        Guard::Authenticated => authenticate(headers, tokens).map(Some),
        Guard::Admin => {
            let user = authenticate(headers, tokens)?;
            if !user.is_admin() {
                tracing::warn!("Non-admin account {} denied admin route", user.id);
                return Err(ApiError::forbidden(ADMIN_REQUIRED));
            }
            Ok(Some(user))
        }
    }
}

fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, ApiError> {
    let token = extract_jwt_from_headers(headers).ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))?;

    tokens
        .verify(token)
        .map(AuthUser::from)
        .map_err(|_| ApiError::unauthorized(INVALID_TOKEN))
}

/// Extract the bearer token from the Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn tokens() -> TokenService {
        TokenService::new(Some("gate-secret"), 3600).unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    fn token_for(role: Role) -> String {
        tokens()
            .issue(&Identity {
                account_id: 5,
                email: "u@x.com".to_string(),
                role,
            })
            .unwrap()
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let err = authorize(Guard::Authenticated, &HeaderMap::new(), &tokens()).unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), MISSING_TOKEN);
    }

    #[test]
    fn non_bearer_scheme_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        let err = authorize(Guard::Authenticated, &headers, &tokens()).unwrap_err();
        assert_eq!(err.message(), MISSING_TOKEN);
    }

    #[test]
    fn garbage_token_is_invalid() {
        let err = authorize(Guard::Authenticated, &bearer("abc.def.ghi"), &tokens()).unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), INVALID_TOKEN);
    }

    #[test]
    fn valid_token_attaches_identity() {
        let user = authorize(Guard::Authenticated, &bearer(&token_for(Role::User)), &tokens())
            .unwrap()
            .unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn admin_guard_rejects_users() {
        let err = authorize(Guard::Admin, &bearer(&token_for(Role::User)), &tokens()).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), ADMIN_REQUIRED);

        assert!(authorize(Guard::Admin, &bearer(&token_for(Role::Admin)), &tokens()).is_ok());
    }

    #[test]
    fn optional_guard_never_rejects() {
        assert_eq!(authorize(Guard::Optional, &HeaderMap::new(), &tokens()).unwrap(), None);
        assert_eq!(authorize(Guard::Optional, &bearer("junk"), &tokens()).unwrap(), None);
        assert!(authorize(Guard::Optional, &bearer(&token_for(Role::User)), &tokens())
            .unwrap()
            .is_some());
    }
}
