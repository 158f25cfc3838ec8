use serde::{Deserialize, Serialize};
use std::env;

/// Placeholder value shipped in sample `.env` files; treated as "not configured".
const JWT_SECRET_PLACEHOLDER: &str = "your-secure-random-string-here";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// Mount prefix stripped from request paths before routing (e.g. "/backend").
    pub base_path: String,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    pub jwt_expiry_secs: i64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = env::var("API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_BASE_PATH") {
            self.api.base_path = normalize_base_path(&v);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = Some(v);
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_SECS").or_else(|_| env::var("JWT_EXPIRY")) {
            self.security.jwt_expiry_secs = v.parse().unwrap_or(self.security.jwt_expiry_secs);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// The configured signing secret, or `None` when it is missing, blank or
    /// still the sample placeholder.
    pub fn jwt_secret(&self) -> Option<&str> {
        self.security
            .jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != JWT_SECRET_PLACEHOLDER)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.security.cors_origins.iter().any(|o| o == "*")
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                base_path: String::new(),
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret: None,
                jwt_expiry_secs: 7 * 24 * 60 * 60, // 7 days
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                base_path: String::new(),
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: None,
                jwt_expiry_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                base_path: String::new(),
                enable_request_logging: false,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: None,
                jwt_expiry_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["*".to_string()],
            },
        }
    }
}

/// "/backend/" -> "/backend", "backend" -> "/backend", "/" -> ""
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.jwt_expiry_secs, 604_800);
        assert!(config.allows_any_origin());
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn missing_or_placeholder_secret_is_not_configured() {
        let mut config = AppConfig::development();
        assert_eq!(config.jwt_secret(), None);

        config.security.jwt_secret = Some("   ".to_string());
        assert_eq!(config.jwt_secret(), None);

        config.security.jwt_secret = Some(JWT_SECRET_PLACEHOLDER.to_string());
        assert_eq!(config.jwt_secret(), None);

        config.security.jwt_secret = Some("s3cret".to_string());
        assert_eq!(config.jwt_secret(), Some("s3cret"));
    }

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path("/backend/"), "/backend");
        assert_eq!(normalize_base_path("backend"), "/backend");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
    }
}
