//! HTTP surface: shared state, the axum `Router`, and dispatch from resolved
//! routes to handler functions.

pub mod context;
pub mod dispatch;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Store;
use crate::routing::PathRouter;

pub use routes::Route;

/// Everything a request needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub routes: Arc<PathRouter<Route>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Fails when no usable signing secret is configured.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let tokens = TokenService::from_config(&config)
            .context("JWT_SECRET must be set to a non-placeholder value")?;
        let routes = routes::route_table(&config.api.base_path)?;

        Ok(Self {
            store,
            tokens: Arc::new(tokens),
            routes: Arc::new(routes),
            config: Arc::new(config),
        })
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allows_any_origin() || config.security.cors_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router.
///
/// All paths go through a single fallback so that the custom router owns
/// matching, including the base-path strip and numeric-only parameters.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .fallback(dispatch::dispatch)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}
