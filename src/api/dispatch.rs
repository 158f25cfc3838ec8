// api/dispatch.rs - Resolve, authorize, call
//
// The one axum handler. It resolves the request against the route table,
// applies the route's guard, and calls the matching handler function with only
// the inputs that handler takes.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::context::RequestContext;
use super::{AppState, Route};
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{authorize, ApiResult};
use crate::routing::RouteError;

pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match route(&state, &method, &uri, &headers, body).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            if err.status_code() >= 500 {
                tracing::error!("{} {} failed: {}", method, uri.path(), err.message());
            }
            err.into_response()
        }
    }
}

async fn route(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> ApiResult<Value> {
    let matched = state.routes.resolve(method, uri.path()).map_err(|e| match e {
        RouteError::NotFound => ApiError::not_found("Route not found"),
        other => ApiError::internal_server_error(other.to_string()),
    })?;

    let user = authorize(matched.handler.guard(), headers, &state.tokens)?;
    let ctx = RequestContext::new(&matched, uri, body, user);

    call(state, matched.handler, ctx).await
}

async fn call(state: &AppState, route: Route, ctx: RequestContext) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let tokens = state.tokens.as_ref();

    match route {
        Route::Health => public::health::check(store).await,

        Route::Register => public::auth::register(store, tokens, ctx.json()?).await,
        Route::Login => public::auth::login(store, tokens, ctx.json()?).await,

        Route::Me => protected::profile::me(store, ctx.user()?).await,
        Route::UpdateProfile => protected::profile::update(store, ctx.user()?, ctx.json()?).await,

        Route::Categories => public::services::categories(store).await,
        Route::Services => public::services::list(store, &ctx.query).await,
        Route::ServicesGrouped => public::services::grouped(store, &ctx.query).await,
        Route::Service => public::services::get(store, ctx.id("id")?).await,
        Route::ServicePricing => {
            public::services::pricing(store, ctx.id("id")?, &ctx.query).await
        }

        Route::CreateBooking => {
            protected::bookings::create(store, ctx.user()?, ctx.json()?).await
        }
        Route::MyBookings => protected::bookings::list(store, ctx.user()?, &ctx.query).await,
        Route::MyBooking => protected::bookings::get(store, ctx.user()?, ctx.id("id")?).await,
        Route::UpdateMyBooking => {
            protected::bookings::update(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
        Route::CancelMyBooking => {
            protected::bookings::cancel(store, ctx.user()?, ctx.id("id")?).await
        }

        Route::SubmitContact => public::contact::submit(store, ctx.json()?).await,
        Route::ApplyProvider => public::providers::apply(store, ctx.json()?).await,

        Route::AdminStats => elevated::stats::dashboard(store).await,
        Route::AdminUsers => elevated::users::list(store, &ctx.query).await,
        Route::AdminUpdateUser => {
            elevated::users::update(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
        Route::AdminBookings => elevated::bookings::list(store, &ctx.query).await,
        Route::AdminUpdateBooking => {
            elevated::bookings::update(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
        Route::AdminProviders => elevated::providers::list(store, &ctx.query).await,
        Route::AdminUpdateProvider => {
            elevated::providers::update(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
        Route::AdminServices => elevated::catalog::list_services(store).await,
        Route::AdminUpdateService => {
            elevated::catalog::update_service(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
        Route::AdminPricing => elevated::catalog::list_pricing(store, &ctx.query).await,
        Route::AdminUpdatePricing => {
            elevated::catalog::update_pricing(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
        Route::AdminContacts => elevated::contacts::list(store, &ctx.query).await,
        Route::AdminUpdateContact => {
            elevated::contacts::update(store, ctx.user()?, ctx.id("id")?, ctx.json()?).await
        }
    }
}
