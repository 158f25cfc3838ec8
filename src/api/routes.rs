// api/routes.rs - Route table
//
// Every endpoint is one `Route` variant. The guard lives next to the variant,
// and the handler call lives in dispatch.rs.

use axum::http::Method;

use crate::middleware::Guard;
use crate::routing::{PathRouter, RouteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,

    // Public auth
    Register,
    Login,

    // Account
    Me,
    UpdateProfile,

    // Catalog
    Categories,
    Services,
    ServicesGrouped,
    Service,
    ServicePricing,

    // Owner bookings
    CreateBooking,
    MyBookings,
    MyBooking,
    UpdateMyBooking,
    CancelMyBooking,

    // Public submissions
    SubmitContact,
    ApplyProvider,

    // Admin
    AdminStats,
    AdminUsers,
    AdminUpdateUser,
    AdminBookings,
    AdminUpdateBooking,
    AdminProviders,
    AdminUpdateProvider,
    AdminServices,
    AdminUpdateService,
    AdminPricing,
    AdminUpdatePricing,
    AdminContacts,
    AdminUpdateContact,
}

impl Route {
    pub fn guard(self) -> Guard {
        use Route::*;

        match self {
            Health | Register | Login | Categories | Services | ServicesGrouped | Service
            | ServicePricing | SubmitContact | ApplyProvider => Guard::Public,

            Me | UpdateProfile | CreateBooking | MyBookings | MyBooking | UpdateMyBooking
            | CancelMyBooking => Guard::Authenticated,

            AdminStats | AdminUsers | AdminUpdateUser | AdminBookings | AdminUpdateBooking
            | AdminProviders | AdminUpdateProvider | AdminServices | AdminUpdateService
            | AdminPricing | AdminUpdatePricing | AdminContacts | AdminUpdateContact => Guard::Admin,
        }
    }
}

fn table() -> Vec<(Method, &'static str, Route)> {
    vec![
        (Method::GET, "/api/health", Route::Health),
        (Method::POST, "/api/auth/register", Route::Register),
        (Method::POST, "/api/auth/login", Route::Login),
        (Method::GET, "/api/auth/me", Route::Me),
        (Method::PUT, "/api/auth/profile", Route::UpdateProfile),
        (Method::GET, "/api/services/categories", Route::Categories),
        (Method::GET, "/api/services/grouped/by-category", Route::ServicesGrouped),
        (Method::GET, "/api/services", Route::Services),
        (Method::GET, "/api/services/:id", Route::Service),
        (Method::GET, "/api/services/:id/pricing", Route::ServicePricing),
        (Method::POST, "/api/bookings", Route::CreateBooking),
        (Method::GET, "/api/bookings", Route::MyBookings),
        (Method::GET, "/api/bookings/:id", Route::MyBooking),
        (Method::PUT, "/api/bookings/:id", Route::UpdateMyBooking),
        (Method::PUT, "/api/bookings/:id/cancel", Route::CancelMyBooking),
        (Method::POST, "/api/contact", Route::SubmitContact),
        (Method::POST, "/api/providers/apply", Route::ApplyProvider),
        (Method::GET, "/api/admin/stats", Route::AdminStats),
        (Method::GET, "/api/admin/dashboard", Route::AdminStats),
        (Method::GET, "/api/admin/users", Route::AdminUsers),
        (Method::PUT, "/api/admin/users/:id", Route::AdminUpdateUser),
        (Method::GET, "/api/admin/bookings", Route::AdminBookings),
        (Method::PUT, "/api/admin/bookings/:id", Route::AdminUpdateBooking),
        (Method::GET, "/api/admin/providers", Route::AdminProviders),
        (Method::PUT, "/api/admin/providers/:id", Route::AdminUpdateProvider),
        (Method::GET, "/api/admin/services", Route::AdminServices),
        (Method::PUT, "/api/admin/services/:id", Route::AdminUpdateService),
        (Method::GET, "/api/admin/pricing", Route::AdminPricing),
        (Method::PUT, "/api/admin/pricing/:id", Route::AdminUpdatePricing),
        (Method::GET, "/api/admin/contacts", Route::AdminContacts),
        (Method::PUT, "/api/admin/contacts/:id", Route::AdminUpdateContact),
    ]
}

pub fn route_table(base_path: &str) -> Result<PathRouter<Route>, RouteError> {
    let mut router = PathRouter::new(base_path);
    for (method, pattern, route) in table() {
        router.register(method, pattern, route)?;
    }
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(method: Method, path: &str) -> Option<Route> {
        route_table("").unwrap().resolve(&method, path).ok().map(|m| m.handler)
    }

    #[test]
    fn literal_paths_are_not_taken_as_ids() {
        assert_eq!(resolve(Method::GET, "/api/services/categories"), Some(Route::Categories));
        assert_eq!(
            resolve(Method::GET, "/api/services/grouped/by-category"),
            Some(Route::ServicesGrouped)
        );
        assert_eq!(resolve(Method::GET, "/api/services/12"), Some(Route::Service));
        assert_eq!(resolve(Method::GET, "/api/services/12/pricing"), Some(Route::ServicePricing));
    }

    #[test]
    fn booking_update_and_cancel_are_distinct() {
        assert_eq!(resolve(Method::PUT, "/api/bookings/3"), Some(Route::UpdateMyBooking));
        assert_eq!(resolve(Method::PUT, "/api/bookings/3/cancel"), Some(Route::CancelMyBooking));
        assert_eq!(resolve(Method::PUT, "/api/bookings/abc/cancel"), None);
        assert_eq!(resolve(Method::DELETE, "/api/bookings/3"), None);
    }

    #[test]
    fn guards_by_tier() {
        assert_eq!(Route::Login.guard(), Guard::Public);
        assert_eq!(Route::CancelMyBooking.guard(), Guard::Authenticated);
        assert_eq!(Route::AdminUpdateBooking.guard(), Guard::Admin);
        for (_, pattern, route) in table() {
            if pattern.starts_with("/api/admin/") {
                assert_eq!(route.guard(), Guard::Admin, "{}", pattern);
            }
        }
    }

    #[test]
    fn dashboard_is_an_alias_of_stats() {
        assert_eq!(resolve(Method::GET, "/api/admin/dashboard"), Some(Route::AdminStats));
    }

    #[test]
    fn base_path_is_stripped() {
        let router = route_table("/backend").unwrap();
        let m = router.resolve(&Method::GET, "/backend/api/health").unwrap();
        assert_eq!(m.handler, Route::Health);
    }
}
