// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (bearer token) → Elevated (admin role)
//
// Handlers take only what they use: the store, the caller's identity, route
// params and a typed body. Wiring from a resolved route to these functions
// lives in api/dispatch.rs.
pub mod public; // Tier 1: catalog, registration, login, contact, provider applications
pub mod protected; // Tier 2: profile and owner-scoped bookings
pub mod elevated; // Tier 3: admin views and mutations

pub mod validate;
