// handlers/protected/mod.rs - Handlers requiring a valid bearer token
//
// Every query here is scoped to the caller's account id.

pub mod bookings;
pub mod profile;
