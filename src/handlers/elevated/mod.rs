// handlers/elevated/mod.rs - Admin handlers
//
// Security Level: bearer token with role `admin`
// Route Prefix: /api/admin/*

pub mod bookings;
pub mod catalog;
pub mod contacts;
pub mod providers;
pub mod stats;
pub mod users;
