// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: /api/auth/{register,login}, /api/services/*, /api/contact, /api/providers/apply, /api/health

pub mod auth;
pub mod contact;
pub mod health;
pub mod providers;
pub mod services;
