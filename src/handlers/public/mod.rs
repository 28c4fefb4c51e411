// handlers/public/mod.rs - handlers that need no credential
//
// Booking mutations live here because they are public by default; the router
// layers the token gate over them when `SECURITY_PROTECT_MUTATIONS` is set.
pub mod auth;
pub mod bookings;
pub mod services;

pub use auth::{jwt_post, logout_post};
pub use bookings::{booking_delete, booking_patch, booking_post};
pub use services::{service_get, services_get};
