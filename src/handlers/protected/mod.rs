// handlers/protected/mod.rs - handlers behind the token gate
//
// Every route in this tier is mounted with `middleware::require_token`,
// so handlers can rely on an `AuthUser` extension being present.
pub mod bookings;

pub use bookings::bookings_get;
