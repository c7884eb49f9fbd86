//! Property-rental marketplace API: listings, room types, seasonal prices and
//! bookings for tenants (hosts) and customers (guests).

pub mod auth;
pub mod availability;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod routes;
