pub mod auth;
pub mod bookings;
pub mod health;
pub mod price_seasons;
pub mod properties;
pub mod rooms;
