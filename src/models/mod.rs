pub mod booking;
pub mod price_season;
pub mod property;
pub mod room;
pub mod user;
