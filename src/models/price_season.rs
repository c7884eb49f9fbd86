use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PropertyPriceHistory {
    pub id: i64,
    pub room_numbers_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub final_price: f64,
    pub created_at: NaiveDateTime,
}

/// A season applies to every room number of the room type. Dates are
/// `DD-MM-YYYY` and both ends are inclusive.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePriceSeason {
    pub room_type_id: i64,
    pub start_date: String,
    pub end_date: String,
    #[validate(range(min = 0.01))]
    pub final_price: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PriceSeasonRow {
    pub id: i64,
    pub room_numbers_id: i64,
    pub room_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub final_price: f64,
}
