use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::availability::AvailabilityStatus;

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct RoomType {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity_room: i64,
    pub total_booked: i64,
    pub guest_capacity: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct RoomNumber {
    pub id: i64,
    pub room_type_id: i64,
    pub number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomType {
    pub property_id: i64,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 0.01))]
    pub price: f64,
    #[validate(range(min = 0, max = 500))]
    pub quantity_room: i64,
    #[serde(default = "default_guest_capacity")]
    #[validate(range(min = 1, max = 50))]
    pub guest_capacity: i64,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub facilities: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoomType {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 0.01))]
    pub price: f64,
    #[validate(range(min = 0, max = 500))]
    pub quantity_room: i64,
    #[serde(default = "default_guest_capacity")]
    #[validate(range(min = 1, max = 50))]
    pub guest_capacity: i64,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub facilities: Vec<String>,
}

fn default_guest_capacity() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct RoomTypeView {
    #[serde(flatten)]
    pub room_type: RoomType,
    pub facilities: Vec<String>,
    pub status: AvailabilityStatus,
    pub free_units: i64,
    pub lowest_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomAvailability {
    pub room_type_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: AvailabilityStatus,
    pub total_units: i64,
    pub free_units: i64,
    pub lowest_price: Option<f64>,
}
