use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PropertyBooking {
    pub id: i64,
    pub user_id: i64,
    pub property_id: i64,
    pub room_type_id: i64,
    pub full_name: String,
    pub phone_number: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

/// Booking request. Dates are `DD-MM-YYYY`; missing names and phone numbers
/// deserialize as empty so validation can report them per field.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBooking {
    pub property_id: i64,
    pub room_type_id: i64,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 120, message = "full_name is required"),
        custom(function = "not_blank", message = "full_name is required")
    )]
    pub full_name: String,
    #[serde(default)]
    #[validate(
        length(min = 6, max = 20, message = "phone_number is required"),
        custom(function = "not_blank", message = "phone_number is required")
    )]
    pub phone_number: String,
    pub check_in: String,
    pub check_out: String,
    #[validate(range(min = 0.0))]
    pub total_price: f64,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
