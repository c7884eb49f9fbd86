use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::availability::AvailabilityStatus;
use crate::models::room::RoomTypeView;

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Property {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// Body of both create and update; an update replaces every field and the
/// facility list.
#[derive(Debug, Deserialize, Validate)]
pub struct PropertyInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 80))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub facilities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PropertySearch {
    pub city: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertySummary {
    #[serde(flatten)]
    pub property: Property,
    pub facilities: Vec<String>,
    pub status: AvailabilityStatus,
    pub lowest_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub summary: PropertySummary,
    pub room_types: Vec<RoomTypeView>,
}
