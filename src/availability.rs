use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::dates::StayWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Unavailable,
    Fullbooked,
    Available,
}

/// Occupancy of one room type for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomOccupancy {
    pub total: i64,
    pub booked: i64,
}

impl RoomOccupancy {
    /// A room type can never offer more units than it has room numbers, nor
    /// more than its declared quantity.
    pub fn new(quantity_room: i64, room_numbers: i64, booked: i64) -> Self {
        Self {
            total: quantity_room.min(room_numbers).max(0),
            booked: booked.max(0),
        }
    }

    pub fn free_units(&self) -> i64 {
        (self.total - self.booked).max(0)
    }

    pub fn status(&self) -> AvailabilityStatus {
        if self.total == 0 {
            AvailabilityStatus::Unavailable
        } else if self.booked >= self.total {
            AvailabilityStatus::Fullbooked
        } else {
            AvailabilityStatus::Available
        }
    }
}

pub fn property_status(rooms: &[RoomOccupancy]) -> AvailabilityStatus {
    let total: i64 = rooms.iter().map(|r| r.total).sum();
    if rooms.is_empty() || total == 0 {
        return AvailabilityStatus::Unavailable;
    }
    // Overbooking one room type does not eat into another's units.
    let booked: i64 = rooms.iter().map(|r| r.booked.min(r.total)).sum();
    if booked >= total {
        AvailabilityStatus::Fullbooked
    } else {
        AvailabilityStatus::Available
    }
}

/// Counts bookings whose stay overlaps the window.
pub fn count_overlapping<I>(window: &StayWindow, stays: I) -> i64
where
    I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
{
    stays
        .into_iter()
        .filter(|(check_in, check_out)| window.overlaps_stay(*check_in, *check_out))
        .count() as i64
}

/// Loads the occupancy of one room type from the database.
///
/// Not locked: a concurrent booking may land between this read and the
/// caller's insert.
pub async fn load_occupancy(
    pool: &SqlitePool,
    room_type_id: i64,
    window: &StayWindow,
) -> Result<RoomOccupancy, sqlx::Error> {
    let (quantity_room, room_numbers): (i64, i64) = sqlx::query_as(
        r#"
        SELECT rt.quantity_room,
               (SELECT COUNT(*) FROM room_numbers rn WHERE rn.room_type_id = rt.id)
        FROM room_types rt
        WHERE rt.id = ?
        "#,
    )
    .bind(room_type_id)
    .fetch_one(pool)
    .await?;

    let stays: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
        r#"
        SELECT check_in_date, check_out_date FROM property_bookings
        WHERE room_type_id = ?
        AND status = 'confirmed'
        AND check_out_date > ?
        "#,
    )
    .bind(room_type_id)
    .bind(window.check_in)
    .fetch_all(pool)
    .await?;

    Ok(RoomOccupancy::new(
        quantity_room,
        room_numbers,
        count_overlapping(window, stays),
    ))
}

/// Occupancy of every room type of a property, keyed by room type id.
pub async fn load_property_occupancy(
    pool: &SqlitePool,
    property_id: i64,
    window: &StayWindow,
) -> Result<Vec<(i64, RoomOccupancy)>, sqlx::Error> {
    let room_types: Vec<(i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT rt.id, rt.quantity_room,
               (SELECT COUNT(*) FROM room_numbers rn WHERE rn.room_type_id = rt.id)
        FROM room_types rt
        WHERE rt.property_id = ?
        ORDER BY rt.id
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    let stays: Vec<(i64, NaiveDate, NaiveDate)> = sqlx::query_as(
        r#"
        SELECT room_type_id, check_in_date, check_out_date FROM property_bookings
        WHERE property_id = ?
        AND status = 'confirmed'
        AND check_out_date > ?
        "#,
    )
    .bind(property_id)
    .bind(window.check_in)
    .fetch_all(pool)
    .await?;

    Ok(room_types
        .into_iter()
        .map(|(id, quantity, numbers)| {
            let booked = count_overlapping(
                window,
                stays
                    .iter()
                    .filter(|(room_type_id, _, _)| *room_type_id == id)
                    .map(|(_, check_in, check_out)| (*check_in, *check_out)),
            );
            (id, RoomOccupancy::new(quantity, numbers, booked))
        })
        .collect())
}
