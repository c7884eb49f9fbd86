use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};

use crate::availability::{AvailabilityStatus, RoomOccupancy};
use crate::dates::StayWindow;

/// A price-history row as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct SeasonPrice {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub final_price: f64,
}

impl SeasonPrice {
    /// A season competes when it is running today or shares a night with the
    /// requested stay.
    pub fn applies(&self, window: Option<&StayWindow>, today: NaiveDate) -> bool {
        let running_today = self.start_date <= today && today <= self.end_date;
        running_today || window.is_some_and(|w| w.touches_season(self.start_date, self.end_date))
    }
}

/// Minimum of the base price and every applicable season price. Equal prices
/// are interchangeable; no season wins for being newer.
pub fn lowest_price(
    base_price: f64,
    seasons: &[SeasonPrice],
    window: Option<&StayWindow>,
    today: NaiveDate,
) -> f64 {
    seasons
        .iter()
        .filter(|s| s.applies(window, today))
        .map(|s| s.final_price)
        .fold(base_price, f64::min)
}

/// Cheapest room type that has any capacity; `None` for unavailable
/// properties.
pub fn property_lowest_price<I>(status: AvailabilityStatus, rooms: I) -> Option<f64>
where
    I: IntoIterator<Item = (RoomOccupancy, f64)>,
{
    if status == AvailabilityStatus::Unavailable {
        return None;
    }
    rooms
        .into_iter()
        .filter(|(occupancy, _)| occupancy.total > 0)
        .map(|(_, price)| price)
        .reduce(f64::min)
}

pub async fn load_seasons(
    pool: &SqlitePool,
    room_type_id: i64,
    window: &StayWindow,
    today: NaiveDate,
) -> Result<Vec<SeasonPrice>, sqlx::Error> {
    sqlx::query_as::<_, SeasonPrice>(
        r#"
        SELECT h.start_date, h.end_date, h.final_price
        FROM property_price_history h
        JOIN room_numbers rn ON rn.id = h.room_numbers_id
        WHERE rn.room_type_id = ?
        AND h.end_date >= ?
        "#,
    )
    .bind(room_type_id)
    .bind(window.check_in.min(today))
    .fetch_all(pool)
    .await
}

pub async fn room_type_lowest_price(
    pool: &SqlitePool,
    room_type_id: i64,
    base_price: f64,
    window: &StayWindow,
    today: NaiveDate,
) -> Result<f64, sqlx::Error> {
    let seasons = load_seasons(pool, room_type_id, window, today).await?;
    Ok(lowest_price(base_price, &seasons, Some(window), today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn season(start: NaiveDate, end: NaiveDate, price: f64) -> SeasonPrice {
        SeasonPrice {
            start_date: start,
            end_date: end,
            final_price: price,
        }
    }

    #[test]
    fn base_price_without_seasons() {
        assert_eq!(lowest_price(120.0, &[], None, d(1, 1)), 120.0);
    }

    #[test]
    fn season_running_today_applies() {
        let seasons = [season(d(1, 1), d(1, 31), 90.0)];
        assert_eq!(lowest_price(120.0, &seasons, None, d(1, 15)), 90.0);
        assert_eq!(lowest_price(120.0, &seasons, None, d(2, 1)), 120.0);
    }

    #[test]
    fn season_overlapping_the_stay_applies() {
        let seasons = [season(d(7, 1), d(7, 31), 80.0)];
        let stay = StayWindow::new(d(6, 28), d(7, 2)).unwrap();
        assert_eq!(lowest_price(120.0, &seasons, Some(&stay), d(1, 1)), 80.0);

        let stay = StayWindow::new(d(6, 20), d(7, 1)).unwrap();
        assert_eq!(lowest_price(120.0, &seasons, Some(&stay), d(1, 1)), 120.0);
    }

    #[test]
    fn surcharges_never_beat_the_base_price() {
        let seasons = [
            season(d(1, 1), d(12, 31), 150.0),
            season(d(3, 1), d(3, 31), 200.0),
        ];
        let stay = StayWindow::new(d(3, 5), d(3, 8)).unwrap();
        assert_eq!(lowest_price(120.0, &seasons, Some(&stay), d(3, 1)), 120.0);
    }

    #[test]
    fn picks_minimum_of_many() {
        let seasons = [
            season(d(3, 1), d(3, 31), 100.0),
            season(d(3, 5), d(3, 6), 70.0),
            season(d(3, 1), d(3, 31), 95.0),
        ];
        let stay = StayWindow::new(d(3, 5), d(3, 8)).unwrap();
        assert_eq!(lowest_price(120.0, &seasons, Some(&stay), d(1, 1)), 70.0);
    }

    #[test]
    fn never_above_base_price() {
        let prices = [10.0, 99.0, 100.0, 101.0, 500.0];
        for base in [50.0, 100.0, 250.0] {
            let seasons: Vec<_> = prices.iter().map(|p| season(d(1, 1), d(12, 31), *p)).collect();
            assert!(lowest_price(base, &seasons, None, d(6, 1)) <= base);
        }
    }

    #[test]
    fn unavailable_property_has_no_price() {
        let rooms = [(RoomOccupancy::new(0, 0, 0), 100.0)];
        assert_eq!(
            property_lowest_price(AvailabilityStatus::Unavailable, rooms),
            None
        );
    }

    #[test]
    fn property_price_ignores_room_types_without_units() {
        let rooms = [
            (RoomOccupancy::new(0, 0, 0), 40.0),
            (RoomOccupancy::new(2, 2, 2), 110.0),
            (RoomOccupancy::new(1, 1, 0), 90.0),
        ];
        assert_eq!(
            property_lowest_price(AvailabilityStatus::Available, rooms),
            Some(90.0)
        );
    }
}
