//! Date parsing for the public API and the stay window used by the resolvers.
//!
//! Clients send dates as `DD-MM-YYYY`. Internally everything is a
//! [`NaiveDate`]; stays are half-open (`check_out` is the departure day and is
//! free for the next guest), price seasons are closed on both ends.

use chrono::{Duration, NaiveDate, Utc};

use crate::error::ApiError;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn parse_dmy(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::bad_request(format!("{field} must be a date in DD-MM-YYYY format")))
}

pub fn today() -> NaiveDate {
    Utc::now().naive_utc().date()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayWindow {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayWindow {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, ApiError> {
        if check_out <= check_in {
            return Err(ApiError::bad_request("Check-out must be after check-in"));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Parses both ends from query/body strings.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self, ApiError> {
        Self::new(
            parse_dmy("check_in", check_in)?,
            parse_dmy("check_out", check_out)?,
        )
    }

    /// Builds a window from optional strings; a missing pair means a one night
    /// stay starting `today`. Supplying only one end is rejected.
    pub fn from_optional(
        check_in: Option<&str>,
        check_out: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ApiError> {
        match (check_in, check_out) {
            (Some(ci), Some(co)) => Self::parse(ci, co),
            (None, None) => Self::new(today, today + Duration::days(1)),
            _ => Err(ApiError::bad_request(
                "check_in and check_out must be given together",
            )),
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn overlaps_stay(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in < check_out && check_in < self.check_out
    }

    /// True when the closed season `[start, end]` shares a night with this stay.
    pub fn touches_season(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start < self.check_out && self.check_in <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_day_month_year() {
        assert_eq!(parse_dmy("check_in", "05-03-2025").unwrap(), d(2025, 3, 5));
        assert_eq!(parse_dmy("check_in", " 31-12-2024 ").unwrap(), d(2024, 12, 31));
    }

    #[test]
    fn rejects_iso_and_garbage() {
        assert!(parse_dmy("check_in", "2025-03-05").is_err());
        assert!(parse_dmy("check_in", "32-01-2025").is_err());
        assert!(parse_dmy("check_in", "").is_err());
        let err = parse_dmy("check_out", "tomorrow").unwrap_err();
        assert!(err.to_string().contains("check_out"));
    }

    #[test]
    fn window_requires_checkout_after_checkin() {
        assert!(StayWindow::parse("10-01-2025", "10-01-2025").is_err());
        assert!(StayWindow::parse("11-01-2025", "10-01-2025").is_err());
        let w = StayWindow::parse("10-01-2025", "13-01-2025").unwrap();
        assert_eq!(w.nights(), 3);
    }

    #[test]
    fn optional_window_defaults_to_one_night() {
        let w = StayWindow::from_optional(None, None, d(2025, 6, 1)).unwrap();
        assert_eq!(w.check_in, d(2025, 6, 1));
        assert_eq!(w.check_out, d(2025, 6, 2));
        assert!(StayWindow::from_optional(Some("01-06-2025"), None, d(2025, 6, 1)).is_err());
    }

    #[test]
    fn stays_are_half_open() {
        let w = StayWindow::new(d(2025, 1, 10), d(2025, 1, 12)).unwrap();
        // back-to-back stays share only the changeover day
        assert!(!w.overlaps_stay(d(2025, 1, 12), d(2025, 1, 14)));
        assert!(!w.overlaps_stay(d(2025, 1, 8), d(2025, 1, 10)));
        assert!(w.overlaps_stay(d(2025, 1, 11), d(2025, 1, 20)));
        // a booking strictly containing the window still overlaps
        assert!(w.overlaps_stay(d(2025, 1, 1), d(2025, 1, 31)));
    }

    #[test]
    fn seasons_are_closed() {
        let w = StayWindow::new(d(2025, 1, 10), d(2025, 1, 12)).unwrap();
        assert!(w.touches_season(d(2025, 1, 1), d(2025, 1, 10)));
        assert!(w.touches_season(d(2025, 1, 11), d(2025, 1, 11)));
        assert!(!w.touches_season(d(2025, 1, 12), d(2025, 1, 20)));
        assert!(!w.touches_season(d(2024, 12, 1), d(2025, 1, 9)));
    }
}
