//! Excel serial dates and the plausible report-year window

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Serials below this are never report dates (40000 = 2009-07-06)
pub const MIN_DATE_SERIAL: f64 = 40000.0;

/// Convert an Excel serial day number to a calendar date.
///
/// Uses the 1899-12-30 base that spreadsheet software effectively uses,
/// which carries the phantom 1900-02-29 for every serial from 61 onward
/// (serial 25569 = 1970-01-01, 45292 = 2024-01-01). Time-of-day fractions
/// are dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.floor();
    if days.abs() > 3_000_000.0 {
        return None;
    }
    base.checked_add_signed(Duration::days(days as i64))
}

/// Inclusive range of years a report row may fall in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl YearWindow {
    pub const YEARS_BACK: i32 = 2;
    pub const YEARS_AHEAD: i32 = 1;

    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Default window anchored at `year`: two years back, one ahead
    pub fn around(year: i32) -> Self {
        Self::new(year - Self::YEARS_BACK, year + Self::YEARS_AHEAD)
    }

    /// Window anchored at the current UTC year
    pub fn current() -> Self {
        Self::around(Utc::now().year())
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for YearWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_epoch() {
        assert_eq!(excel_serial_to_date(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(25569.0), Some(ymd(1970, 1, 1)));
        assert_eq!(excel_serial_to_date(40000.0), Some(ymd(2009, 7, 6)));
        // 1900-03-01 is serial 61 because of the phantom leap day
        assert_eq!(excel_serial_to_date(61.0), Some(ymd(1900, 3, 1)));
    }

    #[test]
    fn test_serial_drops_time_fraction() {
        assert_eq!(excel_serial_to_date(45292.75), Some(ymd(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(45658.0), Some(ymd(2025, 1, 1)));
    }

    #[test]
    fn test_serial_rejects_garbage() {
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
        assert_eq!(excel_serial_to_date(1e12), None);
    }

    #[test]
    fn test_year_window_around() {
        let window = YearWindow::around(2026);
        assert_eq!(window, YearWindow::new(2024, 2027));
        assert!(!window.contains(2023));
        assert!(window.contains(2024));
        assert!(window.contains(2027));
        assert!(!window.contains(2028));
    }

    #[test]
    fn test_current_window_tracks_clock() {
        let year = Utc::now().year();
        let window = YearWindow::current();
        assert!(window.contains(year));
        assert!(window.contains(year - 2));
        assert!(window.contains(year + 1));
        assert!(!window.contains(year - 3));
        assert!(!window.contains(year + 2));
    }
}
