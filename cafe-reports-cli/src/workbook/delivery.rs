//! Order delivery time cells
//!
//! The business reports delivery time as the text shown in the cell
//! ("3:11" = 3 min 11 s), while the stored value is an Excel day fraction.
//! The shown text wins when it is available; otherwise the raw value is
//! interpreted as a day fraction (between 0 and 1) or as plain seconds.

use once_cell::sync::Lazy;
use regex::Regex;

use super::cell::{Cell, round_half_up, to_number};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// `minutes:seconds` as displayed in the report
static DELIVERY_TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3}):(\d{2})$").expect("valid delivery time pattern"));

/// Parse displayed `mm:ss` text into seconds
pub fn parse_display_seconds(text: &str) -> Option<i64> {
    let caps = DELIVERY_TIME_PATTERN.captures(text.trim())?;
    let minutes: i64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: i64 = caps.get(2)?.as_str().parse().ok()?;
    Some(minutes * 60 + seconds)
}

/// Read a delivery time cell as whole seconds; a missing cell reads as 0.
///
/// Only text cells carry display text after decoding, so a cell typed as a
/// time reaches the day-fraction branch. For `mm:ss` formats that gives the
/// same seconds the shown text would.
pub fn read_delivery_time(cell: Option<&Cell>) -> i64 {
    let Some(cell) = cell else {
        return 0;
    };

    if let Some(seconds) = cell.display.as_deref().and_then(parse_display_seconds) {
        return seconds;
    }

    let raw = to_number(&cell.value);
    let seconds = if raw > 0.0 && raw < 1.0 {
        round_half_up(raw * SECONDS_PER_DAY)
    } else {
        round_half_up(raw)
    };
    seconds as i64
}
