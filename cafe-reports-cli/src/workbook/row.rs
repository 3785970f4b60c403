//! Daily report rows: validation and field extraction

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellValue, SheetGrid, round_half_up, to_number};
use super::dates::{MIN_DATE_SERIAL, YearWindow, excel_serial_to_date};
use super::delivery::read_delivery_time;
use super::layout::{HEADER_MARKER, ResolvedLayout, TOTAL_MARKER};

/// Rows with fewer cells than this are never data rows
pub const MIN_ROW_CELLS: usize = 10;
/// Column holding the date serial
pub const DATE_COLUMN: usize = 1;

/// Sub-column offsets from each section's start column
mod offsets {
    pub mod sales {
        pub const PLAN: usize = 0;
        pub const FACT: usize = 1;
        pub const DISCOUNTS: usize = 2;
        pub const WITH_DISCOUNTS: usize = 3;
        pub const DISCOUNT_PERCENT: usize = 4;
        pub const YANDEX_FOOD: usize = 5;
        pub const DEVIATION: usize = 6;
        pub const MONTH_PLAN: usize = 7;
        pub const MONTH_FACT: usize = 8;
        pub const MONTH_DEVIATION: usize = 9;
        pub const MONTH_DEVIATION_RUB: usize = 10;
    }

    /// Shared by orders and average check
    pub mod triple {
        pub const PLAN: usize = 0;
        pub const FACT: usize = 1;
        pub const DEVIATION: usize = 2;
    }

    pub mod loyalty {
        pub const PLAN: usize = 0;
        pub const FACT: usize = 1;
        pub const PENETRATION: usize = 2;
        pub const DEVIATION: usize = 3;
    }

    /// Offset 2 is the fill-rate deviation, which is not imported
    pub mod fill_rate {
        pub const PLAN: usize = 0;
        pub const FACT: usize = 1;
        pub const DISHES: usize = 3;
        pub const DRINKS: usize = 4;
        pub const PORTIONS: usize = 5;
    }

    pub mod productivity {
        pub const PLAN: usize = 0;
        pub const HOURS: usize = 1;
        pub const FACT: usize = 2;
    }
}

/// One location's metrics for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRow {
    pub date: NaiveDate,

    // Sales
    pub sales_plan: f64,
    pub sales_fact: f64,
    pub discounts: f64,
    pub sales_with_discounts: f64,
    pub discount_percent: f64,
    pub yandex_food: f64,
    pub sales_deviation: f64,
    pub month_sales_plan: f64,
    pub month_sales_fact: f64,
    pub month_sales_deviation: f64,
    pub month_sales_deviation_rub: f64,

    // Orders
    pub orders_plan: f64,
    pub orders_fact: i64,
    pub orders_deviation: f64,

    // Loyalty cards
    pub loyalty_plan: f64,
    pub loyalty_fact: i64,
    pub loyalty_penetration: f64,
    pub loyalty_deviation: f64,

    // Average check
    pub avg_check_plan: f64,
    pub avg_check_fact: f64,
    pub avg_check_deviation: f64,

    // Fill rate
    pub fill_rate_plan: f64,
    pub fill_rate_fact: f64,
    pub avg_dishes: f64,
    pub avg_drinks: f64,
    pub portions: f64,

    // Productivity
    pub productivity_plan: f64,
    pub hours_worked: f64,
    pub productivity_fact: f64,

    /// Seconds
    pub order_delivery_time: i64,
}

/// Why a sheet row did not become a [`ParsedRow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    HeaderRow,
    BlankLabel,
    TotalRow,
    NoDate,
    DateBelowFloor,
    YearOutOfRange(i32),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooShort => write!(f, "fewer than {} cells", MIN_ROW_CELLS),
            SkipReason::HeaderRow => write!(f, "header row"),
            SkipReason::BlankLabel => write!(f, "blank first cell"),
            SkipReason::TotalRow => write!(f, "total row"),
            SkipReason::NoDate => write!(f, "no numeric date"),
            SkipReason::DateBelowFloor => write!(f, "date serial below {}", MIN_DATE_SERIAL),
            SkipReason::YearOutOfRange(year) => write!(f, "year {} outside window", year),
        }
    }
}

/// Result of examining one sheet row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(Box<ParsedRow>),
    Skipped(SkipReason),
}

/// Decide whether a row is a data row and return its date if so
fn validate_row(row: &[Cell], window: &YearWindow) -> Result<NaiveDate, SkipReason> {
    if row.len() < MIN_ROW_CELLS {
        return Err(SkipReason::TooShort);
    }

    let label = row[0].value.label();
    if label == HEADER_MARKER {
        return Err(SkipReason::HeaderRow);
    }
    if label.is_empty() {
        return Err(SkipReason::BlankLabel);
    }
    if label.to_lowercase() == TOTAL_MARKER {
        return Err(SkipReason::TotalRow);
    }

    let serial = match row[DATE_COLUMN].value {
        CellValue::Number(n) if n != 0.0 && !n.is_nan() => n,
        _ => return Err(SkipReason::NoDate),
    };
    if serial < MIN_DATE_SERIAL {
        return Err(SkipReason::DateBelowFloor);
    }

    let date = excel_serial_to_date(serial).ok_or(SkipReason::NoDate)?;
    if !window.contains(date.year()) {
        return Err(SkipReason::YearOutOfRange(date.year()));
    }

    Ok(date)
}

/// Numeric field at `offset` from a section start; 0 when the section is absent
fn field(row: &[Cell], start: Option<usize>, offset: usize) -> f64 {
    start
        .and_then(|s| row.get(s + offset))
        .map(|c| to_number(&c.value))
        .unwrap_or(0.0)
}

/// Like [`field`], rounded to a whole count
fn count_field(row: &[Cell], start: Option<usize>, offset: usize) -> i64 {
    round_half_up(field(row, start, offset)) as i64
}

/// Validate and extract the row at `row_idx`
pub fn extract_row(
    grid: &SheetGrid,
    row_idx: usize,
    layout: &ResolvedLayout,
    window: &YearWindow,
) -> RowOutcome {
    let row = grid.row(row_idx).unwrap_or_default();
    let date = match validate_row(row, window) {
        Ok(date) => date,
        Err(reason) => return RowOutcome::Skipped(reason),
    };

    let sec = &layout.sections;
    let s = sec.sales;
    let o = sec.orders;
    let l = sec.loyalty;
    let ch = sec.avg_check;
    let n = sec.fill_rate;
    let p = layout.productivity_start;

    let delivery_cell = sec.delivery_time.and_then(|col| grid.cell(row_idx, col));

    RowOutcome::Parsed(Box::new(ParsedRow {
        date,
        sales_plan: field(row, s, offsets::sales::PLAN),
        sales_fact: field(row, s, offsets::sales::FACT),
        discounts: field(row, s, offsets::sales::DISCOUNTS),
        sales_with_discounts: field(row, s, offsets::sales::WITH_DISCOUNTS),
        discount_percent: field(row, s, offsets::sales::DISCOUNT_PERCENT),
        yandex_food: field(row, s, offsets::sales::YANDEX_FOOD),
        sales_deviation: field(row, s, offsets::sales::DEVIATION),
        month_sales_plan: field(row, s, offsets::sales::MONTH_PLAN),
        month_sales_fact: field(row, s, offsets::sales::MONTH_FACT),
        month_sales_deviation: field(row, s, offsets::sales::MONTH_DEVIATION),
        month_sales_deviation_rub: field(row, s, offsets::sales::MONTH_DEVIATION_RUB),
        orders_plan: field(row, o, offsets::triple::PLAN),
        orders_fact: count_field(row, o, offsets::triple::FACT),
        orders_deviation: field(row, o, offsets::triple::DEVIATION),
        loyalty_plan: field(row, l, offsets::loyalty::PLAN),
        loyalty_fact: count_field(row, l, offsets::loyalty::FACT),
        loyalty_penetration: field(row, l, offsets::loyalty::PENETRATION),
        loyalty_deviation: field(row, l, offsets::loyalty::DEVIATION),
        avg_check_plan: field(row, ch, offsets::triple::PLAN),
        avg_check_fact: field(row, ch, offsets::triple::FACT),
        avg_check_deviation: field(row, ch, offsets::triple::DEVIATION),
        fill_rate_plan: field(row, n, offsets::fill_rate::PLAN),
        fill_rate_fact: field(row, n, offsets::fill_rate::FACT),
        avg_dishes: field(row, n, offsets::fill_rate::DISHES),
        avg_drinks: field(row, n, offsets::fill_rate::DRINKS),
        portions: field(row, n, offsets::fill_rate::PORTIONS),
        productivity_plan: field(row, p, offsets::productivity::PLAN),
        hours_worked: field(row, p, offsets::productivity::HOURS),
        productivity_fact: field(row, p, offsets::productivity::FACT),
        order_delivery_time: read_delivery_time(delivery_cell),
    }))
}
