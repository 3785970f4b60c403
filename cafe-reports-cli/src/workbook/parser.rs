//! Workbook driver: sheets in, daily rows out

use std::collections::HashMap;

use anyhow::Result;
use log::{debug, trace, warn};
use serde::Serialize;

use super::cell::SheetGrid;
use super::dates::YearWindow;
use super::decode::decode_workbook;
use super::layout::ResolvedLayout;
use super::row::{ParsedRow, RowOutcome, extract_row};

/// Options for a parse run
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Rows dated outside this window are skipped
    pub year_window: YearWindow,
}

impl ParseOptions {
    pub fn with_year_window(year_window: YearWindow) -> Self {
        Self { year_window }
    }
}

/// Rows parsed from one sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetParse {
    /// `None` when the sheet has no header row
    pub header_row: Option<usize>,
    pub rows: Vec<ParsedRow>,
    pub skipped: usize,
}

/// Parse result for a whole workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedWorkbook {
    /// Sheet names in workbook order; each names a location
    pub sheet_names: Vec<String>,
    pub rows_by_sheet: HashMap<String, Vec<ParsedRow>>,
    pub skipped_by_sheet: HashMap<String, usize>,
}

impl ParsedWorkbook {
    pub fn rows(&self, sheet_name: &str) -> &[ParsedRow] {
        self.rows_by_sheet
            .get(sheet_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn skipped(&self, sheet_name: &str) -> usize {
        self.skipped_by_sheet.get(sheet_name).copied().unwrap_or(0)
    }

    pub fn total_rows(&self) -> usize {
        self.rows_by_sheet.values().map(|r| r.len()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped_by_sheet.values().sum()
    }
}

/// Parse one sheet.
///
/// A sheet without a header row yields no rows and counts every row as
/// skipped.
pub fn parse_sheet(grid: &SheetGrid, options: &ParseOptions) -> SheetParse {
    let Some(layout) = ResolvedLayout::detect(grid) else {
        return SheetParse {
            header_row: None,
            rows: Vec::new(),
            skipped: grid.row_count(),
        };
    };

    debug!(
        "Header at row {}, sections {:?}, productivity data at {:?}",
        grid.sheet_row_number(layout.header_row),
        layout.sections,
        layout.productivity_start
    );
    let missing = layout.sections.missing();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|s| s.to_string()).collect();
        debug!("Sections absent, read as zero: {}", names.join(", "));
    }

    let mut result = SheetParse {
        header_row: Some(layout.header_row),
        ..SheetParse::default()
    };
    for row_idx in 0..grid.row_count() {
        match extract_row(grid, row_idx, &layout, &options.year_window) {
            RowOutcome::Parsed(row) => result.rows.push(*row),
            RowOutcome::Skipped(reason) => {
                trace!("Row {} skipped: {}", grid.sheet_row_number(row_idx), reason);
                result.skipped += 1;
            }
        }
    }

    result
}

/// Parse already-decoded sheets
pub fn parse_sheets(sheets: Vec<(String, SheetGrid)>, options: &ParseOptions) -> ParsedWorkbook {
    let mut parsed = ParsedWorkbook::default();

    for (sheet_name, grid) in sheets {
        let sheet = parse_sheet(&grid, options);

        if sheet.header_row.is_none() {
            warn!(
                "Sheet '{}': no '{}' header row found, {} rows skipped",
                sheet_name,
                super::layout::HEADER_MARKER,
                sheet.skipped
            );
        } else {
            debug!(
                "Sheet '{}': {} rows parsed, {} skipped",
                sheet_name,
                sheet.rows.len(),
                sheet.skipped
            );
        }

        parsed.sheet_names.push(sheet_name.clone());
        parsed.skipped_by_sheet.insert(sheet_name.clone(), sheet.skipped);
        parsed.rows_by_sheet.insert(sheet_name, sheet.rows);
    }

    parsed
}

/// Parse a workbook buffer.
///
/// Fails only when the buffer is not a readable spreadsheet.
pub fn parse_workbook(buffer: &[u8], options: &ParseOptions) -> Result<ParsedWorkbook> {
    let sheets = decode_workbook(buffer)?;
    Ok(parse_sheets(sheets, options))
}

/// Parse a workbook buffer with the default (current) year window
pub fn parse(buffer: &[u8]) -> Result<ParsedWorkbook> {
    parse_workbook(buffer, &ParseOptions::default())
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory report workbooks shaped like the real ones

    use chrono::{Datelike, NaiveDate, Utc};
    use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

    pub fn serial(date: NaiveDate) -> f64 {
        let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
        (date - base).num_days() as f64
    }

    /// A serial for `day` of January in the current year
    pub fn current_year_serial(day: u32) -> f64 {
        serial(NaiveDate::from_ymd_opt(Utc::now().year(), 1, day).unwrap())
    }

    /// Write the section title row at `row`.
    ///
    /// Layout: A label, B date, C.. sales (11), N orders (3), Q loyalty (4),
    /// U avg check (3), X fill rate (6), AC productivity title over the
    /// portions column, AG delivery time.
    pub fn write_header(sheet: &mut Worksheet, row: u32, with_loyalty: bool) -> Result<(), XlsxError> {
        sheet.write_string(row, 0, "Дата")?;
        sheet.write_string(row, 2, "Продажи")?;
        sheet.write_string(row, 13, "Кол-во заказов")?;
        if with_loyalty {
            sheet.write_string(row, 16, "Карты лояльности")?;
        }
        sheet.write_string(row, 20, "Средний чек")?;
        sheet.write_string(row, 23, "Наполненность")?;
        sheet.write_string(row, 28, "Производительность")?;
        sheet.write_string(row, 32, "Время выдачи заказа")?;
        Ok(())
    }

    /// Sub-header whose "План" puts productivity data one column right of
    /// its title
    pub fn write_sub_header(sheet: &mut Worksheet, row: u32) -> Result<(), XlsxError> {
        for (col, label) in [(23, "план"), (24, "факт"), (25, "откл"), (26, "блюда"), (27, "напитки"), (28, "Порции")] {
            sheet.write_string(row, col, label)?;
        }
        for (col, label) in [(29, "План"), (30, "часы"), (31, "факт")] {
            sheet.write_string(row, col, label)?;
        }
        Ok(())
    }

    /// Write a data row; metric column `c` holds `c + 0.25`, except the
    /// count columns which hold whole numbers
    pub fn write_day(
        sheet: &mut Worksheet,
        row: u32,
        weekday: &str,
        date_serial: f64,
    ) -> Result<(), XlsxError> {
        sheet.write_string(row, 0, weekday)?;
        sheet.write_number(row, 1, date_serial)?;
        for col in 2..32u16 {
            sheet.write_number(row, col, col as f64 + 0.25)?;
        }
        sheet.write_number(row, 14, 120.0)?;
        sheet.write_number(row, 17, 35.0)?;
        sheet.write_string(row, 32, "3:11")?;
        Ok(())
    }

    /// Sheet "Center": first row blank, header on spreadsheet row 2, five
    /// valid days and a totals row. Sheet "North": two lines of notes on
    /// rows 5-6, no header.
    pub fn two_sheet_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let center = workbook.add_worksheet();
        center.set_name("Center")?;
        write_header(center, 1, true)?;
        for day in 1..=5u32 {
            write_day(center, 1 + day, "Пн", current_year_serial(day))?;
        }
        write_day(center, 7, "Итого", current_year_serial(6))?;

        let north = workbook.add_worksheet();
        north.set_name("North")?;
        north.write_string(4, 0, "Данные не заполнены")?;
        north.write_string(5, 0, "Ответственный")?;

        workbook.save_to_buffer()
    }

    /// Sheet "South": title, header, sub-header, then three days
    pub fn sub_header_workbook(with_loyalty: bool) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name("South")?;
        sheet.write_string(0, 0, "Отчет по точке")?;
        write_header(sheet, 1, with_loyalty)?;
        write_sub_header(sheet, 2)?;
        for day in 1..=3u32 {
            write_day(sheet, 2 + day, "Вт", current_year_serial(day))?;
        }

        workbook.save_to_buffer()
    }
}
