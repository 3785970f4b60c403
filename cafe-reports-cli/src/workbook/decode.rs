//! Decode spreadsheet bytes into sheet grids with calamine

use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};

use super::cell::{Cell, CellValue, SheetGrid};

/// Decode a workbook (xlsx, xlsm, xlsb, xls or ods) into named sheet grids,
/// in workbook order.
pub fn decode_workbook(buffer: &[u8]) -> Result<Vec<(String, SheetGrid)>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer))
        .context("Failed to open workbook: not a readable spreadsheet")?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        sheets.push((sheet_name, range_to_grid(&range)));
    }

    Ok(sheets)
}

/// Grid relative to the used range, remembering where the range starts
fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    let Some((start_row, _)) = range.start() else {
        return SheetGrid::default();
    };

    let rows = range
        .rows()
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    SheetGrid::with_origin(rows, start_row as usize)
}

/// Convert a calamine cell to a [`Cell`].
///
/// calamine does not render number formats, so only text cells carry
/// display text.
fn data_to_cell(data: &Data) -> Cell {
    let value = match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        // Date and time cells keep their serial value
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    };
    Cell::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_decode_keeps_sheet_order_and_used_range() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Центр").unwrap();
        sheet.write_string(2, 1, "Дата").unwrap();
        sheet.write_number(3, 3, 45292.0).unwrap();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Север").unwrap();
        sheet.write_string(0, 0, "x").unwrap();
        let buffer = workbook.save_to_buffer().unwrap();

        let sheets = decode_workbook(&buffer).unwrap();
        let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Центр", "Север"]);

        // Rows and columns count from the used range (B3), not from A1
        let grid = &sheets[0].1;
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.origin_row(), 2);
        assert_eq!(grid.value(0, 0), &CellValue::from("Дата"));
        assert_eq!(grid.value(1, 2), &CellValue::Number(45292.0));
        assert_eq!(grid.row(0).map(|r| r.len()), Some(1));
        assert_eq!(grid.row(1).map(|r| r.len()), Some(3));
        assert_eq!(grid.sheet_row_number(1), 4);
    }

    #[test]
    fn test_text_cells_carry_display() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "3:11").unwrap();
        let buffer = workbook.save_to_buffer().unwrap();

        let sheets = decode_workbook(&buffer).unwrap();
        let cell = sheets[0].1.cell(0, 0).unwrap();
        assert_eq!(cell.display.as_deref(), Some("3:11"));
    }

    #[test]
    fn test_data_conversion() {
        assert_eq!(data_to_cell(&Data::Int(7)).value, CellValue::Number(7.0));
        assert_eq!(data_to_cell(&Data::Bool(true)).value, CellValue::Number(1.0));
        assert_eq!(
            data_to_cell(&Data::String(String::new())).value,
            CellValue::Empty
        );
        assert_eq!(
            data_to_cell(&Data::Error(calamine::CellErrorType::Ref)).value,
            CellValue::from("#REF!")
        );
    }

    #[test]
    fn test_garbage_buffer_is_an_error() {
        assert!(decode_workbook(b"definitely not a spreadsheet").is_err());
    }

    #[test]
    fn test_empty_sheet() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let buffer = workbook.save_to_buffer().unwrap();

        let sheets = decode_workbook(&buffer).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].1.row_count(), 0);
    }
}
