//! Daily report workbook parsing
//!
//! Turns a human-maintained report workbook (one sheet per location) into
//! typed daily rows. Section columns are detected from the header row, so
//! sheets with different column layouts parse the same way.

pub mod cell;
pub mod dates;
pub mod decode;
pub mod delivery;
pub mod layout;
pub mod parser;
pub mod row;

pub use cell::{Cell, CellValue, SheetGrid, to_number};
pub use dates::{YearWindow, excel_serial_to_date};
pub use decode::decode_workbook;
pub use layout::{ResolvedLayout, Section, SectionColumns};
pub use parser::{ParseOptions, ParsedWorkbook, SheetParse, parse, parse_sheet, parse_workbook};
pub use row::{ParsedRow, RowOutcome, SkipReason, extract_row};
