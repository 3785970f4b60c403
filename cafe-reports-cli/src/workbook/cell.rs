//! Raw cell values and tolerant numeric coercion
//!
//! Every decoded cell ends up as one of three shapes (empty, number, text).
//! All numeric reads go through [`to_number`] so that blanks, stray text and
//! formula errors collapse to zero in exactly one place.

/// A raw cell value as read from the sheet
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank cell (or no cell at all)
    #[default]
    Empty,
    /// Numeric cell, including date/time serials and booleans (1/0)
    Number(f64),
    /// Text cell, including error cells such as `#REF!`
    Text(String),
}

impl CellValue {
    /// Check if this value is blank
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Trimmed label text of the cell.
    ///
    /// Blank cells and a numeric zero both read as an empty label, matching
    /// how the report authors leave placeholder cells.
    pub fn label(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if *n == 0.0 || n.is_nan() => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// A cell: its raw value plus the formatted text the decoder showed for it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub display: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        let display = match &value {
            CellValue::Text(s) => Some(s.clone()),
            _ => None,
        };
        Self { value, display }
    }

    /// Cell with an explicit display text (e.g. a time rendered as `3:11`)
    pub fn with_display(value: CellValue, display: impl Into<String>) -> Self {
        Self {
            value,
            display: Some(display.into()),
        }
    }
}

/// Coerce a raw cell value to a number.
///
/// Blank cells, blank text, anything mentioning `#REF` and text that is not a
/// plain decimal number all become `0`.
pub fn to_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Empty => 0.0,
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) => 0.0,
        CellValue::Text(s) => {
            if s.contains("#REF") {
                return 0.0;
            }
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return 0.0;
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() && looks_numeric(trimmed) => n,
                _ => 0.0,
            }
        }
    }
}

/// `f64::from_str` also accepts `inf`/`nan` spellings; report text never
/// means those.
fn looks_numeric(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// Round to the nearest integer with halves going up (toward +inf).
pub fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Sheet contents relative to the sheet's used range.
///
/// Row 0 is the first row of the used range and column 0 its first column;
/// leading blank rows above the range do not exist here. Each row is trimmed
/// of trailing blank cells, so `row.len()` is the number of cells the row
/// actually spans.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetGrid {
    rows: Vec<Vec<Cell>>,
    /// 0-based sheet row of grid row 0
    origin_row: usize,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self::with_origin(rows, 0)
    }

    /// Grid whose first row sits at sheet row `origin_row` (0-based)
    pub fn with_origin(rows: Vec<Vec<Cell>>, origin_row: usize) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                while row.last().is_some_and(|c| c.value.is_empty()) {
                    row.pop();
                }
                row
            })
            .collect();
        Self { rows, origin_row }
    }

    /// Build a grid from plain values (display text derived from text cells)
    pub fn from_values(rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::new).collect())
                .collect(),
        )
    }

    pub fn origin_row(&self) -> usize {
        self.origin_row
    }

    /// 1-based spreadsheet row number of grid row `row`, for messages
    pub fn sheet_row_number(&self, row: usize) -> usize {
        self.origin_row + row + 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Direct cell access by grid position
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Raw value at a position, `Empty` when out of range
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cell(row, col).map(|c| &c.value).unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_blanks_and_errors() {
        assert_eq!(to_number(&CellValue::Empty), 0.0);
        assert_eq!(to_number(&CellValue::from("")), 0.0);
        assert_eq!(to_number(&CellValue::from("   ")), 0.0);
        assert_eq!(to_number(&CellValue::from("#REF!")), 0.0);
        assert_eq!(to_number(&CellValue::from("=A1+#REF!")), 0.0);
        assert_eq!(to_number(&CellValue::Number(f64::NAN)), 0.0);
    }

    #[test]
    fn test_to_number_text() {
        assert_eq!(to_number(&CellValue::from("42")), 42.0);
        assert_eq!(to_number(&CellValue::from(" 12.5 ")), 12.5);
        assert_eq!(to_number(&CellValue::from("-3")), -3.0);
        assert_eq!(to_number(&CellValue::from("abc")), 0.0);
        assert_eq!(to_number(&CellValue::from("inf")), 0.0);
        assert_eq!(to_number(&CellValue::from("NaN")), 0.0);
    }

    #[test]
    fn test_to_number_passes_numbers_through() {
        assert_eq!(to_number(&CellValue::Number(1234.75)), 1234.75);
        assert_eq!(to_number(&CellValue::Number(-0.5)), -0.5);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
    }

    #[test]
    fn test_label() {
        assert_eq!(CellValue::from("  Дата ").label(), "Дата");
        assert_eq!(CellValue::Empty.label(), "");
        assert_eq!(CellValue::Number(0.0).label(), "");
        assert_eq!(CellValue::Number(7.0).label(), "7");
    }

    #[test]
    fn test_grid_trims_trailing_blanks() {
        let grid = SheetGrid::from_values(vec![
            vec![CellValue::from("a"), CellValue::Empty, CellValue::Number(1.0), CellValue::Empty],
            vec![CellValue::Empty, CellValue::Empty],
        ]);

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.row(0).map(|r| r.len()), Some(3));
        assert_eq!(grid.row(1).map(|r| r.len()), Some(0));
        assert_eq!(grid.value(0, 2), &CellValue::Number(1.0));
        assert_eq!(grid.value(5, 5), &CellValue::Empty);
    }

    #[test]
    fn test_sheet_row_number_follows_origin() {
        let grid = SheetGrid::with_origin(vec![vec![Cell::new(CellValue::from("Дата"))]], 1);
        assert_eq!(grid.origin_row(), 1);
        assert_eq!(grid.sheet_row_number(0), 2);
        assert_eq!(SheetGrid::default().sheet_row_number(4), 5);
    }

    #[test]
    fn test_text_cell_display() {
        let cell = Cell::new(CellValue::from("3:11"));
        assert_eq!(cell.display.as_deref(), Some("3:11"));
        assert_eq!(Cell::new(CellValue::Number(1.0)).display, None);
    }
}
