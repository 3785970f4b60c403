//! Header row location and section column detection
//!
//! Report sheets have a header row whose first cell is "Дата", with merged
//! section titles ("Продажи", "Кол-во заказов", ...) above a sub-header row
//! ("план", "факт", ...). Each section is located by the column of its title
//! and its fields are then read at fixed offsets from that column.

use super::cell::{Cell, SheetGrid};

/// First-cell text of the header row
pub const HEADER_MARKER: &str = "Дата";
/// First-cell text of monthly total rows (compared lower-cased)
pub const TOTAL_MARKER: &str = "итого";
/// How many leading rows are searched for the header
pub const HEADER_SEARCH_ROWS: usize = 20;
/// Sub-header word marking a "plan" column
pub const PLAN_LABEL: &str = "план";
/// How many sub-header cells are inspected when resolving productivity
pub const PRODUCTIVITY_SCAN_WIDTH: usize = 5;

/// Section title labels, lower-cased
mod labels {
    /// Matched exactly
    pub const SALES: &str = "продажи";
    /// Must be checked before ORDERS: "время выдачи заказа" contains "заказ"
    pub const DELIVERY_TIME: &str = "время выдачи";
    pub const ORDERS: &str = "заказ";
    pub const LOYALTY: &str = "лояльност";
    pub const AVG_CHECK: &str = "средний чек";
    pub const FILL_RATE: &str = "наполненность";
    pub const PRODUCTIVITY: &str = "производительность";
}

/// A logical group of adjacent sub-columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Sales,
    Orders,
    Loyalty,
    AvgCheck,
    FillRate,
    Productivity,
    DeliveryTime,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Sales,
        Section::Orders,
        Section::Loyalty,
        Section::AvgCheck,
        Section::FillRate,
        Section::Productivity,
        Section::DeliveryTime,
    ];

    /// Classify a lower-cased, trimmed header label.
    ///
    /// The order of checks matters, see [`labels::DELIVERY_TIME`].
    pub fn from_label(label: &str) -> Option<Section> {
        if label == labels::SALES {
            Some(Section::Sales)
        } else if label.contains(labels::DELIVERY_TIME) {
            Some(Section::DeliveryTime)
        } else if label.contains(labels::ORDERS) {
            Some(Section::Orders)
        } else if label.contains(labels::LOYALTY) {
            Some(Section::Loyalty)
        } else if label.contains(labels::AVG_CHECK) {
            Some(Section::AvgCheck)
        } else if label.contains(labels::FILL_RATE) {
            Some(Section::FillRate)
        } else if label.contains(labels::PRODUCTIVITY) {
            Some(Section::Productivity)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Sales => write!(f, "sales"),
            Section::Orders => write!(f, "orders"),
            Section::Loyalty => write!(f, "loyalty"),
            Section::AvgCheck => write!(f, "avgCheck"),
            Section::FillRate => write!(f, "fillRate"),
            Section::Productivity => write!(f, "productivity"),
            Section::DeliveryTime => write!(f, "deliveryTime"),
        }
    }
}

/// Start column of each section; `None` means the sheet lacks it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionColumns {
    pub sales: Option<usize>,
    pub orders: Option<usize>,
    pub loyalty: Option<usize>,
    pub avg_check: Option<usize>,
    pub fill_rate: Option<usize>,
    pub productivity: Option<usize>,
    pub delivery_time: Option<usize>,
}

impl SectionColumns {
    pub fn get(&self, section: Section) -> Option<usize> {
        match section {
            Section::Sales => self.sales,
            Section::Orders => self.orders,
            Section::Loyalty => self.loyalty,
            Section::AvgCheck => self.avg_check,
            Section::FillRate => self.fill_rate,
            Section::Productivity => self.productivity,
            Section::DeliveryTime => self.delivery_time,
        }
    }

    fn slot(&mut self, section: Section) -> &mut Option<usize> {
        match section {
            Section::Sales => &mut self.sales,
            Section::Orders => &mut self.orders,
            Section::Loyalty => &mut self.loyalty,
            Section::AvgCheck => &mut self.avg_check,
            Section::FillRate => &mut self.fill_rate,
            Section::Productivity => &mut self.productivity,
            Section::DeliveryTime => &mut self.delivery_time,
        }
    }

    /// Sections missing from the header row
    pub fn missing(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.get(*s).is_none())
            .collect()
    }
}

/// Find the header row: the first of the leading rows whose first cell reads
/// exactly [`HEADER_MARKER`].
pub fn find_header_row(grid: &SheetGrid) -> Option<usize> {
    (0..grid.row_count().min(HEADER_SEARCH_ROWS))
        .find(|&row| grid.value(row, 0).label() == HEADER_MARKER)
}

/// Detect section start columns from the header row.
///
/// The first column matching a section wins.
pub fn detect_sections(header_row: &[Cell]) -> SectionColumns {
    let mut columns = SectionColumns::default();

    for (col, cell) in header_row.iter().enumerate() {
        let label = cell.value.label().to_lowercase();
        if label.is_empty() {
            continue;
        }

        if let Some(section) = Section::from_label(&label) {
            let slot = columns.slot(section);
            if slot.is_none() {
                *slot = Some(col);
            }
        }
    }

    columns
}

/// Find where productivity data really starts.
///
/// The merged "Производительность" title can sit over the last fill-rate
/// sub-column ("Порции"), so the sub-header row below the header is scanned
/// for the first "план" cell within a few columns of the detected title.
/// Falls back to the title column when no such cell is found.
pub fn resolve_productivity_start(
    grid: &SheetGrid,
    header_idx: usize,
    section_col: Option<usize>,
) -> Option<usize> {
    let start = section_col?;
    let Some(sub_row) = grid.row(header_idx + 1) else {
        return Some(start);
    };

    let end = (start + PRODUCTIVITY_SCAN_WIDTH).min(sub_row.len());
    let found = (start..end).find(|&col| {
        sub_row[col]
            .value
            .label()
            .to_lowercase()
            .contains(PLAN_LABEL)
    });

    Some(found.unwrap_or(start))
}

/// Section columns for a sheet with the productivity start resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub header_row: usize,
    pub sections: SectionColumns,
    pub productivity_start: Option<usize>,
}

impl ResolvedLayout {
    /// Locate the header and resolve all section columns, or `None` when the
    /// sheet has no header row.
    pub fn detect(grid: &SheetGrid) -> Option<Self> {
        let header_row = find_header_row(grid)?;
        let sections = detect_sections(grid.row(header_row).unwrap_or_default());
        let productivity_start =
            resolve_productivity_start(grid, header_row, sections.productivity);

        Some(Self {
            header_row,
            sections,
            productivity_start,
        })
    }
}
