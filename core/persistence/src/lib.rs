//! FILENAME: core/persistence/src/lib.rs
//! Ledger Merge Persistence Module
//!
//! Holds the in-memory workbook document and handles loading and saving it
//! in XLSX format, from paths or from raw bytes.

mod error;
mod ooxml;
mod styles_xml;
mod xlsx_reader;
mod xlsx_writer;

pub use error::PersistenceError;
pub use xlsx_reader::{load_xlsx, load_xlsx_from_bytes};
pub use xlsx_writer::{save_xlsx, save_xlsx_to_bytes};

use engine::cell::Cell;
use engine::grid::Grid;
use engine::range::MergedRegion;
use engine::style::{CellStyle, StyleRegistry};
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// WORKBOOK
// ============================================================================

/// Represents a complete workbook that can be saved/loaded.
/// Styles are shared by every sheet, as in the file format.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub styles: StyleRegistry,
    pub active_sheet: usize,
}

impl Workbook {
    /// A workbook with a single empty "Sheet1".
    pub fn new() -> Self {
        Self {
            sheets: vec![Sheet::new("Sheet1".to_string())],
            styles: StyleRegistry::new(),
            active_sheet: 0,
        }
    }

    /// A workbook with no sheets at all.
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            styles: StyleRegistry::new(),
            active_sheet: 0,
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Exact-name lookup.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn contains_sheet(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    /// Appends a sheet. Names are unique ignoring case, as spreadsheet
    /// applications require.
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<&mut Sheet, PersistenceError> {
        let lowered = sheet.name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == lowered) {
            return Err(PersistenceError::DuplicateSheet(sheet.name));
        }
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// Removes the sheet with exactly this name and returns it.
    pub fn remove_sheet(&mut self, name: &str) -> Option<Sheet> {
        let index = self.sheets.iter().position(|s| s.name == name)?;
        let removed = self.sheets.remove(index);

        if self.active_sheet > index || self.active_sheet >= self.sheets.len() {
            self.active_sheet = self.active_sheet.saturating_sub(1);
        }
        Some(removed)
    }

    /// The full style a cell of this workbook renders with.
    pub fn resolve_style(&self, cell: &Cell) -> &CellStyle {
        self.styles.get(cell.style_index)
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SHEET
// ============================================================================

/// Represents a single worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
    /// 0-based column -> width in character units, as stored in the file.
    pub column_widths: HashMap<u32, f64>,
    /// 0-based row -> height in points.
    pub row_heights: HashMap<u32, f64>,
    pub merged_regions: Vec<MergedRegion>,
    /// 0-based rows hidden from view.
    pub hidden_rows: BTreeSet<u32>,
    /// 0-based columns hidden from view.
    pub hidden_columns: BTreeSet<u32>,
    /// Frozen (rows, columns) at the top left, if any.
    pub freeze_panes: Option<(u32, u32)>,
    /// Hidden from the tab bar.
    pub hidden: bool,
}

impl Sheet {
    pub fn new(name: String) -> Self {
        Self {
            name,
            grid: Grid::new(),
            column_widths: HashMap::new(),
            row_heights: HashMap::new(),
            merged_regions: Vec::new(),
            hidden_rows: BTreeSet::new(),
            hidden_columns: BTreeSet::new(),
            freeze_panes: None,
            hidden: false,
        }
    }

    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.grid.get_cell(row, col)
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.grid.set_cell(row, col, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sheet_rejects_duplicates_ignoring_case() {
        let mut workbook = Workbook::new();
        assert!(workbook.add_sheet(Sheet::new("Data".to_string())).is_ok());
        let err = workbook.add_sheet(Sheet::new("DATA".to_string())).unwrap_err();
        assert!(matches!(err, PersistenceError::DuplicateSheet(name) if name == "DATA"));
        assert_eq!(workbook.sheet_names(), vec!["Sheet1", "Data"]);
    }

    #[test]
    fn test_remove_sheet_is_exact_and_clamps_active() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(Sheet::new("Two".to_string())).unwrap();
        workbook.active_sheet = 1;

        assert!(workbook.remove_sheet("two").is_none());
        assert!(workbook.remove_sheet("Two").is_some());
        assert_eq!(workbook.active_sheet, 0);
        assert!(!workbook.contains_sheet("Two"));
    }

    #[test]
    fn test_remove_before_active_shifts_index() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(Sheet::new("B".to_string())).unwrap();
        workbook.add_sheet(Sheet::new("C".to_string())).unwrap();
        workbook.active_sheet = 2;

        workbook.remove_sheet("Sheet1");
        assert_eq!(workbook.active_sheet, 1);
        assert_eq!(workbook.sheets[workbook.active_sheet].name, "C");
    }
}
