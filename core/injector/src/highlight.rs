//! FILENAME: core/injector/src/highlight.rs
//! PURPOSE: The decorative fill laid over a fixed grid of summary cells.
//! CONTEXT: The grid is static configuration; it has nothing to do with
//! what the cells contain.

use crate::error::InjectError;
use engine::coord::{col_to_index, MAX_ROWS};
use engine::style::{Color, FillStyle, StyleRegistry};
use persistence::Sheet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive range of 1-based row numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub const fn new(start: u32, end: u32) -> Self {
        RowRange { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightOverlay {
    /// Column letters, e.g. "C".
    pub columns: Vec<String>,
    pub row_ranges: Vec<RowRange>,
    /// Hex RGB, e.g. "6699FF".
    pub color: String,
}

const REFERENCE_COLUMNS: [&str; 12] = ["C", "E", "G", "I", "K", "M", "O", "Q", "S", "U", "W", "Y"];

const REFERENCE_ROWS: [RowRange; 8] = [
    RowRange::new(36, 60),
    RowRange::new(64, 88),
    RowRange::new(96, 123),
    RowRange::new(128, 157),
    RowRange::new(162, 201),
    RowRange::new(207, 235),
    RowRange::new(240, 269),
    RowRange::new(273, 312),
];

const REFERENCE_COLOR: &str = "6699FF";

impl Default for HighlightOverlay {
    fn default() -> Self {
        HighlightOverlay {
            columns: REFERENCE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            row_ranges: REFERENCE_ROWS.to_vec(),
            color: REFERENCE_COLOR.to_string(),
        }
    }
}

impl HighlightOverlay {
    pub fn validate(&self) -> Result<(), InjectError> {
        for column in &self.columns {
            if col_to_index(column).is_none() {
                return Err(InjectError::Config(format!(
                    "highlight column '{}' is not a column letter",
                    column
                )));
            }
        }
        for range in &self.row_ranges {
            if range.start == 0 || range.start > range.end || range.end > MAX_ROWS {
                return Err(InjectError::Config(format!(
                    "highlight rows {}-{} are not a valid 1-based range",
                    range.start, range.end
                )));
            }
        }
        self.fill_color()?;
        Ok(())
    }

    fn fill_color(&self) -> Result<Color, InjectError> {
        Color::from_hex(&self.color).ok_or_else(|| {
            InjectError::Config(format!("highlight color '{}' is not hex RGB", self.color))
        })
    }

    /// Every highlighted cell as 0-based (row, col), column by column.
    pub fn coordinates(&self) -> Vec<(u32, u32)> {
        let mut coords = Vec::new();
        for column in &self.columns {
            let Some(col) = col_to_index(column) else {
                continue;
            };
            for range in &self.row_ranges {
                for row in range.start.max(1)..=range.end {
                    coords.push((row - 1, col));
                }
            }
        }
        coords
    }

    /// Gives every listed cell the overlay fill, creating cells that do not
    /// exist yet. Font, borders, number format, protection and alignment of
    /// each cell are kept. Returns the number of cells touched.
    pub fn apply(&self, sheet: &mut Sheet, styles: &mut StyleRegistry) -> Result<usize, InjectError> {
        let fill = FillStyle::solid(self.fill_color()?);
        // Original style index -> highlighted style index.
        let mut restyled: HashMap<usize, usize> = HashMap::new();
        let mut touched = 0;

        for (row, col) in self.coordinates() {
            let cell = sheet.grid.cell_mut(row, col);
            let highlighted = match restyled.get(&cell.style_index) {
                Some(&index) => index,
                None => {
                    let mut style = styles.get(cell.style_index).clone();
                    style.fill = fill.clone();
                    let index = styles.get_or_create(style);
                    restyled.insert(cell.style_index, index);
                    index
                }
            };
            cell.style_index = highlighted;
            touched += 1;
        }

        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::cell::{Cell, CellValue};
    use engine::style::{CellStyle, ColorRef, FillPattern};

    #[test]
    fn test_reference_table() {
        let overlay = HighlightOverlay::default();
        assert!(overlay.validate().is_ok());
        let rows: u32 = overlay.row_ranges.iter().map(|r| r.end - r.start + 1).sum();
        assert_eq!(overlay.coordinates().len(), 12 * rows as usize);
        // C36 is the first highlighted cell.
        assert_eq!(overlay.coordinates()[0], (35, 2));
    }

    #[test]
    fn test_apply_keeps_other_groups() {
        let overlay = HighlightOverlay {
            columns: vec!["C".to_string()],
            row_ranges: vec![RowRange::new(2, 3)],
            color: "6699FF".to_string(),
        };
        let mut styles = StyleRegistry::new();
        let bold = styles.get_or_create(CellStyle::new().with_bold(true));
        let mut sheet = Sheet::new("Primary".to_string());
        sheet.set_cell(1, 2, Cell::new_number(5.0).with_style(bold));

        assert_eq!(overlay.apply(&mut sheet, &mut styles).unwrap(), 2);

        let kept = sheet.get_cell(1, 2).unwrap();
        assert_eq!(kept.value, CellValue::Number(5.0));
        let style = styles.get(kept.style_index);
        assert!(style.font.bold);
        assert_eq!(style.fill.pattern, FillPattern::Solid);
        assert_eq!(style.fill.fg_color, Some(ColorRef::Rgb(Color::new(0x66, 0x99, 0xFF))));
        assert_eq!(style.fill.bg_color, style.fill.fg_color);

        let created = sheet.get_cell(2, 2).unwrap();
        assert!(created.is_blank());
        assert!(!styles.get(created.style_index).font.bold);
        assert_eq!(styles.get(created.style_index).fill, FillStyle::solid(Color::new(0x66, 0x99, 0xFF)));
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let mut overlay = HighlightOverlay::default();
        overlay.columns.push("C1".to_string());
        assert!(matches!(overlay.validate(), Err(InjectError::Config(_))));

        let mut overlay = HighlightOverlay::default();
        overlay.row_ranges.push(RowRange::new(10, 5));
        assert!(overlay.validate().is_err());

        let mut overlay = HighlightOverlay::default();
        overlay.row_ranges.push(RowRange::new(0, 5));
        assert!(overlay.validate().is_err());

        let mut overlay = HighlightOverlay::default();
        overlay.color = "blue".to_string();
        assert!(overlay.validate().is_err());
    }
}
