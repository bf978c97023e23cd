//! FILENAME: core/injector/src/copy.rs
//! PURPOSE: Copies one cell, or a sheet's layout, from a template into a destination.
//! CONTEXT: Source and destination belong to different workbooks, so style
//! indices are never shared: the resolved style is re-interned in the
//! destination registry.

use crate::formula::ensure_formula_marker;
use engine::cell::Cell;
use engine::grid::Grid;
use engine::style::StyleRegistry;
use persistence::Sheet;

/// What happened to a single copied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Value, formula and full style were copied.
    Styled,
    /// The source had no explicit style; only value and formula were copied.
    /// This is the "style copy warning" path and is never an error.
    ValueOnly,
}

/// Copies `source` into `dest` at (`row`, `col`).
///
/// The value and formula are always copied; a formula keeps exactly one
/// leading `=`. When the source carries an explicit style, its six attribute
/// groups are interned into `dest_styles` and the new cell points at them.
/// Otherwise the destination cell is left on the default style.
pub fn copy_cell(
    source: &Cell,
    source_styles: &StyleRegistry,
    dest: &mut Grid,
    dest_styles: &mut StyleRegistry,
    row: u32,
    col: u32,
) -> CopyOutcome {
    let formula = source.formula.as_deref().map(ensure_formula_marker);

    let (style_index, outcome) = if source.has_style() {
        let style = source_styles.get(source.style_index).clone();
        (dest_styles.get_or_create(style), CopyOutcome::Styled)
    } else {
        (0, CopyOutcome::ValueOnly)
    };

    dest.set_cell(
        row,
        col,
        Cell {
            formula,
            value: source.value.clone(),
            style_index,
        },
    );
    outcome
}

/// Carries row heights, column widths, merged regions, hidden rows and
/// columns and frozen panes over verbatim. Sheet visibility is not copied.
pub fn copy_layout(source: &Sheet, dest: &mut Sheet) {
    dest.row_heights = source.row_heights.clone();
    dest.column_widths = source.column_widths.clone();
    dest.merged_regions = source.merged_regions.clone();
    dest.hidden_rows = source.hidden_rows.clone();
    dest.hidden_columns = source.hidden_columns.clone();
    dest.freeze_panes = source.freeze_panes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::cell::{CellError, CellValue};
    use engine::range::MergedRegion;
    use engine::style::{CellStyle, Color};

    #[test]
    fn test_styled_cell_is_reinterned() {
        let mut source_styles = StyleRegistry::new();
        // Occupy an index so source and destination indices differ.
        source_styles.get_or_create(CellStyle::new().with_italic(true));
        let bold = CellStyle::new()
            .with_bold(true)
            .with_background(Color::new(255, 255, 0));
        let idx = source_styles.get_or_create(bold.clone());
        let source = Cell::new_number(10.0).with_style(idx);

        let mut dest = Grid::new();
        let mut dest_styles = StyleRegistry::new();
        let outcome = copy_cell(&source, &source_styles, &mut dest, &mut dest_styles, 1, 1);

        assert_eq!(outcome, CopyOutcome::Styled);
        let copied = dest.get_cell(1, 1).unwrap();
        assert_eq!(copied.value, CellValue::Number(10.0));
        assert_eq!(dest_styles.get(copied.style_index), &bold);
        assert_eq!(copied.style_index, 1);
    }

    #[test]
    fn test_unstyled_cell_copies_value_only() {
        let source_styles = StyleRegistry::new();
        let mut dest = Grid::new();
        let mut dest_styles = StyleRegistry::new();

        let outcome = copy_cell(
            &Cell::new_text("note".to_string()),
            &source_styles,
            &mut dest,
            &mut dest_styles,
            0,
            0,
        );

        assert_eq!(outcome, CopyOutcome::ValueOnly);
        assert!(!dest.get_cell(0, 0).unwrap().has_style());
        assert_eq!(dest_styles.len(), 1);
    }

    #[test]
    fn test_formula_stays_formula_with_one_marker() {
        let source_styles = StyleRegistry::new();
        let mut dest = Grid::new();
        let mut dest_styles = StyleRegistry::new();

        let mut bare = Cell::new_formula("SUM(A1:A2)".to_string());
        bare.value = CellValue::Number(3.0);
        copy_cell(&bare, &source_styles, &mut dest, &mut dest_styles, 2, 2);
        copy_cell(
            &Cell::new_formula("=A1".to_string()),
            &source_styles,
            &mut dest,
            &mut dest_styles,
            3,
            2,
        );

        let first = dest.get_cell(2, 2).unwrap();
        assert_eq!(first.formula.as_deref(), Some("=SUM(A1:A2)"));
        assert_eq!(first.value, CellValue::Number(3.0));
        assert_eq!(dest.get_cell(3, 2).unwrap().formula.as_deref(), Some("=A1"));
    }

    #[test]
    fn test_error_values_pass_through() {
        let source_styles = StyleRegistry::new();
        let mut dest = Grid::new();
        let mut dest_styles = StyleRegistry::new();
        let source = Cell {
            formula: Some("=1/0".to_string()),
            value: CellValue::Error(CellError::Div0),
            style_index: 0,
        };

        copy_cell(&source, &source_styles, &mut dest, &mut dest_styles, 0, 0);
        assert_eq!(dest.get_cell(0, 0), Some(&source));
    }

    #[test]
    fn test_copy_layout() {
        let mut source = Sheet::new("src".to_string());
        source.row_heights.insert(1, 30.0);
        source.column_widths.insert(2, 18.5);
        source.merged_regions.push(MergedRegion::new(0, 0, 1, 3));
        source.hidden_rows.insert(4);
        source.hidden_columns.insert(1);
        source.freeze_panes = Some((1, 0));
        source.hidden = true;

        let mut dest = Sheet::new("dst".to_string());
        dest.row_heights.insert(9, 99.0);
        dest.hidden_rows.insert(7);
        copy_layout(&source, &mut dest);

        assert_eq!(dest.row_heights, source.row_heights);
        assert_eq!(dest.column_widths, source.column_widths);
        assert_eq!(dest.merged_regions, source.merged_regions);
        assert_eq!(dest.hidden_rows, source.hidden_rows);
        assert_eq!(dest.hidden_columns, source.hidden_columns);
        assert_eq!(dest.freeze_panes, Some((1, 0)));
        assert!(!dest.hidden);
    }
}
