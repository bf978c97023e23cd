//! FILENAME: core/injector/src/injector.rs
//! PURPOSE: Sheet Injector - copies named sheets from a template into a destination.
//! CONTEXT: Each listed sheet replaces the same-named destination sheet,
//! unless that name is preserved. Processing is in list order and stops at
//! the first missing sheet; sheets injected before it stay injected.

use crate::copy::{copy_cell, copy_layout, CopyOutcome};
use crate::error::InjectError;
use crate::logging::{
    log_debug, log_enter, log_enter_info, log_exit, log_exit_info, log_info, log_warn,
};
use engine::style::StyleRegistry;
use persistence::{Sheet, Workbook};
use std::collections::HashSet;

/// Cell counts for one copied sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub cells_copied: usize,
    /// Cells whose source had no explicit style (style copy warnings).
    pub value_only_cells: usize,
}

impl CopyStats {
    fn record(&mut self, outcome: CopyOutcome) {
        self.cells_copied += 1;
        if outcome == CopyOutcome::ValueOnly {
            self.value_only_cells += 1;
        }
    }

    pub(crate) fn add(&mut self, other: CopyStats) {
        self.cells_copied += other.cells_copied;
        self.value_only_cells += other.value_only_cells;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Sheets written into the destination, in order.
    pub injected: Vec<String>,
    /// Listed sheets skipped because their name is preserved.
    pub preserved: Vec<String>,
    pub cells_copied: usize,
    pub value_only_cells: usize,
}

/// Copies every populated cell of `source` (row by row) into a new sheet
/// called `name`, styles interned into `dest_styles`.
pub(crate) fn copy_sheet_cells(
    source: &Sheet,
    source_styles: &StyleRegistry,
    name: &str,
    dest_styles: &mut StyleRegistry,
) -> (Sheet, CopyStats) {
    log_enter!("INJECT", "copy_sheet_cells", "{} -> {}", source.name, name);
    let mut sheet = Sheet::new(name.to_string());
    let mut stats = CopyStats::default();

    for ((row, col), cell) in source.grid.iter_sorted() {
        let outcome = copy_cell(cell, source_styles, &mut sheet.grid, dest_styles, row, col);
        stats.record(outcome);
    }

    if stats.value_only_cells > 0 {
        log_debug!(
            "INJECT",
            "{}: {} cell(s) without explicit style copied value-only",
            name,
            stats.value_only_cells
        );
    }
    log_exit!("INJECT", "copy_sheet_cells", "{} cell(s)", stats.cells_copied);
    (sheet, stats)
}

/// Injects the sheets named in `names`, in order, from `template` into `dest`.
///
/// Names in `preserve` are skipped and their destination sheets left alone.
/// A name missing from the template fails with `MissingSheet`; whatever was
/// injected before it is kept.
pub fn inject_sheets(
    template: &Workbook,
    dest: &mut Workbook,
    names: &[String],
    preserve: &HashSet<String>,
) -> Result<InjectionReport, InjectError> {
    log_enter_info!("INJECT", "inject_sheets", "{} sheet(s)", names.len());
    let mut report = InjectionReport::default();

    for name in names {
        if preserve.contains(name) {
            log_info!("INJECT", "Preserving existing sheet '{}'", name);
            report.preserved.push(name.clone());
            continue;
        }

        let source = match template.sheet(name) {
            Some(sheet) => sheet,
            None => {
                log_warn!("INJECT", "Sheet '{}' not found in template", name);
                return Err(InjectError::MissingSheet(name.clone()));
            }
        };

        if dest.remove_sheet(name).is_some() {
            log_debug!("INJECT", "Removed existing sheet '{}'", name);
        }

        let (mut sheet, stats) = copy_sheet_cells(source, &template.styles, name, &mut dest.styles);
        copy_layout(source, &mut sheet);
        dest.add_sheet(sheet).map_err(InjectError::from_structure)?;

        log_info!(
            "INJECT",
            "Injected sheet '{}' ({} cells)",
            name,
            stats.cells_copied
        );
        report.injected.push(name.clone());
        report.cells_copied += stats.cells_copied;
        report.value_only_cells += stats.value_only_cells;
    }

    log_exit_info!(
        "INJECT",
        "inject_sheets",
        "injected={} preserved={}",
        report.injected.len(),
        report.preserved.len()
    );
    Ok(report)
}

/// Template sheet names starting with `prefix`, in template order.
pub fn select_sheets_with_prefix(template: &Workbook, prefix: &str) -> Vec<String> {
    template
        .sheets
        .iter()
        .filter(|sheet| sheet.name.starts_with(prefix))
        .map(|sheet| sheet.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::cell::{Cell, CellValue};

    fn workbook_with(names: &[&str]) -> Workbook {
        let mut workbook = Workbook::empty();
        for name in names {
            let mut sheet = Sheet::new(name.to_string());
            sheet.set_cell(0, 0, Cell::new_text(format!("from {}", name)));
            workbook.add_sheet(sheet).unwrap();
        }
        workbook
    }

    #[test]
    fn test_select_sheets_with_prefix_keeps_order() {
        let template = workbook_with(&["2025_Jan", "Notes", "2025_Feb", "2024_Dec"]);
        assert_eq!(
            select_sheets_with_prefix(&template, "2025"),
            vec!["2025_Jan".to_string(), "2025_Feb".to_string()]
        );
        assert!(select_sheets_with_prefix(&template, "2030").is_empty());
    }

    #[test]
    fn test_replaced_sheet_moves_to_end() {
        let template = workbook_with(&["A"]);
        let mut dest = workbook_with(&["A", "B"]);

        inject_sheets(&template, &mut dest, &["A".to_string()], &HashSet::new()).unwrap();

        assert_eq!(dest.sheet_names(), vec!["B", "A"]);
        assert_eq!(
            dest.sheet("A").unwrap().get_cell(0, 0).unwrap().value,
            CellValue::Text("from A".to_string())
        );
    }

    #[test]
    fn test_case_variant_in_destination_is_a_duplicate() {
        let template = workbook_with(&["Data"]);
        let mut dest = workbook_with(&["DATA"]);

        let err = inject_sheets(&template, &mut dest, &["Data".to_string()], &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, InjectError::DuplicateSheet(name) if name == "Data"));
    }

    #[test]
    fn test_report_counts() {
        let template = workbook_with(&["A", "B"]);
        let mut dest = Workbook::empty();
        let preserve: HashSet<String> = ["B".to_string()].into_iter().collect();

        let report = inject_sheets(
            &template,
            &mut dest,
            &["A".to_string(), "B".to_string()],
            &preserve,
        )
        .unwrap();

        assert_eq!(report.injected, vec!["A".to_string()]);
        assert_eq!(report.preserved, vec!["B".to_string()]);
        assert_eq!(report.cells_copied, 1);
        assert_eq!(report.value_only_cells, 1);
    }
}
