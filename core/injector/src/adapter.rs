//! FILENAME: core/injector/src/adapter.rs
//! PURPOSE: Formula Adapter - copies the primary and difference summary
//! sheets under new names and points the difference sheet at the renamed
//! primary.

use crate::config::{SheetMapping, SummaryMapping};
use crate::copy::copy_layout;
use crate::error::InjectError;
use crate::formula::rewrite_sheet_reference;
use crate::highlight::HighlightOverlay;
use crate::injector::{copy_sheet_cells, CopyStats};
use crate::logging::{log_debug, log_enter_info, log_exit_info, log_info, log_warn};
use persistence::{Sheet, Workbook};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Also carry row heights, column widths and merged regions.
    pub copy_layout: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterReport {
    /// Destination names written, primary first.
    pub written: Vec<String>,
    pub cells_copied: usize,
    pub value_only_cells: usize,
    /// Difference-sheet formulas whose text changed.
    pub formulas_rewritten: usize,
    pub highlighted_cells: usize,
}

/// Copies `mapping.primary` then `mapping.difference` from `template` into
/// `dest` under their target names, rewriting `'<primary source>'`
/// references in the difference sheet, then lays `highlight` over the
/// primary destination sheet.
pub fn adapt_summary_sheets(
    template: &Workbook,
    dest: &mut Workbook,
    mapping: &SummaryMapping,
    options: &AdapterOptions,
    highlight: Option<&HighlightOverlay>,
) -> Result<AdapterReport, InjectError> {
    log_enter_info!(
        "ADAPT",
        "adapt_summary_sheets",
        "{} -> {}, {} -> {}",
        mapping.primary.source,
        mapping.primary.target,
        mapping.difference.source,
        mapping.difference.target
    );
    let mut report = AdapterReport::default();

    let stats = adapt_one(template, dest, &mapping.primary, options, None)?;
    record(&mut report, &mapping.primary, stats);

    let rewrite = (mapping.primary.source.as_str(), mapping.primary.target.as_str());
    let stats = adapt_one(template, dest, &mapping.difference, options, Some(rewrite))?;
    record(&mut report, &mapping.difference, stats);
    report.formulas_rewritten = stats.formulas_rewritten;

    if let Some(overlay) = highlight {
        let sheet = dest
            .sheets
            .iter_mut()
            .find(|s| s.name == mapping.primary.target)
            .ok_or_else(|| InjectError::MissingSheet(mapping.primary.target.clone()))?;
        report.highlighted_cells = overlay.apply(sheet, &mut dest.styles)?;
        log_info!(
            "ADAPT",
            "Highlighted {} cell(s) on '{}'",
            report.highlighted_cells,
            mapping.primary.target
        );
    }

    log_exit_info!(
        "ADAPT",
        "adapt_summary_sheets",
        "cells={} rewritten={}",
        report.cells_copied,
        report.formulas_rewritten
    );
    Ok(report)
}

#[derive(Debug, Clone, Copy, Default)]
struct AdaptStats {
    copy: CopyStats,
    formulas_rewritten: usize,
}

fn record(report: &mut AdapterReport, entry: &SheetMapping, stats: AdaptStats) {
    report.written.push(entry.target.clone());
    report.cells_copied += stats.copy.cells_copied;
    report.value_only_cells += stats.copy.value_only_cells;
}

fn adapt_one(
    template: &Workbook,
    dest: &mut Workbook,
    entry: &SheetMapping,
    options: &AdapterOptions,
    rewrite: Option<(&str, &str)>,
) -> Result<AdaptStats, InjectError> {
    let source = match template.sheet(&entry.source) {
        Some(sheet) => sheet,
        None => {
            log_warn!("ADAPT", "Sheet '{}' not found in template", entry.source);
            return Err(InjectError::MissingSheet(entry.source.clone()));
        }
    };

    if dest.remove_sheet(&entry.target).is_some() {
        log_debug!("ADAPT", "Removed existing sheet '{}'", entry.target);
    }

    let mut stats = AdaptStats::default();
    let (mut sheet, copy_stats) =
        copy_sheet_cells(source, &template.styles, &entry.target, &mut dest.styles);
    stats.copy.add(copy_stats);

    if let Some((from, to)) = rewrite {
        stats.formulas_rewritten = rewrite_references(&mut sheet, from, to);
    }
    if options.copy_layout {
        copy_layout(source, &mut sheet);
    }

    dest.add_sheet(sheet).map_err(InjectError::from_structure)?;
    log_info!(
        "ADAPT",
        "Copied '{}' as '{}' ({} cells)",
        entry.source,
        entry.target,
        stats.copy.cells_copied
    );
    Ok(stats)
}

/// Rewrites quoted references in every formula of `sheet`; returns how many changed.
fn rewrite_references(sheet: &mut Sheet, from: &str, to: &str) -> usize {
    let mut changed = 0;
    for cell in sheet.grid.cells.values_mut() {
        if let Some(formula) = cell.formula.as_mut() {
            let rewritten = rewrite_sheet_reference(formula, from, to);
            if rewritten != *formula {
                *formula = rewritten;
                changed += 1;
            }
        }
    }
    changed
}
