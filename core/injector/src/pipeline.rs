//! FILENAME: core/injector/src/pipeline.rs
//! PURPOSE: The end-to-end merge: monthly stage, then summary stage.
//! CONTEXT: One owned Workbook is threaded through both stages. Inputs are
//! decoded up front, so a malformed input fails before anything is changed.

use crate::adapter::{adapt_summary_sheets, AdapterOptions, AdapterReport};
use crate::config::{InjectorConfig, SummaryMode};
use crate::error::InjectError;
use crate::injector::{inject_sheets, select_sheets_with_prefix, InjectionReport};
use crate::logging::{log_debug, log_enter_info, log_exit_info, log_info, log_warn};
use persistence::{load_xlsx, load_xlsx_from_bytes, save_xlsx_to_bytes, PersistenceError, Workbook};
use std::collections::HashSet;
use std::path::Path;

/// The decoded template workbooks.
#[derive(Debug, Clone)]
pub struct Templates {
    /// None skips the monthly stage.
    pub monthly: Option<Workbook>,
    pub summary: Workbook,
}

impl Templates {
    /// Reads the templates named by the config.
    pub fn load(config: &InjectorConfig) -> Result<Self, InjectError> {
        let monthly = config
            .monthly_template_path
            .as_deref()
            .map(load_path)
            .transpose()?;
        let summary = load_path(&config.summary_template_path)?;
        Ok(Templates { monthly, summary })
    }

    pub fn from_bytes(monthly: Option<&[u8]>, summary: &[u8]) -> Result<Self, InjectError> {
        Ok(Templates {
            monthly: monthly.map(decode).transpose()?,
            summary: decode(summary)?,
        })
    }
}

/// What the summary stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryReport {
    Adapted(AdapterReport),
    Injected(InjectionReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub monthly: Option<InjectionReport>,
    pub summary: SummaryReport,
}

/// Decodes a document, reporting any failure as malformed input.
pub fn decode(bytes: &[u8]) -> Result<Workbook, InjectError> {
    match load_xlsx_from_bytes(bytes) {
        Ok(workbook) => {
            log_debug!("XLSX", "Decoded {} bytes, {} sheet(s)", bytes.len(), workbook.sheets.len());
            Ok(workbook)
        }
        Err(e) => {
            log_warn!("XLSX", "Rejected input of {} bytes: {}", bytes.len(), e);
            Err(InjectError::MalformedDocument(e))
        }
    }
}

/// Encodes the merged workbook.
pub fn encode(workbook: &Workbook) -> Result<Vec<u8>, InjectError> {
    let bytes = save_xlsx_to_bytes(workbook)?;
    log_debug!("XLSX", "Encoded {} sheet(s) into {} bytes", workbook.sheets.len(), bytes.len());
    Ok(bytes)
}

fn load_path(path: &Path) -> Result<Workbook, InjectError> {
    log_info!("PIPELINE", "Loading template {}", path.display());
    load_xlsx(path).map_err(|e| match e {
        PersistenceError::Io(io) => InjectError::Io(io),
        other => InjectError::MalformedDocument(other),
    })
}

/// Runs both stages over `target` and returns it.
pub fn run(
    target: Workbook,
    templates: &Templates,
    config: &InjectorConfig,
) -> Result<Workbook, InjectError> {
    run_with_report(target, templates, config).map(|(workbook, _)| workbook)
}

pub fn run_with_report(
    mut target: Workbook,
    templates: &Templates,
    config: &InjectorConfig,
) -> Result<(Workbook, MergeReport), InjectError> {
    log_enter_info!("PIPELINE", "run", "{} sheet(s) in target", target.sheets.len());
    config.validate()?;

    let monthly = match &templates.monthly {
        Some(template) => {
            let names = select_sheets_with_prefix(template, &config.monthly_sheet_prefix);
            log_info!(
                "PIPELINE",
                "Monthly stage: {} sheet(s) with prefix '{}'",
                names.len(),
                config.monthly_sheet_prefix
            );
            Some(inject_sheets(
                template,
                &mut target,
                &names,
                &config.preserved_monthly(),
            )?)
        }
        None => {
            log_info!("PIPELINE", "No monthly template; skipping monthly stage");
            None
        }
    };

    let summary = match &config.summary {
        SummaryMode::Adapt {
            mapping,
            highlight,
            copy_layout,
        } => {
            log_info!("PIPELINE", "Summary stage: adapt");
            let options = AdapterOptions {
                copy_layout: *copy_layout,
            };
            SummaryReport::Adapted(adapt_summary_sheets(
                &templates.summary,
                &mut target,
                mapping,
                &options,
                highlight.as_ref(),
            )?)
        }
        SummaryMode::Inject {
            sheet_names,
            preserve_sheet_names,
        } => {
            log_info!("PIPELINE", "Summary stage: inject");
            let preserve: HashSet<String> = preserve_sheet_names.iter().cloned().collect();
            SummaryReport::Injected(inject_sheets(
                &templates.summary,
                &mut target,
                sheet_names,
                &preserve,
            )?)
        }
    };

    log_exit_info!("PIPELINE", "run", "{} sheet(s) in result", target.sheets.len());
    Ok((target, MergeReport { monthly, summary }))
}

/// Decodes all inputs, runs both stages and encodes the result.
pub fn merge_bytes(
    target: &[u8],
    monthly: Option<&[u8]>,
    summary: &[u8],
    config: &InjectorConfig,
) -> Result<Vec<u8>, InjectError> {
    let workbook = decode(target)?;
    let templates = Templates::from_bytes(monthly, summary)?;
    let merged = run(workbook, &templates, config)?;
    encode(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::cell::Cell;
    use persistence::Sheet;

    fn summary_template() -> Workbook {
        let mut workbook = Workbook::empty();
        workbook.add_sheet(Sheet::new("v1".to_string())).unwrap();
        workbook.add_sheet(Sheet::new("v2".to_string())).unwrap();
        workbook
    }

    #[test]
    fn test_monthly_stage_skipped_without_template() {
        let templates = Templates {
            monthly: None,
            summary: summary_template(),
        };
        let (result, report) =
            run_with_report(Workbook::new(), &templates, &InjectorConfig::default()).unwrap();

        assert!(report.monthly.is_none());
        assert!(matches!(report.summary, SummaryReport::Adapted(_)));
        assert_eq!(
            result.sheet_names(),
            vec!["Sheet1", "Γενικό Αποτέλεσμα", "Διαφορά"]
        );
    }

    #[test]
    fn test_inject_mode_uses_its_own_exclusions() {
        let mut summary = Workbook::empty();
        let mut sheet = Sheet::new("Διαφορές".to_string());
        sheet.set_cell(0, 0, Cell::new_number(1.0));
        summary.add_sheet(sheet).unwrap();

        let mut target = Workbook::new();
        let mut kept = Sheet::new("Γενικό Αποτέλεσμα".to_string());
        kept.set_cell(0, 0, Cell::new_number(99.0));
        target.add_sheet(kept.clone()).unwrap();

        let config = InjectorConfig {
            monthly_template_path: None,
            summary: SummaryMode::Inject {
                sheet_names: vec!["Γενικό Αποτέλεσμα".to_string(), "Διαφορές".to_string()],
                preserve_sheet_names: vec!["Γενικό Αποτέλεσμα".to_string()],
            },
            ..InjectorConfig::default()
        };
        let templates = Templates {
            monthly: None,
            summary,
        };

        let result = run(target, &templates, &config).unwrap();
        assert_eq!(result.sheet("Γενικό Αποτέλεσμα"), Some(&kept));
        assert!(result.contains_sheet("Διαφορές"));
    }

    #[test]
    fn test_missing_template_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = InjectorConfig {
            monthly_template_path: None,
            summary_template_path: dir.path().join("missing.xlsx"),
            ..InjectorConfig::default()
        };
        assert!(matches!(Templates::load(&config), Err(InjectError::Io(_))));
    }
}
