//! FILENAME: core/injector/src/lib.rs
//! PURPOSE: Sheet injection and summary formula adaptation over workbooks.
//! CONTEXT: `pipeline` ties the stages together; the stage functions can
//! also be used on their own.

pub mod logging;

pub mod adapter;
pub mod config;
pub mod copy;
pub mod error;
pub mod formula;
pub mod highlight;
pub mod injector;
pub mod pipeline;

pub use adapter::{adapt_summary_sheets, AdapterOptions, AdapterReport};
pub use config::{InjectorConfig, Locale, SheetMapping, SummaryMapping, SummaryMode};
pub use copy::{copy_cell, copy_layout, CopyOutcome};
pub use error::InjectError;
pub use formula::{ensure_formula_marker, quote_sheet_name, rewrite_sheet_reference};
pub use highlight::{HighlightOverlay, RowRange};
pub use injector::{inject_sheets, select_sheets_with_prefix, CopyStats, InjectionReport};
pub use pipeline::{
    decode, encode, merge_bytes, run, run_with_report, MergeReport, SummaryReport, Templates,
};
