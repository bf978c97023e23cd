//! FILENAME: core/injector/src/config.rs
//! PURPOSE: Run configuration: template locations, sheet names, exclusion
//! sets and message locale.
//! CONTEXT: Loaded from JSON with serde. `Default` is the reference
//! deployment, so an empty JSON object is a complete configuration.

use crate::error::InjectError;
use crate::highlight::HighlightOverlay;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ============================================================================
// SHEET MAPPINGS
// ============================================================================

/// A template sheet and the name it gets in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMapping {
    pub source: String,
    pub target: String,
}

impl SheetMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        SheetMapping {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The two summary sheets handled by the formula adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMapping {
    pub primary: SheetMapping,
    pub difference: SheetMapping,
}

impl Default for SummaryMapping {
    fn default() -> Self {
        SummaryMapping {
            primary: SheetMapping::new("v1", "Γενικό Αποτέλεσμα"),
            difference: SheetMapping::new("v2", "Διαφορά"),
        }
    }
}

// ============================================================================
// SUMMARY STAGE
// ============================================================================

fn default_highlight() -> Option<HighlightOverlay> {
    Some(HighlightOverlay::default())
}

fn default_summary_sheets() -> Vec<String> {
    vec!["Γενικό Αποτέλεσμα".to_string(), "Διαφορές".to_string()]
}

/// How the summary sheets reach the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SummaryMode {
    /// Copy v1/v2 under new names and rewrite references (formula adapter).
    Adapt {
        #[serde(default)]
        mapping: SummaryMapping,
        /// `null` disables the overlay.
        #[serde(default = "default_highlight")]
        highlight: Option<HighlightOverlay>,
        #[serde(default)]
        copy_layout: bool,
    },
    /// Inject the named summary sheets as they are (sheet injector).
    Inject {
        #[serde(default = "default_summary_sheets")]
        sheet_names: Vec<String>,
        #[serde(default)]
        preserve_sheet_names: Vec<String>,
    },
}

impl Default for SummaryMode {
    fn default() -> Self {
        SummaryMode::Adapt {
            mapping: SummaryMapping::default(),
            highlight: default_highlight(),
            copy_layout: false,
        }
    }
}

// ============================================================================
// LOCALE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    El,
    En,
}

impl Locale {
    /// Accepts language tags such as "el", "el-GR", "en_US".
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = tag
            .split(|c: char| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "el" => Some(Locale::El),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

// ============================================================================
// INJECTOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// Template holding the monthly sheets. None skips the monthly stage.
    pub monthly_template_path: Option<PathBuf>,
    pub summary_template_path: PathBuf,
    /// Monthly sheets are the template sheets whose name starts with this.
    pub monthly_sheet_prefix: String,
    /// Destination sheets the monthly stage never replaces.
    pub preserve_sheet_names: Vec<String>,
    pub summary: SummaryMode,
    pub locale: Option<Locale>,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        InjectorConfig {
            monthly_template_path: Some(PathBuf::from("template_phase_2_cleaned.xlsx")),
            summary_template_path: PathBuf::from("bilio_with_v3_formulas.xlsx"),
            monthly_sheet_prefix: "2025".to_string(),
            preserve_sheet_names: Vec::new(),
            summary: SummaryMode::default(),
            locale: None,
        }
    }
}

impl InjectorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, InjectError> {
        let config: InjectorConfig = serde_json::from_str(json)
            .map_err(|e| InjectError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file. Relative template paths are taken relative to
    /// the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self, InjectError> {
        let json = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&json)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(monthly) = self.monthly_template_path.as_mut() {
            if monthly.is_relative() {
                *monthly = base.join(&*monthly);
            }
        }
        if self.summary_template_path.is_relative() {
            self.summary_template_path = base.join(&self.summary_template_path);
        }
    }

    pub fn preserved_monthly(&self) -> HashSet<String> {
        self.preserve_sheet_names.iter().cloned().collect()
    }

    pub fn validate(&self) -> Result<(), InjectError> {
        match &self.summary {
            SummaryMode::Adapt {
                mapping, highlight, ..
            } => {
                for entry in [&mapping.primary, &mapping.difference] {
                    if entry.source.is_empty() || entry.target.is_empty() {
                        return Err(InjectError::Config(
                            "summary sheet names must not be empty".to_string(),
                        ));
                    }
                }
                if mapping.primary.source == mapping.difference.source
                    || mapping.primary.target.to_lowercase() == mapping.difference.target.to_lowercase()
                {
                    return Err(InjectError::Config(
                        "primary and difference sheets must be distinct".to_string(),
                    ));
                }
                if let Some(overlay) = highlight {
                    overlay.validate()?;
                }
            }
            SummaryMode::Inject { sheet_names, .. } => {
                if sheet_names.iter().any(|name| name.is_empty()) {
                    return Err(InjectError::Config(
                        "summary sheet names must not be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
