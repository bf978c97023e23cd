//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the fundamental data structures for a single spreadsheet cell.
//! CONTEXT: This file contains the `Cell` struct and `CellValue` enum.
//! It separates the formula text (the formula type tag) from the literal or
//! cached value, and points at a shared style through `style_index`.

use serde::{Deserialize, Serialize};

/// Excel error literals a cell value can hold (e.g., #DIV/0!).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    Null,        // #NULL!
    Div0,        // #DIV/0!
    Value,       // #VALUE!
    Ref,         // #REF!
    Name,        // #NAME?
    Num,         // #NUM!
    NA,          // #N/A
    GettingData, // #GETTING_DATA
}

impl CellError {
    /// The literal as it appears in a worksheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::NA => "#N/A",
            CellError::GettingData => "#GETTING_DATA",
        }
    }
}

/// Represents the literal value, or the cached result of a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CellError),
}

/// The atomic unit of the spreadsheet.
///
/// `formula` is the type tag: a cell is a formula cell exactly when it is
/// `Some`, and the text always carries one leading `=`.
/// `style_index` points into the owning workbook's `StyleRegistry`;
/// index 0 means "no explicit style".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub formula: Option<String>,
    pub value: CellValue,
    pub style_index: usize,
}

impl Cell {
    pub fn new() -> Self {
        Cell {
            formula: None,
            value: CellValue::Empty,
            style_index: 0,
        }
    }

    pub fn new_number(num: f64) -> Self {
        Cell {
            formula: None,
            value: CellValue::Number(num),
            style_index: 0,
        }
    }

    pub fn new_text(text: String) -> Self {
        Cell {
            formula: None,
            value: CellValue::Text(text),
            style_index: 0,
        }
    }

    pub fn new_formula(formula: String) -> Self {
        Cell {
            formula: Some(formula),
            value: CellValue::Empty,
            style_index: 0,
        }
    }

    /// Same cell pointing at another style.
    pub fn with_style(mut self, style_index: usize) -> Self {
        self.style_index = style_index;
        self
    }

    /// True when the cell references anything other than the default style.
    pub fn has_style(&self) -> bool {
        self.style_index != 0
    }

    /// True when the cell holds nothing but (possibly) a style.
    pub fn is_blank(&self) -> bool {
        self.formula.is_none() && self.value == CellValue::Empty
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}
