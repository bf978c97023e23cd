//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the worksheet model.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod cell;
pub mod coord;
pub mod grid;
pub mod range;
pub mod style;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellError, CellValue};
pub use coord::{a1_to_coord, col_to_index, coord_to_a1, index_to_col, parse_a1, CellCoord};
pub use grid::Grid;
pub use range::MergedRegion;
pub use style::{
    Alignment, BorderLineStyle, BorderStyle, Borders, CellStyle, Color, ColorRef, ExactF64,
    FillPattern, FillStyle, FontStyle, NumberFormat, Protection, StyleRegistry, TextAlign,
    UnderlineStyle, VerticalAlign,
};
