//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Utilities for converting between spreadsheet coordinate formats.
//! CONTEXT: This module provides functions to convert between A1-style notation
//! (e.g., "A1", "AA100", "$B$2") and 0-based (row, col) numeric indices used internally.
//! Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally.

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Largest 1-based column number a worksheet can address (XFD).
pub const MAX_COLUMNS: u32 = 16_384;

/// Largest 1-based row number a worksheet can address.
pub const MAX_ROWS: u32 = 1_048_576;

/// Converts a column string (e.g., "A", "aa", "ABC") to a 0-based column index.
/// "A" -> 0, "B" -> 1, ..., "Z" -> 25, "AA" -> 26, "AB" -> 27, etc.
///
/// Returns None for empty strings, non-alphabetic characters, or columns
/// beyond XFD.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() || col_str.len() > 3 {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result * 26 + digit;
    }
    if result > MAX_COLUMNS {
        return None;
    }
    Some(result - 1) // Convert to 0-based
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Converts a column letter plus a 1-based row number to a 0-based coordinate.
/// ("A", 1) -> (0, 0), ("B", 2) -> (1, 1), ("AA", 100) -> (99, 26)
pub fn a1_to_coord(col_str: &str, row_num: u32) -> Option<CellCoord> {
    if row_num == 0 || row_num > MAX_ROWS {
        return None;
    }
    let col = col_to_index(col_str)?;
    Some((row_num - 1, col))
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference string.
/// (0, 0) -> "A1", (1, 1) -> "B2", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row + 1)
}

/// Parses a single A1 reference such as "B12" or "$B$12".
pub fn parse_a1(reference: &str) -> Option<CellCoord> {
    let reference = reference.trim();
    let split = reference
        .char_indices()
        .find(|(i, c)| c.is_ascii_digit() && *i > 0)
        .map(|(i, _)| i)?;
    let (col_part, row_part) = reference.split_at(split);
    let col_part = col_part.trim_start_matches('$').trim_end_matches('$');
    let row_num: u32 = row_part.parse().ok()?;
    a1_to_coord(col_part, row_num)
}
