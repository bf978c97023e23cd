//! FILENAME: core/engine/src/range.rs
//! PURPOSE: Rectangular cell regions (merged cells).
//! CONTEXT: Regions are stored with inclusive 0-based bounds and rendered to
//! / parsed from A1 range text such as "A1:C3".

use crate::coord::{coord_to_a1, parse_a1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive rectangle of cells, e.g. a merged region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MergedRegion {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergedRegion {
    /// Builds a region from two corners in any order.
    pub fn new(row_a: u32, col_a: u32, row_b: u32, col_b: u32) -> Self {
        MergedRegion {
            start_row: row_a.min(row_b),
            start_col: col_a.min(col_b),
            end_row: row_a.max(row_b),
            end_col: col_a.max(col_b),
        }
    }

    /// Parses "A1:C3". A lone reference ("B2") yields a one-cell region.
    pub fn parse(text: &str) -> Option<Self> {
        match text.split_once(':') {
            Some((first, last)) => {
                let (r1, c1) = parse_a1(first)?;
                let (r2, c2) = parse_a1(last)?;
                Some(Self::new(r1, c1, r2, c2))
            }
            None => {
                let (r, c) = parse_a1(text)?;
                Some(Self::new(r, c, r, c))
            }
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

impl fmt::Display for MergedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            coord_to_a1((self.start_row, self.start_col)),
            coord_to_a1((self.end_row, self.end_col))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let region = MergedRegion::parse("B2:D5").unwrap();
        assert_eq!(region, MergedRegion::new(1, 1, 4, 3));
        assert_eq!(region.to_string(), "B2:D5");
        assert!(region.contains(3, 2));
        assert!(!region.contains(0, 0));
    }

    #[test]
    fn test_parse_normalizes_corners() {
        let region = MergedRegion::parse("D5:B2").unwrap();
        assert_eq!(region.to_string(), "B2:D5");
    }

    #[test]
    fn test_single_cell_and_garbage() {
        assert!(MergedRegion::parse("C3").unwrap().is_single_cell());
        assert_eq!(MergedRegion::parse("nope:A1"), None);
    }
}
