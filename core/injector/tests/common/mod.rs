//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for the injector integration tests.

#![allow(dead_code)]

use engine::cell::{Cell, CellValue};
use engine::range::MergedRegion;
use engine::style::{
    Alignment, BorderLineStyle, BorderStyle, Borders, CellStyle, Color, NumberFormat, Protection,
    TextAlign,
};
use injector::{AdapterOptions, SheetMapping, SummaryMapping};
use persistence::{save_xlsx_to_bytes, Sheet, Workbook};

/// Test harness holding a destination workbook and the two templates.
pub struct TestHarness {
    pub target: Workbook,
    pub monthly: Workbook,
    pub summary: Workbook,
}

impl TestHarness {
    /// Target with one user sheet; templates with the standard fixtures.
    pub fn new() -> Self {
        TestHarness {
            target: sample_target(),
            monthly: monthly_template(),
            summary: summary_template(),
        }
    }

    /// Target that already holds user data in "2025_ΕΣΟΔΑ".
    pub fn with_user_income_sheet() -> Self {
        let mut harness = Self::new();
        let bold = harness
            .target
            .styles
            .get_or_create(CellStyle::new().with_bold(true));
        let mut income = Sheet::new("2025_ΕΣΟΔΑ".to_string());
        income.set_cell(0, 0, Cell::new_text("Μισθός".to_string()).with_style(bold));
        income.set_cell(0, 1, Cell::new_number(1250.0));
        income.column_widths.insert(0, 30.0);
        harness.target.add_sheet(income).unwrap();
        harness
    }

    pub fn target_sheet(&self, name: &str) -> &Sheet {
        self.target
            .sheet(name)
            .unwrap_or_else(|| panic!("sheet '{}' missing from target", name))
    }

    pub fn target_cell(&self, sheet: &str, a1: &str) -> &Cell {
        let (row, col) = engine::parse_a1(a1).unwrap();
        self.target_sheet(sheet)
            .get_cell(row, col)
            .unwrap_or_else(|| panic!("cell {}!{} missing", sheet, a1))
    }

    pub fn target_style(&self, sheet: &str, a1: &str) -> &CellStyle {
        let cell = self.target_cell(sheet, a1);
        self.target.resolve_style(cell)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn bold_yellow() -> CellStyle {
    CellStyle::new()
        .with_bold(true)
        .with_background(Color::new(255, 255, 0))
}

/// A style that sets something in every attribute group.
pub fn full_style() -> CellStyle {
    CellStyle::new()
        .with_italic(true)
        .with_text_color(Color::new(0x20, 0x40, 0x60))
        .with_background(Color::new(0xEE, 0xEE, 0xEE))
        .with_borders(Borders {
            top: BorderStyle {
                style: BorderLineStyle::Medium,
                color: None,
            },
            bottom: BorderStyle {
                style: BorderLineStyle::Double,
                color: None,
            },
            ..Borders::default()
        })
        .with_number_format(NumberFormat::Custom("#,##0.00 €".to_string()))
        .with_protection(Protection {
            locked: false,
            hidden: true,
        })
        .with_alignment(Alignment {
            horizontal: TextAlign::Right,
            wrap_text: true,
            indent: 1,
            ..Alignment::default()
        })
}

pub fn sample_target() -> Workbook {
    let mut workbook = Workbook::empty();
    let mut data = Sheet::new("Data".to_string());
    data.set_cell(0, 0, Cell::new_text("Λογαριασμός".to_string()));
    data.set_cell(0, 1, Cell::new_number(42.0));
    workbook.add_sheet(data).unwrap();
    workbook
}

pub fn monthly_template() -> Workbook {
    let mut workbook = Workbook::empty();
    let highlighted = workbook.styles.get_or_create(bold_yellow());
    let full = workbook.styles.get_or_create(full_style());

    let mut january = Sheet::new("2025_Jan".to_string());
    january.set_cell(1, 1, Cell::new_number(10.0).with_style(highlighted));
    january.set_cell(2, 1, Cell::new_number(5.5).with_style(full));
    january.set_cell(2, 0, Cell::new_text("Ρεύμα".to_string()));
    let mut total = Cell::new_formula("=B2+B3".to_string()).with_style(full);
    total.value = CellValue::Number(15.5);
    january.set_cell(3, 1, total);
    january.row_heights.insert(1, 30.0);
    january.column_widths.insert(1, 18.0);
    january.merged_regions.push(MergedRegion::new(5, 0, 5, 3));
    workbook.add_sheet(january).unwrap();

    let mut february = Sheet::new("2025_Feb".to_string());
    february.set_cell(0, 0, Cell::new_number(20.0));
    workbook.add_sheet(february).unwrap();

    let mut income = Sheet::new("2025_ΕΣΟΔΑ".to_string());
    income.set_cell(0, 0, Cell::new_text("template income".to_string()));
    workbook.add_sheet(income).unwrap();

    let mut notes = Sheet::new("Notes".to_string());
    notes.set_cell(0, 0, Cell::new_text("not a month".to_string()));
    workbook.add_sheet(notes).unwrap();

    workbook
}

pub fn summary_template() -> Workbook {
    let mut workbook = Workbook::empty();
    let full = workbook.styles.get_or_create(full_style());

    let mut v1 = Sheet::new("v1".to_string());
    v1.set_cell(0, 0, Cell::new_number(1.0));
    v1.set_cell(1, 0, Cell::new_number(2.0));
    let mut sum = Cell::new_formula("=SUM(A1:A2)".to_string()).with_style(full);
    sum.value = CellValue::Number(3.0);
    v1.set_cell(2, 2, sum);
    v1.set_cell(40, 4, Cell::new_text("row 41".to_string()).with_style(full));
    v1.row_heights.insert(0, 25.0);
    v1.merged_regions.push(MergedRegion::new(0, 5, 1, 6));
    workbook.add_sheet(v1).unwrap();

    let mut v2 = Sheet::new("v2".to_string());
    v2.set_cell(3, 3, Cell::new_formula("='v1'!C3*2".to_string()));
    v2.set_cell(4, 3, Cell::new_formula("SUM('v1'!A1:A2)-'v1'!C3".to_string()));
    v2.set_cell(5, 3, Cell::new_formula("=B1*2".to_string()));
    v2.set_cell(6, 3, Cell::new_text("'v1' in text".to_string()));
    workbook.add_sheet(v2).unwrap();

    workbook
}

pub fn test_mapping() -> SummaryMapping {
    SummaryMapping {
        primary: SheetMapping::new("v1", "Primary"),
        difference: SheetMapping::new("v2", "Difference"),
    }
}

pub fn no_layout() -> AdapterOptions {
    AdapterOptions::default()
}

pub fn to_bytes(workbook: &Workbook) -> Vec<u8> {
    save_xlsx_to_bytes(workbook).unwrap()
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Asserts the six attribute groups one by one, so a failure names the group.
pub fn assert_style_groups_eq(actual: &CellStyle, expected: &CellStyle) {
    assert_eq!(actual.font, expected.font, "font differs");
    assert_eq!(actual.fill, expected.fill, "fill differs");
    assert_eq!(actual.borders, expected.borders, "borders differ");
    assert_eq!(actual.number_format, expected.number_format, "number format differs");
    assert_eq!(actual.protection, expected.protection, "protection differs");
    assert_eq!(actual.alignment, expected.alignment, "alignment differs");
}
