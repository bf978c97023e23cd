//! FILENAME: core/persistence/src/xlsx_reader.rs
//! PURPOSE: Decodes an XLSX package into a Workbook.
//! CONTEXT: Values and formulas come from calamine; styles, dimensions and
//! merges come from the raw worksheet parts (see ooxml.rs / styles_xml.rs).

use crate::ooxml::{parse_sheet_layout, read_package_layout, read_part, SheetLayout};
use crate::styles_xml::parse_cell_styles;
use crate::{PersistenceError, Sheet, Workbook};
use calamine::{open_workbook_from_rs, CellErrorType, Data, Range, Reader, Xlsx};
use engine::cell::{CellError, CellValue};
use engine::style::{CellStyle, StyleRegistry};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

pub fn load_xlsx(path: &Path) -> Result<Workbook, PersistenceError> {
    let bytes = std::fs::read(path)?;
    load_xlsx_from_bytes(&bytes)
}

pub fn load_xlsx_from_bytes(bytes: &[u8]) -> Result<Workbook, PersistenceError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let layout = read_package_layout(&mut archive)?;

    let xf_styles = match &layout.styles_path {
        Some(path) => match read_part(&mut archive, path)? {
            Some(xml) => parse_cell_styles(&xml)?,
            None => Vec::new(),
        },
        None => Vec::new(),
    };
    let mut styles = XfResolver::new(xf_styles);

    let mut values_reader: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

    let mut sheets = Vec::with_capacity(layout.sheets.len());
    for part in &layout.sheets {
        let sheet_xml = read_part(&mut archive, &part.path)?.ok_or_else(|| {
            PersistenceError::InvalidFormat(format!("missing worksheet part {}", part.path))
        })?;
        let sheet_layout = parse_sheet_layout(&sheet_xml)?;

        let values = values_reader.worksheet_range(&part.name)?;
        let formulas = values_reader.worksheet_formula(&part.name)?;

        let mut sheet = build_sheet(&part.name, &values, &formulas, sheet_layout, &mut styles);
        sheet.hidden = part.hidden;
        sheets.push(sheet);
    }

    let active_sheet = layout.active_tab.min(sheets.len().saturating_sub(1));
    Ok(Workbook {
        sheets,
        styles: styles.into_registry(),
        active_sheet,
    })
}

fn build_sheet(
    name: &str,
    values: &Range<Data>,
    formulas: &Range<String>,
    layout: SheetLayout,
    styles: &mut XfResolver,
) -> Sheet {
    let mut sheet = Sheet::new(name.to_string());

    // used_cells() yields positions relative to the range start.
    if let Some((start_row, start_col)) = values.start() {
        for (row, col, data) in values.used_cells() {
            let value = convert_data(data);
            if value == CellValue::Empty {
                continue;
            }
            sheet
                .grid
                .cell_mut(start_row + row as u32, start_col + col as u32)
                .value = value;
        }
    }

    if let Some((start_row, start_col)) = formulas.start() {
        for (row, col, formula) in formulas.used_cells() {
            let text = formula.trim();
            if text.is_empty() {
                continue;
            }
            let text = if text.starts_with('=') {
                text.to_string()
            } else {
                format!("={}", text)
            };
            sheet
                .grid
                .cell_mut(start_row + row as u32, start_col + col as u32)
                .formula = Some(text);
        }
    }

    for (row, col, xf) in layout.styled_cells {
        let style_index = styles.resolve(xf);
        if style_index != 0 {
            sheet.grid.cell_mut(row, col).style_index = style_index;
        }
    }

    sheet.row_heights = layout.row_heights;
    sheet.column_widths = layout.column_widths;
    sheet.merged_regions = layout.merged_regions;
    sheet.hidden_rows = layout.hidden_rows;
    sheet.hidden_columns = layout.hidden_columns;
    sheet.freeze_panes = layout.freeze_panes;
    sheet
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(convert_error(e)),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn convert_error(error: &CellErrorType) -> CellError {
    match error {
        CellErrorType::Div0 => CellError::Div0,
        CellErrorType::NA => CellError::NA,
        CellErrorType::Name => CellError::Name,
        CellErrorType::Null => CellError::Null,
        CellErrorType::Num => CellError::Num,
        CellErrorType::Ref => CellError::Ref,
        CellErrorType::Value => CellError::Value,
        CellErrorType::GettingData => CellError::GettingData,
    }
}

/// Maps the file's cellXfs indices onto a StyleRegistry, registering each
/// style the first time a cell uses it.
struct XfResolver {
    xf_styles: Vec<CellStyle>,
    resolved: HashMap<u32, usize>,
    registry: StyleRegistry,
}

impl XfResolver {
    fn new(xf_styles: Vec<CellStyle>) -> Self {
        Self {
            xf_styles,
            resolved: HashMap::new(),
            registry: StyleRegistry::new(),
        }
    }

    /// Registry index for a cellXfs index. Index 0 and unknown ids are the default.
    fn resolve(&mut self, xf: u32) -> usize {
        if xf == 0 {
            return 0;
        }
        if let Some(&index) = self.resolved.get(&xf) {
            return index;
        }
        let index = match self.xf_styles.get(xf as usize) {
            Some(style) => self.registry.get_or_create(style.clone()),
            None => 0,
        };
        self.resolved.insert(xf, index);
        index
    }

    fn into_registry(self) -> StyleRegistry {
        self.registry
    }
}
