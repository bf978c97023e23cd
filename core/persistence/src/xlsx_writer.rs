//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::{PersistenceError, Sheet, Workbook};
use engine::cell::{Cell, CellValue};
use engine::coord::MAX_COLUMNS;
use engine::style::{
    BorderLineStyle, BorderStyle, CellStyle, ColorRef, FillPattern, NumberFormat, TextAlign,
    UnderlineStyle, VerticalAlign,
};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, FormatUnderline, Formula,
    Workbook as XlsxWorkbook, Worksheet,
};
use std::path::Path;

/// Character-unit threshold below which spreadsheet widths scale differently.
const NARROW_COLUMN_WIDTH: f64 = 12.0 / 7.0;

pub fn save_xlsx(workbook: &Workbook, path: &Path) -> Result<(), PersistenceError> {
    let mut xlsx = build_xlsx(workbook)?;
    xlsx.save(path)?;
    Ok(())
}

pub fn save_xlsx_to_bytes(workbook: &Workbook) -> Result<Vec<u8>, PersistenceError> {
    let mut xlsx = build_xlsx(workbook)?;
    Ok(xlsx.save_to_buffer()?)
}

fn build_xlsx(workbook: &Workbook) -> Result<XlsxWorkbook, PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();

    // Index-aligned with the registry; slot 0 is never used for writing.
    let formats: Vec<Format> = workbook
        .styles
        .all_styles()
        .iter()
        .map(convert_style_to_format)
        .collect();

    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, &formats)?;
        if index == workbook.active_sheet {
            worksheet.set_active(true);
        } else if sheet.hidden {
            // The active sheet always stays visible.
            worksheet.set_hidden(true);
        }
    }

    Ok(xlsx)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, formats: &[Format]) -> Result<(), PersistenceError> {
    for (col, width) in &sheet.column_widths {
        worksheet.set_column_width(col_num(*col)?, xml_width_to_user(*width))?;
    }

    for (row, height) in &sheet.row_heights {
        worksheet.set_row_height(*row, *height)?;
    }

    for col in &sheet.hidden_columns {
        worksheet.set_column_hidden(col_num(*col)?)?;
    }

    for row in &sheet.hidden_rows {
        worksheet.set_row_hidden(*row)?;
    }

    if let Some((rows, cols)) = sheet.freeze_panes {
        worksheet.set_freeze_panes(rows, col_num(cols)?)?;
    }

    // Merges first: merge_range writes every cell of the region, so the
    // real top-left value is written over it afterwards.
    let default_format = Format::new();
    for region in &sheet.merged_regions {
        if region.is_single_cell() {
            continue;
        }
        let format = sheet
            .grid
            .get_cell(region.start_row, region.start_col)
            .and_then(|cell| format_for(formats, cell.style_index))
            .unwrap_or(&default_format);
        worksheet.merge_range(
            region.start_row,
            col_num(region.start_col)?,
            region.end_row,
            col_num(region.end_col)?,
            "",
            format,
        )?;
    }

    for ((row, col), cell) in sheet.grid.iter_sorted() {
        write_cell(worksheet, row, col_num(col)?, cell, format_for(formats, cell.style_index))?;
    }

    Ok(())
}

/// The format for a registry index; the default style writes without one.
fn format_for(formats: &[Format], style_index: usize) -> Option<&Format> {
    if style_index == 0 {
        None
    } else {
        formats.get(style_index)
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), PersistenceError> {
    if let Some(formula) = &cell.formula {
        let text = formula.strip_prefix('=').unwrap_or(formula);
        let mut formula = Formula::new(text);
        if let Some(result) = cached_result(&cell.value) {
            formula = formula.set_result(result);
        }
        match format {
            Some(fmt) => worksheet.write_formula_with_format(row, col, formula, fmt)?,
            None => worksheet.write_formula(row, col, formula)?,
        };
        return Ok(());
    }

    match (&cell.value, format) {
        (CellValue::Empty, Some(fmt)) => {
            worksheet.write_blank(row, col, fmt)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Number(n), Some(fmt)) => {
            worksheet.write_number_with_format(row, col, *n, fmt)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Text(s), Some(fmt)) => {
            worksheet.write_string_with_format(row, col, s, fmt)?;
        }
        (CellValue::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::Boolean(b), Some(fmt)) => {
            worksheet.write_boolean_with_format(row, col, *b, fmt)?;
        }
        (CellValue::Boolean(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        // Error literals are kept as their text.
        (CellValue::Error(e), Some(fmt)) => {
            worksheet.write_string_with_format(row, col, e.as_str(), fmt)?;
        }
        (CellValue::Error(e), None) => {
            worksheet.write_string(row, col, e.as_str())?;
        }
    }
    Ok(())
}

fn cached_result(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Boolean(true) => Some("TRUE".to_string()),
        CellValue::Boolean(false) => Some("FALSE".to_string()),
        CellValue::Error(e) => Some(e.as_str().to_string()),
    }
}

fn col_num(col: u32) -> Result<u16, PersistenceError> {
    if col >= MAX_COLUMNS {
        return Err(PersistenceError::InvalidFormat(format!(
            "column index {} is beyond the last column",
            col
        )));
    }
    Ok(col as u16)
}

/// Converts a width as stored in a worksheet part into the character width
/// rust_xlsxwriter expects, so writing it back reproduces the stored value.
fn xml_width_to_user(width: f64) -> f64 {
    if width <= 0.0 {
        0.0
    } else if width < NARROW_COLUMN_WIDTH {
        width * 7.0 / 12.0
    } else {
        width - 5.0 / 7.0
    }
}

// ============================================================================
// STYLE CONVERSION
// ============================================================================

fn convert_style_to_format(style: &CellStyle) -> Format {
    let mut format = Format::new()
        .set_font_name(&style.font.name)
        .set_font_size(style.font.size.0);

    // Font settings
    if style.font.bold {
        format = format.set_bold();
    }
    if style.font.italic {
        format = format.set_italic();
    }
    if style.font.strikethrough {
        format = format.set_font_strikethrough();
    }
    format = match style.font.underline {
        UnderlineStyle::None => format,
        UnderlineStyle::Single => format.set_underline(FormatUnderline::Single),
        UnderlineStyle::Double => format.set_underline(FormatUnderline::Double),
        UnderlineStyle::SingleAccounting => format.set_underline(FormatUnderline::SingleAccounting),
        UnderlineStyle::DoubleAccounting => format.set_underline(FormatUnderline::DoubleAccounting),
    };
    if let Some(color) = style.font.color.as_ref().and_then(convert_color) {
        format = format.set_font_color(color);
    }

    // Fill. For solid fills the cell color is the pattern foreground, which
    // rust_xlsxwriter takes as the background color.
    match style.fill.pattern {
        FillPattern::None => {}
        FillPattern::Solid => {
            format = format.set_pattern(FormatPattern::Solid);
            if let Some(color) = style.fill.fg_color.as_ref().and_then(convert_color) {
                format = format.set_background_color(color);
            }
        }
        pattern => {
            format = format.set_pattern(convert_pattern(pattern));
            if let Some(color) = style.fill.fg_color.as_ref().and_then(convert_color) {
                format = format.set_foreground_color(color);
            }
            if let Some(color) = style.fill.bg_color.as_ref().and_then(convert_color) {
                format = format.set_background_color(color);
            }
        }
    }

    // Borders
    let borders = &style.borders;
    if let Some((border, color)) = convert_border(&borders.top) {
        format = format.set_border_top(border);
        if let Some(color) = color {
            format = format.set_border_top_color(color);
        }
    }
    if let Some((border, color)) = convert_border(&borders.bottom) {
        format = format.set_border_bottom(border);
        if let Some(color) = color {
            format = format.set_border_bottom_color(color);
        }
    }
    if let Some((border, color)) = convert_border(&borders.left) {
        format = format.set_border_left(border);
        if let Some(color) = color {
            format = format.set_border_left_color(color);
        }
    }
    if let Some((border, color)) = convert_border(&borders.right) {
        format = format.set_border_right(border);
        if let Some(color) = color {
            format = format.set_border_right_color(color);
        }
    }

    // Number format
    if !style.number_format.is_general() {
        format = match &style.number_format {
            NumberFormat::Builtin(id) => format.set_num_format_index(*id),
            NumberFormat::Custom(code) => format.set_num_format(code),
        };
    }

    // Protection
    if !style.protection.locked {
        format = format.set_unlocked();
    }
    if style.protection.hidden {
        format = format.set_hidden();
    }

    // Alignment
    let alignment = &style.alignment;
    if let Some(align) = convert_horizontal(alignment.horizontal) {
        format = format.set_align(align);
    }
    if let Some(align) = convert_vertical(alignment.vertical) {
        format = format.set_align(align);
    }
    if alignment.wrap_text {
        format = format.set_text_wrap();
    }
    if alignment.shrink_to_fit {
        format = format.set_shrink();
    }
    if alignment.indent > 0 {
        format = format.set_indent(alignment.indent);
    }
    if let Some(rotation) = convert_rotation(alignment.text_rotation) {
        format = format.set_rotation(rotation);
    }

    format
}

fn convert_color(color: &ColorRef) -> Option<Color> {
    match color {
        ColorRef::Auto => Some(Color::Automatic),
        ColorRef::Rgb(rgb) => Some(Color::RGB(rgb.to_rgb_u32())),
        ColorRef::Theme { index, .. } if *index <= 9 => Some(Color::Theme(*index, 0)),
        ColorRef::Theme { .. } => None,
        ColorRef::Indexed(_) => Some(
            color
                .resolve_rgb()
                .map(|rgb| Color::RGB(rgb.to_rgb_u32()))
                .unwrap_or(Color::Automatic),
        ),
    }
}

fn convert_pattern(pattern: FillPattern) -> FormatPattern {
    match pattern {
        FillPattern::None => FormatPattern::None,
        FillPattern::Solid => FormatPattern::Solid,
        FillPattern::MediumGray => FormatPattern::MediumGray,
        FillPattern::DarkGray => FormatPattern::DarkGray,
        FillPattern::LightGray => FormatPattern::LightGray,
        FillPattern::DarkHorizontal => FormatPattern::DarkHorizontal,
        FillPattern::DarkVertical => FormatPattern::DarkVertical,
        FillPattern::DarkDown => FormatPattern::DarkDown,
        FillPattern::DarkUp => FormatPattern::DarkUp,
        FillPattern::DarkGrid => FormatPattern::DarkGrid,
        FillPattern::DarkTrellis => FormatPattern::DarkTrellis,
        FillPattern::LightHorizontal => FormatPattern::LightHorizontal,
        FillPattern::LightVertical => FormatPattern::LightVertical,
        FillPattern::LightDown => FormatPattern::LightDown,
        FillPattern::LightUp => FormatPattern::LightUp,
        FillPattern::LightGrid => FormatPattern::LightGrid,
        FillPattern::LightTrellis => FormatPattern::LightTrellis,
        FillPattern::Gray125 => FormatPattern::Gray125,
        FillPattern::Gray0625 => FormatPattern::Gray0625,
    }
}

fn convert_border(border: &BorderStyle) -> Option<(FormatBorder, Option<Color>)> {
    let line = match border.style {
        BorderLineStyle::None => return None,
        BorderLineStyle::Thin => FormatBorder::Thin,
        BorderLineStyle::Medium => FormatBorder::Medium,
        BorderLineStyle::Dashed => FormatBorder::Dashed,
        BorderLineStyle::Dotted => FormatBorder::Dotted,
        BorderLineStyle::Thick => FormatBorder::Thick,
        BorderLineStyle::Double => FormatBorder::Double,
        BorderLineStyle::Hair => FormatBorder::Hair,
        BorderLineStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderLineStyle::DashDot => FormatBorder::DashDot,
        BorderLineStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderLineStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderLineStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderLineStyle::SlantDashDot => FormatBorder::SlantDashDot,
    };
    Some((line, border.color.as_ref().and_then(convert_color)))
}

fn convert_horizontal(align: TextAlign) -> Option<FormatAlign> {
    match align {
        TextAlign::General => None,
        TextAlign::Left => Some(FormatAlign::Left),
        TextAlign::Center => Some(FormatAlign::Center),
        TextAlign::Right => Some(FormatAlign::Right),
        TextAlign::Fill => Some(FormatAlign::Fill),
        TextAlign::Justify => Some(FormatAlign::Justify),
        TextAlign::CenterContinuous => Some(FormatAlign::CenterAcross),
        TextAlign::Distributed => Some(FormatAlign::Distributed),
    }
}

fn convert_vertical(align: VerticalAlign) -> Option<FormatAlign> {
    match align {
        VerticalAlign::Bottom => None,
        VerticalAlign::Top => Some(FormatAlign::Top),
        VerticalAlign::Center => Some(FormatAlign::VerticalCenter),
        VerticalAlign::Justify => Some(FormatAlign::VerticalJustify),
        VerticalAlign::Distributed => Some(FormatAlign::VerticalDistributed),
    }
}

/// Stored rotation (0-180, 255) to the signed degrees rust_xlsxwriter takes.
fn convert_rotation(rotation: u16) -> Option<i16> {
    match rotation {
        0 => None,
        1..=90 => Some(rotation as i16),
        91..=180 => Some(-(rotation as i16 - 90)),
        255 => Some(270),
        _ => None,
    }
}
