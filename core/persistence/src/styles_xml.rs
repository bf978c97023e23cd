//! FILENAME: core/persistence/src/styles_xml.rs
//! PURPOSE: Decodes the stylesheet part (xl/styles.xml) into CellStyle values.
//! CONTEXT: The result is indexed like the file's `cellXfs` table, so a cell's
//! `s` attribute can be looked up directly.

use crate::ooxml::{attr, attr_bool, attr_f64, attr_u32};
use crate::PersistenceError;
use engine::style::{
    Alignment, BorderLineStyle, BorderStyle, Borders, CellStyle, ColorRef, ExactF64, FillPattern,
    FillStyle, FontStyle, NumberFormat, Protection, TextAlign, UnderlineStyle, VerticalAlign,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// First id available to custom number formats.
const FIRST_CUSTOM_NUM_FMT: u32 = 164;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
    /// Tables whose children look like ours but must not be read (dxfs, cellStyleXfs, ...).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// A cellXfs entry before its ids are resolved.
#[derive(Debug, Clone, Default)]
struct RawXf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Alignment,
    protection: Protection,
}

fn parse_color(e: &BytesStart) -> Result<Option<ColorRef>, PersistenceError> {
    if let Some(rgb) = attr(e, b"rgb")? {
        return Ok(ColorRef::rgb_hex(&rgb));
    }
    if let Some(theme) = attr_u32(e, b"theme")? {
        let tint = attr_f64(e, b"tint")?.unwrap_or(0.0);
        return Ok(Some(ColorRef::Theme {
            index: theme as u8,
            tint: ExactF64(tint),
        }));
    }
    if let Some(indexed) = attr_u32(e, b"indexed")? {
        return Ok(Some(ColorRef::Indexed(indexed as u8)));
    }
    if attr_bool(e, b"auto", false)? {
        return Ok(Some(ColorRef::Auto));
    }
    Ok(None)
}

fn parse_alignment(e: &BytesStart) -> Result<Alignment, PersistenceError> {
    Ok(Alignment {
        horizontal: attr(e, b"horizontal")?
            .map(|v| TextAlign::from_ooxml(&v))
            .unwrap_or_default(),
        vertical: attr(e, b"vertical")?
            .map(|v| VerticalAlign::from_ooxml(&v))
            .unwrap_or_default(),
        wrap_text: attr_bool(e, b"wrapText", false)?,
        shrink_to_fit: attr_bool(e, b"shrinkToFit", false)?,
        indent: attr_u32(e, b"indent")?.unwrap_or(0).min(u8::MAX as u32) as u8,
        text_rotation: attr_u32(e, b"textRotation")?.unwrap_or(0).min(u16::MAX as u32) as u16,
    })
}

fn parse_raw_xf(e: &BytesStart) -> Result<RawXf, PersistenceError> {
    Ok(RawXf {
        num_fmt_id: attr_u32(e, b"numFmtId")?.unwrap_or(0),
        font_id: attr_u32(e, b"fontId")?.unwrap_or(0) as usize,
        fill_id: attr_u32(e, b"fillId")?.unwrap_or(0) as usize,
        border_id: attr_u32(e, b"borderId")?.unwrap_or(0) as usize,
        alignment: Alignment::default(),
        protection: Protection::default(),
    })
}

fn edge_mut(borders: &mut Borders, edge: Edge) -> &mut BorderStyle {
    match edge {
        Edge::Left => &mut borders.left,
        Edge::Right => &mut borders.right,
        Edge::Top => &mut borders.top,
        Edge::Bottom => &mut borders.bottom,
    }
}

/// Applies one font child element (`<b/>`, `<sz val=".."/>`, ...) to `font`.
fn apply_font_child(font: &mut FontStyle, e: &BytesStart) -> Result<(), PersistenceError> {
    match e.local_name().as_ref() {
        b"b" => font.bold = attr_bool(e, b"val", true)?,
        b"i" => font.italic = attr_bool(e, b"val", true)?,
        b"strike" => font.strikethrough = attr_bool(e, b"val", true)?,
        b"u" => {
            font.underline = attr(e, b"val")?
                .map(|v| UnderlineStyle::from_ooxml(&v))
                .unwrap_or(UnderlineStyle::Single)
        }
        b"sz" => {
            if let Some(size) = attr_f64(e, b"val")? {
                font.size = ExactF64(size);
            }
        }
        b"name" => {
            if let Some(name) = attr(e, b"val")? {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color(e)?,
        _ => {}
    }
    Ok(())
}

/// Parses the stylesheet and returns one CellStyle per `cellXfs` entry.
pub(crate) fn parse_cell_styles(xml: &str) -> Result<Vec<CellStyle>, PersistenceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut section = Section::None;
    let mut num_fmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut borders: Vec<Borders> = Vec::new();
    let mut xfs: Vec<RawXf> = Vec::new();

    let mut font: Option<FontStyle> = None;
    let mut fill: Option<FillStyle> = None;
    let mut border: Option<Borders> = None;
    let mut edge: Option<Edge> = None;
    let mut xf: Option<RawXf> = None;

    loop {
        let event = reader.read_event()?;
        let (e, is_empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(end) => {
                match (section, end.local_name().as_ref()) {
                    (_, b"numFmts") | (_, b"fonts") | (_, b"fills") | (_, b"borders")
                    | (_, b"cellXfs") | (_, b"cellStyleXfs") | (_, b"dxfs") => {
                        section = Section::None;
                    }
                    (Section::Fonts, b"font") => fonts.extend(font.take()),
                    (Section::Fills, b"fill") => fills.extend(fill.take()),
                    (Section::Borders, b"border") => borders.extend(border.take()),
                    (Section::Borders, b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom") => {
                        edge = None;
                    }
                    (Section::CellXfs, b"xf") => xfs.extend(xf.take()),
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = e.local_name();
        match (section, name.as_ref()) {
            (Section::None, section_name) if !is_empty => {
                section = match section_name {
                    b"numFmts" => Section::NumFmts,
                    b"fonts" => Section::Fonts,
                    b"fills" => Section::Fills,
                    b"borders" => Section::Borders,
                    b"cellXfs" => Section::CellXfs,
                    b"cellStyleXfs" | b"dxfs" => Section::Ignored,
                    _ => Section::None,
                };
            }
            (Section::NumFmts, b"numFmt") => {
                if let (Some(id), Some(code)) = (attr_u32(&e, b"numFmtId")?, attr(&e, b"formatCode")?) {
                    num_fmts.insert(id, code);
                }
            }
            (Section::Fonts, b"font") => {
                if is_empty {
                    fonts.push(FontStyle::default());
                } else {
                    font = Some(FontStyle::default());
                }
            }
            (Section::Fonts, _) => {
                if let Some(font) = font.as_mut() {
                    apply_font_child(font, &e)?;
                }
            }
            (Section::Fills, b"fill") => {
                if is_empty {
                    fills.push(FillStyle::default());
                } else {
                    fill = Some(FillStyle::default());
                }
            }
            (Section::Fills, b"patternFill") => {
                if let Some(fill) = fill.as_mut() {
                    fill.pattern = attr(&e, b"patternType")?
                        .map(|v| FillPattern::from_ooxml(&v))
                        .unwrap_or_default();
                }
            }
            (Section::Fills, b"fgColor") => {
                if let Some(fill) = fill.as_mut() {
                    fill.fg_color = parse_color(&e)?;
                }
            }
            (Section::Fills, b"bgColor") => {
                if let Some(fill) = fill.as_mut() {
                    fill.bg_color = parse_color(&e)?;
                }
            }
            (Section::Borders, b"border") => {
                if is_empty {
                    borders.push(Borders::default());
                } else {
                    border = Some(Borders::default());
                }
            }
            (Section::Borders, edge_name @ (b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom")) => {
                let this_edge = match edge_name {
                    b"left" | b"start" => Edge::Left,
                    b"right" | b"end" => Edge::Right,
                    b"top" => Edge::Top,
                    _ => Edge::Bottom,
                };
                if let Some(border) = border.as_mut() {
                    let side = edge_mut(border, this_edge);
                    side.style = attr(&e, b"style")?
                        .map(|v| BorderLineStyle::from_ooxml(&v))
                        .unwrap_or_default();
                }
                edge = if is_empty { None } else { Some(this_edge) };
            }
            (Section::Borders, b"color") => {
                if let (Some(border), Some(this_edge)) = (border.as_mut(), edge) {
                    edge_mut(border, this_edge).color = parse_color(&e)?;
                }
            }
            (Section::Borders, b"diagonal" | b"vertical" | b"horizontal") => {
                edge = None;
            }
            (Section::CellXfs, b"xf") => {
                let raw = parse_raw_xf(&e)?;
                if is_empty {
                    xfs.push(raw);
                } else {
                    xf = Some(raw);
                }
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = xf.as_mut() {
                    xf.alignment = parse_alignment(&e)?;
                }
            }
            (Section::CellXfs, b"protection") => {
                if let Some(xf) = xf.as_mut() {
                    xf.protection = Protection {
                        locked: attr_bool(&e, b"locked", true)?,
                        hidden: attr_bool(&e, b"hidden", false)?,
                    };
                }
            }
            _ => {}
        }
    }

    Ok(xfs
        .into_iter()
        .map(|raw| CellStyle {
            font: fonts.get(raw.font_id).cloned().unwrap_or_default(),
            fill: fills.get(raw.fill_id).cloned().unwrap_or_default(),
            borders: borders.get(raw.border_id).cloned().unwrap_or_default(),
            number_format: resolve_number_format(raw.num_fmt_id, &num_fmts),
            protection: raw.protection,
            alignment: raw.alignment,
        })
        .collect())
}

fn resolve_number_format(id: u32, custom: &HashMap<u32, String>) -> NumberFormat {
    if let Some(code) = custom.get(&id) {
        return NumberFormat::Custom(code.clone());
    }
    if id < FIRST_CUSTOM_NUM_FMT {
        NumberFormat::Builtin(id as u8)
    } else {
        NumberFormat::default()
    }
}
