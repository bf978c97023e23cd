//! FILENAME: core/persistence/src/ooxml.rs
//! PURPOSE: Low-level access to the parts of an XLSX package.
//! CONTEXT: calamine decodes cell values and formulas but not layout; this
//! module walks the zip archive with quick-xml to find worksheet parts and
//! read what calamine leaves out: per-cell style ids, row heights, column
//! widths, merged regions, hidden rows and columns, and frozen panes.

use crate::PersistenceError;
use engine::coord::{parse_a1, MAX_COLUMNS};
use engine::range::MergedRegion;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";
const DEFAULT_STYLES_PART: &str = "xl/styles.xml";

// ============================================================================
// ZIP + ATTRIBUTE HELPERS
// ============================================================================

/// Reads a part as UTF-8. Missing parts yield None.
pub(crate) fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<String>, PersistenceError> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Value of the attribute with the given local name (namespace prefix ignored).
pub(crate) fn attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>, PersistenceError> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == name {
            // Package parts are UTF-8.
            let raw = std::str::from_utf8(&attribute.value)
                .map_err(|err| quick_xml::Error::NonDecodable(Some(err)))?;
            let value = unescape(raw).map_err(quick_xml::Error::EscapeError)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

pub(crate) fn attr_u32(e: &BytesStart, name: &[u8]) -> Result<Option<u32>, PersistenceError> {
    Ok(attr(e, name)?.and_then(|v| v.trim().parse().ok()))
}

pub(crate) fn attr_f64(e: &BytesStart, name: &[u8]) -> Result<Option<f64>, PersistenceError> {
    Ok(attr(e, name)?.and_then(|v| v.trim().parse().ok()))
}

/// Boolean attribute; `default` applies when the attribute is absent.
pub(crate) fn attr_bool(e: &BytesStart, name: &[u8], default: bool) -> Result<bool, PersistenceError> {
    Ok(match attr(e, name)?.as_deref() {
        Some("1") | Some("true") => true,
        Some("0") | Some("false") => false,
        _ => default,
    })
}

/// Resolves a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}{}", base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn dir_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

fn rels_path_for(part: &str) -> String {
    let dir = dir_of(part);
    let file = &part[dir.len()..];
    format!("{}_rels/{}.rels", dir, file)
}

/// (Id, Type, Target) triples of a relationships part.
fn parse_relationships(xml: &str) -> Result<Vec<(String, String, String)>, PersistenceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr(&e, b"Id")?.unwrap_or_default();
                let rel_type = attr(&e, b"Type")?.unwrap_or_default();
                let target = attr(&e, b"Target")?.unwrap_or_default();
                rels.push((id, rel_type, target));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

// ============================================================================
// WORKBOOK PARTS
// ============================================================================

/// A worksheet as listed by the workbook part.
#[derive(Debug, Clone)]
pub(crate) struct SheetPart {
    pub name: String,
    pub path: String,
    /// `state="hidden"` or `state="veryHidden"`.
    pub hidden: bool,
}

/// Where things live inside the package.
#[derive(Debug, Clone)]
pub(crate) struct PackageLayout {
    pub sheets: Vec<SheetPart>,
    pub styles_path: Option<String>,
    pub active_tab: usize,
}

pub(crate) fn read_package_layout<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<PackageLayout, PersistenceError> {
    let workbook_path = match read_part(archive, "_rels/.rels")? {
        Some(root_rels) => parse_relationships(&root_rels)?
            .into_iter()
            .find(|(_, rel_type, _)| rel_type.ends_with("/officeDocument"))
            .map(|(_, _, target)| resolve_target("", &target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string()),
        None => DEFAULT_WORKBOOK_PART.to_string(),
    };

    let workbook_xml = read_part(archive, &workbook_path)?.ok_or_else(|| {
        PersistenceError::InvalidFormat(format!("missing workbook part {}", workbook_path))
    })?;

    let rels = read_part(archive, &rels_path_for(&workbook_path))?
        .map(|xml| parse_relationships(&xml))
        .transpose()?
        .unwrap_or_default();
    let base_dir = dir_of(&workbook_path);

    let mut worksheet_targets: HashMap<String, String> = HashMap::new();
    let mut styles_path = None;
    for (id, rel_type, target) in rels {
        if rel_type.ends_with("/worksheet") {
            worksheet_targets.insert(id, resolve_target(base_dir, &target));
        } else if rel_type.ends_with("/styles") {
            styles_path = Some(resolve_target(base_dir, &target));
        }
    }
    if styles_path.is_none() && archive.by_name(DEFAULT_STYLES_PART).is_ok() {
        styles_path = Some(DEFAULT_STYLES_PART.to_string());
    }

    let mut reader = Reader::from_str(&workbook_xml);
    reader.trim_text(true);
    let mut sheets = Vec::new();
    let mut active_tab = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let name = attr(&e, b"name")?.unwrap_or_default();
                    let hidden = matches!(attr(&e, b"state")?.as_deref(), Some("hidden") | Some("veryHidden"));
                    // Chartsheets and dialog sheets have no worksheet relationship.
                    if let Some(path) = attr(&e, b"id")?.and_then(|rid| worksheet_targets.get(&rid).cloned()) {
                        sheets.push(SheetPart { name, path, hidden });
                    }
                }
                b"workbookView" => {
                    active_tab = attr_u32(&e, b"activeTab")?.unwrap_or(0) as usize;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if sheets.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    Ok(PackageLayout {
        sheets,
        styles_path,
        active_tab,
    })
}

// ============================================================================
// WORKSHEET LAYOUT
// ============================================================================

/// What a worksheet part says about layout and formatting.
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetLayout {
    /// (row, col, cellXfs index) for every cell element with a non-zero style.
    pub styled_cells: Vec<(u32, u32, u32)>,
    pub row_heights: HashMap<u32, f64>,
    pub column_widths: HashMap<u32, f64>,
    pub merged_regions: Vec<MergedRegion>,
    pub hidden_rows: BTreeSet<u32>,
    pub hidden_columns: BTreeSet<u32>,
    /// (rows, columns) of the first frozen pane.
    pub freeze_panes: Option<(u32, u32)>,
}

pub(crate) fn parse_sheet_layout(xml: &str) -> Result<SheetLayout, PersistenceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut layout = SheetLayout::default();

    // Positions for cells and rows that omit their `r` attribute.
    let mut current_row: u32 = 0;
    let mut next_row: u32 = 0;
    let mut next_col: u32 = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = match attr_u32(&e, b"r")? {
                        Some(r) if r > 0 => r - 1,
                        _ => next_row,
                    };
                    next_row = current_row + 1;
                    next_col = 0;
                    if let Some(height) = attr_f64(&e, b"ht")? {
                        layout.row_heights.insert(current_row, height);
                    }
                    if attr_bool(&e, b"hidden", false)? {
                        layout.hidden_rows.insert(current_row);
                    }
                }
                b"c" => {
                    let (row, col) = match attr(&e, b"r")?.as_deref().and_then(parse_a1) {
                        Some(coord) => coord,
                        None => (current_row, next_col),
                    };
                    next_col = col + 1;
                    if let Some(style_id) = attr_u32(&e, b"s")? {
                        if style_id != 0 {
                            layout.styled_cells.push((row, col, style_id));
                        }
                    }
                }
                b"col" => {
                    let min = attr_u32(&e, b"min")?.unwrap_or(0);
                    let max = attr_u32(&e, b"max")?.unwrap_or(min).min(MAX_COLUMNS);
                    if min > 0 {
                        if let Some(width) = attr_f64(&e, b"width")? {
                            for col in min..=max {
                                layout.column_widths.insert(col - 1, width);
                            }
                        }
                        if attr_bool(&e, b"hidden", false)? {
                            layout.hidden_columns.extend((min..=max).map(|col| col - 1));
                        }
                    }
                }
                b"pane" if layout.freeze_panes.is_none() => {
                    let frozen = matches!(
                        attr(&e, b"state")?.as_deref(),
                        Some("frozen") | Some("frozenSplit")
                    );
                    if frozen {
                        let rows = attr_f64(&e, b"ySplit")?.unwrap_or(0.0).max(0.0) as u32;
                        let cols = attr_f64(&e, b"xSplit")?.unwrap_or(0.0).max(0.0) as u32;
                        if rows > 0 || cols > 0 {
                            layout.freeze_panes = Some((rows, cols));
                        }
                    }
                }
                b"mergeCell" => {
                    if let Some(region) = attr(&e, b"ref")?.as_deref().and_then(MergedRegion::parse) {
                        layout.merged_regions.push(region);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(layout)
}
