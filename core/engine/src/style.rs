//! FILENAME: core/engine/src/style.rs
//! PURPOSE: Defines the style data structures and registry for cell formatting.
//! CONTEXT: This file implements the Flyweight Pattern for efficient style storage.
//! Instead of storing full style data on every cell, cells store a style_index (usize)
//! that points to a shared Style object in the workbook's StyleRegistry.
//! The attribute groups mirror what an OOXML cell format carries: font, fill,
//! borders, number format, protection and alignment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

// ============================================================================
// EXACT FLOATS
// ============================================================================

/// An f64 compared and hashed by bit pattern, so styles holding sizes or
/// tints can live in the registry's lookup map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ExactF64(pub f64);

impl PartialEq for ExactF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for ExactF64 {}

impl Hash for ExactF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

// ============================================================================
// COLORS
// ============================================================================

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // Alpha channel (255 = opaque)
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn black() -> Self {
        Color::new(0, 0, 0)
    }

    /// Parse from hex string: "6699FF", "#6699FF", or ARGB "FF6699FF"
    /// (the form worksheets store).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::new(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::with_alpha(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => None,
        }
    }

    /// Packed 0xRRGGBB.
    pub fn to_rgb_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

/// Legacy indexed palette (indices 0..=63).
const INDEXED_PALETTE: [u32; 64] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF,
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF,
    0x800000, 0x008000, 0x000080, 0x808000, 0x800080, 0x008080, 0xC0C0C0, 0x808080,
    0x9999FF, 0x993366, 0xFFFFCC, 0xCCFFFF, 0x660066, 0xFF8080, 0x0066CC, 0xCCCCFF,
    0x000080, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0x800080, 0x800000, 0x008080, 0x0000FF,
    0x00CCFF, 0xCCFFFF, 0xCCFFCC, 0xFFFF99, 0x99CCFF, 0xFF99CC, 0xCC99FF, 0xFFCC99,
    0x3366FF, 0x33CCCC, 0x99CC00, 0xFFCC00, 0xFF9900, 0xFF6600, 0x666699, 0x969696,
    0x003366, 0x339966, 0x003300, 0x333300, 0x993300, 0x993366, 0x333399, 0x333333,
];

/// How a style refers to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRef {
    /// System automatic color.
    Auto,
    Rgb(Color),
    /// Theme palette slot with a tint in [-1.0, 1.0].
    Theme { index: u8, tint: ExactF64 },
    /// Legacy palette index; 64 and 65 are system foreground/background.
    Indexed(u8),
}

impl ColorRef {
    pub fn rgb_hex(hex: &str) -> Option<Self> {
        Color::from_hex(hex).map(ColorRef::Rgb)
    }

    /// Concrete RGB when one can be determined without a theme.
    pub fn resolve_rgb(&self) -> Option<Color> {
        match self {
            ColorRef::Rgb(color) => Some(*color),
            ColorRef::Indexed(i) => INDEXED_PALETTE.get(*i as usize).map(|rgb| {
                Color::new((rgb >> 16) as u8, (rgb >> 8) as u8, *rgb as u8)
            }),
            ColorRef::Auto | ColorRef::Theme { .. } => None,
        }
    }
}

// ============================================================================
// FONT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl UnderlineStyle {
    /// Maps the `val` attribute of `<u>`; a bare `<u/>` means single.
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "double" => UnderlineStyle::Double,
            "singleAccounting" => UnderlineStyle::SingleAccounting,
            "doubleAccounting" => UnderlineStyle::DoubleAccounting,
            "none" => UnderlineStyle::None,
            _ => UnderlineStyle::Single,
        }
    }
}

/// Font style configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    pub name: String,
    pub size: ExactF64, // Font size in points
    pub bold: bool,
    pub italic: bool,
    pub underline: UnderlineStyle,
    pub strikethrough: bool,
    pub color: Option<ColorRef>,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            name: "Calibri".to_string(),
            size: ExactF64(11.0),
            bold: false,
            italic: false,
            underline: UnderlineStyle::None,
            strikethrough: false,
            color: None,
        }
    }
}

// ============================================================================
// FILL
// ============================================================================

/// Pattern fill types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FillPattern {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl FillPattern {
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "solid" => FillPattern::Solid,
            "mediumGray" => FillPattern::MediumGray,
            "darkGray" => FillPattern::DarkGray,
            "lightGray" => FillPattern::LightGray,
            "darkHorizontal" => FillPattern::DarkHorizontal,
            "darkVertical" => FillPattern::DarkVertical,
            "darkDown" => FillPattern::DarkDown,
            "darkUp" => FillPattern::DarkUp,
            "darkGrid" => FillPattern::DarkGrid,
            "darkTrellis" => FillPattern::DarkTrellis,
            "lightHorizontal" => FillPattern::LightHorizontal,
            "lightVertical" => FillPattern::LightVertical,
            "lightDown" => FillPattern::LightDown,
            "lightUp" => FillPattern::LightUp,
            "lightGrid" => FillPattern::LightGrid,
            "lightTrellis" => FillPattern::LightTrellis,
            "gray125" => FillPattern::Gray125,
            "gray0625" => FillPattern::Gray0625,
            _ => FillPattern::None,
        }
    }
}

/// Cell background fill. For solid fills `fg_color` is the visible color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FillStyle {
    pub pattern: FillPattern,
    pub fg_color: Option<ColorRef>,
    pub bg_color: Option<ColorRef>,
}

impl FillStyle {
    /// Solid fill with the same start and end color.
    pub fn solid(color: Color) -> Self {
        FillStyle {
            pattern: FillPattern::Solid,
            fg_color: Some(ColorRef::Rgb(color)),
            bg_color: Some(ColorRef::Rgb(color)),
        }
    }
}

// ============================================================================
// BORDERS
// ============================================================================

/// Line style for borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BorderLineStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderLineStyle {
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "thin" => BorderLineStyle::Thin,
            "medium" => BorderLineStyle::Medium,
            "dashed" => BorderLineStyle::Dashed,
            "dotted" => BorderLineStyle::Dotted,
            "thick" => BorderLineStyle::Thick,
            "double" => BorderLineStyle::Double,
            "hair" => BorderLineStyle::Hair,
            "mediumDashed" => BorderLineStyle::MediumDashed,
            "dashDot" => BorderLineStyle::DashDot,
            "mediumDashDot" => BorderLineStyle::MediumDashDot,
            "dashDotDot" => BorderLineStyle::DashDotDot,
            "mediumDashDotDot" => BorderLineStyle::MediumDashDotDot,
            "slantDashDot" => BorderLineStyle::SlantDashDot,
            _ => BorderLineStyle::None,
        }
    }
}

/// Border style for a single edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BorderStyle {
    pub style: BorderLineStyle,
    pub color: Option<ColorRef>,
}

/// Complete border configuration for a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Borders {
    pub top: BorderStyle,
    pub right: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
}

// ============================================================================
// NUMBER FORMAT
// ============================================================================

/// Number format of a cell: either a built-in id or a custom format code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberFormat {
    Builtin(u8),
    Custom(String),
}

impl NumberFormat {
    pub fn is_general(&self) -> bool {
        matches!(self, NumberFormat::Builtin(0))
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Builtin(0)
    }
}

// ============================================================================
// PROTECTION & ALIGNMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protection {
    pub locked: bool,
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Protection {
            locked: true,
            hidden: false,
        }
    }
}

/// Horizontal alignment options for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TextAlign {
    #[default]
    General, // Auto: numbers right, text left
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl TextAlign {
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "left" => TextAlign::Left,
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            "fill" => TextAlign::Fill,
            "justify" => TextAlign::Justify,
            "centerContinuous" => TextAlign::CenterContinuous,
            "distributed" => TextAlign::Distributed,
            _ => TextAlign::General,
        }
    }
}

/// Vertical alignment options for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlign {
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "top" => VerticalAlign::Top,
            "center" => VerticalAlign::Center,
            "justify" => VerticalAlign::Justify,
            "distributed" => VerticalAlign::Distributed,
            _ => VerticalAlign::Bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Alignment {
    pub horizontal: TextAlign,
    pub vertical: VerticalAlign,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u8,
    /// Stored as in the document: 0-90 counter-clockwise, 91-180 clockwise
    /// (90 - value), 255 vertical stacked text.
    pub text_rotation: u16,
}

// ============================================================================
// CELL STYLE
// ============================================================================

/// Complete cell style definition.
/// This is what gets stored in the StyleRegistry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CellStyle {
    pub font: FontStyle,
    pub fill: FillStyle,
    pub borders: Borders,
    pub number_format: NumberFormat,
    pub protection: Protection,
    pub alignment: Alignment,
}

impl CellStyle {
    /// Create a new default style.
    pub fn new() -> Self {
        CellStyle::default()
    }

    /// Create a style with bold text.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Create a style with italic text.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    /// Create a style with a specific text color.
    pub fn with_text_color(mut self, color: Color) -> Self {
        self.font.color = Some(ColorRef::Rgb(color));
        self
    }

    /// Create a style with a specific fill.
    pub fn with_fill(mut self, fill: FillStyle) -> Self {
        self.fill = fill;
        self
    }

    /// Create a style with a solid background color.
    pub fn with_background(self, color: Color) -> Self {
        self.with_fill(FillStyle::solid(color))
    }

    /// Create a style with specific borders.
    pub fn with_borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// Create a style with a specific number format.
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Create a style with specific protection flags.
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    /// Create a style with a specific alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// The StyleRegistry implements the Flyweight Pattern.
/// It stores unique styles and returns indices for cells to reference.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    /// Vector of unique styles. Index 0 is always the default style.
    styles: Vec<CellStyle>,
    /// Reverse lookup: style hash -> index for deduplication.
    style_to_index: HashMap<CellStyle, usize>,
}

impl StyleRegistry {
    /// Create a new registry with the default style at index 0.
    pub fn new() -> Self {
        let default_style = CellStyle::new();
        let mut style_to_index = HashMap::new();
        style_to_index.insert(default_style.clone(), 0);

        StyleRegistry {
            styles: vec![default_style],
            style_to_index,
        }
    }

    /// Get or create a style index for the given style.
    /// If the style already exists, returns its index.
    /// Otherwise, adds the style and returns the new index.
    pub fn get_or_create(&mut self, style: CellStyle) -> usize {
        if let Some(&index) = self.style_to_index.get(&style) {
            return index;
        }

        let index = self.styles.len();
        self.style_to_index.insert(style.clone(), index);
        self.styles.push(style);
        index
    }

    /// Get a style by its index.
    /// Returns the default style (index 0) if index is out of bounds.
    pub fn get(&self, index: usize) -> &CellStyle {
        self.styles.get(index).unwrap_or(&self.styles[0])
    }

    /// Get the default style (index 0).
    pub fn default_style(&self) -> &CellStyle {
        &self.styles[0]
    }

    /// Get the total number of unique styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the registry only contains the default style.
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Get all styles (for serialization/debugging).
    pub fn all_styles(&self) -> &[CellStyle] {
        &self.styles
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        StyleRegistry::new()
    }
}
