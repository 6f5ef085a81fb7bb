//! Drawing tools and brush settings.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::canvas::CanvasError;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Line,
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Line,
        ToolKind::Rectangle,
        ToolKind::Circle,
    ];

    /// Freehand tools extend the stroke on every move; shape tools redraw a
    /// single shape from the start point.
    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Brush | ToolKind::Eraser)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Line => "Line",
        }
    }
}

/// Smallest brush size.
pub const MIN_BRUSH_SIZE: u32 = 1;
/// Largest brush size.
pub const MAX_BRUSH_SIZE: u32 = 50;
/// Increment used by the size buttons.
pub const BRUSH_SIZE_STEP: u32 = 2;
/// Initial brush size.
pub const DEFAULT_BRUSH_SIZE: u32 = 5;

/// Colour palette offered to the drawer.
pub const PALETTE: [&str; 20] = [
    "#000000", "#7F7F7F", "#880015", "#ED1C24", "#FF7F27", "#FFF200",
    "#22B14C", "#00A2E8", "#3F48CC", "#A349A4", "#FFFFFF", "#C3C3C3",
    "#B97A57", "#FFAEC9", "#FFC90E", "#EFE4B0", "#B5E61D", "#99D9EA",
    "#7092BE", "#C8BFE7",
];

/// Parse a `#RRGGBB` colour into an opaque pixel.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, CanvasError> {
    let s = s.trim();
    let invalid = || CanvasError::InvalidColor(s.to_string());
    let hex = s.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

/// Current tool, colour and size.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushSettings {
    pub tool: ToolKind,
    color: Rgba<u8>,
    size: u32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            color: Rgba([0, 0, 0, 255]),
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl BrushSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn set_color(&mut self, hex: &str) -> Result<(), CanvasError> {
        self.color = parse_color(hex)?;
        Ok(())
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn increase_size(&mut self) {
        self.set_size(self.size.saturating_add(BRUSH_SIZE_STEP));
    }

    pub fn decrease_size(&mut self) {
        self.set_size(self.size.saturating_sub(BRUSH_SIZE_STEP));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ED1C24").unwrap(), Rgba([0xED, 0x1C, 0x24, 255]));
        assert_eq!(parse_color(" #ffffff ").unwrap(), Rgba([255, 255, 255, 255]));
        assert!(parse_color("ED1C24").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#GG0000").is_err());
    }

    #[test]
    fn test_palette_parses() {
        for hex in PALETTE {
            assert!(parse_color(hex).is_ok(), "{}", hex);
        }
    }

    #[test]
    fn test_brush_size_clamped() {
        let mut brush = BrushSettings::new();
        assert_eq!(brush.size(), DEFAULT_BRUSH_SIZE);

        brush.decrease_size();
        brush.decrease_size();
        brush.decrease_size();
        assert_eq!(brush.size(), MIN_BRUSH_SIZE);

        brush.set_size(49);
        brush.increase_size();
        assert_eq!(brush.size(), MAX_BRUSH_SIZE);
    }

    #[test]
    fn test_freehand_tools() {
        assert!(ToolKind::Brush.is_freehand());
        assert!(ToolKind::Eraser.is_freehand());
        assert!(!ToolKind::Rectangle.is_freehand());
        assert_eq!(ToolKind::default(), ToolKind::Brush);
    }
}
