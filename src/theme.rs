//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::shapes::ShapeKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Piece colours in catalog order: square, I-beam, tromino, T, S, mono, L.
const CANDY: [Color; 7] = [
    rgb(0xFF4757),
    rgb(0x4E7DFA),
    rgb(0x2ED573),
    rgb(0xA29BFE),
    rgb(0xFFA502),
    rgb(0xECCC68),
    rgb(0x70A1FF),
];

const HIGH_CONTRAST: [Color; 7] = [
    rgb(0xFF0000),
    rgb(0x0088FF),
    rgb(0x00FF00),
    rgb(0xFF00FF),
    rgb(0xFF8800),
    rgb(0xFFFF00),
    rgb(0x00FFFF),
];

/// Okabe-Ito derived; no red/green pair relies on hue alone.
const COLORBLIND: [Color; 7] = [
    rgb(0xD55E00),
    rgb(0x0072B2),
    rgb(0x009E73),
    rgb(0xCC79A7),
    rgb(0xE69F00),
    rgb(0xF0E442),
    rgb(0x56B4E9),
];

/// Theme file keys for the piece colours, in catalog order.
const PIECE_KEYS: [&str; 7] = [
    "piece_square",
    "piece_ibeam",
    "piece_tromino",
    "piece_tee",
    "piece_skew",
    "piece_mono",
    "piece_ell",
];

/// Piece palette and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    pub pieces: [Color; 7],
    /// Background behind board and tray.
    pub bg: Color,
    /// Empty board cell.
    pub empty_cell: Color,
    /// Borders.
    pub div_line: Color,
    pub main_fg: Color,
    pub title: Color,
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            pieces: CANDY,
            bg: rgb(0x121218),
            empty_cell: rgb(0x1C1C24),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xECCC68),
            inactive_fg: rgb(0x5C6370),
        }
    }
}

impl Theme {
    /// Load from a btop-style file; defaults when `path` is None or missing.
    /// `palette` then overrides the piece colours unless it is Normal.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.pieces = HIGH_CONTRAST;
                self.empty_cell = Color::Black;
            }
            crate::Palette::Colorblind => self.pieces = COLORBLIND,
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::default();
        let mut pieces = d.pieces;
        for (slot, key) in pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = get(key) {
                *slot = c;
            }
        }
        Self {
            pieces,
            bg: get("main_bg").unwrap_or(d.bg),
            empty_cell: get("meter_bg").unwrap_or(d.empty_cell),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Colour for a board cell / piece colour slot.
    #[inline]
    pub fn piece_color(&self, index: u8) -> Color {
        self.pieces[(index as usize) % self.pieces.len()]
    }

    pub fn shape_color(&self, kind: ShapeKind) -> Color {
        self.piece_color(kind.color_index())
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let value = u32::from_str_radix(s, 16).map_err(|_| invalid())?;
    match s.len() {
        6 => Ok(rgb(value)),
        3 => {
            let (r, g, b) = ((value >> 8) & 0xF, (value >> 4) & 0xF, value & 0xF);
            Ok(Color::Rgb(r as u8 * 17, g as u8 * 17, b as u8 * 17))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#FF4757").unwrap();
        assert!(matches!(c, Color::Rgb(0xFF, 0x47, 0x57)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_bad_input() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_theme_file_overrides_piece() {
        let map = parse_theme_file(
            "# comment\ntheme[piece_mono]=\"#010203\"\ntheme[meter_bg]='#000'\n",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.shape_color(ShapeKind::Mono), Color::Rgb(1, 2, 3));
        assert_eq!(theme.empty_cell, Color::Rgb(0, 0, 0));
        assert_eq!(theme.shape_color(ShapeKind::Square), CANDY[0]);
    }

    #[test]
    fn test_colorblind_palette_swaps_pieces() {
        let theme = Theme::load(None, crate::Palette::Colorblind).unwrap();
        assert_eq!(theme.pieces, COLORBLIND);
    }
}
