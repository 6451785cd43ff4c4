//! Color values and palette resolution
//!
//! The server describes colors either as an index into the 16-entry ANSI
//! palette or as a literal 24-bit value. Resolution turns such a value into
//! a concrete RGB color, or into nothing at all when the value is the
//! conventional default for its role (white foreground, black background) -
//! in that case the terminal's own default styling is left untouched.

use std::sync::OnceLock;

/// A concrete 24-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` code.
    pub const fn from_code(code: u32) -> Self {
        Self {
            r: (code >> 16) as u8,
            g: (code >> 8) as u8,
            b: code as u8,
        }
    }

    /// Packed `0xRRGGBB` code.
    #[allow(dead_code)]
    pub const fn code(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// A color as emitted by the backend, before palette resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorValue {
    /// Index into the session palette. Only 0-15 are resolvable; the decoder
    /// maps xterm 256-color indices to `Hex` before they get here.
    Ansi(u8),
    /// Literal 24-bit color.
    Hex(RgbColor),
}

impl ColorValue {
    /// The conventional default foreground (suppressed to baseline).
    pub const DEFAULT_FOREGROUND: Self = Self::Ansi(7);
    /// The conventional default background (suppressed to baseline).
    pub const DEFAULT_BACKGROUND: Self = Self::Ansi(0);
}

/// Which slot of a styled run a color is being resolved for.
///
/// The baseline suppression rule differs per role, so the same raw value can
/// resolve to a concrete color in one role and to nothing in the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Foreground,
    Background,
}

/// The 16-entry indexed color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette([RgbColor; 16]);

impl Palette {
    /// Conventional ANSI 4-bit colors: black, red, green, yellow, blue,
    /// magenta, cyan, light gray, then the bright counterparts.
    pub const ANSI: Self = Self([
        RgbColor::new(0, 0, 0),
        RgbColor::new(128, 0, 0),
        RgbColor::new(0, 128, 0),
        RgbColor::new(128, 128, 0),
        RgbColor::new(0, 0, 128),
        RgbColor::new(128, 0, 128),
        RgbColor::new(0, 128, 128),
        RgbColor::new(192, 192, 192),
        RgbColor::new(128, 128, 128),
        RgbColor::new(255, 0, 0),
        RgbColor::new(0, 255, 0),
        RgbColor::new(255, 255, 0),
        RgbColor::new(0, 0, 255),
        RgbColor::new(255, 0, 255),
        RgbColor::new(0, 255, 255),
        RgbColor::new(255, 255, 255),
    ]);

    pub const fn new(colors: [RgbColor; 16]) -> Self {
        Self(colors)
    }

    pub fn get(&self, index: u8) -> Option<RgbColor> {
        self.0.get(index as usize).copied()
    }

    pub fn colors(&self) -> &[RgbColor; 16] {
        &self.0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::ANSI
    }
}

/// Resolve a color value for a role against a palette.
///
/// Returns `None` ("baseline") when the value is the conventional default
/// for the role: `Ansi(7)` or literal white for the foreground, `Ansi(0)`
/// or literal black for the background. The check is on the tagged value
/// itself, not on the resolved RGB, so a customized palette entry that
/// happens to be white or black is never suppressed.
///
/// An `Ansi` index with no palette entry is bad data from the stream; it
/// resolves to baseline rather than failing.
pub fn resolve(role: ColorRole, value: ColorValue, palette: &Palette) -> Option<RgbColor> {
    if is_baseline(role, value) {
        return None;
    }
    match value {
        ColorValue::Ansi(index) => {
            let resolved = palette.get(index);
            if resolved.is_none() {
                tracing::warn!("palette index {} out of range, using baseline", index);
            }
            resolved
        }
        ColorValue::Hex(color) => Some(color),
    }
}

fn is_baseline(role: ColorRole, value: ColorValue) -> bool {
    match role {
        ColorRole::Foreground => {
            value == ColorValue::Ansi(7) || value == ColorValue::Hex(RgbColor::WHITE)
        }
        ColorRole::Background => {
            value == ColorValue::Ansi(0) || value == ColorValue::Hex(RgbColor::BLACK)
        }
    }
}

/// Look up an xterm 256-color index as a literal RGB color.
///
/// Indices 0-15 use the conventional ANSI table, 16-231 the 6x6x6 color
/// cube, 232-255 the grayscale ramp.
pub fn xterm_color(code: u8) -> RgbColor {
    static TABLE: OnceLock<[RgbColor; 256]> = OnceLock::new();
    TABLE.get_or_init(build_xterm_table)[code as usize]
}

fn build_xterm_table() -> [RgbColor; 256] {
    let mut table = [RgbColor::BLACK; 256];
    table[..16].copy_from_slice(Palette::ANSI.colors());

    // Color cube: each channel steps through 0, 95, 135, 175, 215, 255
    const STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                table[16 + 36 * r + 6 * g + b] = RgbColor::new(STEPS[r], STEPS[g], STEPS[b]);
            }
        }
    }

    // Grayscale ramp: 8, 18, ... 238
    for i in 0..24 {
        let level = 8 + 10 * i as u8;
        table[232 + i] = RgbColor::new(level, level, level);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_baseline_suppression() {
        let palette = Palette::default();
        assert_eq!(
            resolve(ColorRole::Foreground, ColorValue::Ansi(7), &palette),
            None
        );
        assert_eq!(
            resolve(
                ColorRole::Foreground,
                ColorValue::Hex(RgbColor::from_code(0xFFFFFF)),
                &palette
            ),
            None
        );
        // A non-default index is never suppressed
        assert_eq!(
            resolve(ColorRole::Foreground, ColorValue::Ansi(6), &palette),
            Some(RgbColor::new(0, 128, 128))
        );
    }

    #[test]
    fn test_background_baseline_suppression() {
        let palette = Palette::default();
        assert_eq!(
            resolve(ColorRole::Background, ColorValue::Ansi(0), &palette),
            None
        );
        assert_eq!(
            resolve(
                ColorRole::Background,
                ColorValue::Hex(RgbColor::from_code(0x000000)),
                &palette
            ),
            None
        );
        assert_eq!(
            resolve(ColorRole::Background, ColorValue::Ansi(1), &palette),
            Some(RgbColor::new(128, 0, 0))
        );
    }

    #[test]
    fn test_suppression_is_role_specific() {
        let palette = Palette::default();
        // White foreground is baseline, white background is not
        assert_eq!(
            resolve(
                ColorRole::Background,
                ColorValue::Hex(RgbColor::WHITE),
                &palette
            ),
            Some(RgbColor::WHITE)
        );
        // Black background is baseline, black foreground is not
        assert_eq!(
            resolve(
                ColorRole::Foreground,
                ColorValue::Hex(RgbColor::BLACK),
                &palette
            ),
            Some(RgbColor::BLACK)
        );
        // Index 0 as foreground resolves to the palette entry
        assert_eq!(
            resolve(ColorRole::Foreground, ColorValue::Ansi(0), &palette),
            Some(RgbColor::BLACK)
        );
    }

    #[test]
    fn test_suppression_checks_tag_not_resolved_rgb() {
        // Customize index 3 to pure white; it must still resolve
        let mut colors = *Palette::ANSI.colors();
        colors[3] = RgbColor::WHITE;
        let palette = Palette::new(colors);
        assert_eq!(
            resolve(ColorRole::Foreground, ColorValue::Ansi(3), &palette),
            Some(RgbColor::WHITE)
        );
    }

    #[test]
    fn test_out_of_range_index_is_baseline() {
        let palette = Palette::default();
        assert_eq!(
            resolve(ColorRole::Foreground, ColorValue::Ansi(20), &palette),
            None
        );
        assert_eq!(
            resolve(ColorRole::Background, ColorValue::Ansi(255), &palette),
            None
        );
    }

    #[test]
    fn test_rgb_code_round_trip() {
        let color = RgbColor::new(0x12, 0x34, 0x56);
        assert_eq!(color.code(), 0x123456);
        assert_eq!(RgbColor::from_code(0x123456), color);
    }

    #[test]
    fn test_xterm_table() {
        // First 16 match the default palette
        assert_eq!(xterm_color(9), RgbColor::new(255, 0, 0));
        // Cube corners
        assert_eq!(xterm_color(16), RgbColor::new(0, 0, 0));
        assert_eq!(xterm_color(231), RgbColor::new(255, 255, 255));
        // One mid-cube entry: 16 + 36*1 + 6*2 + 3 = 67
        assert_eq!(xterm_color(67), RgbColor::new(95, 135, 175));
        // Grayscale ramp ends at 238
        assert_eq!(xterm_color(232), RgbColor::new(8, 8, 8));
        assert_eq!(xterm_color(255), RgbColor::new(238, 238, 238));
    }
}
