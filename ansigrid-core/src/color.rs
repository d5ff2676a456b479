//! Terminal color representation.
//!
//! A cell color is either absent (the terminal default), an index into the
//! 256-entry palette, or a direct 24-bit RGB value. Cells store palette
//! indices rather than resolved RGB, so palette edits show up on the next
//! read without rewriting the grid.

use serde::{Deserialize, Serialize};

/// A color as stored in a cell style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// No color set; consumers treat this as "default".
    #[default]
    Default,
    /// Index into the 256-entry palette.
    Indexed(u8),
    /// Direct 24-bit color.
    Rgb(Rgb),
}

impl Color {
    /// Resolve to a concrete RGB value through the given palette.
    /// `Default` resolves to `None`.
    pub fn resolve(self, palette: &Palette) -> Option<Rgb> {
        match self {
            Color::Default => None,
            Color::Indexed(i) => Some(palette[i as usize]),
            Color::Rgb(rgb) => Some(rgb),
        }
    }
}

/// 24-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Lowercase `#rrggbb` form used by every external projection.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The 256-entry palette owned by an emulator.
pub type Palette = [Rgb; 256];

/// Build the default xterm-compatible palette:
/// 0-15 standard and bright ANSI colors, 16-231 the 6x6x6 cube,
/// 232-255 the grayscale ramp.
pub fn default_palette() -> Palette {
    let mut palette = [Rgb::new(0, 0, 0); 256];

    palette[0] = Rgb::new(0, 0, 0);
    palette[1] = Rgb::new(205, 0, 0);
    palette[2] = Rgb::new(0, 205, 0);
    palette[3] = Rgb::new(205, 205, 0);
    palette[4] = Rgb::new(0, 0, 238);
    palette[5] = Rgb::new(205, 0, 205);
    palette[6] = Rgb::new(0, 205, 205);
    palette[7] = Rgb::new(229, 229, 229);

    palette[8] = Rgb::new(127, 127, 127);
    palette[9] = Rgb::new(255, 0, 0);
    palette[10] = Rgb::new(0, 255, 0);
    palette[11] = Rgb::new(255, 255, 0);
    palette[12] = Rgb::new(92, 92, 255);
    palette[13] = Rgb::new(255, 0, 255);
    palette[14] = Rgb::new(0, 255, 255);
    palette[15] = Rgb::new(255, 255, 255);

    let cube = [0u8, 95, 135, 175, 215, 255];
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                palette[16 + r * 36 + g * 6 + b] = Rgb::new(cube[r], cube[g], cube[b]);
            }
        }
    }

    for i in 0..24 {
        let gray = (i * 10 + 8) as u8;
        palette[232 + i] = Rgb::new(gray, gray, gray);
    }

    palette
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_through_palette() {
        let palette = default_palette();
        assert_eq!(Color::Default.resolve(&palette), None);
        assert_eq!(Color::Indexed(2).resolve(&palette), Some(Rgb::new(0, 205, 0)));
        assert_eq!(
            Color::Rgb(Rgb::new(1, 2, 3)).resolve(&palette),
            Some(Rgb::new(1, 2, 3))
        );
    }

    #[test]
    fn hex_is_lowercase() {
        assert_eq!(Rgb::new(255, 0, 128).hex(), "#ff0080");
        assert_eq!(Rgb::new(0, 205, 0).hex(), "#00cd00");
    }

    #[test]
    fn cube_endpoints() {
        let palette = default_palette();
        assert_eq!(palette[16], Rgb::new(0, 0, 0));
        assert_eq!(palette[231], Rgb::new(255, 255, 255));
        assert_eq!(palette[255], Rgb::new(238, 238, 238));
    }
}
