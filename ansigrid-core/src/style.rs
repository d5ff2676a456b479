//! Text style: colors plus a closed set of boolean attributes.
//!
//! The attribute bit values are an external contract shared with every
//! consumer of the JSON projection and must not change.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Attribute set for a style. Exactly six bits are defined; the numeric
/// values are exported as-is in the JSON `flags` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttrFlags {
    bits: u8,
}

impl AttrFlags {
    pub const BOLD: u8 = 1;
    pub const ITALIC: u8 = 1 << 1;
    pub const UNDERLINE: u8 = 1 << 2;
    pub const STRIKETHROUGH: u8 = 1 << 3;
    pub const INVERSE: u8 = 1 << 4;
    pub const FAINT: u8 = 1 << 5;

    /// Mask of every defined attribute bit.
    pub const ALL: u8 = 0x3f;

    pub const fn empty() -> Self {
        AttrFlags { bits: 0 }
    }

    pub fn contains(self, flag: u8) -> bool {
        self.bits & flag != 0
    }

    pub fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.bits |= flag;
        } else {
            self.bits &= !flag;
        }
    }

    pub fn bits(self) -> u8 {
        self.bits
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }
}

/// The styling applied to one cell: foreground, background, attributes.
///
/// Equality is field-wise; an absent color never compares equal to a
/// concrete one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: AttrFlags,
}

impl Style {
    /// Style carrying only a background, as produced by erase operations.
    pub fn bg_only(bg: Color) -> Self {
        Style {
            fg: Color::Default,
            bg,
            attrs: AttrFlags::empty(),
        }
    }

    /// Back to the all-default style (SGR 0).
    pub fn reset(&mut self) {
        *self = Style::default();
    }
}
