//! A cell is one grid column in one row: a single Unicode scalar, a style,
//! and a width class.
//!
//! `'\0'` marks a cell that was never written; extraction trims trailing
//! runs of these and renders interior ones as spaces. A wide character
//! occupies a `Wide` cell plus a `Spacer` immediately to its right; the
//! spacer is never independently styled or extracted.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::style::Style;

/// Width class of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellWidth {
    #[default]
    Narrow,
    /// First column of a double-width character.
    Wide,
    /// Right half of a double-width character.
    Spacer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub c: char,
    pub style: Style,
    pub width: CellWidth,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            c: '\0',
            style: Style::default(),
            width: CellWidth::Narrow,
        }
    }
}

impl Cell {
    pub fn new(c: char, style: Style, width: CellWidth) -> Self {
        Cell { c, style, width }
    }

    /// True when nothing has ever been written here.
    pub fn is_unset(&self) -> bool {
        self.c == '\0'
    }

    pub fn is_wide(&self) -> bool {
        self.width == CellWidth::Wide
    }

    pub fn is_spacer(&self) -> bool {
        self.width == CellWidth::Spacer
    }

    /// Columns this cell contributes to a span (spacers contribute none).
    pub fn display_width(&self) -> usize {
        match self.width {
            CellWidth::Narrow => 1,
            CellWidth::Wide => 2,
            CellWidth::Spacer => 0,
        }
    }

    /// Erase in place, keeping only the given background.
    pub fn erase(&mut self, bg: Color) {
        *self = Cell {
            c: '\0',
            style: Style::bg_only(bg),
            width: CellWidth::Narrow,
        };
    }
}
