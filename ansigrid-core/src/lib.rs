//! Ansigrid Terminal Core
//!
//! Platform-independent model of a terminal screen:
//! - Cell representation with one scalar, a style, and a width class
//! - Style model with palette-indexed and true colors
//! - Screen buffer with primary/alternate grids and unbounded scrollback
//! - Character set translation (DEC Special Graphics, UK)
//!
//! This crate has no parser and no I/O; it is driven entirely through the
//! screen mutation API and can be used headlessly for testing.

pub mod cell;
pub mod charset;
pub mod color;
pub mod row;
pub mod screen;
pub mod scrollback;
pub mod style;

pub use cell::{Cell, CellWidth};
pub use charset::{Charset, CharsetState};
pub use color::{default_palette, Color, Palette, Rgb};
pub use row::Row;
pub use screen::{Cursor, Screen, ScrollRegion, TerminalModes};
pub use scrollback::Scrollback;
pub use style::{AttrFlags, Style};

/// Default grid width for structured extraction.
pub const DEFAULT_COLS: usize = 120;
/// Default grid height for structured extraction.
pub const DEFAULT_ROWS: usize = 40;
/// Scrollback retention is effectively unbounded unless configured.
pub const DEFAULT_SCROLLBACK_ROWS: usize = usize::MAX;
