//! Screen buffer: primary and alternate grids, cursor, modes, scrollback.
//!
//! The cursor column is allowed to equal `cols` transiently; that is the
//! pending-wrap state, resolved by the next write when autowrap is on.
//! Rows that scroll off the top of a full-screen region on the primary
//! grid are retained in scrollback.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellWidth};
use crate::color::Color;
use crate::row::Row;
use crate::scrollback::Scrollback;
use crate::style::Style;

/// Logical cursor position. `col == cols` is the pending-wrap state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
}

/// DECSTBM margins, inclusive, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub top: usize,
    pub bottom: usize,
}

impl ScrollRegion {
    pub fn full(rows: usize) -> Self {
        ScrollRegion {
            top: 0,
            bottom: rows.saturating_sub(1),
        }
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.top && row <= self.bottom
    }
}

/// Tracked terminal modes.
///
/// LNM defaults to enabled: PTY streams routinely emit a bare LF after a
/// styled line, and without the implicit carriage return the next line
/// would start at the old column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalModes {
    /// DECTCEM
    pub cursor_visible: bool,
    /// DECAWM
    pub autowrap: bool,
    /// LNM
    pub linefeed_mode: bool,
    /// DECOM
    pub origin_mode: bool,
    /// IRM
    pub insert_mode: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        TerminalModes {
            cursor_visible: true,
            autowrap: true,
            linefeed_mode: true,
            origin_mode: false,
            insert_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TabStops {
    stops: Vec<bool>,
}

impl TabStops {
    fn new(cols: usize) -> Self {
        let mut stops = vec![false; cols];
        for i in (0..cols).step_by(8) {
            stops[i] = true;
        }
        TabStops { stops }
    }

    fn set(&mut self, col: usize) {
        if col < self.stops.len() {
            self.stops[col] = true;
        }
    }

    fn clear(&mut self, col: usize) {
        if col < self.stops.len() {
            self.stops[col] = false;
        }
    }

    fn clear_all(&mut self) {
        self.stops.fill(false);
    }

    fn next_after(&self, col: usize) -> usize {
        ((col + 1)..self.stops.len())
            .find(|&i| self.stops[i])
            .unwrap_or_else(|| self.stops.len().saturating_sub(1))
    }

    fn resize(&mut self, new_cols: usize) {
        let old = self.stops.len();
        self.stops.resize(new_cols, false);
        for i in old..new_cols {
            if i % 8 == 0 {
                self.stops[i] = true;
            }
        }
    }
}

/// Cursor state captured by DECSC / restored by DECRC.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SavedCursor {
    cursor: Cursor,
    brush: Style,
    origin_mode: bool,
    autowrap: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    cols: usize,
    rows: usize,

    primary: Vec<Row>,
    alternate: Vec<Row>,
    alt_active: bool,

    scrollback: Scrollback,

    cursor: Cursor,
    saved_primary: Option<SavedCursor>,
    saved_alternate: Option<SavedCursor>,

    scroll_region: ScrollRegion,
    tab_stops: TabStops,

    /// Style applied to subsequent writes (mutated by SGR).
    pub brush: Style,
    pub modes: TerminalModes,
    pub title: String,
}

fn blank_row(cols: usize, bg: Color) -> Row {
    let mut row = Row::new(cols);
    if bg != Color::Default {
        row.erase_all(bg);
    }
    row
}

impl Screen {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Screen {
            cols,
            rows,
            primary: (0..rows).map(|_| Row::new(cols)).collect(),
            alternate: (0..rows).map(|_| Row::new(cols)).collect(),
            alt_active: false,
            scrollback: Scrollback::default(),
            cursor: Cursor::default(),
            saved_primary: None,
            saved_alternate: None,
            scroll_region: ScrollRegion::full(rows),
            tab_stops: TabStops::new(cols),
            brush: Style::default(),
            modes: TerminalModes::default(),
            title: String::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cursor position and visibility. The column is reported raw and may
    /// equal `cols` while a wrap is pending.
    pub fn cursor(&self) -> (usize, usize, bool) {
        (self.cursor.col, self.cursor.row, self.modes.cursor_visible)
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn set_max_scrollback(&mut self, max_rows: usize) {
        self.scrollback.set_max_rows(max_rows);
    }

    pub fn scroll_region(&self) -> ScrollRegion {
        self.scroll_region
    }

    pub fn is_alt_active(&self) -> bool {
        self.alt_active
    }

    fn grid(&self) -> &[Row] {
        if self.alt_active {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Vec<Row> {
        if self.alt_active {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.grid().get(index)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid().get(row).and_then(|r| r.get(col))
    }

    /// All retained rows, oldest scrollback first, then the active grid.
    /// This is the one ordering every extractor uses.
    pub fn rows_iter(&self) -> impl Iterator<Item = &Row> {
        self.scrollback.iter().chain(self.grid().iter())
    }

    /// Total retained rows (scrollback plus active grid).
    pub fn row_count(&self) -> usize {
        self.scrollback.len() + self.rows
    }

    /// Cheap check used by the early-exit feed loop.
    pub fn has_at_least(&self, n: usize) -> bool {
        n <= self.row_count()
    }

    // --- writes ---------------------------------------------------------

    /// Write one already-translated scalar at the cursor.
    /// Zero-width scalars are dropped.
    pub fn put_char(&mut self, c: char) {
        let width = match UnicodeWidthChar::width(c) {
            Some(0) | None => return,
            Some(w) => w.min(2),
        };

        if self.cursor.col + width > self.cols {
            if self.modes.autowrap {
                self.cursor.col = 0;
                self.index_down();
                let row = self.cursor.row;
                if let Some(r) = self.grid_mut().get_mut(row) {
                    r.wrapped = true;
                }
            } else {
                self.cursor.col = self.cols.saturating_sub(width);
            }
        }

        let Cursor { col, row } = self.cursor;
        if self.modes.insert_mode {
            if let Some(r) = self.grid_mut().get_mut(row) {
                r.insert_cells(col, width);
            }
        }

        self.heal_wide_overlap(row, col);
        if width == 2 {
            self.heal_wide_overlap(row, col + 1);
        }

        let brush = self.brush;
        if let Some(r) = self.grid_mut().get_mut(row) {
            let class = if width == 2 {
                CellWidth::Wide
            } else {
                CellWidth::Narrow
            };
            r.set(col, Cell::new(c, brush, class));
            if width == 2 {
                r.set(col + 1, Cell::new('\0', brush, CellWidth::Spacer));
            }
        }

        self.cursor.col += width;
    }

    /// Overwriting half of a wide character must not leave the other half
    /// behind: a spacer always has its wide cell, and vice versa.
    fn heal_wide_overlap(&mut self, row: usize, col: usize) {
        let class = match self.cell(row, col) {
            Some(cell) => cell.width,
            None => return,
        };
        match class {
            CellWidth::Spacer => {
                if col > 0 {
                    if let Some(r) = self.grid_mut().get_mut(row) {
                        r.set(col - 1, Cell::default());
                    }
                }
            }
            CellWidth::Wide => {
                if let Some(r) = self.grid_mut().get_mut(row) {
                    r.set(col + 1, Cell::default());
                }
            }
            CellWidth::Narrow => {}
        }
    }

    // --- cursor motion and control --------------------------------------

    /// Move down one row, scrolling when at the bottom margin. Does not
    /// touch the column.
    pub fn index_down(&mut self) {
        if self.cursor.row == self.scroll_region.bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
    }

    /// Move up one row, scrolling down when at the top margin.
    pub fn reverse_index(&mut self) {
        if self.cursor.row == self.scroll_region.top {
            self.scroll_down(1);
        } else {
            self.cursor.row = self.cursor.row.saturating_sub(1);
        }
    }

    /// LF. With LNM enabled this also performs the carriage return.
    pub fn linefeed(&mut self) {
        self.index_down();
        if self.modes.linefeed_mode {
            self.cursor.col = 0;
        }
    }

    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
    }

    pub fn backspace(&mut self) {
        self.cursor.col = self.cursor.col.saturating_sub(1).min(self.cols - 1);
    }

    /// HT: advance to the next tab stop without writing. Skipped columns
    /// stay unset.
    pub fn tab(&mut self) {
        let col = self.cursor.col.min(self.cols - 1);
        self.cursor.col = self.tab_stops.next_after(col).min(self.cols - 1);
    }

    pub fn set_tab_stop(&mut self) {
        self.tab_stops.set(self.cursor.col.min(self.cols - 1));
    }

    pub fn clear_tab_stop(&mut self, mode: u16) {
        match mode {
            0 => self.tab_stops.clear(self.cursor.col.min(self.cols - 1)),
            3 => self.tab_stops.clear_all(),
            _ => {}
        }
    }

    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        let (min_row, max_row) = if self.modes.origin_mode {
            (self.scroll_region.top, self.scroll_region.bottom)
        } else {
            (0, self.rows - 1)
        };
        let row = if self.modes.origin_mode {
            self.scroll_region.top + row
        } else {
            row
        };
        self.cursor.row = row.clamp(min_row, max_row);
        self.cursor.col = col.min(self.cols - 1);
    }

    pub fn move_cursor_up(&mut self, n: usize) {
        let min_row = if self.modes.origin_mode {
            self.scroll_region.top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(min_row);
        self.cursor.col = self.cursor.col.min(self.cols - 1);
    }

    pub fn move_cursor_down(&mut self, n: usize) {
        let max_row = if self.modes.origin_mode {
            self.scroll_region.bottom
        } else {
            self.rows - 1
        };
        self.cursor.row = (self.cursor.row + n).min(max_row);
        self.cursor.col = self.cursor.col.min(self.cols - 1);
    }

    pub fn move_cursor_forward(&mut self, n: usize) {
        self.cursor.col = (self.cursor.col.min(self.cols - 1) + n).min(self.cols - 1);
    }

    pub fn move_cursor_backward(&mut self, n: usize) {
        self.cursor.col = self.cursor.col.min(self.cols - 1).saturating_sub(n);
    }

    pub fn move_cursor_to_col(&mut self, col: usize) {
        self.cursor.col = col.min(self.cols - 1);
    }

    pub fn move_cursor_to_row(&mut self, row: usize) {
        let col = self.cursor.col.min(self.cols - 1);
        self.move_cursor_to(row, col);
    }

    pub fn save_cursor(&mut self) {
        let saved = SavedCursor {
            cursor: self.cursor,
            brush: self.brush,
            origin_mode: self.modes.origin_mode,
            autowrap: self.modes.autowrap,
        };
        if self.alt_active {
            self.saved_alternate = Some(saved);
        } else {
            self.saved_primary = Some(saved);
        }
    }

    pub fn restore_cursor(&mut self) {
        let saved = if self.alt_active {
            self.saved_alternate
        } else {
            self.saved_primary
        };
        if let Some(saved) = saved {
            self.cursor.row = saved.cursor.row.min(self.rows - 1);
            self.cursor.col = saved.cursor.col.min(self.cols - 1);
            self.brush = saved.brush;
            self.modes.origin_mode = saved.origin_mode;
            self.modes.autowrap = saved.autowrap;
        }
    }

    // --- scrolling ------------------------------------------------------

    /// SU / implicit scroll at the bottom margin. Rows leaving the top of
    /// a full-height region on the primary grid are kept in scrollback.
    pub fn scroll_up(&mut self, count: usize) {
        let ScrollRegion { top, bottom } = self.scroll_region;
        if count == 0 || top > bottom || bottom >= self.rows {
            return;
        }
        let count = count.min(bottom - top + 1);
        let cols = self.cols;
        let bg = self.brush.bg;
        let capture = !self.alt_active && top == 0;

        let Screen {
            primary,
            alternate,
            alt_active,
            scrollback,
            ..
        } = self;
        let grid = if *alt_active { alternate } else { primary };

        for _ in 0..count {
            let removed = grid.remove(top);
            if capture {
                scrollback.push(removed);
            }
            grid.insert(bottom, blank_row(cols, bg));
        }
    }

    /// SD: move region content down, fresh rows at the top.
    pub fn scroll_down(&mut self, count: usize) {
        let ScrollRegion { top, bottom } = self.scroll_region;
        if count == 0 || top > bottom || bottom >= self.rows {
            return;
        }
        let count = count.min(bottom - top + 1);
        let cols = self.cols;
        let bg = self.brush.bg;

        let grid = self.grid_mut();
        for _ in 0..count {
            grid.remove(bottom);
            grid.insert(top, blank_row(cols, bg));
        }
    }

    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let top = top.min(self.rows - 1);
        let bottom = bottom.min(self.rows - 1);
        if top < bottom {
            self.scroll_region = ScrollRegion { top, bottom };
            self.move_cursor_to(0, 0);
        }
    }

    pub fn reset_scroll_region(&mut self) {
        self.scroll_region = ScrollRegion::full(self.rows);
    }

    // --- erase and edit -------------------------------------------------

    pub fn erase_in_display(&mut self, mode: u16) {
        let Cursor { col, row } = self.cursor;
        let cols = self.cols;
        let bg = self.brush.bg;
        match mode {
            0 => {
                if let Some(r) = self.grid_mut().get_mut(row) {
                    r.erase_range(col.min(cols), cols, bg);
                }
                for r in self.grid_mut().iter_mut().skip(row + 1) {
                    r.erase_all(bg);
                }
            }
            1 => {
                for r in self.grid_mut().iter_mut().take(row) {
                    r.erase_all(bg);
                }
                if let Some(r) = self.grid_mut().get_mut(row) {
                    r.erase_range(0, (col + 1).min(cols), bg);
                }
            }
            // scrollback survives everything except reset, so ED 3 only
            // clears the visible grid
            2 | 3 => {
                for r in self.grid_mut().iter_mut() {
                    r.erase_all(bg);
                }
            }
            _ => {}
        }
    }

    pub fn erase_in_line(&mut self, mode: u16) {
        let Cursor { col, row } = self.cursor;
        let cols = self.cols;
        let bg = self.brush.bg;
        if let Some(r) = self.grid_mut().get_mut(row) {
            match mode {
                0 => r.erase_range(col.min(cols), cols, bg),
                1 => r.erase_range(0, (col + 1).min(cols), bg),
                2 => r.erase_all(bg),
                _ => {}
            }
        }
    }

    /// ECH: erase forward from the cursor without moving it.
    pub fn erase_chars(&mut self, count: usize) {
        let Cursor { col, row } = self.cursor;
        let end = (col + count).min(self.cols);
        let bg = self.brush.bg;
        if let Some(r) = self.grid_mut().get_mut(row) {
            r.erase_range(col.min(end), end, bg);
        }
    }

    pub fn insert_chars(&mut self, count: usize) {
        let Cursor { col, row } = self.cursor;
        let col = col.min(self.cols - 1);
        if let Some(r) = self.grid_mut().get_mut(row) {
            r.insert_cells(col, count);
        }
    }

    pub fn delete_chars(&mut self, count: usize) {
        let Cursor { col, row } = self.cursor;
        let col = col.min(self.cols - 1);
        if let Some(r) = self.grid_mut().get_mut(row) {
            r.delete_cells(col, count);
        }
    }

    /// IL: blank rows pushed in at the cursor, region content shifted down.
    pub fn insert_lines(&mut self, count: usize) {
        let row = self.cursor.row;
        let bottom = self.scroll_region.bottom;
        if !self.scroll_region.contains(row) {
            return;
        }
        let count = count.min(bottom - row + 1);
        let cols = self.cols;
        let grid = self.grid_mut();
        for _ in 0..count {
            if bottom < grid.len() {
                grid.remove(bottom);
            }
            grid.insert(row, Row::new(cols));
        }
    }

    /// DL: rows removed at the cursor, blanks appended at the margin.
    pub fn delete_lines(&mut self, count: usize) {
        let row = self.cursor.row;
        let bottom = self.scroll_region.bottom;
        if !self.scroll_region.contains(row) {
            return;
        }
        let count = count.min(bottom - row + 1);
        let cols = self.cols;
        let grid = self.grid_mut();
        for _ in 0..count {
            if row < grid.len() {
                grid.remove(row);
            }
            if bottom <= grid.len() {
                grid.insert(bottom, Row::new(cols));
            }
        }
    }

    // --- alternate screen -----------------------------------------------

    pub fn enter_alternate(&mut self) {
        if !self.alt_active {
            self.alt_active = true;
            for row in &mut self.alternate {
                *row = Row::new(self.cols);
            }
            self.cursor = Cursor::default();
        }
    }

    pub fn exit_alternate(&mut self) {
        self.alt_active = false;
    }

    // --- lifecycle ------------------------------------------------------

    /// Change grid dimensions. Content is not reflowed: rows are clipped or
    /// extended per column, rows dropped from the top of a shrinking
    /// primary grid move into scrollback, and the cursor is clamped.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        let new_cols = new_cols.max(1);
        let new_rows = new_rows.max(1);
        if new_cols == self.cols && new_rows == self.rows {
            return;
        }

        for row in self.primary.iter_mut().chain(self.alternate.iter_mut()) {
            row.resize(new_cols);
        }

        let mut shifted = 0usize;
        while self.primary.len() > new_rows {
            let row = self.primary.remove(0);
            self.scrollback.push(row);
            shifted += 1;
        }
        while self.primary.len() < new_rows {
            self.primary.push(Row::new(new_cols));
        }
        self.alternate.resize(new_rows, Row::new(new_cols));

        self.cols = new_cols;
        self.rows = new_rows;

        self.cursor.row = self.cursor.row.saturating_sub(shifted).min(new_rows - 1);
        self.cursor.col = self.cursor.col.min(new_cols - 1);

        self.scroll_region = ScrollRegion::full(new_rows);
        self.tab_stops.resize(new_cols);
    }

    /// Hard reset: grids, scrollback, cursor, brush, modes, tab stops.
    pub fn reset(&mut self) {
        for row in self.primary.iter_mut().chain(self.alternate.iter_mut()) {
            *row = Row::new(self.cols);
        }
        self.alt_active = false;
        self.scrollback.clear();
        self.cursor = Cursor::default();
        self.saved_primary = None;
        self.saved_alternate = None;
        self.scroll_region = ScrollRegion::full(self.rows);
        self.tab_stops = TabStops::new(self.cols);
        self.brush = Style::default();
        self.modes = TerminalModes::default();
        self.title.clear();
    }
}

impl Default for Screen {
    fn default() -> Self {
        Screen::new(crate::DEFAULT_COLS, crate::DEFAULT_ROWS)
    }
}
