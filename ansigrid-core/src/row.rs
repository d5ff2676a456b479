//! A row of the grid: exactly `cols` cells plus a soft-wrap marker.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::color::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<Cell>,
    /// Set when the previous row wrapped into this one rather than ending
    /// with an explicit line break.
    pub wrapped: bool,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Row {
            cells: vec![Cell::default(); cols],
            wrapped: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    pub fn set(&mut self, col: usize, cell: Cell) {
        if col < self.cells.len() {
            self.cells[col] = cell;
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of leading columns that survive trailing trim: everything up
    /// to the last cell that was ever written. Erased cells count as unset
    /// regardless of the background they carry.
    pub fn content_cols(&self) -> usize {
        self.cells
            .iter()
            .rposition(|cell| !cell.is_unset())
            .map_or(0, |i| i + 1)
    }

    pub fn erase_all(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
        self.wrapped = false;
    }

    /// Erase `start..end`, clamped to the row.
    pub fn erase_range(&mut self, start: usize, end: usize, bg: Color) {
        let end = end.min(self.cells.len());
        for cell in &mut self.cells[start.min(end)..end] {
            cell.erase(bg);
        }
    }

    /// Shift cells right from `col`, dropping overflow. Used by IRM and ICH.
    pub fn insert_cells(&mut self, col: usize, count: usize) {
        if col >= self.cells.len() {
            return;
        }
        let count = count.min(self.cells.len() - col);
        self.cells.truncate(self.cells.len() - count);
        for _ in 0..count {
            self.cells.insert(col, Cell::default());
        }
    }

    /// Shift cells left from `col`, back-filling with blanks. Used by DCH.
    pub fn delete_cells(&mut self, col: usize, count: usize) {
        if col >= self.cells.len() {
            return;
        }
        let cols = self.cells.len();
        let count = count.min(cols - col);
        self.cells.drain(col..col + count);
        self.cells.resize(cols, Cell::default());
    }

    pub fn resize(&mut self, new_cols: usize) {
        self.cells.resize(new_cols, Cell::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellWidth;
    use crate::style::Style;

    fn written(c: char) -> Cell {
        Cell::new(c, Style::default(), CellWidth::Narrow)
    }

    #[test]
    fn content_cols_trims_trailing_unset() {
        let mut row = Row::new(10);
        row.set(0, written('a'));
        row.set(3, written('b'));
        assert_eq!(row.content_cols(), 4);
    }

    #[test]
    fn content_cols_ignores_painted_background() {
        let mut row = Row::new(10);
        row.set(0, written('a'));
        row.get_mut(6).unwrap().erase(Color::Indexed(1));
        assert_eq!(row.content_cols(), 1);
    }

    #[test]
    fn content_cols_zero_for_erased_row() {
        let mut row = Row::new(10);
        row.set(0, written('a'));
        row.erase_all(Color::Indexed(4));
        assert_eq!(row.content_cols(), 0);
    }

    #[test]
    fn content_cols_empty_row() {
        let row = Row::new(10);
        assert_eq!(row.content_cols(), 0);
    }

    #[test]
    fn insert_shifts_right() {
        let mut row = Row::new(6);
        for (i, c) in "abcdef".chars().enumerate() {
            row.set(i, written(c));
        }
        row.insert_cells(2, 2);
        assert_eq!(row.get(1).unwrap().c, 'b');
        assert!(row.get(2).unwrap().is_unset());
        assert!(row.get(3).unwrap().is_unset());
        assert_eq!(row.get(4).unwrap().c, 'c');
        assert_eq!(row.len(), 6);
    }

    #[test]
    fn delete_shifts_left() {
        let mut row = Row::new(6);
        for (i, c) in "abcdef".chars().enumerate() {
            row.set(i, written(c));
        }
        row.delete_cells(1, 2);
        assert_eq!(row.get(1).unwrap().c, 'd');
        assert_eq!(row.get(3).unwrap().c, 'f');
        assert!(row.get(4).unwrap().is_unset());
        assert_eq!(row.len(), 6);
    }
}
