//! Scrollback: rows that scrolled off the top of the active region.
//!
//! Retention is unbounded by default; a bound can be configured, in which
//! case the oldest rows are dropped first.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::row::Row;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrollback {
    rows: VecDeque<Row>,
    max_rows: usize,
}

impl Scrollback {
    pub fn new(max_rows: usize) -> Self {
        Scrollback {
            rows: VecDeque::new(),
            max_rows,
        }
    }

    pub fn push(&mut self, row: Row) {
        if self.rows.len() >= self.max_rows {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn set_max_rows(&mut self, max_rows: usize) {
        self.max_rows = max_rows;
        while self.rows.len() > max_rows {
            self.rows.pop_front();
        }
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Scrollback::new(crate::DEFAULT_SCROLLBACK_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellWidth};
    use crate::style::Style;

    fn tagged(c: char, cols: usize) -> Row {
        let mut row = Row::new(cols);
        row.set(0, Cell::new(c, Style::default(), CellWidth::Narrow));
        row
    }

    #[test]
    fn oldest_first_ordering() {
        let mut sb = Scrollback::default();
        sb.push(tagged('a', 4));
        sb.push(tagged('b', 4));
        assert_eq!(sb.get(0).unwrap().get(0).unwrap().c, 'a');
        assert_eq!(sb.get(1).unwrap().get(0).unwrap().c, 'b');
    }

    #[test]
    fn bounded_retention_drops_oldest() {
        let mut sb = Scrollback::new(2);
        for c in ['a', 'b', 'c'] {
            sb.push(tagged(c, 4));
        }
        assert_eq!(sb.len(), 2);
        assert_eq!(sb.get(0).unwrap().get(0).unwrap().c, 'b');
    }

    #[test]
    fn shrinking_bound_truncates() {
        let mut sb = Scrollback::default();
        for c in ['a', 'b', 'c', 'd'] {
            sb.push(tagged(c, 4));
        }
        sb.set_max_rows(2);
        assert_eq!(sb.len(), 2);
        assert_eq!(sb.get(0).unwrap().get(0).unwrap().c, 'c');
    }
}
