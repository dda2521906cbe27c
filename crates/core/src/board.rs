//! Board module - manages the game grid
//!
//! The board is a `width x (visible_height + vanish_rows)` grid of numeric cells
//! stored as one flat row-major vector. `0` is empty; any other value is an
//! occupied cell tagged with the piece that filled it.
//!
//! Coordinates are playfield-relative: `x` grows left to right from 0, `y` grows
//! top to bottom with row 0 the top visible row. Negative rows address the
//! hidden vanish zone above the playfield.
//!
//! Boards are values. [`Board::place`] and [`Board::compact`] return new boards
//! and never share storage with their input.

use crate::piece::ActivePiece;
use crate::types::{BoardConfig, Cell, EMPTY_CELL, GARBAGE_CELL};

/// The game board with its vanish zone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: u8,
    visible_height: u8,
    vanish_rows: u8,
    /// Flat array of cells, row-major order starting at the top vanish row
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(config: BoardConfig) -> Self {
        let size = config.width as usize * config.total_height() as usize;
        Self {
            width: config.width,
            visible_height: config.visible_height,
            vanish_rows: config.vanish_rows,
            cells: vec![EMPTY_CELL; size],
        }
    }

    /// Create an empty 10x20 board with a two-row vanish zone
    pub fn standard() -> Self {
        Self::new(BoardConfig::default())
    }

    /// Build a board whose bottom visible rows match `rows`
    ///
    /// Each string is one row, left to right: `.` or space is empty, a piece
    /// letter tags the cell with that piece, anything else becomes garbage.
    /// Rows are aligned to the bottom of the playfield.
    ///
    /// ```
    /// use tetris_sim_core::Board;
    /// use tetris_sim_core::types::BoardConfig;
    ///
    /// let board = Board::from_rows(BoardConfig::default(), &["XXXXXXXXX."]);
    /// assert!(board.is_blocked(0, 19));
    /// assert!(!board.is_blocked(9, 19));
    /// ```
    pub fn from_rows(config: BoardConfig, rows: &[&str]) -> Self {
        let mut board = Self::new(config);
        let bottom = config.visible_height as i8 - 1;
        for (i, row) in rows.iter().rev().enumerate() {
            let y = bottom - i as i8;
            for (x, ch) in row.chars().enumerate() {
                let cell = match ch {
                    '.' | ' ' => EMPTY_CELL,
                    other => crate::types::PieceKind::from_str(&other.to_string())
                        .map(|kind| kind.cell_value())
                        .unwrap_or(GARBAGE_CELL),
                };
                board.set(x as i8, y, cell);
            }
        }
        board
    }

    /// Calculate flat index from playfield coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        let row = y as i16 + self.vanish_rows as i16;
        if x < 0 || x as u8 >= self.width || row < 0 || row >= self.total_height() as i16 {
            return None;
        }
        Some(row as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn visible_height(&self) -> u8 {
        self.visible_height
    }

    pub fn vanish_rows(&self) -> u8 {
        self.vanish_rows
    }

    pub fn total_height(&self) -> u8 {
        self.visible_height + self.vanish_rows
    }

    /// Geometry of this board
    pub fn config(&self) -> BoardConfig {
        BoardConfig {
            width: self.width,
            visible_height: self.visible_height,
            vanish_rows: self.vanish_rows,
        }
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if a mino can not occupy (x, y)
    ///
    /// Out of horizontal bounds, below the floor, above the vanish zone and
    /// occupied cells are blocked. Empty vanish-zone cells are free.
    pub fn is_blocked(&self, x: i8, y: i8) -> bool {
        !matches!(self.get(x, y), Some(EMPTY_CELL))
    }

    /// Check if a visible row is completely filled
    pub fn is_row_full(&self, y: i8) -> bool {
        if !self.is_visible_row(y) {
            return false;
        }
        self.row(y).iter().all(|&cell| cell != EMPTY_CELL)
    }

    fn is_visible_row(&self, y: i8) -> bool {
        y >= 0 && (y as u8) < self.visible_height
    }

    /// Cells of one row (visible or vanish)
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the board.
    pub fn row(&self, y: i8) -> &[Cell] {
        let start = self
            .index(0, y)
            .unwrap_or_else(|| panic!("row {} outside board", y));
        &self.cells[start..start + self.width as usize]
    }

    /// Fully occupied visible rows, top to bottom
    pub fn completed_rows(&self) -> Vec<i8> {
        (0..self.visible_height as i8)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Return a copy of this board with `piece` written in
    ///
    /// Cells outside the board are dropped; callers only place pieces that fit.
    pub fn place(&self, piece: &ActivePiece) -> Board {
        let mut next = self.clone();
        let value = piece.kind.cell_value();
        for (x, y) in piece.cells() {
            let written = next.set(x, y, value);
            debug_assert!(written, "placed mino ({}, {}) outside board", x, y);
        }
        next
    }

    /// Return a copy of this board with the given visible rows removed
    ///
    /// Everything above a removed row shifts down by one per removed row,
    /// vanish zone included; empty rows enter at the top. Rows outside the
    /// visible playfield and duplicates are ignored.
    pub fn compact(&self, rows: &[i8]) -> Board {
        let width = self.width as usize;
        let total = self.total_height() as usize;
        let vanish = self.vanish_rows as i16;
        let mut next = vec![EMPTY_CELL; self.cells.len()];

        // Two-pointer copy from the bottom up, skipping removed rows.
        let mut write_row = total;
        for read_row in (0..total).rev() {
            let y = (read_row as i16 - vanish) as i8;
            if self.is_visible_row(y) && rows.contains(&y) {
                continue;
            }
            write_row -= 1;
            let src = read_row * width;
            let dst = write_row * width;
            next[dst..dst + width].copy_from_slice(&self.cells[src..src + width]);
        }

        Board {
            cells: next,
            ..*self
        }
    }

    /// Number of occupied cells, vanish zone included
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != EMPTY_CELL).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Height of the stack: visible rows from the highest occupied cell to the floor
    pub fn stack_height(&self) -> u8 {
        (-(self.vanish_rows as i8)..self.visible_height as i8)
            .find(|&y| self.row(y).iter().any(|&cell| cell != EMPTY_CELL))
            .map(|top| (self.visible_height as i8 - top) as u8)
            .unwrap_or(0)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Visible rows, top to bottom
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell]> {
        let skip = self.vanish_rows as usize;
        self.cells.chunks(self.width as usize).skip(skip)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceKind, Rotation};

    #[test]
    fn test_board_index_calculation() {
        let board = Board::standard();
        assert_eq!(board.index(0, -2), Some(0));
        assert_eq!(board.index(0, 0), Some(20));
        assert_eq!(board.index(9, 19), Some(219));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(10, 0), None);
        assert_eq!(board.index(0, 20), None);
        assert_eq!(board.index(0, -3), None);
    }

    #[test]
    fn grid_length_matches_geometry() {
        let board = Board::new(BoardConfig {
            width: 6,
            visible_height: 8,
            vanish_rows: 3,
        });
        assert_eq!(board.cells().len(), 6 * 11);
        assert_eq!(board.visible_rows().count(), 8);
    }

    #[test]
    fn vanish_zone_is_free_but_bounded() {
        let board = Board::standard();
        assert!(!board.is_blocked(0, -1));
        assert!(!board.is_blocked(9, -2));
        assert!(board.is_blocked(0, -3));
        assert!(board.is_blocked(0, 20));
        assert!(board.is_blocked(-1, 5));
    }

    #[test]
    fn place_does_not_alias_input() {
        let board = Board::standard();
        let piece = ActivePiece {
            kind: PieceKind::O,
            rotation: Rotation::North,
            x: 3,
            y: 18,
        };
        let placed = board.place(&piece);

        assert!(board.is_empty());
        assert_eq!(placed.cell_count(), 4);
        assert_eq!(placed.get(4, 18), Some(PieceKind::O.cell_value()));
    }

    #[test]
    fn compact_shifts_vanish_zone_content() {
        let mut board = Board::from_rows(BoardConfig::default(), &["XXXXXXXXXX"]);
        board.set(0, -1, 3);
        let compacted = board.compact(&[19]);

        assert_eq!(compacted.get(0, 0), Some(3));
        assert_eq!(compacted.get(0, -1), Some(EMPTY_CELL));
        assert_eq!(compacted.completed_rows(), Vec::<i8>::new());
    }

    #[test]
    fn compact_ignores_invisible_and_duplicate_rows() {
        let board = Board::from_rows(BoardConfig::default(), &["XXXXXXXXXX", "X........."]);
        let compacted = board.compact(&[19, 19, -1, 25]);

        assert_eq!(compacted.cell_count(), 10);
        assert!(compacted.is_row_full(19));
    }
}
