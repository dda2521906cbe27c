//! Active piece - the falling tetromino.
//!
//! An `ActivePiece` is a small `Copy` value. Every transform returns a new piece
//! instead of mutating in place, so comparing the previous and next value is a
//! reliable "did anything change" signal.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::pieces::{get_shape, try_rotate, PieceShape};
use crate::types::{PieceKind, RotateDirection, Rotation};

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Create a piece in spawn orientation at the board's spawn position
    ///
    /// Pieces spawn horizontally centred, with their top row in the vanish zone
    /// (up to two rows above the visible playfield).
    pub fn spawn(kind: PieceKind, board: &Board) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: ((board.width() as i8) - 4) / 2,
            y: -(board.vanish_rows().min(2) as i8),
        }
    }

    /// Get the shape (mino offsets) for current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board cells covered by this piece
    pub fn cells(&self) -> [(i8, i8); 4] {
        self.shape().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Distinct rows covered by this piece, top to bottom
    pub fn rows(&self) -> ArrayVec<i8, 4> {
        let mut rows: ArrayVec<i8, 4> = ArrayVec::new();
        for (_, y) in self.cells() {
            if !rows.contains(&y) {
                rows.push(y);
            }
        }
        rows.sort_unstable();
        rows
    }

    /// Check if every mino sits on a free cell
    pub fn fits(&self, board: &Board) -> bool {
        self.cells().iter().all(|&(x, y)| !board.is_blocked(x, y))
    }

    /// Check if the piece can not descend any further
    pub fn is_grounded(&self, board: &Board) -> bool {
        !self.shifted(0, 1).fits(board)
    }

    /// True if any mino is above the visible playfield
    pub fn is_above_playfield(&self) -> bool {
        self.cells().iter().any(|&(_, y)| y < 0)
    }

    /// The same piece translated by `(dx, dy)`, without a collision check
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Translate the piece if the target position is free
    pub fn try_shift(&self, board: &Board, dx: i8, dy: i8) -> Option<Self> {
        let moved = self.shifted(dx, dy);
        moved.fits(board).then_some(moved)
    }

    /// Rotate with SRS wall kicks
    pub fn try_rotate(&self, board: &Board, direction: RotateDirection) -> Option<Self> {
        try_rotate(
            self.kind,
            self.rotation,
            self.x,
            self.y,
            direction,
            |x, y| board.is_blocked(x, y),
        )
        .map(|(rotation, (dx, dy))| Self {
            rotation,
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        })
    }

    /// Resting position: repeated one-row descents until blocked
    pub fn dropped(&self, board: &Board) -> Self {
        let mut piece = *self;
        while let Some(lower) = piece.try_shift(board, 0, 1) {
            piece = lower;
        }
        piece
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_is_centred_in_vanish_zone() {
        let board = Board::standard();
        let piece = ActivePiece::spawn(PieceKind::T, &board);

        assert_eq!(piece.x, 3);
        assert_eq!(piece.y, -2);
        assert_eq!(piece.rotation, Rotation::North);
        assert!(piece.fits(&board));
        assert!(piece.is_above_playfield());
    }

    #[test]
    fn dropped_rests_on_floor() {
        let board = Board::standard();
        let piece = ActivePiece::spawn(PieceKind::I, &board).dropped(&board);

        // I North occupies offset row 1.
        assert_eq!(piece.y, 18);
        assert!(piece.is_grounded(&board));
        assert_eq!(piece.rows().as_slice(), &[19]);
    }

    #[test]
    fn try_shift_respects_walls() {
        let board = Board::standard();
        let mut piece = ActivePiece::spawn(PieceKind::O, &board);
        let mut moves = 0;
        while let Some(next) = piece.try_shift(&board, -1, 0) {
            piece = next;
            moves += 1;
        }
        // O minos sit at offsets 1..=2, spawn x=3 -> leftmost mino reaches column 0.
        assert_eq!(moves, 4);
        assert_eq!(piece.x, -1);
    }

    #[test]
    fn rows_are_sorted_and_distinct() {
        let board = Board::standard();
        let piece = ActivePiece {
            kind: PieceKind::T,
            rotation: Rotation::East,
            x: 4,
            y: 10,
        };
        assert!(piece.fits(&board));
        assert_eq!(piece.rows().as_slice(), &[10, 11, 12]);
    }
}
