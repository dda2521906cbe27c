//! Pending-lock builder.
//!
//! A pending lock is the outcome of a lock computed against the board without
//! mutating it. Hard drops and lock-delay timeouts both go through [`build`] so
//! they share the same line detection.

use crate::board::Board;
use crate::lock_delay::LockDelayState;
use crate::piece::ActivePiece;
use crate::types::{LockSource, PieceKind, Timestamp};

/// A computed but uncommitted lock
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingLock {
    pub piece: PieceKind,
    /// Where the piece will be written.
    pub final_position: ActivePiece,
    /// Visible rows the placement completes, top to bottom.
    pub completed_lines: Vec<i8>,
    pub source: LockSource,
    pub timestamp: Timestamp,
    /// Lock timer at the moment the lock was triggered.
    pub lock_delay: LockDelayState,
}

impl PendingLock {
    /// Whether committing this lock ends the game.
    pub fn locks_out(&self) -> bool {
        self.final_position.is_above_playfield()
    }
}

/// Compute the lock outcome for `piece` on `board`
///
/// Hard drops first fall to the resting row; every other source locks in place.
/// The lock timer is recorded as `Airborne`; callers locking out of a grounded
/// dwell overwrite it.
pub fn build(board: &Board, piece: &ActivePiece, source: LockSource, now: Timestamp) -> PendingLock {
    let final_position = match source {
        LockSource::HardDrop => piece.dropped(board),
        LockSource::SoftDrop | LockSource::Gravity => *piece,
    };

    let placed = board.place(&final_position);
    let completed_lines = final_position
        .rows()
        .into_iter()
        .filter(|&y| placed.is_row_full(y))
        .collect();

    PendingLock {
        piece: piece.kind,
        final_position,
        completed_lines,
        source,
        timestamp: now,
        lock_delay: LockDelayState::Airborne,
    }
}
