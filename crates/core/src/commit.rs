//! Lock-commit pipeline.
//!
//! Second phase of the two-phase lock: writes a pending lock into the board and
//! decides where the game goes next. The prediction stored in the pending lock
//! is checked against the real board; the real board wins.

use crate::board::Board;
use crate::pending_lock::PendingLock;
use crate::types::TimingConfig;

/// Status that follows a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitNext {
    /// Back to play without a falling piece.
    Playing,
    /// Rows are shown clearing; compaction is deferred.
    LineClear(Vec<i8>),
    /// The piece locked with a cell above the playfield.
    LockOut,
}

/// Board and follow-up status of a committed lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub board: Board,
    /// Completed rows found on the placed board, top to bottom.
    pub lines: Vec<i8>,
    pub next: CommitNext,
}

/// Apply `pending` to `board`
///
/// Lock-out wins over everything: the board keeps the placed piece and its
/// completed rows uncompacted. A zero line-clear delay compacts immediately.
pub fn commit(board: &Board, pending: &PendingLock, timing: &TimingConfig) -> CommitOutcome {
    let placed = board.place(&pending.final_position);
    let lines = placed.completed_rows();
    if lines != pending.completed_lines {
        log::warn!(
            "commit of {:?}: predicted lines {:?}, board has {:?}",
            pending.piece,
            pending.completed_lines,
            lines
        );
    }

    if pending.locks_out() {
        return CommitOutcome {
            board: placed,
            lines,
            next: CommitNext::LockOut,
        };
    }
    if lines.is_empty() {
        return CommitOutcome {
            board: placed,
            lines,
            next: CommitNext::Playing,
        };
    }
    if timing.line_clear_delay_ms == 0 {
        return CommitOutcome {
            board: placed.compact(&lines),
            lines,
            next: CommitNext::Playing,
        };
    }
    CommitOutcome {
        board: placed,
        next: CommitNext::LineClear(lines.clone()),
        lines,
    }
}
