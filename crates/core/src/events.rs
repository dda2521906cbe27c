//! Events emitted by applied steps.
//!
//! Events describe what a transition did. They are returned alongside the new
//! snapshot and carry owned data, so observers never hold references into
//! game state.

use crate::input_log::InputRecord;
use crate::piece::ActivePiece;
use crate::stats::StatsDelta;
use crate::types::{LockSource, PieceKind, Timestamp, TopOutCause};

/// A committed lock, as seen by finesse graders and statistics stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEvent {
    pub piece: PieceKind,
    /// Spawn counter of the committed piece.
    pub piece_index: u32,
    pub final_position: ActivePiece,
    pub source: LockSource,
    /// Rows cleared by this lock, top to bottom.
    pub lines: Vec<i8>,
    pub top_out: bool,
    pub timestamp: Timestamp,
    /// Processed inputs of the piece, in order.
    pub inputs: Vec<InputRecord>,
    pub stats: StatsDelta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Spawned {
        piece: PieceKind,
        piece_index: u32,
    },
    Held {
        held: PieceKind,
        active: PieceKind,
    },
    LockPending {
        piece: PieceKind,
        source: LockSource,
        lines: Vec<i8>,
    },
    Committed(LockEvent),
    LineClearStarted {
        rows: Vec<i8>,
    },
    LineClearCompleted {
        rows: Vec<i8>,
    },
    /// Rows removed by a direct board edit.
    LinesRemoved {
        rows: Vec<i8>,
    },
    Retried {
        piece: PieceKind,
    },
    ToppedOut(TopOutCause),
}

impl GameEvent {
    /// camelCase event name
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Spawned { .. } => "spawned",
            GameEvent::Held { .. } => "held",
            GameEvent::LockPending { .. } => "lockPending",
            GameEvent::Committed(_) => "committed",
            GameEvent::LineClearStarted { .. } => "lineClearStarted",
            GameEvent::LineClearCompleted { .. } => "lineClearCompleted",
            GameEvent::LinesRemoved { .. } => "linesRemoved",
            GameEvent::Retried { .. } => "retried",
            GameEvent::ToppedOut(_) => "toppedOut",
        }
    }
}
