//! Processed-input log of the current piece.
//!
//! Only inputs that actually changed the game are recorded. The log is handed
//! over with the commit event and cleared on spawn and retry, so finesse
//! grading sees exactly the inputs that shaped one placement.

use crate::types::{MoveDirection, RepeatKind, RotateDirection, Timestamp};

/// Kind of a processed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Move(MoveDirection, RepeatKind),
    Rotate(RotateDirection),
    SoftDrop(bool),
    HardDrop,
    Hold,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Move(..) => "move",
            InputKind::Rotate(_) => "rotate",
            InputKind::SoftDrop(_) => "softDrop",
            InputKind::HardDrop => "hardDrop",
            InputKind::Hold => "hold",
        }
    }
}

/// One processed input with the timestamp it was applied at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputRecord {
    pub kind: InputKind,
    pub at: Timestamp,
}

/// Number of DAS/ARR-free key presses in a log
///
/// Auto-repeats count as part of the press that started them.
pub fn key_presses(log: &[InputRecord]) -> usize {
    log.iter()
        .filter(|record| match record.kind {
            InputKind::Move(_, repeat) => repeat == RepeatKind::Tap,
            InputKind::SoftDrop(on) => on,
            InputKind::Rotate(_) | InputKind::HardDrop | InputKind::Hold => true,
        })
        .count()
}
