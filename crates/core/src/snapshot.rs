//! Flattened read-only export of a game state.
//!
//! A `GameSnapshot` owns copies of everything a renderer or observer needs and
//! nothing it could use to mutate the game.

use crate::lock_delay::LockDelayState;
use crate::piece::ActivePiece;
use crate::stats::Statistics;
use crate::types::{Cell, LockSource, PieceKind, Rotation, Timestamp, TopOutCause};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

/// Lock timer as shown to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LockDelayView {
    pub grounded: bool,
    /// Grounded dwell since the last (re)start.
    pub dwell_ms: u64,
    pub resets: u32,
    pub max_resets: u32,
    pub delay_ms: u32,
}

impl LockDelayView {
    pub fn new(state: LockDelayState, now: Timestamp, delay_ms: u32, max_resets: u32) -> Self {
        Self {
            grounded: state.is_grounded(),
            dwell_ms: state.dwell_ms(now),
            resets: state.resets(),
            max_resets,
            delay_ms,
        }
    }

    /// Fraction of the lock delay already spent, clamped to `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if !self.grounded {
            return 0.0;
        }
        if self.delay_ms == 0 {
            return 1.0;
        }
        (self.dwell_ms as f32 / self.delay_ms as f32).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingSnapshot {
    pub piece: PieceKind,
    pub final_position: ActiveSnapshot,
    pub completed_lines: Vec<i8>,
    pub source: LockSource,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub width: u8,
    pub visible_height: u8,
    pub vanish_rows: u8,
    /// Row-major cells, vanish zone first.
    pub board: Vec<Cell>,
    /// camelCase status tag.
    pub status: &'static str,
    pub top_out: Option<TopOutCause>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub lock_delay: LockDelayView,
    pub pending: Option<PendingSnapshot>,
    /// Rows being animated away while in line clear.
    pub clearing_rows: Vec<i8>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub next_queue: Vec<PieceKind>,
    pub soft_dropping: bool,
    pub seed: u32,
    pub piece_index: u32,
    pub now: Timestamp,
    pub stats: Statistics,
}

impl GameSnapshot {
    /// Cell at playfield coordinates, `None` outside the board
    pub fn cell(&self, x: i8, y: i8) -> Option<Cell> {
        let row = y as i16 + self.vanish_rows as i16;
        let total = self.visible_height as i16 + self.vanish_rows as i16;
        if x < 0 || x as u8 >= self.width || row < 0 || row >= total {
            return None;
        }
        self.board
            .get(row as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn playable(&self) -> bool {
        self.top_out.is_none()
    }
}
