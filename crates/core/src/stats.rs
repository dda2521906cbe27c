//! Session statistics.
//!
//! Counters are only touched by commits, retries, holds and clock updates.
//! Every commit also produces a [`StatsDelta`] so persistence layers can
//! accumulate totals without reading the whole snapshot.

use crate::lock_delay::LockDelayState;
use crate::pending_lock::PendingLock;
use crate::types::{LockSource, Timestamp};

/// Line-clear size categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearKind {
    Single,
    Double,
    Triple,
    Tetris,
}

impl ClearKind {
    /// Category for a clear of `lines` rows; `None` for zero lines
    ///
    /// Clears of more than four rows (possible with garbage edits) count as
    /// tetrises.
    pub fn from_lines(lines: usize) -> Option<Self> {
        match lines {
            0 => None,
            1 => Some(ClearKind::Single),
            2 => Some(ClearKind::Double),
            3 => Some(ClearKind::Triple),
            _ => Some(ClearKind::Tetris),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ClearKind::Single => 0,
            ClearKind::Double => 1,
            ClearKind::Triple => 2,
            ClearKind::Tetris => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClearKind::Single => "single",
            ClearKind::Double => "double",
            ClearKind::Triple => "triple",
            ClearKind::Tetris => "tetris",
        }
    }
}

/// What one commit added to the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatsDelta {
    pub pieces_placed: u32,
    pub lines_cleared: u32,
    pub clear_kind: Option<ClearKind>,
    pub source: Option<LockSource>,
    /// Grounded dwell of a lock-delay timeout, zero for hard drops.
    pub lock_dwell_ms: u64,
    /// Lock-delay restarts spent by the piece.
    pub lock_resets: u32,
}

/// Running counters for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Statistics {
    pub pieces_placed: u32,
    pub lines_cleared: u32,
    /// Indexed by [`ClearKind::index`].
    pub clears: [u32; 4],
    /// Indexed by [`LockSource::index`].
    pub locks_by_source: [u32; 3],
    pub holds: u32,
    pub retries: u32,
    /// Timestamp of the first timed step, if any.
    pub session_started_at: Option<Timestamp>,
    pub session_ms: u64,
    /// Locks that went through the lock-delay timer.
    pub timed_locks: u32,
    /// Sum of grounded dwell over timed locks.
    pub total_lock_dwell_ms: u64,
    /// Sum of lock-delay restarts over all committed pieces.
    pub total_lock_resets: u32,
}

impl Statistics {
    /// Count a committed lock with the lines actually cleared
    pub fn record_commit(&mut self, pending: &PendingLock, lines: usize) -> StatsDelta {
        let clear_kind = ClearKind::from_lines(lines);
        let (lock_dwell_ms, lock_resets) = match pending.lock_delay {
            LockDelayState::Grounded { start, resets } if pending.source != LockSource::HardDrop => {
                (pending.timestamp.saturating_sub(start), resets)
            }
            other => (0, other.resets()),
        };

        self.pieces_placed += 1;
        self.lines_cleared += lines as u32;
        if let Some(kind) = clear_kind {
            self.clears[kind.index()] += 1;
        }
        self.locks_by_source[pending.source.index()] += 1;
        if pending.source != LockSource::HardDrop && pending.lock_delay.is_grounded() {
            self.timed_locks += 1;
            self.total_lock_dwell_ms += lock_dwell_ms;
        }
        self.total_lock_resets += lock_resets;

        StatsDelta {
            pieces_placed: 1,
            lines_cleared: lines as u32,
            clear_kind,
            source: Some(pending.source),
            lock_dwell_ms,
            lock_resets,
        }
    }

    /// Update session bookkeeping for a timed step at `now`
    pub fn observe_time(&mut self, now: Timestamp) {
        let started = *self.session_started_at.get_or_insert(now);
        self.session_ms = now.saturating_sub(started);
    }

    pub fn clear_count(&self, kind: ClearKind) -> u32 {
        self.clears[kind.index()]
    }

    pub fn lock_count(&self, source: LockSource) -> u32 {
        self.locks_by_source[source.index()]
    }

    /// Mean grounded dwell over timed locks
    pub fn average_lock_dwell_ms(&self) -> Option<u64> {
        (self.timed_locks > 0).then(|| self.total_lock_dwell_ms / self.timed_locks as u64)
    }

    /// Placements per second over the session so far
    pub fn pieces_per_second(&self) -> f64 {
        if self.session_ms == 0 {
            return 0.0;
        }
        self.pieces_placed as f64 * 1000.0 / self.session_ms as f64
    }
}
