//! Lock-delay machine.
//!
//! A grounded piece gets `delay_ms` of dwell before it is forced to lock.
//! Player movement while grounded restarts the dwell, at most `max_resets`
//! times. Once the budget is spent movement is ignored and the piece locks
//! when the original dwell runs out; there is no immediate lock at the cap.
//!
//! [`step`] is pure. The game state calls it exactly once per applied step.

use crate::types::Timestamp;

/// Lock timer state of the falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockDelayState {
    /// No timer running.
    #[default]
    Airborne,
    /// Resting on the stack since `start`, after `resets` restarts.
    Grounded { start: Timestamp, resets: u32 },
}

impl LockDelayState {
    pub fn is_grounded(&self) -> bool {
        matches!(self, LockDelayState::Grounded { .. })
    }

    /// Time spent grounded since the last (re)start
    pub fn dwell_ms(&self, now: Timestamp) -> u64 {
        match *self {
            LockDelayState::Airborne => 0,
            LockDelayState::Grounded { start, .. } => now.saturating_sub(start),
        }
    }

    pub fn resets(&self) -> u32 {
        match *self {
            LockDelayState::Airborne => 0,
            LockDelayState::Grounded { resets, .. } => resets,
        }
    }
}

/// Lock delay limits, taken from the timing config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockDelayLimits {
    pub delay_ms: u32,
    pub max_resets: u32,
}

/// Advance the lock timer by one game step
///
/// Returns the next state and whether the piece must lock now.
///
/// ```
/// use tetris_sim_core::lock_delay::{step, LockDelayLimits, LockDelayState};
///
/// let limits = LockDelayLimits { delay_ms: 500, max_resets: 15 };
/// let (grounded, lock) = step(LockDelayState::Airborne, true, false, 1000, limits);
/// assert!(!lock);
/// assert_eq!(step(grounded, true, false, 1499, limits).1, false);
/// assert_eq!(step(grounded, true, false, 1500, limits).1, true);
/// ```
pub fn step(
    state: LockDelayState,
    grounded: bool,
    moved_while_grounded: bool,
    now: Timestamp,
    limits: LockDelayLimits,
) -> (LockDelayState, bool) {
    if !grounded {
        return (LockDelayState::Airborne, false);
    }

    match state {
        LockDelayState::Airborne => (LockDelayState::Grounded { start: now, resets: 0 }, false),
        LockDelayState::Grounded { start, resets } => {
            if moved_while_grounded && resets < limits.max_resets {
                return (
                    LockDelayState::Grounded {
                        start: now,
                        resets: resets + 1,
                    },
                    false,
                );
            }
            let expired = now.saturating_sub(start) >= limits.delay_ms as u64;
            (LockDelayState::Grounded { start, resets }, expired)
        }
    }
}
