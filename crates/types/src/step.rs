//! Step vocabulary - the only way callers drive the simulation.
//!
//! Steps are plain data. They carry timestamps where the step itself advances
//! simulated time; every other step is evaluated at the last observed timestamp.

use crate::{GameplayConfig, GameplayPatch, PieceKind, Timestamp, TimingConfig, TimingPatch};

/// Lateral movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    /// Column delta for one step in this direction
    pub fn dx(&self) -> i8 {
        match self {
            MoveDirection::Left => -1,
            MoveDirection::Right => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Left => "left",
            MoveDirection::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" | "l" => Some(MoveDirection::Left),
            "right" | "r" => Some(MoveDirection::Right),
            _ => None,
        }
    }
}

/// How the input layer produced a lateral move.
///
/// The simulation treats all kinds identically; the kind is recorded in the
/// processed-input log for finesse grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatKind {
    /// A fresh key press.
    Tap,
    /// The first auto-repeat after the delayed auto shift elapsed.
    Das,
    /// A subsequent auto-repeat.
    Arr,
}

impl RepeatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatKind::Tap => "tap",
            RepeatKind::Das => "das",
            RepeatKind::Arr => "arr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tap" => Some(RepeatKind::Tap),
            "das" => Some(RepeatKind::Das),
            "arr" => Some(RepeatKind::Arr),
            _ => None,
        }
    }
}

/// Rotation input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateDirection {
    Cw,
    Ccw,
    Half,
}

impl RotateDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotateDirection::Cw => "cw",
            RotateDirection::Ccw => "ccw",
            RotateDirection::Half => "180",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cw" => Some(RotateDirection::Cw),
            "ccw" => Some(RotateDirection::Ccw),
            "180" | "half" => Some(RotateDirection::Half),
            _ => None,
        }
    }
}

/// What triggered a pending lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockSource {
    HardDrop,
    SoftDrop,
    Gravity,
}

impl LockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockSource::HardDrop => "hardDrop",
            LockSource::SoftDrop => "softDrop",
            LockSource::Gravity => "gravity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "harddrop" => Some(LockSource::HardDrop),
            "softdrop" => Some(LockSource::SoftDrop),
            "gravity" => Some(LockSource::Gravity),
            _ => None,
        }
    }

    /// Stable index for per-source counters.
    pub fn index(&self) -> usize {
        match self {
            LockSource::HardDrop => 0,
            LockSource::SoftDrop => 1,
            LockSource::Gravity => 2,
        }
    }
}

/// One externally supplied step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Start a fresh game.
    Init {
        seed: u32,
        timing: TimingConfig,
        gameplay: GameplayConfig,
    },
    /// Periodic time advancement.
    Tick(Timestamp),
    /// Spawn the next queued piece, or a forced one.
    Spawn(Option<PieceKind>),
    Move(MoveDirection, RepeatKind),
    Rotate(RotateDirection),
    HardDrop(Timestamp),
    /// Soft drop key pressed (`true`) or released (`false`).
    SoftDrop(bool),
    Hold,
    /// Explicit, non-gravity lock trigger for a grounded piece.
    Lock(Timestamp),
    CommitLock,
    RetryPendingLock(Timestamp),
    StartLineClear(Vec<i8>, Timestamp),
    CompleteLineClear,
    /// Direct board edit used by garbage-injection features.
    ClearLines(Vec<i8>),
    UpdateTiming(TimingPatch),
    UpdateGameplay(GameplayPatch),
}

impl Step {
    /// Timestamp carried by the step, if it advances simulated time.
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Step::Tick(now)
            | Step::HardDrop(now)
            | Step::Lock(now)
            | Step::RetryPendingLock(now)
            | Step::StartLineClear(_, now) => Some(*now),
            _ => None,
        }
    }

    /// Player-initiated transforms whose displacement counts as lock-delay movement.
    pub fn is_player_transform(&self) -> bool {
        matches!(self, Step::Move(..) | Step::Rotate(_) | Step::SoftDrop(true))
    }

    /// camelCase name used by logs and the wire protocol.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Init { .. } => "init",
            Step::Tick(_) => "tick",
            Step::Spawn(_) => "spawn",
            Step::Move(..) => "move",
            Step::Rotate(_) => "rotate",
            Step::HardDrop(_) => "hardDrop",
            Step::SoftDrop(_) => "softDrop",
            Step::Hold => "hold",
            Step::Lock(_) => "lock",
            Step::CommitLock => "commitLock",
            Step::RetryPendingLock(_) => "retryPendingLock",
            Step::StartLineClear(..) => "startLineClear",
            Step::CompleteLineClear => "completeLineClear",
            Step::ClearLines(_) => "clearLines",
            Step::UpdateTiming(_) => "updateTiming",
            Step::UpdateGameplay(_) => "updateGameplay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timed_steps_carry_timestamps() {
        assert_eq!(Step::Tick(10).timestamp(), Some(10));
        assert_eq!(Step::HardDrop(20).timestamp(), Some(20));
        assert_eq!(Step::StartLineClear(vec![19], 30).timestamp(), Some(30));
        assert_eq!(Step::Hold.timestamp(), None);
        assert_eq!(
            Step::Move(MoveDirection::Left, RepeatKind::Tap).timestamp(),
            None
        );
    }

    #[test]
    fn player_transforms() {
        assert!(Step::Move(MoveDirection::Right, RepeatKind::Arr).is_player_transform());
        assert!(Step::Rotate(RotateDirection::Ccw).is_player_transform());
        assert!(Step::SoftDrop(true).is_player_transform());
        assert!(!Step::SoftDrop(false).is_player_transform());
        assert!(!Step::Tick(5).is_player_transform());
        assert!(!Step::Hold.is_player_transform());
    }

    #[test]
    fn lock_source_parses_case_insensitively() {
        assert_eq!(LockSource::from_str("hardDrop"), Some(LockSource::HardDrop));
        assert_eq!(LockSource::from_str("GRAVITY"), Some(LockSource::Gravity));
        assert_eq!(LockSource::from_str("nope"), None);
    }
}
