//! Deterministic replay.
//!
//! Snapshots hold no clocks and no shared references, so feeding the same
//! steps to the same starting snapshot always yields the same result.

use tetris_sim_core::{GameEvent, GameState};
use tetris_sim_types::Step;

use crate::session::Session;

/// Result of replaying a step list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub state: GameState,
    pub applied: usize,
    /// Indices of steps that did not apply.
    pub skipped: Vec<usize>,
    pub events: Vec<GameEvent>,
}

/// Apply `steps` to `initial` in order
pub fn replay<'a>(initial: &GameState, steps: impl IntoIterator<Item = &'a Step>) -> Replay {
    let mut state = initial.clone();
    let mut applied = 0;
    let mut skipped = Vec::new();
    let mut events = Vec::new();

    for (index, step) in steps.into_iter().enumerate() {
        match state.apply(step) {
            Some(transition) => {
                state = transition.state;
                events.extend(transition.events);
                applied += 1;
            }
            None => skipped.push(index),
        }
    }

    log::debug!("replayed {} steps, {} skipped", applied, skipped.len());
    Replay {
        state,
        applied,
        skipped,
        events,
    }
}

/// Check that a session's step log reproduces its current snapshot
pub fn verify(session: &Session) -> bool {
    let replayed = replay(session.initial(), session.applied_steps());
    replayed.skipped.is_empty() && replayed.state == **session.state()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetris_sim_types::{MoveDirection, PieceKind, RepeatKind, RotateDirection};

    fn script() -> Vec<Step> {
        vec![
            Step::Spawn(Some(PieceKind::T)),
            Step::Move(MoveDirection::Left, RepeatKind::Tap),
            Step::Rotate(RotateDirection::Cw),
            Step::Tick(1000),
            Step::CommitLock,
            Step::HardDrop(1200),
            Step::CommitLock,
            Step::Spawn(Some(PieceKind::I)),
            Step::Tick(1500),
        ]
    }

    #[test]
    fn same_steps_same_state() {
        let initial = GameState::with_defaults(42);
        let a = replay(&initial, &script());
        let b = replay(&initial, &script());
        assert_eq!(a, b);
        assert_eq!(a.skipped, vec![4]);
    }

    #[test]
    fn session_log_verifies() {
        let mut session = Session::with_seed(42);
        session.apply_all(script());
        assert!(verify(&session));

        session.undo();
        assert!(verify(&session));
    }
}
