//! Replay and invariant tests - generated step streams

use std::sync::Arc;

use proptest::prelude::*;
use tetris_sim::core::{GameState, StatusKind};
use tetris_sim::engine::{replay, verify, Session};
use tetris_sim::types::{
    GameplayPatch, MoveDirection, PieceKind, RepeatKind, RotateDirection, Step, TimingPatch,
};

fn piece_kind() -> impl Strategy<Value = PieceKind> {
    prop::sample::select(PieceKind::ALL.to_vec())
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0u64..20_000).prop_map(Step::Tick),
        3 => prop::option::of(piece_kind()).prop_map(Step::Spawn),
        4 => (
            prop::sample::select(vec![MoveDirection::Left, MoveDirection::Right]),
            prop::sample::select(vec![RepeatKind::Tap, RepeatKind::Das, RepeatKind::Arr]),
        )
            .prop_map(|(direction, repeat)| Step::Move(direction, repeat)),
        3 => prop::sample::select(vec![
            RotateDirection::Cw,
            RotateDirection::Ccw,
            RotateDirection::Half,
        ])
        .prop_map(Step::Rotate),
        2 => (0u64..20_000).prop_map(Step::HardDrop),
        2 => any::<bool>().prop_map(Step::SoftDrop),
        1 => Just(Step::Hold),
        1 => (0u64..20_000).prop_map(Step::Lock),
        3 => Just(Step::CommitLock),
        1 => (0u64..20_000).prop_map(Step::RetryPendingLock),
        1 => Just(Step::CompleteLineClear),
        1 => prop::collection::vec(-3i8..22, 0..3).prop_map(Step::ClearLines),
        1 => (0u32..1000).prop_map(|ms| Step::UpdateTiming(TimingPatch {
            lock_delay_ms: Some(ms),
            ..TimingPatch::default()
        })),
        1 => (0usize..9).prop_map(|count| Step::UpdateGameplay(GameplayPatch {
            preview_count: Some(count),
            ..GameplayPatch::default()
        })),
    ]
}

fn check_invariants(state: &GameState) -> Result<(), TestCaseError> {
    if let Some(active) = state.active() {
        prop_assert!(active.fits(state.board()), "active piece overlaps the board");
        let ghost = state.ghost().unwrap();
        prop_assert!(ghost.y >= active.y);
        prop_assert!(ghost.is_grounded(state.board()));
    }
    if state.status_kind() != StatusKind::Playing {
        prop_assert!(state.active().is_none());
    }
    if !state.lock_delay_view().grounded {
        prop_assert_eq!(state.lock_delay_view().dwell_ms, 0);
    }
    prop_assert!(state.lock_delay_view().resets <= state.timing().lock_delay_max_resets);
    prop_assert_eq!(state.next_queue().len(), state.gameplay().preview_count);
    // Completed rows only survive inside a line clear or after a lock out.
    if matches!(state.status_kind(), StatusKind::Playing | StatusKind::ResolvingLock) {
        prop_assert!(state.board().completed_rows().is_empty());
    }
    Ok(())
}

proptest! {
    #[test]
    fn replay_is_deterministic(
        seed in 1u32..10_000,
        steps in prop::collection::vec(step(), 1..120),
    ) {
        let initial = GameState::with_defaults(seed);
        let a = replay(&initial, &steps);
        let b = replay(&initial, &steps);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.applied + a.skipped.len(), steps.len());
    }

    #[test]
    fn applied_steps_keep_invariants(
        seed in 1u32..10_000,
        steps in prop::collection::vec(step(), 1..120),
    ) {
        let mut state = GameState::with_defaults(seed);
        check_invariants(&state)?;
        for step in &steps {
            let before_now = state.now();
            if let Some(transition) = state.apply(step) {
                prop_assert_ne!(&transition.state, &state, "{} reported a change", step.name());
                prop_assert!(transition.state.now() >= before_now);
                state = transition.state;
                check_invariants(&state)?;
            }
        }
    }

    #[test]
    fn rejected_steps_leave_session_untouched(
        seed in 1u32..10_000,
        steps in prop::collection::vec(step(), 1..80),
    ) {
        let mut session = Session::with_seed(seed);
        for step in steps {
            let before = Arc::clone(session.state());
            let applied = session.apply(step);
            prop_assert_eq!(applied, !Arc::ptr_eq(&before, session.state()));
        }
        prop_assert!(verify(&session));
    }
}

#[test]
fn replay_skips_inapplicable_steps() {
    let initial = GameState::with_defaults(5);
    let steps = [
        Step::CommitLock,
        Step::Spawn(Some(PieceKind::Z)),
        Step::Tick(500),
        Step::Tick(400),
        Step::HardDrop(600),
        Step::CommitLock,
    ];
    let result = replay(&initial, &steps);

    assert_eq!(result.skipped, vec![0, 3]);
    assert_eq!(result.applied, 4);
    assert_eq!(result.state.stats().pieces_placed, 1);
    assert_eq!(result.state.board().cell_count(), 4);
}
