//! Placement planner.
//!
//! Turns "put the active piece at column x in rotation r" into the concrete
//! step sequence a player would press, validated on a scratch copy of the
//! snapshot. Advisor and bot clients use it instead of hand-building steps.

use tetris_sim_core::{GameState, StatusKind};
use tetris_sim_types::{MoveDirection, RepeatKind, RotateDirection, Rotation, Step, Timestamp};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    HoldUnavailable,
    RotationBlocked,
    XOutOfBounds,
    XBlocked,
    NotPlayable,
    NoActive,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold_unavailable",
            PlaceError::RotationBlocked
            | PlaceError::XOutOfBounds
            | PlaceError::XBlocked
            | PlaceError::NotPlayable
            | PlaceError::NoActive => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold requested when unavailable",
            PlaceError::RotationBlocked => "could not rotate to target rotation",
            PlaceError::XOutOfBounds => "target x would place piece out of bounds",
            PlaceError::XBlocked => "could not move to target x due to collision",
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoActive => "no active piece",
        }
    }
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for PlaceError {}

/// Candidate rotation sequences from `current` to `target`, shortest first
fn rotation_plans(current: Rotation, target: Rotation) -> Vec<Vec<RotateDirection>> {
    let cw = (target.index() as i8 - current.index() as i8).rem_euclid(4) as usize;
    let ccw = (4 - cw) % 4;
    match cw {
        0 => vec![Vec::new()],
        2 => vec![
            vec![RotateDirection::Half],
            vec![RotateDirection::Cw; 2],
            vec![RotateDirection::Ccw; 2],
        ],
        _ => {
            let mut plans = vec![vec![RotateDirection::Cw; cw], vec![RotateDirection::Ccw; ccw]];
            if ccw < cw {
                plans.swap(0, 1);
            }
            plans
        }
    }
}

/// Run `steps` on a scratch copy; `None` if any step fails to apply
fn try_steps(state: &GameState, steps: &[Step]) -> Option<GameState> {
    let mut scratch = state.clone();
    for step in steps {
        scratch = scratch.apply(step)?.state;
    }
    Some(scratch)
}

/// Plan the steps that place the active piece at `target_x` in `target_rot`
/// and hard-drop it at `now`
///
/// The returned steps are known to apply, in order, to `state`.
pub fn plan_place(
    state: &GameState,
    target_x: i8,
    target_rot: Rotation,
    use_hold: bool,
    now: Timestamp,
) -> Result<Vec<Step>, PlaceError> {
    if state.status_kind() != StatusKind::Playing {
        return Err(PlaceError::NotPlayable);
    }
    if state.active().is_none() {
        return Err(PlaceError::NoActive);
    }

    let mut steps = Vec::new();
    let mut scratch = state.clone();

    // Hold first if requested.
    if use_hold {
        scratch = scratch
            .apply(&Step::Hold)
            .ok_or(PlaceError::HoldUnavailable)?
            .state;
        steps.push(Step::Hold);
    }

    let Some(active) = scratch.active() else {
        return Err(PlaceError::NoActive);
    };

    let mut rotated = None;
    for plan in rotation_plans(active.rotation, target_rot) {
        let plan: Vec<Step> = plan.into_iter().map(Step::Rotate).collect();
        if let Some(next) = try_steps(&scratch, &plan) {
            rotated = Some((next, plan));
            break;
        }
    }
    let Some((next, plan)) = rotated else {
        return Err(PlaceError::RotationBlocked);
    };
    scratch = next;
    steps.extend(plan);

    let Some(active) = scratch.active() else {
        return Err(PlaceError::NoActive);
    };
    if active.rotation != target_rot {
        return Err(PlaceError::RotationBlocked);
    }

    // Validate x bounds based on current shape.
    let (min_dx, max_dx) = active
        .shape()
        .iter()
        .fold((i8::MAX, i8::MIN), |(lo, hi), &(dx, _)| (lo.min(dx), hi.max(dx)));
    let width = scratch.board().width() as i8;
    if target_x + min_dx < 0 || target_x + max_dx >= width {
        return Err(PlaceError::XOutOfBounds);
    }

    let direction = if target_x > active.x {
        MoveDirection::Right
    } else {
        MoveDirection::Left
    };
    for _ in 0..(target_x - active.x).unsigned_abs() {
        let step = Step::Move(direction, RepeatKind::Tap);
        scratch = scratch.apply(&step).ok_or(PlaceError::XBlocked)?.state;
        steps.push(step);
    }

    let drop = Step::HardDrop(now.max(scratch.now()));
    if scratch.apply(&drop).is_none() {
        return Err(PlaceError::NotPlayable);
    }
    steps.push(drop);
    Ok(steps)
}

/// Plan a placement and apply it to `session`
pub fn apply_place(
    session: &mut Session,
    target_x: i8,
    target_rot: Rotation,
    use_hold: bool,
    now: Timestamp,
) -> Result<(), PlaceError> {
    let steps = plan_place(session.state(), target_x, target_rot, use_hold, now)?;
    let planned = steps.len();
    let applied = session.apply_all(steps);
    debug_assert_eq!(applied, planned, "validated plan failed to apply");
    Ok(())
}
