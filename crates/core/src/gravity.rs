//! Gravity stepper.
//!
//! Pulls the falling piece down one row per gravity interval. While soft drop is
//! held the interval is divided by the configured multiplier; an infinite soft
//! drop teleports the piece to its resting row instead. Gravity never locks:
//! a blocked descent only leaves the piece grounded for the lock-delay machine.

use crate::board::Board;
use crate::piece::ActivePiece;
use crate::types::{SoftDropSpeed, Timestamp, TimingConfig};

/// Result of one gravity evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityStep {
    pub piece: ActivePiece,
    /// Timestamp of the last applied descent.
    pub gravity_at: Timestamp,
    /// Number of rows the piece moved down.
    pub rows: u8,
}

/// Effective gravity interval in milliseconds, or `None` for an instant drop
pub fn effective_interval_ms(timing: &TimingConfig, soft_dropping: bool) -> Option<u32> {
    if !soft_dropping {
        return Some(timing.gravity_ms.max(1));
    }
    match timing.soft_drop_speed {
        SoftDropSpeed::Infinite => None,
        SoftDropSpeed::Multiplier(multiplier) => {
            Some((timing.gravity_ms / multiplier.max(1)).max(1))
        }
    }
}

/// Evaluate gravity for the falling piece at `now`
///
/// The caller checks that gravity is enabled and a piece is falling.
pub fn advance(
    board: &Board,
    piece: ActivePiece,
    gravity_at: Timestamp,
    now: Timestamp,
    timing: &TimingConfig,
    soft_dropping: bool,
) -> GravityStep {
    let Some(interval) = effective_interval_ms(timing, soft_dropping) else {
        let dropped = piece.dropped(board);
        let rows = (dropped.y - piece.y) as u8;
        return GravityStep {
            piece: dropped,
            gravity_at: if rows > 0 { now } else { gravity_at },
            rows,
        };
    };

    if now.saturating_sub(gravity_at) < interval as u64 {
        return GravityStep {
            piece,
            gravity_at,
            rows: 0,
        };
    }

    match piece.try_shift(board, 0, 1) {
        Some(lower) => {
            log::trace!("gravity: {:?} down to row {}", lower.kind, lower.y);
            GravityStep {
                piece: lower,
                gravity_at: now,
                rows: 1,
            }
        }
        None => GravityStep {
            piece,
            gravity_at,
            rows: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn timing(speed: SoftDropSpeed) -> TimingConfig {
        TimingConfig {
            gravity_ms: 1000,
            soft_drop_speed: speed,
            ..TimingConfig::default()
        }
    }

    #[test]
    fn interval_divides_by_multiplier() {
        let t = timing(SoftDropSpeed::Multiplier(20));
        assert_eq!(effective_interval_ms(&t, false), Some(1000));
        assert_eq!(effective_interval_ms(&t, true), Some(50));

        let fast = timing(SoftDropSpeed::Multiplier(5000));
        assert_eq!(effective_interval_ms(&fast, true), Some(1));
        assert_eq!(
            effective_interval_ms(&timing(SoftDropSpeed::Infinite), true),
            None
        );
    }

    #[test]
    fn waits_for_full_interval() {
        let board = Board::standard();
        let piece = ActivePiece::spawn(PieceKind::T, &board);
        let t = timing(SoftDropSpeed::Multiplier(20));

        let early = advance(&board, piece, 0, 999, &t, false);
        assert_eq!(early.piece, piece);
        assert_eq!(early.gravity_at, 0);

        let due = advance(&board, piece, 0, 1000, &t, false);
        assert_eq!(due.piece.y, piece.y + 1);
        assert_eq!(due.gravity_at, 1000);
        assert_eq!(due.rows, 1);
    }

    #[test]
    fn one_row_per_evaluation() {
        let board = Board::standard();
        let piece = ActivePiece::spawn(PieceKind::T, &board);
        let t = timing(SoftDropSpeed::Multiplier(20));

        let late = advance(&board, piece, 0, 10_000, &t, false);
        assert_eq!(late.rows, 1);
    }

    #[test]
    fn blocked_descent_keeps_timestamp() {
        let board = Board::standard();
        let piece = ActivePiece::spawn(PieceKind::T, &board).dropped(&board);
        let t = timing(SoftDropSpeed::Multiplier(20));

        let step = advance(&board, piece, 100, 5000, &t, false);
        assert_eq!(step.piece, piece);
        assert_eq!(step.gravity_at, 100);
        assert_eq!(step.rows, 0);
    }

    #[test]
    fn infinite_soft_drop_teleports_without_waiting() {
        let board = Board::standard();
        let piece = ActivePiece::spawn(PieceKind::I, &board);
        let t = timing(SoftDropSpeed::Infinite);

        let step = advance(&board, piece, 0, 1, &t, true);
        assert_eq!(step.piece, piece.dropped(&board));
        assert_eq!(step.gravity_at, 1);
        assert_eq!(step.rows, 20);
    }
}
