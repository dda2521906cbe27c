//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the piece lifecycle and lock-timing rules. It has
//! **zero dependencies** on rendering, input devices or I/O:
//!
//! - **Deterministic**: same seed and same steps produce identical snapshots
//! - **Immutable**: every step maps one snapshot to a new one
//! - **Headless**: the caller supplies all timestamps; nothing reads a clock
//!
//! # Module Structure
//!
//! - [`board`]: playfield grid with vanish zone, placement and compaction
//! - [`pieces`]: tetromino shapes and SRS rotation with wall kicks
//! - [`piece`]: the active piece value and its transforms
//! - [`lock_delay`]: grounded timer with a bounded reset budget
//! - [`pending_lock`]: tentative lock outcome, computed without touching the board
//! - [`gravity`]: timed descent and soft drop speeds
//! - [`commit`]: second phase of a lock, board mutation and next status
//! - [`game_state`]: the status state machine and step handlers
//! - [`rng`]: seeded 7-bag piece supply
//! - [`stats`], [`input_log`], [`events`], [`snapshot`]: read-only exports
//!
//! # Lock lifecycle
//!
//! A piece that can no longer descend is *grounded*. After the lock delay has
//! elapsed (measured from landing, or from the last of at most
//! `lock_delay_max_resets` movement restarts) the piece becomes a
//! [`PendingLock`]. A `CommitLock` step writes it into the board; a
//! `RetryPendingLock` step discards it and respawns the same piece.
//!
//! # Example
//!
//! ```
//! use tetris_sim_core::GameState;
//! use tetris_sim_core::types::{PieceKind, Step};
//!
//! let game = GameState::with_defaults(12345);
//! let game = game.apply(&Step::Spawn(Some(PieceKind::O))).unwrap().state;
//! let game = game.apply(&Step::HardDrop(1000)).unwrap().state;
//! assert!(game.pending_lock().is_some());
//!
//! let game = game.apply(&Step::CommitLock).unwrap().state;
//! assert_eq!(game.board().cell_count(), 4);
//! assert!(game.apply(&Step::CommitLock).is_none());
//! ```

pub mod board;
pub mod commit;
pub mod events;
pub mod game_state;
pub mod gravity;
pub mod input_log;
pub mod lock_delay;
pub mod pending_lock;
pub mod piece;
pub mod pieces;
pub mod rng;
pub mod snapshot;
pub mod stats;

pub use tetris_sim_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use events::{GameEvent, LockEvent};
pub use game_state::{Falling, GameState, Status, StatusKind, Transition};
pub use input_log::{InputKind, InputRecord};
pub use lock_delay::{LockDelayLimits, LockDelayState};
pub use pending_lock::PendingLock;
pub use piece::ActivePiece;
pub use pieces::{get_shape, try_rotate};
pub use rng::{SevenBag, SimpleRng};
pub use snapshot::{ActiveSnapshot, GameSnapshot, LockDelayView};
pub use stats::{ClearKind, Statistics, StatsDelta};
