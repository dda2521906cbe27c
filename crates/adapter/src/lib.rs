//! Adapter module - JSON wire form for steps, observations and replay files
//!
//! External collaborators (bots, recorders, test harnesses) talk to the engine
//! through **line-delimited JSON**: one step per line in, one observation per
//! line out.
//!
//! # Message Types
//!
//! - **step**: one of the engine steps, tagged by `type` (`tick`, `spawn`,
//!   `move`, `rotate`, `hardDrop`, `softDrop`, `hold`, `lock`, `commitLock`,
//!   `retryPendingLock`, `startLineClear`, `completeLineClear`, `clearLines`,
//!   `updateTiming`, `updateGameplay`, `init`)
//! - **observation**: flattened snapshot (board rows, active piece, ghost row,
//!   lock timer, pending lock, hold, preview queue, statistics)
//! - **replay file**: `{"version":1,"seed":..,"steps":[..]}`
//!
//! # Example
//!
//! ```
//! use tetris_sim_adapter::{encode_step, parse_step, Observation};
//! use tetris_sim_core::GameState;
//! use tetris_sim_types::Step;
//!
//! let step = parse_step(r#"{"type":"spawn","piece":"T"}"#).unwrap();
//! let state = GameState::with_defaults(1).apply(&step).unwrap().state;
//!
//! let observation = Observation::from_state(&state);
//! assert_eq!(observation.status, "playing");
//! assert_eq!(encode_step(&Step::Hold).unwrap(), r#"{"type":"hold"}"#);
//! ```

pub mod protocol;
pub mod replay_file;

pub use protocol::*;
pub use replay_file::{ReplayFile, REPLAY_FILE_VERSION};
