//! Session engine: owns the current snapshot and drives it with steps
//!
//! - [`session`]: the single current snapshot, undo history and event drain
//! - [`replay`]: deterministic re-execution of step logs
//! - [`place`]: placement planner for advisor and bot clients

pub mod place;
pub mod replay;
pub mod session;

pub use place::{apply_place, plan_place, PlaceError};
pub use replay::{replay, verify, Replay};
pub use session::{Session, DEFAULT_HISTORY_LIMIT};
