//! Tetris simulation engine (workspace facade crate).
//!
//! Re-exports the `tetris_sim::{core,engine,adapter,types}` public API; the
//! implementation lives in dedicated crates under `crates/`.

pub use tetris_sim_adapter as adapter;
pub use tetris_sim_core as core;
pub use tetris_sim_engine as engine;
pub use tetris_sim_types as types;
