//! Replay files: a seed plus the step log that reproduces a game.
//!
//! ```text
//! {"version":1,"seed":42,"steps":[{"type":"spawn"},{"type":"hardDrop","now":16}]}
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tetris_sim_core::GameState;
use tetris_sim_engine::Session;
use tetris_sim_types::Step;

use crate::protocol::WireStep;

pub const REPLAY_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFile {
    pub version: u32,
    /// Seed of the default game the steps start from.
    #[serde(default = "default_seed")]
    pub seed: u32,
    pub steps: Vec<WireStep>,
}

fn default_seed() -> u32 {
    1
}

impl ReplayFile {
    pub fn from_steps<'a>(seed: u32, steps: impl IntoIterator<Item = &'a Step>) -> Self {
        Self {
            version: REPLAY_FILE_VERSION,
            seed,
            steps: steps.into_iter().map(WireStep::from).collect(),
        }
    }

    /// Capture a session's applied steps
    ///
    /// The session must have started from a default game.
    pub fn from_session(session: &Session) -> Self {
        Self::from_steps(session.initial().seed(), session.applied_steps())
    }

    pub fn steps(&self) -> Vec<Step> {
        self.steps.iter().cloned().map(Step::from).collect()
    }

    pub fn initial_state(&self) -> GameState {
        GameState::with_defaults(self.seed)
    }

    pub fn parse(input: &str) -> Result<Self> {
        let file: ReplayFile = serde_json::from_str(input).context("invalid replay file")?;
        if file.version != REPLAY_FILE_VERSION {
            bail!(
                "unsupported replay file version {} (expected {})",
                file.version,
                REPLAY_FILE_VERSION
            );
        }
        Ok(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&input).with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let output = serde_json::to_string_pretty(self).context("failed to encode replay file")?;
        fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Run the steps in a fresh session
    pub fn play(&self) -> Session {
        let mut session = Session::new(self.initial_state());
        let steps = self.steps();
        let total = steps.len();
        let applied = session.apply_all(steps);
        if applied < total {
            log::debug!("replay file: {} of {} steps not applicable", total - applied, total);
        }
        session
    }
}
