//! Session orchestrator.
//!
//! A `Session` owns the single current snapshot behind an `Arc`. Applying a
//! step swaps in the new snapshot; a rejected step keeps the identical `Arc`,
//! so `Arc::ptr_eq` on two reads tells a caller whether anything changed.
//! Old snapshots are kept in a bounded history for undo.

use std::collections::VecDeque;
use std::sync::Arc;

use tetris_sim_core::{GameEvent, GameSnapshot, GameState};
use tetris_sim_types::Step;

/// Default number of snapshots kept for undo
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct Session {
    initial: Arc<GameState>,
    current: Arc<GameState>,
    history: VecDeque<Arc<GameState>>,
    history_limit: usize,
    /// Applied steps since `initial`, in order.
    steps: Vec<Step>,
    /// Events not yet drained by observers.
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(state: GameState) -> Self {
        let state = Arc::new(state);
        Self {
            initial: Arc::clone(&state),
            current: state,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            steps: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Session over a default game with the given seed
    pub fn with_seed(seed: u32) -> Self {
        Self::new(GameState::with_defaults(seed))
    }

    /// Limit how many snapshots undo can go back; 0 disables undo
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        while self.history.len() > limit {
            self.history.pop_front();
        }
        self
    }

    /// The current snapshot
    pub fn state(&self) -> &Arc<GameState> {
        &self.current
    }

    /// The snapshot the session started from
    pub fn initial(&self) -> &Arc<GameState> {
        &self.initial
    }

    /// Apply one step; returns false if it did not apply
    pub fn apply(&mut self, step: Step) -> bool {
        let Some(transition) = self.current.apply(&step) else {
            log::trace!("{} not applicable in {}", step.name(), self.current.status_kind().as_str());
            return false;
        };

        let previous = std::mem::replace(&mut self.current, Arc::new(transition.state));
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(previous);
        }
        self.steps.push(step);
        self.events.extend(transition.events);
        true
    }

    /// Apply steps in order; returns how many applied
    pub fn apply_all(&mut self, steps: impl IntoIterator<Item = Step>) -> usize {
        let mut applied = 0;
        for step in steps {
            if self.apply(step) {
                applied += 1;
            }
        }
        applied
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Return to the snapshot before the last applied step
    ///
    /// Events already emitted are not retracted.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop_back() else {
            return false;
        };
        self.current = previous;
        self.steps.pop();
        true
    }

    /// Steps that produced the current snapshot from [`Session::initial`]
    pub fn applied_steps(&self) -> &[Step] {
        &self.steps
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.current.snapshot()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameState::default())
    }
}
