//! Game state module - the immutable snapshot and its step handlers
//!
//! A [`GameState`] is never mutated in place by callers. [`GameState::apply`]
//! maps the current snapshot and one [`Step`] to a new snapshot plus the events
//! the step produced, or to `None` when the step does not apply.
//!
//! Every applied step runs one handler followed by a single physics
//! reconciliation pass. The pass is the only caller of the lock-delay machine,
//! so the lock timer advances exactly once per applied step no matter which
//! handler ran.
//!
//! Status flow:
//!
//! ```text
//! playing --(hard drop | lock timeout | lock)--> resolvingLock
//! resolvingLock --commit--> playing | lineClear | topOut(lockOut)
//! resolvingLock --retry--> playing | topOut(blockOut)
//! lineClear --complete--> playing
//! playing --(spawn | hold collision)--> topOut(blockOut)
//! ```

use std::collections::VecDeque;

use crate::board::Board;
use crate::commit::{self, CommitNext};
use crate::events::{GameEvent, LockEvent};
use crate::gravity;
use crate::input_log::{InputKind, InputRecord};
use crate::lock_delay::{self, LockDelayLimits, LockDelayState};
use crate::pending_lock::{self, PendingLock};
use crate::piece::ActivePiece;
use crate::rng::SevenBag;
use crate::snapshot::{ActiveSnapshot, GameSnapshot, LockDelayView, PendingSnapshot};
use crate::stats::Statistics;
use crate::types::*;

/// The falling piece together with its timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Falling {
    pub piece: ActivePiece,
    pub lock_delay: LockDelayState,
    /// Timestamp of the last gravity descent (or of spawn).
    pub gravity_at: Timestamp,
}

/// Top-level game status
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// `falling` is `None` between a commit and the next spawn.
    Playing { falling: Option<Falling> },
    ResolvingLock { pending: PendingLock },
    LineClear { rows: Vec<i8>, started_at: Timestamp },
    TopOut { cause: TopOutCause },
}

/// Tag of a [`Status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Playing,
    ResolvingLock,
    LineClear,
    TopOut,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Playing => "playing",
            StatusKind::ResolvingLock => "resolvingLock",
            StatusKind::LineClear => "lineClear",
            StatusKind::TopOut => "topOut",
        }
    }
}

impl Status {
    pub fn kind(&self) -> StatusKind {
        match self {
            Status::Playing { .. } => StatusKind::Playing,
            Status::ResolvingLock { .. } => StatusKind::ResolvingLock,
            Status::LineClear { .. } => StatusKind::LineClear,
            Status::TopOut { .. } => StatusKind::TopOut,
        }
    }

    pub fn falling(&self) -> Option<&Falling> {
        match self {
            Status::Playing { falling } => falling.as_ref(),
            _ => None,
        }
    }
}

/// Result of an applied step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    status: Status,
    board: Board,
    timing: TimingConfig,
    gameplay: GameplayConfig,
    supply: SevenBag,
    /// Lookahead queue; may be longer than `preview_count` after the preview shrinks.
    queue: VecDeque<PieceKind>,
    hold: Option<PieceKind>,
    can_hold: bool,
    soft_dropping: bool,
    /// Last observed timestamp.
    now: Timestamp,
    /// Monotonic id for spawned pieces (increments only on successful spawn).
    piece_index: u32,
    stats: Statistics,
    /// Processed inputs of the current piece.
    input_log: Vec<InputRecord>,
}

impl GameState {
    /// Create a fresh game: playing, no falling piece, lookahead filled
    pub fn new(
        seed: u32,
        timing: TimingConfig,
        gameplay: GameplayConfig,
    ) -> Result<Self, ConfigError> {
        timing.validate()?;
        gameplay.validate()?;
        let mut state = Self {
            status: Status::Playing { falling: None },
            board: Board::new(gameplay.board),
            timing,
            gameplay,
            supply: SevenBag::new(seed),
            queue: VecDeque::with_capacity(MAX_PREVIEW_COUNT),
            hold: None,
            can_hold: true,
            soft_dropping: false,
            now: 0,
            piece_index: 0,
            stats: Statistics::default(),
            input_log: Vec::new(),
        };
        state.refill_queue();
        Ok(state)
    }

    /// Create a fresh game with default timing and gameplay
    pub fn with_defaults(seed: u32) -> Self {
        let mut state = Self {
            status: Status::Playing { falling: None },
            board: Board::standard(),
            timing: TimingConfig::default(),
            gameplay: GameplayConfig::default(),
            supply: SevenBag::new(seed),
            queue: VecDeque::with_capacity(MAX_PREVIEW_COUNT),
            hold: None,
            can_hold: true,
            soft_dropping: false,
            now: 0,
            piece_index: 0,
            stats: Statistics::default(),
            input_log: Vec::new(),
        };
        state.refill_queue();
        state
    }

    /// Replace the board, e.g. with a garbage or puzzle setup
    ///
    /// The board geometry must match the gameplay config.
    pub fn with_board(mut self, board: Board) -> Result<Self, ConfigError> {
        if board.config() != self.gameplay.board {
            return Err(ConfigError::BoardResizeWhilePlaying);
        }
        self.board = board;
        Ok(self)
    }

    // ---- read-only exports ----

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_kind(&self) -> StatusKind {
        self.status.kind()
    }

    pub fn is_topped_out(&self) -> bool {
        matches!(self.status, Status::TopOut { .. })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn gameplay(&self) -> &GameplayConfig {
        &self.gameplay
    }

    pub fn falling(&self) -> Option<Falling> {
        self.status.falling().copied()
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.status.falling().map(|falling| falling.piece)
    }

    /// Lock timer of the falling piece; `Airborne` without one
    pub fn lock_delay(&self) -> LockDelayState {
        self.status
            .falling()
            .map(|falling| falling.lock_delay)
            .unwrap_or_default()
    }

    pub fn lock_delay_view(&self) -> LockDelayView {
        LockDelayView::new(
            self.lock_delay(),
            self.now,
            self.timing.lock_delay_ms,
            self.timing.lock_delay_max_resets,
        )
    }

    pub fn pending_lock(&self) -> Option<&PendingLock> {
        match &self.status {
            Status::ResolvingLock { pending } => Some(pending),
            _ => None,
        }
    }

    /// Rows being cleared while in line clear
    pub fn line_clear_rows(&self) -> &[i8] {
        match &self.status {
            Status::LineClear { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// The visible lookahead queue, next piece first
    pub fn next_queue(&self) -> Vec<PieceKind> {
        self.queue
            .iter()
            .take(self.gameplay.preview_count)
            .copied()
            .collect()
    }

    pub fn soft_dropping(&self) -> bool {
        self.soft_dropping
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn seed(&self) -> u32 {
        self.supply.seed()
    }

    pub fn piece_index(&self) -> u32 {
        self.piece_index
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn input_log(&self) -> &[InputRecord] {
        &self.input_log
    }

    /// Where the falling piece would land
    pub fn ghost(&self) -> Option<ActivePiece> {
        self.active().map(|piece| piece.dropped(&self.board))
    }

    pub fn ghost_y(&self) -> Option<i8> {
        self.ghost().map(|ghost| ghost.y)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let config = self.board.config();
        GameSnapshot {
            width: config.width,
            visible_height: config.visible_height,
            vanish_rows: config.vanish_rows,
            board: self.board.cells().to_vec(),
            status: self.status_kind().as_str(),
            top_out: match self.status {
                Status::TopOut { cause } => Some(cause),
                _ => None,
            },
            active: self.active().map(ActiveSnapshot::from),
            ghost_y: self.ghost_y(),
            lock_delay: self.lock_delay_view(),
            pending: self.pending_lock().map(|pending| PendingSnapshot {
                piece: pending.piece,
                final_position: pending.final_position.into(),
                completed_lines: pending.completed_lines.clone(),
                source: pending.source,
                timestamp: pending.timestamp,
            }),
            clearing_rows: self.line_clear_rows().to_vec(),
            hold: self.hold,
            can_hold: self.can_hold,
            next_queue: self.next_queue(),
            soft_dropping: self.soft_dropping,
            seed: self.seed(),
            piece_index: self.piece_index,
            now: self.now,
            stats: self.stats,
        }
    }

    // ---- transitions ----

    /// Apply one step
    ///
    /// Returns `None` when the step is not applicable in the current status,
    /// fails (blocked move, invalid patch) or would not change anything.
    pub fn apply(&self, step: &Step) -> Option<Transition> {
        if let Step::Init {
            seed,
            timing,
            gameplay,
        } = step
        {
            return match GameState::new(*seed, *timing, *gameplay) {
                Ok(state) => {
                    log::debug!("init: seed {}", seed);
                    Some(Transition {
                        state,
                        events: Vec::new(),
                    })
                }
                Err(err) => {
                    log::warn!("init rejected: {}", err);
                    None
                }
            };
        }

        if self.is_topped_out() {
            return None;
        }
        if let Some(now) = step.timestamp() {
            if now < self.now {
                log::warn!(
                    "{} at {}ms is earlier than last observed {}ms",
                    step.name(),
                    now,
                    self.now
                );
                return None;
            }
        }

        let mut next = self.clone();
        let mut events = Vec::new();
        if let Some(now) = step.timestamp() {
            next.now = now;
            next.stats.observe_time(now);
        }

        let before = next.active();
        if !next.dispatch(step, &mut events) {
            return None;
        }
        next.reconcile(step, before, &mut events);

        if next == *self {
            return None;
        }
        Some(Transition {
            state: next,
            events,
        })
    }

    fn dispatch(&mut self, step: &Step, events: &mut Vec<GameEvent>) -> bool {
        match step {
            Step::Init { .. } => false,
            Step::Tick(_) => self.tick(),
            Step::Spawn(forced) => self.spawn(*forced, events),
            Step::Move(direction, repeat) => self.shift(*direction, *repeat),
            Step::Rotate(direction) => self.rotate(*direction),
            Step::HardDrop(_) => self.hard_drop(events),
            Step::SoftDrop(on) => self.set_soft_drop(*on),
            Step::Hold => self.hold(events),
            Step::Lock(_) => self.force_lock(events),
            Step::CommitLock => self.commit_lock(events),
            Step::RetryPendingLock(_) => self.retry_pending_lock(events),
            Step::StartLineClear(rows, _) => self.start_line_clear(rows, events),
            Step::CompleteLineClear => self.complete_line_clear(events),
            Step::ClearLines(rows) => self.clear_lines(rows, events),
            Step::UpdateTiming(patch) => self.update_timing(patch),
            Step::UpdateGameplay(patch) => self.update_gameplay(patch),
        }
    }

    /// Physics reconciliation: the single lock-delay evaluation of a step
    fn reconcile(&mut self, step: &Step, before: Option<ActivePiece>, events: &mut Vec<GameEvent>) {
        let Some(falling) = self.falling() else {
            return;
        };
        let grounded = falling.piece.is_grounded(&self.board);
        let moved = step.is_player_transform() && before.is_some_and(|prev| prev != falling.piece);
        let (lock_delay, lock_now) =
            lock_delay::step(falling.lock_delay, grounded, moved, self.now, self.lock_limits());

        if lock_delay != falling.lock_delay {
            log::trace!(
                "lock delay {:?} -> {:?} at {}ms",
                falling.lock_delay,
                lock_delay,
                self.now
            );
        }

        if lock_now {
            let source = self.timeout_source();
            self.begin_lock(falling.piece, source, lock_delay, events);
        } else if let Some(current) = self.falling_mut() {
            current.lock_delay = lock_delay;
        }
    }

    fn tick(&mut self) -> bool {
        if !self.timing.gravity_enabled {
            return true;
        }
        let now = self.now;
        if let Status::Playing {
            falling: Some(falling),
        } = &mut self.status
        {
            let step = gravity::advance(
                &self.board,
                falling.piece,
                falling.gravity_at,
                now,
                &self.timing,
                self.soft_dropping,
            );
            falling.piece = step.piece;
            falling.gravity_at = step.gravity_at;
        }
        true
    }

    fn spawn(&mut self, forced: Option<PieceKind>, events: &mut Vec<GameEvent>) -> bool {
        if !matches!(self.status, Status::Playing { falling: None }) {
            return false;
        }
        let kind = match forced {
            Some(kind) => kind,
            None => self.take_next(),
        };
        self.input_log.clear();
        if self.install(kind, events) {
            self.piece_index = self.piece_index.wrapping_add(1);
            events.push(GameEvent::Spawned {
                piece: kind,
                piece_index: self.piece_index,
            });
        }
        true
    }

    fn shift(&mut self, direction: MoveDirection, repeat: RepeatKind) -> bool {
        let Some(falling) = self.falling() else {
            return false;
        };
        let Some(piece) = falling.piece.try_shift(&self.board, direction.dx(), 0) else {
            return false;
        };
        self.set_piece(piece);
        self.record_input(InputKind::Move(direction, repeat));
        true
    }

    fn rotate(&mut self, direction: RotateDirection) -> bool {
        let Some(falling) = self.falling() else {
            return false;
        };
        let Some(piece) = falling.piece.try_rotate(&self.board, direction) else {
            return false;
        };
        self.set_piece(piece);
        self.record_input(InputKind::Rotate(direction));
        true
    }

    fn set_soft_drop(&mut self, on: bool) -> bool {
        if !matches!(self.status, Status::Playing { .. }) || on == self.soft_dropping {
            return false;
        }
        self.soft_dropping = on;

        let now = self.now;
        let instant = gravity::effective_interval_ms(&self.timing, true).is_none();
        let mut has_piece = false;
        if let Status::Playing {
            falling: Some(falling),
        } = &mut self.status
        {
            has_piece = true;
            falling.gravity_at = now;
            if on {
                falling.piece = if instant {
                    falling.piece.dropped(&self.board)
                } else {
                    falling
                        .piece
                        .try_shift(&self.board, 0, 1)
                        .unwrap_or(falling.piece)
                };
            }
        }
        if has_piece {
            self.record_input(InputKind::SoftDrop(on));
        }
        true
    }

    fn hard_drop(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let Some(falling) = self.falling() else {
            return false;
        };
        self.record_input(InputKind::HardDrop);
        self.begin_lock(falling.piece, LockSource::HardDrop, falling.lock_delay, events);
        true
    }

    fn force_lock(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let Some(falling) = self.falling() else {
            return false;
        };
        if !falling.piece.is_grounded(&self.board) {
            return false;
        }
        let source = self.timeout_source();
        self.begin_lock(falling.piece, source, falling.lock_delay, events);
        true
    }

    fn hold(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.gameplay.hold_enabled || !self.can_hold {
            return false;
        }
        let Some(falling) = self.falling() else {
            return false;
        };

        let current = falling.piece.kind;
        let incoming = match self.hold.replace(current) {
            Some(held) => held,
            None => self.take_next(),
        };
        self.can_hold = false;
        self.stats.holds += 1;
        self.record_input(InputKind::Hold);
        events.push(GameEvent::Held {
            held: current,
            active: incoming,
        });
        self.install(incoming, events);
        true
    }

    fn commit_lock(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let Status::ResolvingLock { pending } = &self.status else {
            return false;
        };
        let pending = pending.clone();

        let outcome = commit::commit(&self.board, &pending, &self.timing);
        let delta = self.stats.record_commit(&pending, outcome.lines.len());
        self.board = outcome.board;
        self.can_hold = true;
        events.push(GameEvent::Committed(LockEvent {
            piece: pending.piece,
            piece_index: self.piece_index,
            final_position: pending.final_position,
            source: pending.source,
            lines: outcome.lines.clone(),
            top_out: outcome.next == CommitNext::LockOut,
            timestamp: pending.timestamp,
            inputs: std::mem::take(&mut self.input_log),
            stats: delta,
        }));

        match outcome.next {
            CommitNext::LockOut => self.top_out(TopOutCause::LockOut, events),
            CommitNext::Playing => {
                log::debug!(
                    "resolvingLock -> playing: {:?} committed, {} lines",
                    pending.piece,
                    outcome.lines.len()
                );
                self.status = Status::Playing { falling: None };
            }
            CommitNext::LineClear(rows) => {
                log::debug!("resolvingLock -> lineClear: rows {:?}", rows);
                events.push(GameEvent::LineClearStarted { rows: rows.clone() });
                self.status = Status::LineClear {
                    rows,
                    started_at: self.now,
                };
            }
        }
        true
    }

    fn retry_pending_lock(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let Status::ResolvingLock { pending } = &self.status else {
            return false;
        };
        let kind = pending.piece;

        self.can_hold = true;
        self.input_log.clear();
        self.stats.retries += 1;
        log::debug!("resolvingLock -> playing: retry {:?}", kind);
        events.push(GameEvent::Retried { piece: kind });
        self.install(kind, events);
        true
    }

    fn start_line_clear(&mut self, rows: &[i8], events: &mut Vec<GameEvent>) -> bool {
        if !matches!(self.status, Status::Playing { falling: None }) {
            return false;
        }
        let rows = self.visible_rows(rows);
        if rows.is_empty() {
            return false;
        }
        log::debug!("playing -> lineClear: rows {:?}", rows);
        events.push(GameEvent::LineClearStarted { rows: rows.clone() });
        self.status = Status::LineClear {
            rows,
            started_at: self.now,
        };
        true
    }

    fn complete_line_clear(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let Status::LineClear { rows, .. } = &self.status else {
            return false;
        };
        if rows.is_empty() {
            return false;
        }
        let rows = rows.clone();

        self.board = self.board.compact(&rows);
        log::debug!("lineClear -> playing: removed {:?}", rows);
        events.push(GameEvent::LineClearCompleted { rows });
        self.status = Status::Playing { falling: None };
        true
    }

    fn clear_lines(&mut self, rows: &[i8], events: &mut Vec<GameEvent>) -> bool {
        if !matches!(self.status, Status::Playing { .. }) {
            return false;
        }
        let rows = self.visible_rows(rows);
        if rows.is_empty() {
            return false;
        }
        let board = self.board.compact(&rows);
        if board == self.board {
            return false;
        }
        if let Some(falling) = self.falling() {
            if !falling.piece.fits(&board) {
                log::warn!("clear of rows {:?} would overlap the falling piece", rows);
                return false;
            }
        }
        self.board = board;
        events.push(GameEvent::LinesRemoved { rows });
        true
    }

    fn update_timing(&mut self, patch: &TimingPatch) -> bool {
        match self.timing.merged(patch) {
            Ok(timing) if timing == self.timing => false,
            Ok(timing) => {
                self.timing = timing;
                true
            }
            Err(err) => {
                log::warn!("timing update rejected: {}", err);
                false
            }
        }
    }

    fn update_gameplay(&mut self, patch: &GameplayPatch) -> bool {
        match self.gameplay.merged(patch) {
            Ok(gameplay) if gameplay == self.gameplay => false,
            Ok(gameplay) => {
                self.gameplay = gameplay;
                self.refill_queue();
                true
            }
            Err(err) => {
                log::warn!("gameplay update rejected: {}", err);
                false
            }
        }
    }

    // ---- helpers ----

    /// Move into `resolvingLock` with a freshly built pending lock
    fn begin_lock(
        &mut self,
        piece: ActivePiece,
        source: LockSource,
        lock_delay: LockDelayState,
        events: &mut Vec<GameEvent>,
    ) {
        let pending = PendingLock {
            lock_delay,
            ..pending_lock::build(&self.board, &piece, source, self.now)
        };
        log::debug!(
            "playing -> resolvingLock: {:?} by {} at {}ms",
            piece.kind,
            source.as_str(),
            self.now
        );
        events.push(GameEvent::LockPending {
            piece: piece.kind,
            source,
            lines: pending.completed_lines.clone(),
        });
        self.status = Status::ResolvingLock { pending };
    }

    /// Put a fresh `kind` at the spawn position, or top out on collision
    fn install(&mut self, kind: PieceKind, events: &mut Vec<GameEvent>) -> bool {
        let piece = ActivePiece::spawn(kind, &self.board);
        if !piece.fits(&self.board) {
            self.top_out(TopOutCause::BlockOut, events);
            return false;
        }
        self.status = Status::Playing {
            falling: Some(Falling {
                piece,
                lock_delay: LockDelayState::Airborne,
                gravity_at: self.now,
            }),
        };
        true
    }

    fn top_out(&mut self, cause: TopOutCause, events: &mut Vec<GameEvent>) {
        log::debug!(
            "{} -> topOut: {}",
            self.status_kind().as_str(),
            cause.as_str()
        );
        events.push(GameEvent::ToppedOut(cause));
        self.status = Status::TopOut { cause };
    }

    fn take_next(&mut self) -> PieceKind {
        let kind = self
            .queue
            .pop_front()
            .unwrap_or_else(|| self.supply.draw());
        self.refill_queue();
        kind
    }

    fn refill_queue(&mut self) {
        while self.queue.len() < self.gameplay.preview_count {
            self.queue.push_back(self.supply.draw());
        }
    }

    fn falling_mut(&mut self) -> Option<&mut Falling> {
        match &mut self.status {
            Status::Playing { falling } => falling.as_mut(),
            _ => None,
        }
    }

    fn set_piece(&mut self, piece: ActivePiece) {
        if let Some(falling) = self.falling_mut() {
            falling.piece = piece;
        }
    }

    fn record_input(&mut self, kind: InputKind) {
        self.input_log.push(InputRecord { kind, at: self.now });
    }

    fn lock_limits(&self) -> LockDelayLimits {
        LockDelayLimits {
            delay_ms: self.timing.lock_delay_ms,
            max_resets: self.timing.lock_delay_max_resets,
        }
    }

    fn timeout_source(&self) -> LockSource {
        if self.soft_dropping {
            LockSource::SoftDrop
        } else {
            LockSource::Gravity
        }
    }

    /// Sorted, distinct visible rows of `rows`
    fn visible_rows(&self, rows: &[i8]) -> Vec<i8> {
        let height = self.board.visible_height() as i8;
        let mut rows: Vec<i8> = rows
            .iter()
            .copied()
            .filter(|&y| (0..height).contains(&y))
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_defaults(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: &GameState, step: Step) -> GameState {
        state
            .apply(&step)
            .unwrap_or_else(|| panic!("{} should apply", step.name()))
            .state
    }

    fn spawned(kind: PieceKind) -> GameState {
        apply(&GameState::with_defaults(1), Step::Spawn(Some(kind)))
    }

    fn no_gravity() -> TimingConfig {
        TimingConfig {
            gravity_enabled: false,
            ..TimingConfig::default()
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::with_defaults(12345);

        assert_eq!(state.status(), &Status::Playing { falling: None });
        assert_eq!(state.next_queue().len(), 5);
        assert!(state.board().is_empty());
        assert!(state.can_hold());
        assert_eq!(state.hold_piece(), None);
        assert_eq!(state.now(), 0);
        assert_eq!(state.seed(), 12345);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let timing = TimingConfig {
            gravity_ms: 0,
            ..TimingConfig::default()
        };
        assert_eq!(
            GameState::new(1, timing, GameplayConfig::default()),
            Err(ConfigError::ZeroGravityInterval)
        );
    }

    #[test]
    fn test_spawn_pops_queue_head() {
        let state = GameState::with_defaults(7);
        let queue = state.next_queue();
        let transition = state.apply(&Step::Spawn(None)).unwrap();
        let next = transition.state;

        let active = next.active().unwrap();
        assert_eq!(active.kind, queue[0]);
        assert_eq!((active.x, active.y), (3, -2));
        assert_eq!(next.next_queue()[..4], queue[1..]);
        assert_eq!(next.next_queue().len(), 5);
        assert_eq!(next.piece_index(), 1);
        assert_eq!(next.lock_delay(), LockDelayState::Airborne);
        assert_eq!(
            transition.events,
            vec![GameEvent::Spawned {
                piece: queue[0],
                piece_index: 1
            }]
        );
    }

    #[test]
    fn test_forced_spawn_leaves_queue() {
        let state = GameState::with_defaults(7);
        let next = apply(&state, Step::Spawn(Some(PieceKind::I)));
        assert_eq!(next.active().unwrap().kind, PieceKind::I);
        assert_eq!(next.next_queue(), state.next_queue());
    }

    #[test]
    fn test_spawn_requires_empty_slot() {
        let state = spawned(PieceKind::T);
        assert!(state.apply(&Step::Spawn(None)).is_none());
    }

    #[test]
    fn test_spawn_collision_blocks_out() {
        let mut board = Board::standard();
        board.set(4, -1, GARBAGE_CELL);
        let state = GameState::with_defaults(1).with_board(board).unwrap();
        let transition = state.apply(&Step::Spawn(Some(PieceKind::T))).unwrap();

        assert_eq!(
            transition.state.status(),
            &Status::TopOut {
                cause: TopOutCause::BlockOut
            }
        );
        assert_eq!(transition.state.piece_index(), 0);
        assert_eq!(
            transition.events,
            vec![GameEvent::ToppedOut(TopOutCause::BlockOut)]
        );
    }

    #[test]
    fn test_failed_move_is_noop() {
        let mut state = spawned(PieceKind::O);
        let left = Step::Move(MoveDirection::Left, RepeatKind::Arr);
        while let Some(transition) = state.apply(&left) {
            state = transition.state;
        }
        assert_eq!(state.active().unwrap().x, -1);
        assert_eq!(state.input_log().len(), 4);
        assert!(state.apply(&left).is_none());
    }

    #[test]
    fn test_o_piece_never_rotates() {
        let state = spawned(PieceKind::O);
        assert!(state.apply(&Step::Rotate(RotateDirection::Cw)).is_none());
        assert!(state.apply(&Step::Rotate(RotateDirection::Half)).is_none());
    }

    #[test]
    fn test_rotate_records_input() {
        let state = apply(&spawned(PieceKind::T), Step::Rotate(RotateDirection::Cw));
        assert_eq!(state.active().unwrap().rotation, Rotation::East);
        assert_eq!(
            state.input_log(),
            &[InputRecord {
                kind: InputKind::Rotate(RotateDirection::Cw),
                at: 0
            }]
        );
    }

    #[test]
    fn test_tick_rejects_earlier_timestamp() {
        let state = apply(&spawned(PieceKind::T), Step::Tick(500));
        assert!(state.apply(&Step::Tick(499)).is_none());
        assert!(state.apply(&Step::HardDrop(10)).is_none());
        assert!(state.apply(&Step::Tick(500)).is_none());
    }

    #[test]
    fn test_tick_gravity() {
        let state = spawned(PieceKind::T);
        let early = apply(&state, Step::Tick(999));
        assert_eq!(early.active().unwrap().y, -2);

        let due = apply(&early, Step::Tick(1000));
        let falling = due.falling().unwrap();
        assert_eq!(falling.piece.y, -1);
        assert_eq!(falling.gravity_at, 1000);
    }

    #[test]
    fn test_tick_updates_session_clock_without_piece() {
        let state = apply(&GameState::with_defaults(1), Step::Tick(250));
        assert_eq!(state.now(), 250);
        assert_eq!(state.stats().session_started_at, Some(250));
    }

    #[test]
    fn test_soft_drop_descends_and_toggles() {
        let state = spawned(PieceKind::T);
        let dropping = apply(&state, Step::SoftDrop(true));

        assert!(dropping.soft_dropping());
        assert_eq!(dropping.active().unwrap().y, -1);
        assert!(dropping.apply(&Step::SoftDrop(true)).is_none());

        let released = apply(&dropping, Step::SoftDrop(false));
        assert!(!released.soft_dropping());
        assert_eq!(released.active().unwrap().y, -1);
        assert_eq!(released.input_log().len(), 2);
    }

    #[test]
    fn test_soft_drop_uses_divided_interval() {
        let state = apply(&spawned(PieceKind::T), Step::SoftDrop(true));
        let next = apply(&state, Step::Tick(50));
        assert_eq!(next.active().unwrap().y, 0);
    }

    #[test]
    fn test_hard_drop_creates_pending_lock() {
        let state = spawned(PieceKind::O);
        let transition = state.apply(&Step::HardDrop(1000)).unwrap();
        let next = transition.state;

        let pending = next.pending_lock().unwrap();
        assert_eq!(pending.source, LockSource::HardDrop);
        assert_eq!(pending.final_position.y, 18);
        assert_eq!(pending.timestamp, 1000);
        assert!(next.active().is_none());
        assert!(next.board().is_empty());
        assert_eq!(next.status_kind(), StatusKind::ResolvingLock);
    }

    #[test]
    fn test_commit_is_exactly_once() {
        let pending = apply(&spawned(PieceKind::O), Step::HardDrop(1000));
        let transition = pending.apply(&Step::CommitLock).unwrap();
        let committed = transition.state;

        assert_eq!(committed.status(), &Status::Playing { falling: None });
        assert_eq!(committed.board().cell_count(), 4);
        assert_eq!(committed.stats().pieces_placed, 1);
        assert!(committed.apply(&Step::CommitLock).is_none());

        let GameEvent::Committed(event) = &transition.events[0] else {
            panic!("expected commit event, got {:?}", transition.events);
        };
        assert_eq!(event.piece, PieceKind::O);
        assert_eq!(event.inputs.len(), 1);
        assert!(!event.top_out);
        assert!(committed.input_log().is_empty());
    }

    #[test]
    fn test_lock_requires_grounded_piece() {
        let state = spawned(PieceKind::T);
        assert!(state.apply(&Step::Lock(10)).is_none());

        let timing = TimingConfig {
            soft_drop_speed: SoftDropSpeed::Infinite,
            ..TimingConfig::default()
        };
        let state = GameState::new(1, timing, GameplayConfig::default()).unwrap();
        let state = apply(&state, Step::Spawn(Some(PieceKind::T)));
        let state = apply(&state, Step::SoftDrop(true));
        let locked = apply(&state, Step::Lock(10));
        let pending = locked.pending_lock().unwrap();
        assert_eq!(pending.source, LockSource::SoftDrop);
        assert_eq!(pending.final_position.y, 18);
    }

    #[test]
    fn test_retry_restores_piece_at_spawn() {
        let state = apply(&spawned(PieceKind::L), Step::Hold);
        assert!(!state.can_hold());
        let pending = apply(&state, Step::HardDrop(300));
        let transition = pending.apply(&Step::RetryPendingLock(400)).unwrap();
        let retried = transition.state;

        let falling = retried.falling().unwrap();
        assert_eq!(falling.piece, ActivePiece::spawn(pending.pending_lock().unwrap().piece, retried.board()));
        assert_eq!(falling.gravity_at, 400);
        assert_eq!(falling.lock_delay, LockDelayState::Airborne);
        assert!(retried.board().is_empty());
        assert!(retried.can_hold());
        assert!(retried.input_log().is_empty());
        assert_eq!(retried.stats().retries, 1);
        assert_eq!(retried.stats().pieces_placed, 0);
    }

    #[test]
    fn test_line_clear_delay_defers_compaction() {
        let timing = TimingConfig {
            line_clear_delay_ms: 400,
            ..TimingConfig::default()
        };
        let board = Board::from_rows(BoardConfig::default(), &["XXXXXX...."]);
        let state = GameState::new(1, timing, GameplayConfig::default())
            .unwrap()
            .with_board(board)
            .unwrap();
        let mut state = apply(&state, Step::Spawn(Some(PieceKind::I)));
        for _ in 0..3 {
            state = apply(&state, Step::Move(MoveDirection::Right, RepeatKind::Tap));
        }
        let state = apply(&apply(&state, Step::HardDrop(100)), Step::CommitLock);

        assert_eq!(state.line_clear_rows(), &[19]);
        assert!(state.board().is_row_full(19));
        assert!(state.apply(&Step::Spawn(None)).is_none());

        let transition = state.apply(&Step::CompleteLineClear).unwrap();
        assert!(transition.state.board().is_empty());
        assert_eq!(transition.state.status(), &Status::Playing { falling: None });
        assert_eq!(
            transition.events,
            vec![GameEvent::LineClearCompleted { rows: vec![19] }]
        );
    }

    #[test]
    fn test_complete_line_clear_outside_line_clear_is_noop() {
        let state = GameState::with_defaults(1);
        assert!(state.apply(&Step::CompleteLineClear).is_none());
    }

    #[test]
    fn test_start_line_clear_preconditions() {
        assert!(spawned(PieceKind::T)
            .apply(&Step::StartLineClear(vec![19], 0))
            .is_none());

        let idle = GameState::with_defaults(1);
        assert!(idle.apply(&Step::StartLineClear(vec![], 0)).is_none());
        assert!(idle.apply(&Step::StartLineClear(vec![-1, 20], 0)).is_none());

        let clearing = apply(&idle, Step::StartLineClear(vec![19, 18, 19], 50));
        assert_eq!(
            clearing.status(),
            &Status::LineClear {
                rows: vec![18, 19],
                started_at: 50
            }
        );
    }

    #[test]
    fn test_clear_lines_edits_board() {
        let board = Board::from_rows(BoardConfig::default(), &["X.........", "XXXXXXXXX."]);
        let state = GameState::with_defaults(1).with_board(board).unwrap();

        let cleared = apply(&state, Step::ClearLines(vec![19]));
        assert_eq!(cleared.board().cell_count(), 1);
        assert_eq!(cleared.board().get(0, 19), Some(GARBAGE_CELL));

        let empty = GameState::with_defaults(1);
        assert!(empty.apply(&Step::ClearLines(vec![19])).is_none());
        assert!(state.apply(&Step::ClearLines(vec![])).is_none());
    }

    #[test]
    fn test_hold_first_use_pulls_queue() {
        let state = spawned(PieceKind::T);
        let queue = state.next_queue();
        let transition = state.apply(&Step::Hold).unwrap();
        let held = transition.state;

        assert_eq!(held.hold_piece(), Some(PieceKind::T));
        assert_eq!(held.active().unwrap().kind, queue[0]);
        assert!(!held.can_hold());
        assert!(held.apply(&Step::Hold).is_none());
        assert_eq!(
            transition.events,
            vec![GameEvent::Held {
                held: PieceKind::T,
                active: queue[0]
            }]
        );
    }

    #[test]
    fn test_hold_swaps_and_resets_timers() {
        let state = apply(&spawned(PieceKind::T), Step::Hold);
        let state = apply(&apply(&state, Step::HardDrop(100)), Step::CommitLock);
        let state = apply(&state, Step::Spawn(Some(PieceKind::S)));
        let state = apply(&state, Step::Tick(1100));
        let swapped = apply(&state, Step::Hold);

        let falling = swapped.falling().unwrap();
        assert_eq!(falling.piece.kind, PieceKind::T);
        assert_eq!(falling.piece.y, -2);
        assert_eq!(falling.gravity_at, 1100);
        assert_eq!(swapped.hold_piece(), Some(PieceKind::S));
    }

    #[test]
    fn test_hold_disabled() {
        let gameplay = GameplayConfig {
            hold_enabled: false,
            ..GameplayConfig::default()
        };
        let state = GameState::new(1, TimingConfig::default(), gameplay).unwrap();
        let state = apply(&state, Step::Spawn(None));
        assert!(state.apply(&Step::Hold).is_none());
    }

    #[test]
    fn test_lock_out_tops_out_after_commit() {
        let rows = ["XXXXXXXXX."; 20];
        let board = Board::from_rows(BoardConfig::default(), &rows);
        let state = GameState::with_defaults(1).with_board(board).unwrap();
        let state = apply(&state, Step::Spawn(Some(PieceKind::O)));
        let transition = apply(&state, Step::HardDrop(0)).apply(&Step::CommitLock).unwrap();

        assert_eq!(
            transition.state.status(),
            &Status::TopOut {
                cause: TopOutCause::LockOut
            }
        );
        assert_eq!(transition.state.board().cell_count(), 20 * 9 + 4);
        assert!(matches!(
            &transition.events[..],
            [GameEvent::Committed(LockEvent { top_out: true, .. }), GameEvent::ToppedOut(TopOutCause::LockOut)]
        ));
    }

    #[test]
    fn test_top_out_is_terminal() {
        let mut board = Board::standard();
        board.set(4, -1, GARBAGE_CELL);
        let state = GameState::with_defaults(1).with_board(board).unwrap();
        let over = apply(&state, Step::Spawn(Some(PieceKind::T)));

        assert!(over.apply(&Step::Tick(100)).is_none());
        assert!(over.apply(&Step::Spawn(None)).is_none());
        assert!(over
            .apply(&Step::UpdateTiming(TimingPatch {
                lock_delay_ms: Some(100),
                ..TimingPatch::default()
            }))
            .is_none());

        let restarted = apply(
            &over,
            Step::Init {
                seed: 2,
                timing: TimingConfig::default(),
                gameplay: GameplayConfig::default(),
            },
        );
        assert_eq!(restarted.status_kind(), StatusKind::Playing);
    }

    #[test]
    fn test_update_timing() {
        let state = GameState::with_defaults(1);
        let faster = apply(
            &state,
            Step::UpdateTiming(TimingPatch {
                gravity_ms: Some(100),
                ..TimingPatch::default()
            }),
        );
        assert_eq!(faster.timing().gravity_ms, 100);

        let same = TimingPatch {
            gravity_ms: Some(100),
            ..TimingPatch::default()
        };
        assert!(faster.apply(&Step::UpdateTiming(same)).is_none());

        let invalid = TimingPatch {
            soft_drop_speed: Some(SoftDropSpeed::Multiplier(0)),
            ..TimingPatch::default()
        };
        assert!(state.apply(&Step::UpdateTiming(invalid)).is_none());
    }

    #[test]
    fn test_update_gameplay_preview_and_board() {
        let state = GameState::with_defaults(3);
        let queue = state.next_queue();

        let short = apply(
            &state,
            Step::UpdateGameplay(GameplayPatch {
                preview_count: Some(2),
                ..GameplayPatch::default()
            }),
        );
        assert_eq!(short.next_queue(), queue[..2]);

        let long = apply(
            &short,
            Step::UpdateGameplay(GameplayPatch {
                preview_count: Some(5),
                ..GameplayPatch::default()
            }),
        );
        assert_eq!(long.next_queue(), queue);

        let resize = GameplayPatch {
            board: Some(BoardConfig {
                width: 12,
                ..BoardConfig::default()
            }),
            ..GameplayPatch::default()
        };
        assert!(state.apply(&Step::UpdateGameplay(resize)).is_none());
    }

    #[test]
    fn test_gravity_disabled_tick_only_moves_clock() {
        let state = GameState::new(1, no_gravity(), GameplayConfig::default()).unwrap();
        let state = apply(&state, Step::Spawn(Some(PieceKind::J)));
        let later = apply(&state, Step::Tick(10_000));
        assert_eq!(later.active(), state.active());
        assert_eq!(later.now(), 10_000);
    }

    #[test]
    fn test_snapshot_export() {
        let state = apply(&spawned(PieceKind::I), Step::Tick(1000));
        let snapshot = state.snapshot();

        assert_eq!(snapshot.status, "playing");
        assert_eq!(snapshot.board.len(), 10 * 22);
        assert_eq!(snapshot.active.unwrap().kind, PieceKind::I);
        assert_eq!(snapshot.ghost_y, Some(18));
        assert_eq!(snapshot.next_queue.len(), 5);
        assert!(snapshot.playable());
        assert_eq!(snapshot.now, 1000);
    }
}
