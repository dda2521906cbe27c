//! Timing and gameplay configuration.
//!
//! Full configs are always valid once constructed through [`TimingConfig::validate`] /
//! [`GameplayConfig::validate`]. Partial updates arrive as patches whose every field
//! is optional; merging a patch never mutates the original config.

use std::fmt;

use crate::{
    DEFAULT_BOARD_WIDTH, DEFAULT_GRAVITY_MS, DEFAULT_LINE_CLEAR_DELAY_MS, DEFAULT_LOCK_DELAY_MAX_RESETS,
    DEFAULT_LOCK_DELAY_MS, DEFAULT_PREVIEW_COUNT, DEFAULT_SOFT_DROP_MULTIPLIER, DEFAULT_TICK_RATE_HZ,
    DEFAULT_VANISH_ROWS, DEFAULT_VISIBLE_HEIGHT, MAX_PREVIEW_COUNT,
};

/// Soft drop speed: a positive multiplier over gravity, or an instant drop to the resting row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftDropSpeed {
    Multiplier(u32),
    Infinite,
}

impl Default for SoftDropSpeed {
    fn default() -> Self {
        SoftDropSpeed::Multiplier(DEFAULT_SOFT_DROP_MULTIPLIER)
    }
}

/// Configuration rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroGravityInterval,
    ZeroSoftDropMultiplier,
    ZeroTickRate,
    PreviewTooLong,
    BoardWidthOutOfRange,
    BoardHeightOutOfRange,
    VanishRowsOutOfRange,
    BoardResizeWhilePlaying,
}

impl ConfigError {
    pub fn code(self) -> &'static str {
        match self {
            ConfigError::ZeroGravityInterval
            | ConfigError::ZeroSoftDropMultiplier
            | ConfigError::ZeroTickRate => "invalid_timing",
            ConfigError::PreviewTooLong
            | ConfigError::BoardWidthOutOfRange
            | ConfigError::BoardHeightOutOfRange
            | ConfigError::VanishRowsOutOfRange => "invalid_gameplay",
            ConfigError::BoardResizeWhilePlaying => "board_locked",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ConfigError::ZeroGravityInterval => "gravityMs must be greater than zero",
            ConfigError::ZeroSoftDropMultiplier => "softDropSpeed multiplier must be positive",
            ConfigError::ZeroTickRate => "tickRateHz must be greater than zero",
            ConfigError::PreviewTooLong => "previewCount must not exceed one bag",
            ConfigError::BoardWidthOutOfRange => "board width must be within 4..=40",
            ConfigError::BoardHeightOutOfRange => "board visible height must be within 4..=40",
            ConfigError::VanishRowsOutOfRange => "vanish rows must be within 0..=20",
            ConfigError::BoardResizeWhilePlaying => "board geometry can only change on init",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Lock, gravity and line-clear timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimingConfig {
    /// Grounded dwell before a forced lock.
    pub lock_delay_ms: u32,
    /// How many times movement may restart the grounded timer.
    pub lock_delay_max_resets: u32,
    /// Line clear animation time; 0 clears rows synchronously on commit.
    pub line_clear_delay_ms: u32,
    pub gravity_enabled: bool,
    /// Gravity interval per row.
    pub gravity_ms: u32,
    pub soft_drop_speed: SoftDropSpeed,
    /// Advisory only; the simulation never schedules itself.
    pub tick_rate_hz: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lock_delay_ms: DEFAULT_LOCK_DELAY_MS,
            lock_delay_max_resets: DEFAULT_LOCK_DELAY_MAX_RESETS,
            line_clear_delay_ms: DEFAULT_LINE_CLEAR_DELAY_MS,
            gravity_enabled: true,
            gravity_ms: DEFAULT_GRAVITY_MS,
            soft_drop_speed: SoftDropSpeed::default(),
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gravity_ms == 0 {
            return Err(ConfigError::ZeroGravityInterval);
        }
        if self.soft_drop_speed == SoftDropSpeed::Multiplier(0) {
            return Err(ConfigError::ZeroSoftDropMultiplier);
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }

    /// Merge a patch into a copy of this config and validate the result.
    pub fn merged(&self, patch: &TimingPatch) -> Result<Self, ConfigError> {
        let merged = Self {
            lock_delay_ms: patch.lock_delay_ms.unwrap_or(self.lock_delay_ms),
            lock_delay_max_resets: patch
                .lock_delay_max_resets
                .unwrap_or(self.lock_delay_max_resets),
            line_clear_delay_ms: patch.line_clear_delay_ms.unwrap_or(self.line_clear_delay_ms),
            gravity_enabled: patch.gravity_enabled.unwrap_or(self.gravity_enabled),
            gravity_ms: patch.gravity_ms.unwrap_or(self.gravity_ms),
            soft_drop_speed: patch.soft_drop_speed.unwrap_or(self.soft_drop_speed),
            tick_rate_hz: patch.tick_rate_hz.unwrap_or(self.tick_rate_hz),
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Nominal tick interval for callers driving `Tick` on a timer.
    pub fn tick_interval_ms(&self) -> u32 {
        (1000 / self.tick_rate_hz.max(1)).max(1)
    }
}

/// Partial timing update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimingPatch {
    pub lock_delay_ms: Option<u32>,
    pub lock_delay_max_resets: Option<u32>,
    pub line_clear_delay_ms: Option<u32>,
    pub gravity_enabled: Option<bool>,
    pub gravity_ms: Option<u32>,
    pub soft_drop_speed: Option<SoftDropSpeed>,
    pub tick_rate_hz: Option<u32>,
}

/// Playfield geometry. Fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardConfig {
    pub width: u8,
    pub visible_height: u8,
    pub vanish_rows: u8,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            visible_height: DEFAULT_VISIBLE_HEIGHT,
            vanish_rows: DEFAULT_VANISH_ROWS,
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=40).contains(&self.width) {
            return Err(ConfigError::BoardWidthOutOfRange);
        }
        if !(4..=40).contains(&self.visible_height) {
            return Err(ConfigError::BoardHeightOutOfRange);
        }
        if self.vanish_rows > 20 {
            return Err(ConfigError::VanishRowsOutOfRange);
        }
        Ok(())
    }

    pub fn total_height(&self) -> u8 {
        self.visible_height + self.vanish_rows
    }
}

/// Gameplay rules that are not timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameplayConfig {
    pub hold_enabled: bool,
    /// Length of the lookahead queue.
    pub preview_count: usize,
    pub board: BoardConfig,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            hold_enabled: true,
            preview_count: DEFAULT_PREVIEW_COUNT,
            board: BoardConfig::default(),
        }
    }
}

impl GameplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_count > MAX_PREVIEW_COUNT {
            return Err(ConfigError::PreviewTooLong);
        }
        self.board.validate()
    }

    /// Merge a patch into a copy of this config and validate the result.
    ///
    /// Board geometry is fixed once a game exists, so a patch that changes it is rejected.
    pub fn merged(&self, patch: &GameplayPatch) -> Result<Self, ConfigError> {
        if let Some(board) = patch.board {
            if board != self.board {
                return Err(ConfigError::BoardResizeWhilePlaying);
            }
        }
        let merged = Self {
            hold_enabled: patch.hold_enabled.unwrap_or(self.hold_enabled),
            preview_count: patch.preview_count.unwrap_or(self.preview_count),
            board: self.board,
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Partial gameplay update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GameplayPatch {
    pub hold_enabled: Option<bool>,
    pub preview_count: Option<usize>,
    pub board: Option<BoardConfig>,
}
