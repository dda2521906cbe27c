//! Protocol module - JSON wire form of steps and observations
//!
//! Steps travel as line-delimited JSON objects tagged by `type`, using the
//! camelCase step names (`tick`, `hardDrop`, `retryPendingLock`, ...).
//! Observations are the flattened read-only view of one snapshot.
//!
//! ```text
//! {"type":"init","seed":7,"timing":{"lockDelayMs":500,"softDropSpeed":"infinite"}}
//! {"type":"spawn"}
//! {"type":"move","direction":"left","repeat":"das"}
//! {"type":"rotate","direction":"cw"}
//! {"type":"tick","now":1000}
//! {"type":"hardDrop","now":1016}
//! {"type":"commitLock"}
//! {"type":"updateTiming","gravityMs":500}
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tetris_sim_core::{ActiveSnapshot, GameSnapshot, GameState};
use tetris_sim_types::{
    BoardConfig, GameplayConfig, GameplayPatch, LockSource, MoveDirection, PieceKind, RepeatKind,
    RotateDirection, Rotation, SoftDropSpeed, Step, Timestamp, TimingConfig, TimingPatch,
};

// ============== String-valued enums ==============

/// Newtype over a core enum that travels as a case-insensitive string
macro_rules! wire_str_enum {
    ($(#[$meta:meta])* $name:ident($inner:ty), $expecting:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub $inner);

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.0.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                <$inner>::from_str(&s)
                    .map($name)
                    .ok_or_else(|| serde::de::Error::custom(concat!("invalid ", $expecting)))
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                $name(value)
            }
        }
    };
}

wire_str_enum!(
    /// Piece kind: `"i"`, `"o"`, `"t"`, `"s"`, `"z"`, `"j"`, `"l"`
    Piece(PieceKind),
    "piece kind"
);
wire_str_enum!(
    /// Orientation: `"north"`, `"east"`, `"south"`, `"west"`
    WireRotation(Rotation),
    "rotation"
);
wire_str_enum!(
    /// Lateral direction: `"left"` or `"right"`
    Direction(MoveDirection),
    "move direction"
);
wire_str_enum!(
    /// Move origin: `"tap"`, `"das"` or `"arr"`
    Repeat(RepeatKind),
    "repeat kind"
);
wire_str_enum!(
    /// Rotation input: `"cw"`, `"ccw"` or `"180"`
    Spin(RotateDirection),
    "rotate direction"
);
wire_str_enum!(
    /// Lock trigger: `"hardDrop"`, `"softDrop"` or `"gravity"`
    Source(LockSource),
    "lock source"
);

impl Default for Repeat {
    fn default() -> Self {
        Repeat(RepeatKind::Tap)
    }
}

/// Soft drop speed: a positive multiplier, or the string `"infinite"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireSoftDropSpeed(pub SoftDropSpeed);

impl Serialize for WireSoftDropSpeed {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            SoftDropSpeed::Multiplier(n) => serializer.serialize_u32(n),
            SoftDropSpeed::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

impl<'de> Deserialize<'de> for WireSoftDropSpeed {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = WireSoftDropSpeed;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a soft drop multiplier or \"infinite\"")
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u32::try_from(v)
                    .map(|n| WireSoftDropSpeed(SoftDropSpeed::Multiplier(n)))
                    .map_err(|_| E::custom("soft drop multiplier too large"))
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map_err(|_| E::custom("soft drop multiplier must be positive"))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.eq_ignore_ascii_case("infinite") {
                    Ok(WireSoftDropSpeed(SoftDropSpeed::Infinite))
                } else {
                    Err(E::custom("invalid soft drop speed"))
                }
            }
        }

        deserializer.deserialize_any(V)
    }
}

// ============== Configuration ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireTiming {
    pub lock_delay_ms: u32,
    pub lock_delay_max_resets: u32,
    pub line_clear_delay_ms: u32,
    pub gravity_enabled: bool,
    pub gravity_ms: u32,
    pub soft_drop_speed: WireSoftDropSpeed,
    pub tick_rate_hz: u32,
}

impl Default for WireTiming {
    fn default() -> Self {
        TimingConfig::default().into()
    }
}

impl From<TimingConfig> for WireTiming {
    fn from(value: TimingConfig) -> Self {
        Self {
            lock_delay_ms: value.lock_delay_ms,
            lock_delay_max_resets: value.lock_delay_max_resets,
            line_clear_delay_ms: value.line_clear_delay_ms,
            gravity_enabled: value.gravity_enabled,
            gravity_ms: value.gravity_ms,
            soft_drop_speed: WireSoftDropSpeed(value.soft_drop_speed),
            tick_rate_hz: value.tick_rate_hz,
        }
    }
}

impl From<WireTiming> for TimingConfig {
    fn from(value: WireTiming) -> Self {
        Self {
            lock_delay_ms: value.lock_delay_ms,
            lock_delay_max_resets: value.lock_delay_max_resets,
            line_clear_delay_ms: value.line_clear_delay_ms,
            gravity_enabled: value.gravity_enabled,
            gravity_ms: value.gravity_ms,
            soft_drop_speed: value.soft_drop_speed.0,
            tick_rate_hz: value.tick_rate_hz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireBoardConfig {
    pub width: u8,
    pub visible_height: u8,
    pub vanish_rows: u8,
}

impl Default for WireBoardConfig {
    fn default() -> Self {
        BoardConfig::default().into()
    }
}

impl From<BoardConfig> for WireBoardConfig {
    fn from(value: BoardConfig) -> Self {
        Self {
            width: value.width,
            visible_height: value.visible_height,
            vanish_rows: value.vanish_rows,
        }
    }
}

impl From<WireBoardConfig> for BoardConfig {
    fn from(value: WireBoardConfig) -> Self {
        Self {
            width: value.width,
            visible_height: value.visible_height,
            vanish_rows: value.vanish_rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGameplay {
    pub hold_enabled: bool,
    pub preview_count: usize,
    pub board: WireBoardConfig,
}

impl Default for WireGameplay {
    fn default() -> Self {
        GameplayConfig::default().into()
    }
}

impl From<GameplayConfig> for WireGameplay {
    fn from(value: GameplayConfig) -> Self {
        Self {
            hold_enabled: value.hold_enabled,
            preview_count: value.preview_count,
            board: value.board.into(),
        }
    }
}

impl From<WireGameplay> for GameplayConfig {
    fn from(value: WireGameplay) -> Self {
        Self {
            hold_enabled: value.hold_enabled,
            preview_count: value.preview_count,
            board: value.board.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireTimingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_delay_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_delay_max_resets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_clear_delay_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_drop_speed: Option<WireSoftDropSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_rate_hz: Option<u32>,
}

impl From<TimingPatch> for WireTimingPatch {
    fn from(value: TimingPatch) -> Self {
        Self {
            lock_delay_ms: value.lock_delay_ms,
            lock_delay_max_resets: value.lock_delay_max_resets,
            line_clear_delay_ms: value.line_clear_delay_ms,
            gravity_enabled: value.gravity_enabled,
            gravity_ms: value.gravity_ms,
            soft_drop_speed: value.soft_drop_speed.map(WireSoftDropSpeed),
            tick_rate_hz: value.tick_rate_hz,
        }
    }
}

impl From<WireTimingPatch> for TimingPatch {
    fn from(value: WireTimingPatch) -> Self {
        Self {
            lock_delay_ms: value.lock_delay_ms,
            lock_delay_max_resets: value.lock_delay_max_resets,
            line_clear_delay_ms: value.line_clear_delay_ms,
            gravity_enabled: value.gravity_enabled,
            gravity_ms: value.gravity_ms,
            soft_drop_speed: value.soft_drop_speed.map(|speed| speed.0),
            tick_rate_hz: value.tick_rate_hz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGameplayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<WireBoardConfig>,
}

impl From<GameplayPatch> for WireGameplayPatch {
    fn from(value: GameplayPatch) -> Self {
        Self {
            hold_enabled: value.hold_enabled,
            preview_count: value.preview_count,
            board: value.board.map(Into::into),
        }
    }
}

impl From<WireGameplayPatch> for GameplayPatch {
    fn from(value: WireGameplayPatch) -> Self {
        Self {
            hold_enabled: value.hold_enabled,
            preview_count: value.preview_count,
            board: value.board.map(Into::into),
        }
    }
}

// ============== Steps ==============

/// One step message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireStep {
    Init {
        seed: u32,
        #[serde(default)]
        timing: WireTiming,
        #[serde(default)]
        gameplay: WireGameplay,
    },
    Tick {
        now: Timestamp,
    },
    Spawn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        piece: Option<Piece>,
    },
    Move {
        direction: Direction,
        #[serde(default)]
        repeat: Repeat,
    },
    Rotate {
        direction: Spin,
    },
    HardDrop {
        now: Timestamp,
    },
    SoftDrop {
        on: bool,
    },
    Hold,
    Lock {
        now: Timestamp,
    },
    CommitLock,
    RetryPendingLock {
        now: Timestamp,
    },
    StartLineClear {
        rows: Vec<i8>,
        now: Timestamp,
    },
    CompleteLineClear,
    ClearLines {
        rows: Vec<i8>,
    },
    UpdateTiming(WireTimingPatch),
    UpdateGameplay(WireGameplayPatch),
}

impl From<WireStep> for Step {
    fn from(value: WireStep) -> Self {
        match value {
            WireStep::Init {
                seed,
                timing,
                gameplay,
            } => Step::Init {
                seed,
                timing: timing.into(),
                gameplay: gameplay.into(),
            },
            WireStep::Tick { now } => Step::Tick(now),
            WireStep::Spawn { piece } => Step::Spawn(piece.map(|piece| piece.0)),
            WireStep::Move { direction, repeat } => Step::Move(direction.0, repeat.0),
            WireStep::Rotate { direction } => Step::Rotate(direction.0),
            WireStep::HardDrop { now } => Step::HardDrop(now),
            WireStep::SoftDrop { on } => Step::SoftDrop(on),
            WireStep::Hold => Step::Hold,
            WireStep::Lock { now } => Step::Lock(now),
            WireStep::CommitLock => Step::CommitLock,
            WireStep::RetryPendingLock { now } => Step::RetryPendingLock(now),
            WireStep::StartLineClear { rows, now } => Step::StartLineClear(rows, now),
            WireStep::CompleteLineClear => Step::CompleteLineClear,
            WireStep::ClearLines { rows } => Step::ClearLines(rows),
            WireStep::UpdateTiming(patch) => Step::UpdateTiming(patch.into()),
            WireStep::UpdateGameplay(patch) => Step::UpdateGameplay(patch.into()),
        }
    }
}

impl From<&Step> for WireStep {
    fn from(value: &Step) -> Self {
        match value {
            Step::Init {
                seed,
                timing,
                gameplay,
            } => WireStep::Init {
                seed: *seed,
                timing: (*timing).into(),
                gameplay: (*gameplay).into(),
            },
            Step::Tick(now) => WireStep::Tick { now: *now },
            Step::Spawn(piece) => WireStep::Spawn {
                piece: piece.map(Piece),
            },
            Step::Move(direction, repeat) => WireStep::Move {
                direction: Direction(*direction),
                repeat: Repeat(*repeat),
            },
            Step::Rotate(direction) => WireStep::Rotate {
                direction: Spin(*direction),
            },
            Step::HardDrop(now) => WireStep::HardDrop { now: *now },
            Step::SoftDrop(on) => WireStep::SoftDrop { on: *on },
            Step::Hold => WireStep::Hold,
            Step::Lock(now) => WireStep::Lock { now: *now },
            Step::CommitLock => WireStep::CommitLock,
            Step::RetryPendingLock(now) => WireStep::RetryPendingLock { now: *now },
            Step::StartLineClear(rows, now) => WireStep::StartLineClear {
                rows: rows.clone(),
                now: *now,
            },
            Step::CompleteLineClear => WireStep::CompleteLineClear,
            Step::ClearLines(rows) => WireStep::ClearLines { rows: rows.clone() },
            Step::UpdateTiming(patch) => WireStep::UpdateTiming((*patch).into()),
            Step::UpdateGameplay(patch) => WireStep::UpdateGameplay((*patch).into()),
        }
    }
}

/// Parse one step message
pub fn parse_step(line: &str) -> Result<Step> {
    let wire: WireStep = serde_json::from_str(line.trim())
        .with_context(|| format!("invalid step message: {}", line.trim()))?;
    Ok(wire.into())
}

/// Encode one step as a single JSON line (no trailing newline)
pub fn encode_step(step: &Step) -> Result<String> {
    serde_json::to_string(&WireStep::from(step)).context("failed to encode step")
}

/// Parse line-delimited step messages
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_step_lines(input: &str) -> Result<Vec<Step>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| parse_step(line).with_context(|| format!("line {}", index + 1)))
        .collect()
}

// ============== Observations ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardObservation {
    pub width: u8,
    pub visible_height: u8,
    pub vanish_rows: u8,
    /// Rows top to bottom, vanish zone first.
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveObservation {
    pub kind: Piece,
    pub rotation: WireRotation,
    pub x: i8,
    pub y: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockDelayObservation {
    pub grounded: bool,
    pub dwell_ms: u64,
    pub resets: u32,
    pub max_resets: u32,
    pub delay_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingObservation {
    pub piece: Piece,
    pub position: ActiveObservation,
    pub completed_lines: Vec<i8>,
    pub source: Source,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsObservation {
    pub pieces_placed: u32,
    pub lines_cleared: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub tetrises: u32,
    pub hard_drop_locks: u32,
    pub soft_drop_locks: u32,
    pub gravity_locks: u32,
    pub holds: u32,
    pub retries: u32,
    pub session_ms: u64,
    pub average_lock_dwell_ms: Option<u64>,
    pub pieces_per_second: f64,
}

/// Read-only view of one snapshot for collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_out: Option<String>,
    pub board: BoardObservation,
    pub active: Option<ActiveObservation>,
    pub ghost_y: Option<i8>,
    pub lock_delay: LockDelayObservation,
    pub pending: Option<PendingObservation>,
    pub clearing_rows: Vec<i8>,
    pub hold: Option<Piece>,
    pub can_hold: bool,
    pub next_queue: Vec<Piece>,
    pub soft_dropping: bool,
    pub seed: u32,
    pub piece_index: u32,
    pub now: Timestamp,
    pub stats: StatsObservation,
}

impl Observation {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        let width = snapshot.width.max(1) as usize;
        let stats = &snapshot.stats;
        let active = |piece: ActiveSnapshot| ActiveObservation {
            kind: Piece(piece.kind),
            rotation: WireRotation(piece.rotation),
            x: piece.x,
            y: piece.y,
        };

        Self {
            status: snapshot.status.to_string(),
            top_out: snapshot.top_out.map(|cause| cause.as_str().to_string()),
            board: BoardObservation {
                width: snapshot.width,
                visible_height: snapshot.visible_height,
                vanish_rows: snapshot.vanish_rows,
                cells: snapshot.board.chunks(width).map(<[u8]>::to_vec).collect(),
            },
            active: snapshot.active.map(active),
            ghost_y: snapshot.ghost_y,
            lock_delay: LockDelayObservation {
                grounded: snapshot.lock_delay.grounded,
                dwell_ms: snapshot.lock_delay.dwell_ms,
                resets: snapshot.lock_delay.resets,
                max_resets: snapshot.lock_delay.max_resets,
                delay_ms: snapshot.lock_delay.delay_ms,
            },
            pending: snapshot.pending.as_ref().map(|pending| PendingObservation {
                piece: Piece(pending.piece),
                position: active(pending.final_position),
                completed_lines: pending.completed_lines.clone(),
                source: Source(pending.source),
                timestamp: pending.timestamp,
            }),
            clearing_rows: snapshot.clearing_rows.clone(),
            hold: snapshot.hold.map(Piece),
            can_hold: snapshot.can_hold,
            next_queue: snapshot.next_queue.iter().copied().map(Piece).collect(),
            soft_dropping: snapshot.soft_dropping,
            seed: snapshot.seed,
            piece_index: snapshot.piece_index,
            now: snapshot.now,
            stats: StatsObservation {
                pieces_placed: stats.pieces_placed,
                lines_cleared: stats.lines_cleared,
                singles: stats.clears[0],
                doubles: stats.clears[1],
                triples: stats.clears[2],
                tetrises: stats.clears[3],
                hard_drop_locks: stats.lock_count(LockSource::HardDrop),
                soft_drop_locks: stats.lock_count(LockSource::SoftDrop),
                gravity_locks: stats.lock_count(LockSource::Gravity),
                holds: stats.holds,
                retries: stats.retries,
                session_ms: stats.session_ms,
                average_lock_dwell_ms: stats.average_lock_dwell_ms(),
                pieces_per_second: stats.pieces_per_second(),
            },
        }
    }

    pub fn from_state(state: &GameState) -> Self {
        Self::from_snapshot(&state.snapshot())
    }

    /// Single-line JSON encoding
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to encode observation")
    }
}
