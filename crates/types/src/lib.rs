//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the simulator.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, session orchestration, wire protocol).
//!
//! # Board Geometry
//!
//! The default playfield is the guideline one:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Visible height**: 20 rows (indexed 0-19, top to bottom)
//! - **Vanish zone**: 2 hidden rows above the visible area (rows -2 and -1)
//!
//! # Timing Defaults
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_LOCK_DELAY_MS` | 500 | Grounded dwell before a forced lock |
//! | `DEFAULT_LOCK_DELAY_MAX_RESETS` | 15 | Reset budget per grounded episode |
//! | `DEFAULT_LINE_CLEAR_DELAY_MS` | 0 | 0 means rows are removed synchronously |
//! | `DEFAULT_GRAVITY_MS` | 1000 | Gravity interval per row |
//! | `DEFAULT_SOFT_DROP_MULTIPLIER` | 20 | Soft drop speed multiplier |
//! | `DEFAULT_TICK_RATE_HZ` | 60 | Advisory tick rate for callers |
//!
//! # Examples
//!
//! ```
//! use tetris_sim_types::{PieceKind, Rotation, Step, DEFAULT_BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.cell_value(), 3);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Step::Tick(16).name(), "tick");
//! assert_eq!(DEFAULT_BOARD_WIDTH, 10);
//! ```

pub mod config;
pub mod step;

pub use config::{
    BoardConfig, ConfigError, GameplayConfig, GameplayPatch, SoftDropSpeed, TimingConfig,
    TimingPatch,
};
pub use step::{LockSource, MoveDirection, RepeatKind, RotateDirection, Step};

/// Simulated time in milliseconds. Supplied by the caller, never read from a clock.
pub type Timestamp = u64;

/// A board cell: `0` is empty, anything else is occupied.
pub type Cell = u8;

/// Cell value of an empty cell.
pub const EMPTY_CELL: Cell = 0;

/// Cell value used for garbage rows injected by external features.
pub const GARBAGE_CELL: Cell = 8;

/// Default board width in cells (10 columns)
pub const DEFAULT_BOARD_WIDTH: u8 = 10;

/// Default visible board height in cells (20 rows)
pub const DEFAULT_VISIBLE_HEIGHT: u8 = 20;

/// Default number of hidden rows above the visible playfield
pub const DEFAULT_VANISH_ROWS: u8 = 2;

/// Grounded dwell before a forced lock (500ms)
pub const DEFAULT_LOCK_DELAY_MS: u32 = 500;

/// Maximum number of lock timer resets per grounded episode (15)
pub const DEFAULT_LOCK_DELAY_MAX_RESETS: u32 = 15;

/// Line clear animation delay; zero removes rows synchronously
pub const DEFAULT_LINE_CLEAR_DELAY_MS: u32 = 0;

/// Gravity interval at the default speed (1000ms = 1 second per row)
pub const DEFAULT_GRAVITY_MS: u32 = 1000;

/// Soft drop speed multiplier (20x normal gravity)
pub const DEFAULT_SOFT_DROP_MULTIPLIER: u32 = 20;

/// Advisory tick rate for callers' own scheduling
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Number of upcoming pieces kept in the lookahead queue
pub const DEFAULT_PREVIEW_COUNT: usize = 5;

/// Upper bound on the lookahead queue length (one full bag)
pub const MAX_PREVIEW_COUNT: usize = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guideline_timing_defaults() {
        assert_eq!(DEFAULT_LOCK_DELAY_MS, 500);
        assert_eq!(DEFAULT_LOCK_DELAY_MAX_RESETS, 15);
        assert_eq!(DEFAULT_LINE_CLEAR_DELAY_MS, 0);
        assert_eq!(DEFAULT_GRAVITY_MS, 1000);
        assert_eq!(DEFAULT_TICK_RATE_HZ, 60);
    }

    #[test]
    fn piece_cell_values_roundtrip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_cell(kind.cell_value()), Some(kind));
        }
        assert_eq!(PieceKind::from_cell(EMPTY_CELL), None);
        assert_eq!(PieceKind::from_cell(GARBAGE_CELL), None);
    }
}

/// The seven tetromino piece kinds
///
/// Each piece has a distinct shape and a board cell tag:
/// - **I**: 1, horizontal bar
/// - **O**: 2, 2x2 square
/// - **T**: 3, T-shaped
/// - **S**: 4, S-shaped
/// - **Z**: 5, Z-shaped (mirror of S)
/// - **J**: 6, J-shaped
/// - **L**: 7, L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every piece kind, in bag order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_sim_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Board cell tag written when this piece locks.
    pub fn cell_value(&self) -> Cell {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Inverse of [`PieceKind::cell_value`]. Empty and garbage cells map to `None`.
    pub fn from_cell(cell: Cell) -> Option<Self> {
        match cell {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// - **North**: Spawn orientation (0° rotation)
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 90° counter-clockwise (270° clockwise)
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_sim_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Rotate by 180°
    pub fn rotate_half(&self) -> Self {
        self.rotate_cw().rotate_cw()
    }

    /// Apply a rotation step in the given direction
    pub fn rotate(&self, direction: RotateDirection) -> Self {
        match direction {
            RotateDirection::Cw => self.rotate_cw(),
            RotateDirection::Ccw => self.rotate_ccw(),
            RotateDirection::Half => self.rotate_half(),
        }
    }

    /// Quarter turns clockwise from North (0..=3)
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Parse rotation from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "north" | "n", "east" | "e", "south" | "s", "west" | "w"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Rotation::North),
            "east" | "e" => Some(Rotation::East),
            "south" | "s" => Some(Rotation::South),
            "west" | "w" => Some(Rotation::West),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopOutCause {
    /// A spawning (or held-in) piece overlapped existing blocks.
    BlockOut,
    /// A piece was committed with at least one cell above the visible playfield.
    LockOut,
}

impl TopOutCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopOutCause::BlockOut => "blockOut",
            TopOutCause::LockOut => "lockOut",
        }
    }
}
