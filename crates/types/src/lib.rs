//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the server.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (board logic, session coordination, wire protocol).
//!
//! # Board Dimensions
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BOARD_SIDE` | 5 | Each participant plays on a 5x5 grid |
//! | `GOAL_SIDE` | 3 | The goal pattern is a 3x3 grid |
//! | `GOAL_OFFSET` | 1 | The goal is compared against board cells (1,1)..=(3,3) |
//! | `COLOR_COUNT` | 6 | Tile colors are `0..6` |
//! | `COLOR_CAP` | 4 | No color may appear more than 4 times |
//!
//! A board holds 24 colored tiles and one empty slot (`EMPTY_CELL`).
//! Since `6 * 4 == 24`, a full board always holds exactly four tiles of each color.
//!
//! # Participant Codes
//!
//! Participants are identified by a six-digit code. The server only ever
//! allocates codes in `ID_MIN..=ID_MAX`, but any six ASCII digits form a
//! well-formed code.
//!
//! # Examples
//!
//! ```
//! use slide_duel_types::{ParticipantId, Pos, BOARD_SIDE};
//!
//! let id: ParticipantId = "222222".parse().unwrap();
//! assert_eq!(id.get(), 222_222);
//! assert_eq!(id.to_string(), "222222");
//!
//! assert!("22222".parse::<ParticipantId>().is_err());
//! assert!("22a222".parse::<ParticipantId>().is_err());
//!
//! let pos = Pos::new(4, 0).unwrap();
//! assert_eq!(pos.x() as usize, BOARD_SIDE - 1);
//! assert_eq!(Pos::new(5, 0), None);
//! ```

use std::fmt;
use std::str::FromStr;

/// Board side length in cells (5 columns, 5 rows)
pub const BOARD_SIDE: usize = 5;

/// Goal pattern side length in cells
pub const GOAL_SIDE: usize = 3;

/// Offset of the goal window inside the board (both axes)
pub const GOAL_OFFSET: usize = 1;

/// Number of distinct tile colors
pub const COLOR_COUNT: u8 = 6;

/// Maximum number of tiles of a single color
pub const COLOR_CAP: u8 = 4;

/// Marker value for the empty slot
pub const EMPTY_CELL: Cell = -1;

/// Number of digits in a participant code
pub const ID_DIGITS: usize = 6;

/// Lowest participant code handed out by the server
pub const ID_MIN: u32 = 100_000;

/// Highest participant code handed out by the server
pub const ID_MAX: u32 = 999_999;

/// A board cell: a color in `0..COLOR_COUNT`, or `EMPTY_CELL`
pub type Cell = i8;

/// Full board layout, row-major: `layout[y][x]`
pub type Layout = [[Cell; BOARD_SIDE]; BOARD_SIDE];

/// Goal pattern, row-major: `goal[y][x]`
pub type Goal = [[Cell; GOAL_SIDE]; GOAL_SIDE];

/// Returns true if `cell` is a tile color (not the empty slot).
#[inline]
pub fn is_color(cell: Cell) -> bool {
    (0..COLOR_COUNT as Cell).contains(&cell)
}

/// A position on the 5x5 board.
///
/// Fields are private so every `Pos` in circulation is on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pos {
    x: u8,
    y: u8,
}

impl Pos {
    /// Build a position, rejecting anything outside the board.
    ///
    /// Takes wide signed integers so raw wire values can be checked directly.
    pub fn new(x: i64, y: i64) -> Option<Self> {
        let side = BOARD_SIDE as i64;
        if !(0..side).contains(&x) || !(0..side).contains(&y) {
            return None;
        }
        Some(Self {
            x: x as u8,
            y: y as u8,
        })
    }

    /// Column, 0..5 left to right.
    pub fn x(self) -> u8 {
        self.x
    }

    /// Row, 0..5 top to bottom.
    pub fn y(self) -> u8 {
        self.y
    }

    /// Every board position in reading order.
    pub fn all() -> impl Iterator<Item = Pos> {
        let side = BOARD_SIDE as u8;
        (0..side).flat_map(move |y| (0..side).map(move |x| Pos { x, y }))
    }

    /// Orthogonal neighbors that lie on the board.
    pub fn neighbors(self) -> impl Iterator<Item = Pos> {
        const DELTAS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
        DELTAS
            .into_iter()
            .filter_map(move |(dx, dy)| Pos::new(self.x as i64 + dx, self.y as i64 + dy))
    }

    /// True if `other` is directly above, below, left or right of `self`.
    pub fn is_adjacent(self, other: Pos) -> bool {
        let dx = (self.x as i16 - other.x as i16).abs();
        let dy = (self.y as i16 - other.y as i16).abs();
        dx + dy == 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Six-digit participant code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(u32);

impl ParticipantId {
    /// Wrap a numeric code. Returns None if it does not fit in six digits.
    pub fn new(value: u32) -> Option<Self> {
        if value > ID_MAX {
            return None;
        }
        Some(Self(value))
    }

    /// Parse a code made of exactly six ASCII digits.
    pub fn parse(value: &str) -> Result<Self, ParticipantIdError> {
        let found = value.chars().count();
        if found != ID_DIGITS {
            return Err(ParticipantIdError::InvalidLength {
                expected: ID_DIGITS,
                found,
            });
        }
        let mut code = 0u32;
        for (index, ch) in value.chars().enumerate() {
            let Some(digit) = ch.to_digit(10) else {
                return Err(ParticipantIdError::InvalidCharacter { ch, index });
            };
            code = code * 10 + digit;
        }
        Ok(Self(code))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = ParticipantIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Why a string is not a well-formed participant code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantIdError {
    InvalidLength { expected: usize, found: usize },
    InvalidCharacter { ch: char, index: usize },
}

impl fmt::Display for ParticipantIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantIdError::InvalidLength { expected, found } => {
                write!(f, "participant code must be {expected} digits, got {found}")
            }
            ParticipantIdError::InvalidCharacter { ch, index } => {
                write!(f, "invalid character '{ch}' at position {index}")
            }
        }
    }
}

impl std::error::Error for ParticipantIdError {}
