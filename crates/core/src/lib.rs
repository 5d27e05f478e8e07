//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the puzzle rules, random generation, per-session state
//! and the process-wide session coordinator. It has **no dependencies** on
//! networking or I/O: the transport reaches participants through the
//! [`Connection`] trait and drives the coordinator with typed calls.
//!
//! - **Deterministic**: Same seed produces identical codes, boards and goals
//! - **Testable**: Every operation is a plain method on owned state
//! - **Portable**: Any transport that can deliver a [`Notice`] can host a race
//!
//! # Module Structure
//!
//! - [`board`]: 5x5 sliding-tile board, move validation and goal matching
//! - [`pattern`]: Random starting layouts and goal patterns under a per-color cap
//! - [`session`]: Two private boards sharing one goal, win detection
//! - [`coordinator`]: Participant codes, pairing, routing and disconnect cleanup
//! - [`rng`]: Seedable LCG used by every random decision
//!
//! # Game Rules
//!
//! - Each participant gets a copy of the same random 5x5 board with one empty slot
//! - A tile next to the empty slot (no diagonals) may slide into it
//! - The first board whose center 3x3 equals the shared goal wins
//!
//! # Example
//!
//! ```
//! use slide_duel_core::{Connection, Notice, SessionCoordinator};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct Inbox(Arc<Mutex<Vec<Notice>>>);
//!
//! impl Connection for Inbox {
//!     fn deliver(&self, notice: Notice) -> bool {
//!         self.0.lock().unwrap().push(notice);
//!         true
//!     }
//! }
//!
//! let mut coord = SessionCoordinator::with_seed(7);
//! let (inbox_a, inbox_b) = (Inbox::default(), Inbox::default());
//! let a = coord.register_connection(inbox_a.clone());
//! let b = coord.register_connection(inbox_b.clone());
//!
//! coord.request_pairing(a, b).unwrap();
//! assert!(matches!(inbox_b.0.lock().unwrap().last(), Some(Notice::StartGame(_))));
//!
//! coord.handle_disconnect(a);
//! assert_eq!(inbox_b.0.lock().unwrap().last(), Some(&Notice::OpponentDisconnected));
//! ```

pub mod board;
pub mod coordinator;
pub mod pattern;
pub mod rng;
pub mod session;

pub use slide_duel_types as types;

// Re-export commonly used types for convenience
pub use board::{BoardError, GoalPattern, PuzzleBoard};
pub use coordinator::{Connection, Notice, PairingError, SessionCoordinator};
pub use pattern::{Dealer, PatternGenerator};
pub use rng::SimpleRng;
pub use session::{GameSession, InitData, SessionId};
