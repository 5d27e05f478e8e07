//! Adapter module - duel clients over a TCP socket with JSON protocol
//!
//! This module connects browser and bot clients to the session coordinator.
//! It owns sockets, framing and serialization; all game decisions are made
//! by [`core::SessionCoordinator`].
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:3000)
//! 2. **Code**: Server immediately sends `self_id` with a six-digit code
//! 3. **Pairing**: Client sends `play` with a friend's code; both get `start_game`
//! 4. **Racing**: Each client sends `move_tile` on its own board and `test_win` after moves
//! 5. **Ending**: Both get `game_end`, or the survivor gets `opponent_disconnected`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **play**: Pair with `opponentId`
//! - **move_tile**: Slide the tile at `x`, `y` into the empty slot
//! - **test_win**: Ask the server to check both boards against the goal
//!
//! ## Server → Client
//!
//! - **self_id**: The connection's own code
//! - **start_game**: Own board (`table`), empty slot (`eptX`, `eptY`) and `goal`
//! - **game_end**: `win` is true for the winner only
//! - **opponent_disconnected**, **already_playing**, **not_self**, **not_exist_id**
//! - **error**: Malformed or unknown message, with code and message
//!
//! # Environment Variables
//!
//! - `SLIDE_DUEL_HOST`: Bind address (default: "127.0.0.1")
//! - `SLIDE_DUEL_PORT` or `PORT`: Port number (default: 3000)
//! - `SLIDE_DUEL_SEED`: Fixed seed for codes and boards
//! - `SLIDE_DUEL_LOG_PATH`: Append every wire line to this file
//!
//! # Example Protocol Flow
//!
//! ```text
//! Server -> A: {"type":"self_id","id":"482913"}
//! Server -> B: {"type":"self_id","id":"730155"}
//! A -> Server: {"type":"play","opponentId":"730155"}
//! Server -> A: {"type":"start_game","table":[[...],...],"eptX":3,"eptY":0,"goal":[[...],...]}
//! Server -> B: {"type":"start_game","table":[[...],...],"eptX":3,"eptY":0,"goal":[[...],...]}
//! B -> Server: {"type":"move_tile","x":3,"y":1}
//! B -> Server: {"type":"test_win"}
//! ```
//!
//! # Testing
//!
//! Connect to the server using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 3000
//! {"type":"play","opponentId":"123456"}
//! ```

pub mod protocol;
pub mod server;

pub use slide_duel_core as core;
pub use slide_duel_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use server::*;
