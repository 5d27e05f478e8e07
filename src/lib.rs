//! Slide Duel (workspace facade crate).
//!
//! Re-exports the `slide_duel::{adapter,core,types}` public API while the
//! implementation lives in dedicated crates under `crates/`.

pub use slide_duel_adapter as adapter;
pub use slide_duel_core as core;
pub use slide_duel_types as types;
