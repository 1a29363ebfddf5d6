//! Game engine logic and state management.
//!
//! This module builds the playable game on top of the [`core`](crate::core)
//! data structures:
//!
//! - [`GameState`] - board, floating piece, hold slot and upcoming queue,
//!   with every player-facing operation
//! - [`PieceQueue`] - 7-bag piece generation
//! - [`PieceSeed`] - seed for deterministic piece generation
//! - [`GameConfig`] - board dimensions, spawn position and preview length
//!
//! # Game Flow
//!
//! 1. Create a [`GameState`] (optionally with a seed or a custom config)
//! 2. The host maps input onto shifts, rotations, drops and holds
//! 3. [`GameState::lock`] merges the piece and spawns the next one
//! 4. [`GameState::clear_lines`] collapses full rows
//! 5. A `false` from `lock` (or `hold`) means the new piece could not spawn;
//!    the state switches to [`GameStatus::ToppedOut`]
//!
//! # Example
//!
//! ```
//! use stackfall_engine::GameState;
//!
//! let mut game = GameState::new();
//!
//! game.left_shift();
//! game.rotate_clockwise();
//! game.hard_drop();
//!
//! if !game.lock() {
//!     println!("Game over!");
//! }
//! game.clear_lines();
//! ```

pub use self::{config::*, game_state::*, piece_queue::*};

mod config;
mod game_state;
mod piece_queue;
