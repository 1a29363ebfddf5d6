//! Core engine of the stackfall falling-block puzzle game.
//!
//! The crate is split in two layers:
//!
//! - [`core`] holds the passive data: [`Cell`], piece templates and instances
//!   ([`Piece`], [`PieceInstance`]) with their wall-kick tables, and the
//!   [`Board`].
//! - [`engine`] holds the moving parts: the 7-bag [`PieceQueue`], the
//!   [`GameConfig`], and the [`GameState`] that ties everything together.
//!
//! Rendering and input handling are left to the host; see the `stackfall-cli`
//! crate for a terminal front-end.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
