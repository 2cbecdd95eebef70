//! Scoreboard rendering for the dishmint controller
//!
//! This crate provides:
//! - [`DisplayState`]: per-player count and transient status, last write wins
//! - [`Screen`]: a character buffer and the scoreboard layout
//! - [`DisplayBackend`]: whatever actually paints characters
//! - [`Presenter`]: the [`RewardObserver`](dishmint_core::traits::RewardObserver)
//!   that ties the three together
//!
//! # Layout
//!
//! ```text
//! Who unloaded
//! the dishwasher?
//! Press to mint tokens
//! Player 1 (3)
//! Sam (12)
//!
//!
//! Confirming...
//! ```

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod presenter;
pub mod screen;
pub mod state;

#[cfg(test)]
mod fixtures;

// Re-export key types
pub use backend::{render, DisplayBackend, DisplayError};
pub use presenter::Presenter;
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
pub use state::{DisplayState, PlayerRow};
