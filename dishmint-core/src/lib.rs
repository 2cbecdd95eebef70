//! Board-agnostic core logic for the dishmint reward controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration types and validation
//! - Button debouncing and press arbitration
//! - The per-player reward state machine and its async driver
//! - Collaborator traits (audio output, mint service, display observer)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod input;
pub mod reward;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod fixtures;
