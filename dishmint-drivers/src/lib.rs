//! Peripheral drivers
//!
//! This crate provides concrete implementations of the traits defined
//! in dishmint-core:
//!
//! - Serial MP3 module command channel ([`audio::SerialCommandChannel`])
//! - Gateway link mint client and scoreboard backend
//!   ([`gateway::GatewayClient`], [`gateway::GatewayDisplay`])

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod audio;
pub mod gateway;
