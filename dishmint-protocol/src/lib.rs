//! Wire formats for the Dishmint controller
//!
//! Two serial links leave the controller:
//!
//! - [`audio`]: fixed 10-byte command/report frames for the MP3 module
//!   (`7E FF 06 OP FB P1 P2 CH CL EF`, 9600 baud).
//! - [`link`] + [`messages`]: variable-length frames to the gateway that
//!   holds the mint authority and paints the scoreboard.
//!
//! Everything here is pure data transformation: no I/O, no allocation,
//! fuzzable on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod audio;
pub mod link;
pub mod messages;

pub use audio::{AudioCommand, FrameError, FrameReader, ParsedFrame, FRAME_LEN};
pub use link::{LinkError, LinkFrame, LinkParser, MAX_LINK_PAYLOAD};
pub use messages::{GatewayEvent, GatewayRequest, NO_HANDLE, WALLET_LEN};
