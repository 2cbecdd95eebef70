//! MP3 module over a serial port
//!
//! The module speaks the fixed 10-byte frame format from
//! [`dishmint_protocol::audio`] at 9600 baud 8N1. It silently drops a
//! command that arrives too soon after the previous one, so the channel
//! holds the bus for a short gap after every write.

mod channel;

pub use channel::{ChannelConfig, SerialCommandChannel};
pub use dishmint_core::traits::ChannelError;
