//! Gateway link clients
//!
//! The gateway holds the mint authority, talks to the chain RPC and paints
//! the TFT. [`GatewayClient`] is the controller side of the minting role and
//! [`GatewayDisplay`] the scoreboard backend. Both only queue frames; the
//! firmware's link tasks move bytes on the UART and feed received events
//! back through [`GatewayClient::route`].

mod client;
mod display;

pub use client::{
    reject_to_error, GatewayClient, GatewayTimeouts, ReplyQueue, RouteError, REPLY_DEPTH,
};
pub use display::GatewayDisplay;
