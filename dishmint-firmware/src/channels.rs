//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use dishmint_core::config::MAX_PLAYERS;
use dishmint_core::input::PressEvent;
use dishmint_drivers::gateway::ReplyQueue;
use dishmint_protocol::LinkFrame;

/// Channel capacity for debounced presses
const PRESS_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outgoing gateway frames (one full screen plus requests)
pub const LINK_TX_SIZE: usize = 16;

/// Debounced presses from the button tasks
pub static PRESS_CHANNEL: Channel<CriticalSectionRawMutex, PressEvent, PRESS_CHANNEL_SIZE> =
    Channel::new();

/// Frames queued for the gateway UART
pub static LINK_TX: Channel<CriticalSectionRawMutex, LinkFrame, LINK_TX_SIZE> = Channel::new();

/// Per-slot "pipeline triggered" signals, index = slot - 1
pub static TRIGGERED: [Signal<CriticalSectionRawMutex, ()>; MAX_PLAYERS] =
    [const { Signal::new() }; MAX_PLAYERS];

/// Per-slot gateway replies, index = slot - 1
pub static GATEWAY_REPLY: [ReplyQueue<CriticalSectionRawMutex>; MAX_PLAYERS] =
    [const { Channel::new() }; MAX_PLAYERS];
