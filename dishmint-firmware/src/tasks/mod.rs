//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod buttons;
pub mod display;
pub mod link_rx;
pub mod link_tx;
pub mod reward;

pub use buttons::{button_task, press_dispatch_task, SharedMonitor};
pub use display::display_task;
pub use link_rx::link_rx_task;
pub use link_tx::link_tx_task;
pub use reward::{reward_task, Audio, Gateway, Orchestrator, Scoreboard};
