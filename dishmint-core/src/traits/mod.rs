//! Collaborator traits
//!
//! These traits define the seams between the reward logic and the things
//! it drives: the audio module, the mint service and the display.

pub mod audio;
pub mod display;
pub mod mint;

pub use audio::{AudioOutput, ChannelError};
pub use display::{PlayerUpdate, RewardObserver, Status};
pub use mint::{Confirmed, MintError, MintService, TxHandle};
