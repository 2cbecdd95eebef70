//! Display observer trait
//!
//! The orchestrator pushes `(player, count, status)` updates; the presenter
//! owns everything about how they look.

use crate::config::PlayerId;

use super::mint::MintError;

/// Transient status shown while a pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Minting,
    Sending,
    Confirming,
    Success,
    Failed(MintError),
}

impl Status {
    /// Status line text, e.g. `Sending tx...` or `Error: timeout`
    pub fn write_label<W: core::fmt::Write>(&self, out: &mut W) -> core::fmt::Result {
        match self {
            Status::Minting => out.write_str("Minting..."),
            Status::Sending => out.write_str("Sending tx..."),
            Status::Confirming => out.write_str("Confirming..."),
            Status::Success => out.write_str("Success!"),
            Status::Failed(err) => write!(out, "Error: {}", err.reason()),
        }
    }
}

/// One notification to the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerUpdate {
    pub player: PlayerId,
    /// Confirmed token count
    pub count: u64,
    /// `None` clears the player's status
    pub status: Option<Status>,
}

/// Receives pipeline progress; must not block
pub trait RewardObserver {
    fn on_update(&self, update: PlayerUpdate);
}

impl<T: RewardObserver + ?Sized> RewardObserver for &T {
    fn on_update(&self, update: PlayerUpdate) {
        (**self).on_update(update)
    }
}
