//! Mint service contract
//!
//! The controller never signs anything. It asks a service to mint and then
//! watches the outcome through an opaque handle.

use embassy_time::Duration;

use crate::config::WalletAddress;

/// Opaque transaction handle issued by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxHandle(pub u32);

/// Proof that a transaction reached the required commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Confirmed {
    pub handle: TxHandle,
}

/// Mint failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MintError {
    /// Service or chain RPC unreachable
    Network,
    /// Transaction rejected, with the service's reason code
    Rejected(u8),
    /// No confirmation within the bound
    Timeout,
    /// Service cannot mint at all (no authority, link down)
    Unavailable,
}

impl MintError {
    /// Short reason shown after "Error: "
    pub fn reason(&self) -> &'static str {
        match self {
            MintError::Network => "network",
            MintError::Rejected(_) => "rejected",
            MintError::Timeout => "timeout",
            MintError::Unavailable => "unavailable",
        }
    }
}

impl core::fmt::Display for MintError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MintError::Rejected(code) => write!(f, "rejected ({})", code),
            other => f.write_str(other.reason()),
        }
    }
}

/// Mint service client
#[allow(async_fn_in_trait)]
pub trait MintService {
    /// Submit a mint of `amount` base units to `wallet`
    async fn submit(&self, wallet: &WalletAddress, amount: u64) -> Result<TxHandle, MintError>;

    /// Wait up to `timeout` for `handle` to confirm
    async fn confirm(&self, handle: TxHandle, timeout: Duration) -> Result<Confirmed, MintError>;

    /// Token balance of `wallet` in base units
    async fn balance(&self, wallet: &WalletAddress) -> Result<u64, MintError>;
}
