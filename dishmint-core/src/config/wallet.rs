//! Player wallet addresses
//!
//! A wallet is a 32-byte ed25519 public key written in base58. The
//! configuration keeps the text for display and logging and the decoded
//! bytes for the gateway link.

use heapless::String;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Raw key length
pub const WALLET_KEY_LEN: usize = 32;

/// Longest base58 rendering of a 32-byte key
pub const MAX_WALLET_TEXT: usize = 44;

/// A validated wallet address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "String<MAX_WALLET_TEXT>",
    into = "String<MAX_WALLET_TEXT>"
)]
pub struct WalletAddress {
    text: String<MAX_WALLET_TEXT>,
    key: [u8; WALLET_KEY_LEN],
}

impl WalletAddress {
    /// Parse and validate a base58 address
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut key = [0u8; WALLET_KEY_LEN];
        let len = bs58::decode(text)
            .onto(&mut key[..])
            .map_err(|_| ConfigError::InvalidWallet)?;
        if len != WALLET_KEY_LEN {
            return Err(ConfigError::InvalidWallet);
        }
        let text = String::try_from(text).map_err(|_| ConfigError::InvalidWallet)?;
        Ok(Self { text, key })
    }

    /// Decoded public key
    pub fn key(&self) -> &[u8; WALLET_KEY_LEN] {
        &self.key
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TryFrom<String<MAX_WALLET_TEXT>> for WalletAddress {
    type Error = ConfigError;

    fn try_from(text: String<MAX_WALLET_TEXT>) -> Result<Self, Self::Error> {
        Self::parse(&text)
    }
}

impl From<WalletAddress> for String<MAX_WALLET_TEXT> {
    fn from(wallet: WalletAddress) -> Self {
        wallet.text
    }
}

impl core::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WalletAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.text.as_str());
    }
}
