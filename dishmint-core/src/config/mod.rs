//! Configuration types
//!
//! Board-agnostic configuration structures, authored as TOML and stored in
//! flash as postcard binary data.

pub mod types;
pub mod wallet;

pub use types::*;
pub use wallet::{WalletAddress, MAX_WALLET_TEXT, WALLET_KEY_LEN};
