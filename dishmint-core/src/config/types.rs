//! Configuration type definitions
//!
//! The device configuration is written as `device.toml`, validated at build
//! time and embedded into the firmware as postcard binary data. It is
//! immutable once the controller is running.

use embassy_time::Duration;
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use super::wallet::WalletAddress;

/// Maximum number of players (one button each)
pub const MAX_PLAYERS: usize = 4;

/// Maximum player name length
pub const MAX_NAME_LEN: usize = 12;

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Highest volume accepted by the audio module
pub const MAX_VOLUME: u8 = 30;

/// Highest folder number on the SD card (`/01` .. `/99`)
pub const MAX_FOLDER: u8 = 99;

/// Track numbers are 1-based and fit the one-byte folder-track argument
pub const MAX_TRACK: u16 = 255;

/// Player slot number, 1-based
pub type PlayerId = u8;

/// Zero-based table index for `slot`, if it is a valid slot number
pub fn slot_index(slot: PlayerId) -> Option<usize> {
    let index = (slot as usize).checked_sub(1)?;
    (index < MAX_PLAYERS).then_some(index)
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Wallet is not a base58-encoded 32-byte key
    InvalidWallet,
    /// No players configured
    NoPlayers,
    /// Slot numbers must run 1..=N
    SlotOutOfRange(PlayerId),
    /// Two players share a slot
    DuplicateSlot(PlayerId),
    /// Two players share a button pin
    DuplicatePin(u8),
    /// Two players share a wallet
    DuplicateWallet(PlayerId),
    /// GPIO number does not exist
    InvalidPin(u8),
    /// Track is 0 or above 255
    InvalidTrack(PlayerId),
    /// Folder above 99
    InvalidFolder(PlayerId),
    /// Volume above 30
    InvalidVolume(u8),
    /// Mint amount must be positive
    ZeroAmount,
    /// `amount * 10^decimals` does not fit in u64
    AmountOverflow,
    /// Confirmation timeout must be positive
    ZeroTimeout,
    /// Embedded binary configuration could not be decoded
    Decode,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidWallet => f.write_str("wallet is not a base58 32-byte key"),
            ConfigError::NoPlayers => f.write_str("no players configured"),
            ConfigError::SlotOutOfRange(s) => write!(f, "player slot {} out of range", s),
            ConfigError::DuplicateSlot(s) => write!(f, "player slot {} used twice", s),
            ConfigError::DuplicatePin(p) => write!(f, "GPIO{} assigned to two players", p),
            ConfigError::DuplicateWallet(s) => write!(f, "player {} reuses another wallet", s),
            ConfigError::InvalidPin(p) => write!(f, "GPIO{} does not exist", p),
            ConfigError::InvalidTrack(s) => write!(f, "player {} track must be 1-255", s),
            ConfigError::InvalidFolder(s) => write!(f, "player {} folder must be 0-99", s),
            ConfigError::InvalidVolume(v) => write!(f, "volume {} above 30", v),
            ConfigError::ZeroAmount => f.write_str("mint amount must be positive"),
            ConfigError::AmountOverflow => f.write_str("amount with decimals overflows u64"),
            ConfigError::ZeroTimeout => f.write_str("confirmation timeout must be positive"),
            ConfigError::Decode => f.write_str("embedded configuration is corrupt"),
        }
    }
}

/// One player: a button, a jingle and a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerConfig {
    /// Slot number (1..=N)
    pub slot: PlayerId,
    /// Display name; empty means "Player N"
    #[serde(default)]
    pub name: String<MAX_NAME_LEN>,
    /// Destination wallet for minted tokens
    pub wallet: WalletAddress,
    /// Button GPIO (active low, internal pull-up)
    pub input_pin: u8,
    /// SD card folder; 0 plays `track` by global index
    #[serde(default)]
    pub folder: u8,
    /// Track to play on press
    pub track: u16,
}

/// Token reward settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct RewardConfig {
    /// Whole tokens minted per press
    pub amount: u64,
    /// Token decimals (base units per token = 10^decimals)
    pub decimals: u8,
    /// Bound on waiting for confirmation (ms)
    pub confirm_timeout_ms: u32,
    /// How long a settled result stays on screen before re-arming (ms)
    pub settle_hold_ms: u32,
    /// Seed counts from on-chain balances at boot
    pub sync_balances: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            amount: 1,
            decimals: 9,
            confirm_timeout_ms: 30_000,
            settle_hold_ms: 2_500,
            sync_balances: true,
        }
    }
}

impl RewardConfig {
    /// Base units per minted reward
    pub fn base_units(&self) -> Option<u64> {
        10u64
            .checked_pow(self.decimals as u32)
            .and_then(|scale| scale.checked_mul(self.amount))
    }

    /// Convert a base-unit balance to whole tokens (truncating)
    pub fn whole_tokens(&self, base_units: u64) -> u64 {
        match 10u64.checked_pow(self.decimals as u32) {
            Some(scale) => base_units / scale,
            None => 0,
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms as u64)
    }

    pub fn settle_hold(&self) -> Duration {
        Duration::from_millis(self.settle_hold_ms as u64)
    }
}

/// Button input settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct InputConfig {
    /// Minimum spacing between accepted edges on one input (ms)
    pub debounce_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl InputConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms as u64)
    }
}

/// Audio module settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct AudioConfig {
    /// Volume applied at boot (0-30)
    pub volume: u8,
    /// Quiet time held on the bus after each command (ms)
    pub command_gap_ms: u32,
    /// Response timeout for status queries (ms)
    pub query_timeout_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 20,
            command_gap_ms: 100,
            query_timeout_ms: 500,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub players: Vec<PlayerConfig, MAX_PLAYERS>,
    #[serde(default)]
    pub reward: RewardConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl DeviceConfig {
    /// Check every cross-field constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }

        let count = self.players.len() as PlayerId;
        for (i, player) in self.players.iter().enumerate() {
            if player.slot == 0 || player.slot > count {
                return Err(ConfigError::SlotOutOfRange(player.slot));
            }
            if player.input_pin > MAX_GPIO {
                return Err(ConfigError::InvalidPin(player.input_pin));
            }
            if player.track == 0 || player.track > MAX_TRACK {
                return Err(ConfigError::InvalidTrack(player.slot));
            }
            if player.folder > MAX_FOLDER {
                return Err(ConfigError::InvalidFolder(player.slot));
            }

            for other in &self.players[..i] {
                if other.slot == player.slot {
                    return Err(ConfigError::DuplicateSlot(player.slot));
                }
                if other.input_pin == player.input_pin {
                    return Err(ConfigError::DuplicatePin(player.input_pin));
                }
                if other.wallet == player.wallet {
                    return Err(ConfigError::DuplicateWallet(player.slot));
                }
            }
        }

        if self.reward.amount == 0 {
            return Err(ConfigError::ZeroAmount);
        }
        if self.reward.base_units().is_none() {
            return Err(ConfigError::AmountOverflow);
        }
        if self.reward.confirm_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.audio.volume > MAX_VOLUME {
            return Err(ConfigError::InvalidVolume(self.audio.volume));
        }

        Ok(())
    }

    /// Decode and validate the embedded postcard blob
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    /// Find a player by slot
    pub fn player(&self, slot: PlayerId) -> Option<&PlayerConfig> {
        self.players.iter().find(|p| p.slot == slot)
    }

    /// Find the player wired to a GPIO
    pub fn player_for_pin(&self, pin: u8) -> Option<&PlayerConfig> {
        self.players.iter().find(|p| p.input_pin == pin)
    }
}

impl PlayerConfig {
    /// Display name, "Player N" when unnamed
    pub fn display_name(&self) -> String<MAX_NAME_LEN> {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        let mut name = String::new();
        let _ = core::fmt::write(&mut name, format_args!("Player {}", self.slot));
        name
    }
}
