//! Shared test configuration

use heapless::String;

use crate::config::{DeviceConfig, PlayerConfig, WalletAddress};

pub const WALLETS: [&str; 2] = [
    "41QHsedtyfNyj6Q2iCDFoGspZ7rqUKu735YNoFLTvw9i",
    "GsfNSuZFrT2r4xzSndnCSs9tTXwt47etPqU8yFVnDcXd",
];

/// Two players on GPIO17/18, tracks 3 and 4 from the root folder
pub fn two_players() -> DeviceConfig {
    let mut config = DeviceConfig::default();
    for (i, wallet) in WALLETS.iter().enumerate() {
        config
            .players
            .push(PlayerConfig {
                slot: i as u8 + 1,
                name: String::new(),
                wallet: WalletAddress::parse(wallet).unwrap(),
                input_pin: 17 + i as u8,
                folder: 0,
                track: i as u16 + 3,
            })
            .unwrap();
    }
    config.reward.confirm_timeout_ms = 50;
    config.reward.settle_hold_ms = 0;
    config.validate().unwrap();
    config
}
