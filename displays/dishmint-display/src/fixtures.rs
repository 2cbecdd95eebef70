//! Shared test configuration

use dishmint_core::config::{DeviceConfig, PlayerConfig, WalletAddress};
use heapless::String;

/// Player 1 unnamed, player 2 "Sam"
pub fn config() -> DeviceConfig {
    let wallets = [
        "41QHsedtyfNyj6Q2iCDFoGspZ7rqUKu735YNoFLTvw9i",
        "GsfNSuZFrT2r4xzSndnCSs9tTXwt47etPqU8yFVnDcXd",
    ];
    let mut config = DeviceConfig::default();
    for (i, wallet) in wallets.iter().enumerate() {
        let name = if i == 1 {
            String::try_from("Sam").unwrap()
        } else {
            String::new()
        };
        config
            .players
            .push(PlayerConfig {
                slot: i as u8 + 1,
                name,
                wallet: WalletAddress::parse(wallet).unwrap(),
                input_pin: 17 + i as u8,
                folder: 0,
                track: 1,
            })
            .unwrap();
    }
    config
}
