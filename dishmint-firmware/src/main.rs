//! Dishmint - Button Reward Firmware
//!
//! Main firmware binary for RP2040-based reward controllers. Each player
//! has a button; a press plays the player's jingle on the MP3 module, asks
//! the gateway to mint tokens to the player's wallet and tracks the
//! transaction until it settles, while the scoreboard follows along.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dishmint_core::config::{DeviceConfig, MAX_PLAYERS};
use dishmint_core::input::ButtonMonitor;
use dishmint_drivers::audio::{ChannelConfig, SerialCommandChannel};
use dishmint_drivers::gateway::{GatewayClient, GatewayTimeouts};

use crate::channels::{GATEWAY_REPLY, LINK_TX};
use crate::error::{fatal, HardwareInitError};
use crate::tasks::{Audio, Gateway, Orchestrator, Scoreboard, SharedMonitor};

mod channels;
mod error;
mod pins;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Validated device.toml, embedded by build.rs
static CONFIG_BLOB: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/device.postcard"));

/// MP3 module baud rate (fixed by the module)
const AUDIO_BAUD: u32 = 9600;

/// Gateway link baud rate
const LINK_BAUD: u32 = 115_200;

// Static cells for UART buffers (must live forever)
static AUDIO_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static AUDIO_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static LINK_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static LINK_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Shared state handed to tasks
static DEVICE_CONFIG: StaticCell<DeviceConfig> = StaticCell::new();
static AUDIO: StaticCell<Audio> = StaticCell::new();
static GATEWAY: StaticCell<Gateway> = StaticCell::new();
static SCOREBOARD: StaticCell<Scoreboard> = StaticCell::new();
static ORCHESTRATOR: StaticCell<Orchestrator> = StaticCell::new();
static MONITOR: StaticCell<SharedMonitor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Dishmint firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static DeviceConfig = match DeviceConfig::from_postcard(CONFIG_BLOB) {
        Ok(config) => DEVICE_CONFIG.init(config),
        Err(e) => fatal(e.into()),
    };
    info!("Configuration loaded: {} player(s)", config.players.len());

    // MP3 module on UART0
    let mut audio_uart_config = UartConfig::default();
    audio_uart_config.baudrate = AUDIO_BAUD;
    let audio_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, audio_uart_config)
        .into_buffered(Irqs, AUDIO_TX_BUF.init([0u8; 64]), AUDIO_RX_BUF.init([0u8; 64]));
    let audio: &'static Audio = AUDIO.init(SerialCommandChannel::new(
        audio_uart,
        ChannelConfig::from(&config.audio),
    ));

    if let Err(e) = audio.set_volume(config.audio.volume).await {
        fatal(HardwareInitError::from(e));
    }
    info!("Audio initialized, volume {}", config.audio.volume);

    // Gateway link on UART1
    let mut link_uart_config = UartConfig::default();
    link_uart_config.baudrate = LINK_BAUD;
    let link_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, link_uart_config)
        .into_buffered(Irqs, LINK_TX_BUF.init([0u8; 256]), LINK_RX_BUF.init([0u8; 256]));
    let (link_tx, link_rx) = link_uart.split();
    info!("UART initialized for gateway communication");

    let gateway: &'static Gateway = GATEWAY.init(GatewayClient::new(
        config,
        &LINK_TX,
        &GATEWAY_REPLY,
        GatewayTimeouts::default(),
    ));
    let scoreboard: &'static Scoreboard = SCOREBOARD.init(Scoreboard::new(config));
    let orchestrator: &'static Orchestrator = match Orchestrator::new(config) {
        Ok(orchestrator) => ORCHESTRATOR.init(orchestrator),
        Err(e) => fatal(e.into()),
    };
    let monitor: &'static SharedMonitor =
        MONITOR.init(Mutex::new(RefCell::new(ButtonMonitor::new(config))));

    // Claim button pins before anything can react to a press
    let mut bank = button_pins!(p);
    let mut buttons = heapless::Vec::<_, MAX_PLAYERS>::new();
    for player in &config.players {
        match bank.take(player.input_pin) {
            Ok(pin) => {
                let _ = buttons.push((Input::new(pin, Pull::Up), player.input_pin));
            }
            Err(e) => fatal(e.into()),
        }
    }
    info!("{} button(s) initialized", buttons.len());

    spawner.spawn(tasks::link_rx_task(link_rx, gateway)).unwrap();
    spawner.spawn(tasks::link_tx_task(link_tx)).unwrap();
    spawner.spawn(tasks::display_task(scoreboard)).unwrap();

    // Counts start from the chain before the first press is accepted
    orchestrator.sync_balances(gateway, scoreboard).await;
    info!("Scoreboard seeded");

    for player in &config.players {
        spawner
            .spawn(tasks::reward_task(player.slot, orchestrator, audio, gateway, scoreboard))
            .unwrap();
    }
    spawner.spawn(tasks::press_dispatch_task(orchestrator)).unwrap();
    for (input, gpio) in buttons {
        spawner.spawn(tasks::button_task(input, gpio, monitor)).unwrap();
    }

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
