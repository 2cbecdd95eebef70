//! Button input tasks
//!
//! One task per button waits for falling edges (buttons pull the line to
//! ground against the internal pull-up). Edges go through the shared
//! debouncing monitor; accepted presses are queued for the dispatcher,
//! which starts the player's pipeline if it is idle.

use core::cell::RefCell;

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;

use dishmint_core::config::slot_index;
use dishmint_core::input::ButtonMonitor;

use crate::channels::{PRESS_CHANNEL, TRIGGERED};
use crate::tasks::reward::Orchestrator;

/// Debouncer state shared by all button tasks
pub type SharedMonitor = Mutex<CriticalSectionRawMutex, RefCell<ButtonMonitor>>;

/// Edge watcher for one button
#[embassy_executor::task(pool_size = 4)]
pub async fn button_task(mut input: Input<'static>, gpio: u8, monitor: &'static SharedMonitor) {
    info!("Button task started on GPIO{}", gpio);

    loop {
        input.wait_for_falling_edge().await;
        let at = Instant::now();

        let Some(press) = monitor.lock(|m| m.borrow_mut().on_edge(gpio, at)) else {
            continue;
        };

        debug!("press: player {}", press.player);
        if PRESS_CHANNEL.try_send(press).is_err() {
            warn!("Press channel full, dropping press from player {}", press.player);
        }
    }
}

/// Hands presses to idle players' pipelines
///
/// A press on a busy player is dropped here so nothing queues behind a
/// pending mint.
#[embassy_executor::task]
pub async fn press_dispatch_task(orchestrator: &'static Orchestrator) {
    info!("Press dispatch task started");

    loop {
        let press = PRESS_CHANNEL.receive().await;
        let Some(index) = slot_index(press.player) else {
            continue;
        };

        if orchestrator.try_trigger(press.player, press.at).is_some() {
            TRIGGERED[index].signal(());
        }
    }
}
