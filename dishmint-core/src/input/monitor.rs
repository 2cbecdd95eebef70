//! Press arbitration across all player buttons

use embassy_time::Instant;
use heapless::Vec;

use super::debounce::Debouncer;
use crate::config::{DeviceConfig, PlayerId, MAX_PLAYERS};

/// A debounced press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressEvent {
    pub player: PlayerId,
    pub at: Instant,
}

struct Input {
    pin: u8,
    player: PlayerId,
    debouncer: Debouncer,
}

/// Maps input pins to players and debounces each one separately
///
/// The monitor knows nothing about reward state; a press on a busy player
/// is still reported and dropped later by the orchestrator.
pub struct ButtonMonitor {
    inputs: Vec<Input, MAX_PLAYERS>,
}

impl ButtonMonitor {
    pub fn new(config: &DeviceConfig) -> Self {
        let interval = config.input.debounce();
        let inputs = config
            .players
            .iter()
            .map(|p| Input {
                pin: p.input_pin,
                player: p.slot,
                debouncer: Debouncer::new(interval),
            })
            .collect();
        Self { inputs }
    }

    /// Feed a falling edge seen on `pin` at `at`
    pub fn on_edge(&mut self, pin: u8, at: Instant) -> Option<PressEvent> {
        let Some(input) = self.inputs.iter_mut().find(|i| i.pin == pin) else {
            warn!("edge on unmapped GPIO{}", pin);
            return None;
        };

        if !input.debouncer.accept(at) {
            debug!("bounce on GPIO{} ignored", pin);
            return None;
        }

        Some(PressEvent {
            player: input.player,
            at,
        })
    }
}
