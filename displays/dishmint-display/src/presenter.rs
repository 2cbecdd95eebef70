//! Display presenter
//!
//! Receives orchestrator updates from any task, keeps the scoreboard state
//! and hands out a fresh [`Screen`] only when something visible changed.

use core::cell::RefCell;

use dishmint_core::config::{DeviceConfig, PlayerId};
use dishmint_core::traits::{PlayerUpdate, RewardObserver};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::backend::{render, DisplayBackend, DisplayError};
use crate::screen::Screen;
use crate::state::DisplayState;

pub struct Presenter<M: RawMutex> {
    state: Mutex<M, RefCell<DisplayState>>,
    changed: Signal<M, ()>,
}

impl<M: RawMutex> Presenter<M> {
    pub fn new(config: &DeviceConfig) -> Self {
        let presenter = Self {
            state: Mutex::new(RefCell::new(DisplayState::new(config))),
            changed: Signal::new(),
        };
        // First frame shows the empty scoreboard
        presenter.changed.signal(());
        presenter
    }

    /// Layout for the current state if it changed since the last call
    pub fn take_screen(&self) -> Option<Screen> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if !state.is_dirty() {
                return None;
            }
            state.mark_clean();
            Some(Screen::scoreboard(&state))
        })
    }

    /// Layout for the current state, changed or not
    pub fn screen(&self) -> Screen {
        self.state.lock(|state| Screen::scoreboard(&state.borrow()))
    }

    /// Paint the scoreboard if it changed; returns whether anything was drawn
    ///
    /// A failed paint leaves the state dirty so the next call retries.
    pub fn render_to<B: DisplayBackend + ?Sized>(&self, backend: &mut B) -> Result<bool, DisplayError> {
        let Some(screen) = self.take_screen() else {
            return Ok(false);
        };
        if let Err(e) = render(&screen, backend) {
            self.state.lock(|state| state.borrow_mut().mark_dirty());
            return Err(e);
        }
        Ok(true)
    }

    /// Wait until an update changed the state
    pub async fn wait_changed(&self) {
        self.changed.wait().await
    }

    pub fn count(&self, player: PlayerId) -> Option<u64> {
        self.state.lock(|state| state.borrow().count(player))
    }
}

impl<M: RawMutex> RewardObserver for Presenter<M> {
    fn on_update(&self, update: PlayerUpdate) {
        let changed = self.state.lock(|state| state.borrow_mut().apply(update));
        if changed {
            self.changed.signal(());
        }
    }
}
