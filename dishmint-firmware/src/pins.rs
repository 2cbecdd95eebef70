//! Config-driven button pin assignment
//!
//! Button GPIOs come from device.toml, so the pins that may carry a button
//! are moved into a bank at boot and taken out by number.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

/// GPIOs that may carry a button
///
/// 0/1 and 4/5 are the UARTs; 23-25 and 29 are board functions on the Pico.
pub const BUTTON_GPIOS: [u8; 22] = [
    2, 3, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 26, 27, 28,
];

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Not a button-capable GPIO
    Reserved(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

/// Pin bank that hands out button pins by GPIO number
pub struct PinBank {
    pins: [(u8, Option<Peri<'static, AnyPin>>); BUTTON_GPIOS.len()],
}

impl PinBank {
    pub fn new(pins: [Peri<'static, AnyPin>; BUTTON_GPIOS.len()]) -> Self {
        let mut pins = pins.into_iter();
        Self {
            pins: BUTTON_GPIOS.map(|gpio| (gpio, pins.next())),
        }
    }

    /// Take a pin by number
    pub fn take(&mut self, gpio: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        let (_, slot) = self
            .pins
            .iter_mut()
            .find(|(n, _)| *n == gpio)
            .ok_or(PinError::Reserved(gpio))?;
        slot.take().ok_or(PinError::AlreadyTaken(gpio))
    }
}

/// Build a [`PinBank`] from the peripherals struct
#[macro_export]
macro_rules! button_pins {
    ($p:expr) => {
        $crate::pins::PinBank::new([
            $p.PIN_2.into(),
            $p.PIN_3.into(),
            $p.PIN_6.into(),
            $p.PIN_7.into(),
            $p.PIN_8.into(),
            $p.PIN_9.into(),
            $p.PIN_10.into(),
            $p.PIN_11.into(),
            $p.PIN_12.into(),
            $p.PIN_13.into(),
            $p.PIN_14.into(),
            $p.PIN_15.into(),
            $p.PIN_16.into(),
            $p.PIN_17.into(),
            $p.PIN_18.into(),
            $p.PIN_19.into(),
            $p.PIN_20.into(),
            $p.PIN_21.into(),
            $p.PIN_22.into(),
            $p.PIN_26.into(),
            $p.PIN_27.into(),
            $p.PIN_28.into(),
        ])
    };
}
