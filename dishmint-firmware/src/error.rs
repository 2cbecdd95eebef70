//! Boot-time failures
//!
//! Anything here leaves the controller unable to reward presses, so boot
//! stops and the error is reported over RTT.

use defmt::Format;

use dishmint_core::config::ConfigError;
use dishmint_core::traits::ChannelError;

use crate::pins::PinError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum HardwareInitError {
    /// Embedded configuration blob is unusable
    Config(ConfigError),
    /// Button pin could not be claimed
    Pin(PinError),
    /// MP3 module did not accept the boot volume
    AudioBus(ChannelError),
}

impl From<ConfigError> for HardwareInitError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PinError> for HardwareInitError {
    fn from(e: PinError) -> Self {
        Self::Pin(e)
    }
}

impl From<ChannelError> for HardwareInitError {
    fn from(e: ChannelError) -> Self {
        Self::AudioBus(e)
    }
}

/// Halt boot with a logged error
pub fn fatal(err: HardwareInitError) -> ! {
    defmt::panic!("Hardware init failed: {}", err)
}
