//! Audio output trait

/// Errors from the serial command channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Argument out of range; nothing was written
    InvalidArgument,
    /// No answer within the query timeout
    Timeout,
    /// Serial port read or write failed
    Io,
    /// Module reported an error (0x40) with this code
    Device(u16),
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelError::InvalidArgument => f.write_str("invalid argument"),
            ChannelError::Timeout => f.write_str("timeout"),
            ChannelError::Io => f.write_str("serial i/o"),
            ChannelError::Device(code) => write!(f, "device error {:#06x}", code),
        }
    }
}

/// Something that can play a player's jingle
#[allow(async_fn_in_trait)]
pub trait AudioOutput {
    /// Play `track`, from `folder` or by global index when `folder` is 0
    async fn play_track(&self, folder: u8, track: u16) -> Result<(), ChannelError>;
}
