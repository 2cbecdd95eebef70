use dishmint_display::{DisplayBackend, DisplayError};
use dishmint_protocol::{GatewayRequest, LinkError, LinkFrame};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

/// Scoreboard backend that forwards draw calls to the gateway's TFT
///
/// Never waits: a full TX queue fails the paint with
/// [`DisplayError::BufferOverflow`] and the caller repaints later.
pub struct GatewayDisplay<'a, M: RawMutex, const TX: usize> {
    tx: &'a Channel<M, LinkFrame, TX>,
}

impl<'a, M: RawMutex, const TX: usize> GatewayDisplay<'a, M, TX> {
    pub fn new(tx: &'a Channel<M, LinkFrame, TX>) -> Self {
        Self { tx }
    }

    fn queue(&self, frame: Result<LinkFrame, LinkError>) -> Result<(), DisplayError> {
        let frame = frame.map_err(|_| DisplayError::InvalidCoordinates)?;
        self.tx
            .try_send(frame)
            .map_err(|_| DisplayError::BufferOverflow)
    }
}

impl<M: RawMutex, const TX: usize> DisplayBackend for GatewayDisplay<'_, M, TX> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.queue(GatewayRequest::Clear.to_frame())
    }

    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.queue(GatewayRequest::Text { row, col, text }.to_frame())
    }
}
