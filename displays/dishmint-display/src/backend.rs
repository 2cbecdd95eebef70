//! Display backend trait
//!
//! Defines the interface for whatever ends up painting characters: a
//! directly attached panel or a remote one driven over a serial link.

use crate::screen::Screen;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Command queue full
    BufferOverflow,
}

/// Character-cell display
pub trait DisplayBackend {
    /// Clear the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text at the specified row and column (character units)
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Flush buffered content to the display
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Paint a whole screen: clear, every non-empty line, flush
pub fn render<B: DisplayBackend + ?Sized>(screen: &Screen, backend: &mut B) -> Result<(), DisplayError> {
    backend.clear()?;
    for (row, line) in screen.lines().enumerate() {
        if !line.is_empty() {
            backend.draw_text(row as u8, 0, line)?;
        }
    }
    backend.flush()
}
