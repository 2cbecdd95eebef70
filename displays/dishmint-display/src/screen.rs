//! Screen buffer types
//!
//! Provides a character-based screen buffer and the scoreboard layout.

use core::fmt::Write;

use heapless::String;

use crate::state::DisplayState;

/// Number of character rows
pub const SCREEN_ROWS: usize = 8;

/// Number of character columns
pub const SCREEN_COLS: usize = 21;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

pub const TITLE: [&str; 2] = ["Who unloaded", "the dishwasher?"];
pub const HINT: &str = "Press to mint tokens";

/// First row of the player list
pub const FIRST_PLAYER_ROW: usize = 3;

/// Status line row
pub const STATUS_ROW: usize = SCREEN_ROWS - 1;

/// Screen buffer for text-mode displays
#[derive(Clone, PartialEq, Eq)]
pub struct Screen {
    lines: [String<LINE_LEN>; SCREEN_ROWS],
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub const fn new() -> Self {
        Self {
            lines: [
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ],
        }
    }

    /// Lay out the scoreboard for `state`
    pub fn scoreboard(state: &DisplayState) -> Self {
        let mut screen = Self::new();
        screen.set_line(0, TITLE[0]);
        screen.set_line(1, TITLE[1]);
        screen.set_line(2, HINT);

        let mut text: String<40> = String::new();
        for (i, row) in state.rows().iter().enumerate() {
            text.clear();
            let _ = write!(text, "{} ({})", row.name.as_str(), row.count);
            screen.set_line(FIRST_PLAYER_ROW + i, &text);
        }

        if let Some(status) = state.status_line() {
            text.clear();
            let _ = status.write_label(&mut text);
            screen.set_line(STATUS_ROW, &text);
        }
        screen
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Set the content of a specific row, truncated to the screen width
    pub fn set_line(&mut self, row: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
            let end = text
                .char_indices()
                .nth(LINE_LEN)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            let _ = line.push_str(&text[..end]);
        }
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}

impl core::fmt::Debug for Screen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.lines()).finish()
    }
}
