//! Scoreboard state
//!
//! Owned by the presenter and changed only through orchestrator updates.
//! Each update overwrites the player's row; the status line shows the
//! most recently set status that is still active.

use dishmint_core::config::{DeviceConfig, PlayerId, MAX_NAME_LEN, MAX_PLAYERS};
use dishmint_core::traits::{PlayerUpdate, Status};
use heapless::{String, Vec};

/// One scoreboard line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub player: PlayerId,
    pub name: String<MAX_NAME_LEN>,
    pub count: u64,
    pub status: Option<Status>,
    /// Update sequence at which `status` was set
    status_seq: u32,
}

/// Everything the scoreboard shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    rows: Vec<PlayerRow, MAX_PLAYERS>,
    seq: u32,
    dirty: bool,
}

impl DisplayState {
    /// One zero-count row per configured player, in slot order
    pub fn new(config: &DeviceConfig) -> Self {
        let mut rows: Vec<PlayerRow, MAX_PLAYERS> = config
            .players
            .iter()
            .map(|p| PlayerRow {
                player: p.slot,
                name: p.display_name(),
                count: 0,
                status: None,
                status_seq: 0,
            })
            .collect();
        rows.sort_unstable_by_key(|r| r.player);

        Self {
            rows,
            seq: 0,
            dirty: true,
        }
    }

    /// Apply an update; returns true if anything visible changed
    pub fn apply(&mut self, update: PlayerUpdate) -> bool {
        self.seq = self.seq.wrapping_add(1);
        let seq = self.seq;
        let Some(row) = self.rows.iter_mut().find(|r| r.player == update.player) else {
            return false;
        };

        let changed = row.count != update.count || row.status != update.status;
        row.count = update.count;
        if row.status != update.status {
            row.status = update.status;
            row.status_seq = seq;
        }
        self.dirty |= changed;
        changed
    }

    pub fn rows(&self) -> &[PlayerRow] {
        &self.rows
    }

    pub fn count(&self, player: PlayerId) -> Option<u64> {
        self.rows.iter().find(|r| r.player == player).map(|r| r.count)
    }

    /// Most recently set active status
    pub fn status_line(&self) -> Option<Status> {
        self.rows
            .iter()
            .filter(|r| r.status.is_some())
            .max_by_key(|r| r.status_seq)
            .and_then(|r| r.status)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark state as rendered
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Force a redraw on the next render
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::config;
    use dishmint_core::traits::MintError;

    fn update(player: PlayerId, count: u64, status: Option<Status>) -> PlayerUpdate {
        PlayerUpdate {
            player,
            count,
            status,
        }
    }

    #[test]
    fn test_initial_rows() {
        let state = DisplayState::new(&config());
        assert_eq!(state.rows().len(), 2);
        assert_eq!(state.rows()[0].name.as_str(), "Player 1");
        assert_eq!(state.rows()[1].name.as_str(), "Sam");
        assert!(state.is_dirty());
        assert_eq!(state.status_line(), None);
    }

    #[test]
    fn test_repeated_update_is_not_a_change() {
        let mut state = DisplayState::new(&config());
        state.mark_clean();
        assert!(state.apply(update(1, 1, Some(Status::Success))));
        state.mark_clean();
        assert!(!state.apply(update(1, 1, Some(Status::Success))));
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = DisplayState::new(&config());
        state.apply(update(2, 5, Some(Status::Confirming)));
        state.apply(update(2, 6, Some(Status::Success)));
        assert_eq!(state.count(2), Some(6));
        assert_eq!(state.rows()[1].status, Some(Status::Success));
    }

    #[test]
    fn test_status_line_follows_latest() {
        let mut state = DisplayState::new(&config());
        state.apply(update(1, 0, Some(Status::Confirming)));
        state.apply(update(2, 0, Some(Status::Sending)));
        assert_eq!(state.status_line(), Some(Status::Sending));

        state.apply(update(2, 0, Some(Status::Failed(MintError::Network))));
        assert_eq!(state.status_line(), Some(Status::Failed(MintError::Network)));

        // Player 2 re-arms: player 1's status is still active
        state.apply(update(2, 0, None));
        assert_eq!(state.status_line(), Some(Status::Confirming));

        state.apply(update(1, 1, None));
        assert_eq!(state.status_line(), None);
    }

    #[test]
    fn test_unknown_player_ignored() {
        let mut state = DisplayState::new(&config());
        state.mark_clean();
        assert!(!state.apply(update(7, 3, None)));
        assert!(!state.is_dirty());
    }
}
