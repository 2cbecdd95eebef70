//! Events that advance a reward pipeline

use crate::traits::MintError;

/// Events that can trigger stage transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineEvent {
    /// Debounced button press for this player
    Press,
    /// Jingle command issued (or given up on)
    SoundIssued,
    /// Mint request sent to the service
    MintRequested,
    /// Service returned a transaction handle
    HandleReceived,
    /// Transaction confirmed on chain
    Confirmed,
    /// Submission, confirmation or timeout failure
    Failed(MintError),
    /// Hold time elapsed, player may press again
    Rearm,
}

impl PipelineEvent {
    /// Check if this event ends the pipeline
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Confirmed | PipelineEvent::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(PipelineEvent::Confirmed.is_terminal());
        assert!(PipelineEvent::Failed(MintError::Timeout).is_terminal());
        assert!(!PipelineEvent::Press.is_terminal());
        assert!(!PipelineEvent::Rearm.is_terminal());
    }
}
