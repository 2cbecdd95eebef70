//! Stage definitions and the transition function

use super::events::PipelineEvent;
use crate::traits::MintError;

/// How a pipeline ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Tokens minted and confirmed
    Success,
    /// Pipeline gave up; count unchanged
    Failure(MintError),
}

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Armed, waiting for a press
    #[default]
    Idle,
    /// Press accepted, nothing sent yet
    Triggered,
    /// Jingle requested from the audio module
    SoundPlaying,
    /// Mint request on its way to the service
    MintSubmitted,
    /// Waiting for on-chain confirmation
    Confirming,
    /// Result is on screen, waiting to re-arm
    Settled(Outcome),
}

impl Stage {
    /// Check if a press would start a new pipeline
    pub fn is_idle(&self) -> bool {
        matches!(self, Stage::Idle)
    }

    /// Check if a request is outstanding
    pub fn is_busy(&self) -> bool {
        !self.is_idle()
    }

    /// Check if the pipeline has produced its result
    pub fn is_settled(&self) -> bool {
        matches!(self, Stage::Settled(_))
    }

    /// Process an event and return the next stage
    ///
    /// Pairs that do not describe a legal step leave the stage unchanged,
    /// so a press on a busy player is a no-op.
    pub fn transition(self, event: PipelineEvent) -> Self {
        use PipelineEvent::*;
        use Stage::*;

        match (self, event) {
            (Idle, Press) => Triggered,

            (Triggered, SoundIssued) => SoundPlaying,

            (SoundPlaying, MintRequested) => MintSubmitted,

            (MintSubmitted, HandleReceived) => Confirming,
            (MintSubmitted, Failed(err)) => Settled(Outcome::Failure(err)),

            (Confirming, Confirmed) => Settled(Outcome::Success),
            (Confirming, Failed(err)) => Settled(Outcome::Failure(err)),

            (Settled(_), Rearm) => Idle,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(events: &[PipelineEvent]) -> Stage {
        events
            .iter()
            .fold(Stage::Idle, |stage, &event| stage.transition(event))
    }

    #[test]
    fn test_happy_path() {
        use PipelineEvent::*;
        let stage = run(&[Press, SoundIssued, MintRequested, HandleReceived]);
        assert_eq!(stage, Stage::Confirming);

        let settled = stage.transition(Confirmed);
        assert_eq!(settled, Stage::Settled(Outcome::Success));
        assert_eq!(settled.transition(Rearm), Stage::Idle);
    }

    #[test]
    fn test_submit_failure_settles() {
        use PipelineEvent::*;
        let stage = run(&[Press, SoundIssued, MintRequested, Failed(MintError::Network)]);
        assert_eq!(stage, Stage::Settled(Outcome::Failure(MintError::Network)));
    }

    #[test]
    fn test_confirm_timeout_settles() {
        use PipelineEvent::*;
        let stage = run(&[
            Press,
            SoundIssued,
            MintRequested,
            HandleReceived,
            Failed(MintError::Timeout),
        ]);
        assert_eq!(stage, Stage::Settled(Outcome::Failure(MintError::Timeout)));
    }

    #[test]
    fn test_press_ignored_while_busy() {
        let busy = [
            Stage::Triggered,
            Stage::SoundPlaying,
            Stage::MintSubmitted,
            Stage::Confirming,
            Stage::Settled(Outcome::Success),
            Stage::Settled(Outcome::Failure(MintError::Rejected(2))),
        ];

        for stage in busy {
            assert_eq!(stage.transition(PipelineEvent::Press), stage);
        }
    }

    #[test]
    fn test_rearm_only_from_settled() {
        assert_eq!(Stage::Confirming.transition(PipelineEvent::Rearm), Stage::Confirming);
        assert_eq!(Stage::Idle.transition(PipelineEvent::Rearm), Stage::Idle);
    }

    fn any_event() -> impl Strategy<Value = PipelineEvent> {
        prop_oneof![
            Just(PipelineEvent::Press),
            Just(PipelineEvent::SoundIssued),
            Just(PipelineEvent::MintRequested),
            Just(PipelineEvent::HandleReceived),
            Just(PipelineEvent::Confirmed),
            Just(PipelineEvent::Failed(MintError::Network)),
            Just(PipelineEvent::Failed(MintError::Timeout)),
            Just(PipelineEvent::Rearm),
        ]
    }

    proptest! {
        // A settled stage is only reachable through a terminal event, and
        // Success only through Confirmed.
        #[test]
        fn prop_success_requires_confirmation(events in proptest::collection::vec(any_event(), 0..24)) {
            let mut stage = Stage::Idle;
            for event in events {
                let next = stage.transition(event);
                if next != stage && next.is_settled() {
                    prop_assert!(event.is_terminal());
                    if next == Stage::Settled(Outcome::Success) {
                        prop_assert_eq!(event, PipelineEvent::Confirmed);
                        prop_assert_eq!(stage, Stage::Confirming);
                    }
                }
                stage = next;
            }
        }
    }
}
