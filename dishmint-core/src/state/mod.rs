//! Per-player reward pipeline state machine
//!
//! Every player runs an independent copy of this machine. The stage is a
//! pure function of the previous stage and an event; the async driver in
//! [`crate::reward`] produces the events.

pub mod events;
pub mod machine;

pub use events::PipelineEvent;
pub use machine::{Outcome, Stage};
