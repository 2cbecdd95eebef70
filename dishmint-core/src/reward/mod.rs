//! Reward orchestration
//!
//! Drives each player's pipeline through the stages in [`crate::state`]:
//! jingle, mint submission, bounded confirmation, settle and re-arm.

mod orchestrator;

pub use orchestrator::{RewardOrchestrator, RewardRequest};
