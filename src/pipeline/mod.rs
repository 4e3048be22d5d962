//! Alarm frame pipeline

pub mod alarm;
pub mod chain;
pub mod continuity;

pub use alarm::AlarmPipeline;
pub use chain::{ChainStage, StageChain, StageKind, TriggerClass};
pub use continuity::{ContinuityState, FrameKey};
