//! Dialog orchestration: stack manager, waterfall sequencer, prompt
//! resolver.
//!
//! A dialog is a named, fixed sequence of steps; a frame is one active
//! instance on the per-conversation stack. Suspension is explicit data
//! (frame + step index + pending prompt), so a conversation resumes
//! exactly where it left off after minutes, hours, or a process restart.

pub mod prompt;
pub mod stack;
pub mod waterfall;

pub use stack::{DialogDispatcher, EngineError};
pub use waterfall::{StepInput, StepOutcome, TurnContext, WaterfallSet};
