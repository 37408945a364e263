//! `engine` crate — core domain models and the guided-filing state machine.
//!
//! A workflow is an ordered sequence of form steps.  [`WorkflowEngine`] tracks
//! one actor's position through that sequence, resolves a submission per step
//! through the `store` crate, carries shared field values forward, and gates
//! completion on required steps.

pub mod error;
pub mod machine;
pub mod mapper;
pub mod models;
pub mod progress;
pub mod sequence;

pub use error::EngineError;
pub use machine::WorkflowEngine;
pub use models::{EngineState, EngineStatus, FieldMapping, StepDefinition, WorkflowDefinition};
pub use progress::Progress;
pub use sequence::validate_steps;
pub use store::Actor;

#[cfg(test)]
mod machine_tests;
