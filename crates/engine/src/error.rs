//! Engine-level error types.

use thiserror::Error;

use store::StoreError;

/// Errors produced by the workflow engine (definition validation, state
/// deserialization, and navigation).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Definition validation errors ------

    /// A workflow with no steps cannot be navigated.
    #[error("workflow '{0}' has no steps")]
    EmptySteps(String),

    /// Two steps share the same position.
    #[error("workflow '{workflow_id}' defines step position {position} more than once")]
    DuplicatePosition { workflow_id: String, position: u32 },

    /// Step positions are not contiguous from 1.
    #[error(
        "workflow '{workflow_id}' step positions must run 1..n without gaps: \
         expected {expected}, found {found}"
    )]
    PositionGap {
        workflow_id: String,
        expected: u32,
        found: u32,
    },

    /// Field mappings apply when a step is left toward its successor; the
    /// last step has no successor.
    #[error("workflow '{workflow_id}' puts field mappings on its last step ({position})")]
    TrailingMappings { workflow_id: String, position: u32 },

    // ------ State errors ------

    /// A persisted state blob that fails validation against its workflow
    /// definition.  Rejected outright, never silently defaulted.
    #[error("engine state is malformed: {0}")]
    InvalidState(String),

    // ------ Navigation errors ------

    /// The actor tried to finish the workflow while required steps are still
    /// incomplete.  Expected and user-recoverable: the engine stays at the
    /// last step and the caller re-prompts.
    #[error("required steps are incomplete: {missing:?}")]
    RequiredStepsIncomplete { missing: Vec<u32> },

    // ------ Collaborator pass-through ------

    /// Submission store failure, propagated unchanged.
    #[error("submission store error: {0}")]
    Store(#[from] StoreError),
}
