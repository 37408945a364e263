//! Core domain models for the guided-filing workflow engine.
//!
//! These types are the source of truth for what a workflow looks like in
//! memory, and for the state blob the session store round-trips between
//! requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use store::Actor;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// FieldMapping
// ---------------------------------------------------------------------------

/// A shared-field rule: when the owning step is left, copy the value under
/// `from` in its submission into `to` in the next step's submission — unless
/// the user already entered something there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub from: String,
    pub to: String,
}

// ---------------------------------------------------------------------------
// StepDefinition
// ---------------------------------------------------------------------------

/// One position in a workflow, referencing exactly one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// 1-based position; unique and contiguous within the workflow.
    pub position: u32,
    /// The form this step fills out.
    pub form_id: String,
    /// Short heading shown above the step's form.
    #[serde(default)]
    pub title: Option<String>,
    /// Whether this step's submission must be complete before the workflow
    /// can finish.
    #[serde(default)]
    pub required: bool,
    /// Rules applied when this step is left toward the next one.
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
}

// ---------------------------------------------------------------------------
// WorkflowDefinition
// ---------------------------------------------------------------------------

/// A named guided process: an ordered list of form steps.
///
/// Immutable after load; the definition repository in the `catalog` crate
/// loads and validates these once and hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

impl WorkflowDefinition {
    /// Convenience constructor for testing.
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<StepDefinition>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            steps,
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }

    /// The step at `position`, or `None` when out of range.
    pub fn step_at(&self, position: u32) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.position == position)
    }
}

// ---------------------------------------------------------------------------
// EngineState
// ---------------------------------------------------------------------------

/// The serializable session payload: where one actor stands in one workflow.
///
/// `step` is 1-based; `total_steps + 1` encodes the completed pseudo-state.
/// `submissions` maps visited step positions to the submission created for
/// them.  `NotStarted` serializes as `step == 1` with an empty map — `start`
/// always resolves the step-1 submission, so any in-progress state has a
/// non-empty map and the encoding is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub workflow_id: String,
    pub step: u32,
    #[serde(default)]
    pub submissions: BTreeMap<u32, Uuid>,
    pub actor: Actor,
}

impl EngineState {
    /// Validate the blob against the definition it claims to belong to.
    pub fn validate(&self, definition: &WorkflowDefinition) -> Result<(), EngineError> {
        if self.workflow_id != definition.id {
            return Err(EngineError::InvalidState(format!(
                "state belongs to workflow '{}', not '{}'",
                self.workflow_id, definition.id
            )));
        }

        let total = definition.total_steps();
        if self.step < 1 || self.step > total + 1 {
            return Err(EngineError::InvalidState(format!(
                "step {} outside 1..={}",
                self.step,
                total + 1
            )));
        }

        if let Some(position) = self
            .submissions
            .keys()
            .find(|position| **position < 1 || **position > total)
        {
            return Err(EngineError::InvalidState(format!(
                "submission recorded for nonexistent step {position}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EngineStatus
// ---------------------------------------------------------------------------

/// Where the state machine stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    NotStarted,
    /// Filling out the step at this 1-based position.
    InProgress(u32),
    Complete,
}

impl EngineStatus {
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}
