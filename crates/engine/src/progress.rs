//! Progress arithmetic — pure functions over engine state, no mutation.

use serde::{Deserialize, Serialize};

use crate::models::{EngineState, WorkflowDefinition};

/// How far through a workflow an actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Current 1-based step (clamped to the last step when complete).
    pub current: u32,
    pub total: u32,
    /// 0–100, rounded; 100 exactly when the workflow is complete.
    pub percent: u8,
}

/// Progress for a state blob.  `step == total + 1` is the completed
/// pseudo-position and reports 100%.
pub fn progress(state: &EngineState, definition: &WorkflowDefinition) -> Progress {
    compute(state.step, definition.total_steps())
}

/// True at the last *fillable* step — not in the completed pseudo-state.
pub fn is_at_final_step(state: &EngineState, definition: &WorkflowDefinition) -> bool {
    state.step == definition.total_steps()
}

pub(crate) fn compute(step: u32, total: u32) -> Progress {
    if step > total {
        return Progress {
            current: total,
            total,
            percent: 100,
        };
    }
    let percent = (f64::from(100 * (step - 1)) / f64::from(total)).round() as u8;
    Progress {
        current: step,
        total,
        percent,
    }
}
