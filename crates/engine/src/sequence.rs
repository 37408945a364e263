//! Step-sequence validation — run this before a definition is served.
//!
//! Rules enforced:
//! 1. A workflow has at least one step.
//! 2. Step positions are unique.
//! 3. Positions run 1..n in order, without gaps.
//! 4. The last step carries no field mappings (there is no step to map into).
//!
//! Whether the referenced forms exist — and whether mapped field keys do —
//! is checked by the catalog, which owns the form schemas.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::models::WorkflowDefinition;

/// Validate the workflow's step sequence.
///
/// # Errors
/// - [`EngineError::EmptySteps`] if the workflow has no steps.
/// - [`EngineError::DuplicatePosition`] if two steps share a position.
/// - [`EngineError::PositionGap`] if positions are not contiguous from 1.
/// - [`EngineError::TrailingMappings`] if the last step declares mappings.
pub fn validate_steps(workflow: &WorkflowDefinition) -> Result<(), EngineError> {
    if workflow.steps.is_empty() {
        return Err(EngineError::EmptySteps(workflow.id.clone()));
    }

    let mut seen: HashSet<u32> = HashSet::new();
    for step in &workflow.steps {
        if !seen.insert(step.position) {
            return Err(EngineError::DuplicatePosition {
                workflow_id: workflow.id.clone(),
                position: step.position,
            });
        }
    }

    for (index, step) in workflow.steps.iter().enumerate() {
        let expected = index as u32 + 1;
        if step.position != expected {
            return Err(EngineError::PositionGap {
                workflow_id: workflow.id.clone(),
                expected,
                found: step.position,
            });
        }
    }

    if let Some(last) = workflow.steps.last() {
        if !last.field_mappings.is_empty() {
            return Err(EngineError::TrailingMappings {
                workflow_id: workflow.id.clone(),
                position: last.position,
            });
        }
    }

    Ok(())
}
