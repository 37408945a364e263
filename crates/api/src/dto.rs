//! Request and response DTOs for the REST surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engine::{EngineStatus, Progress, StepDefinition, WorkflowDefinition, WorkflowEngine};
use store::SubmissionRecord;

#[derive(Serialize)]
pub struct StepDto {
    pub position: u32,
    pub form_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub required: bool,
}

impl From<&StepDefinition> for StepDto {
    fn from(step: &StepDefinition) -> Self {
        Self {
            position: step.position,
            form_id: step.form_id.clone(),
            title: step.title.clone(),
            required: step.required,
        }
    }
}

#[derive(Serialize)]
pub struct WorkflowSummaryDto {
    pub id: String,
    pub name: String,
    pub total_steps: u32,
}

impl From<&WorkflowDefinition> for WorkflowSummaryDto {
    fn from(definition: &WorkflowDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            total_steps: definition.total_steps(),
        }
    }
}

#[derive(Serialize)]
pub struct WorkflowDetailDto {
    pub id: String,
    pub name: String,
    pub steps: Vec<StepDto>,
}

impl From<&WorkflowDefinition> for WorkflowDetailDto {
    fn from(definition: &WorkflowDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            steps: definition.steps.iter().map(StepDto::from).collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct AdvanceDto {
    /// Field values entered on the current step.
    #[serde(default)]
    pub field_values: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct SubmissionDto {
    pub id: Uuid,
    pub form_id: String,
    pub field_values: BTreeMap<String, String>,
    pub complete: bool,
}

impl From<SubmissionRecord> for SubmissionDto {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            id: record.id,
            form_id: record.form_id,
            field_values: record.field_values,
            complete: record.complete,
        }
    }
}

/// Where the actor stands after a filing operation.
#[derive(Serialize)]
pub struct FilingStateDto {
    /// "not_started" | "in_progress" | "complete"
    pub status: &'static str,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionDto>,
}

impl FilingStateDto {
    pub fn new(engine: &WorkflowEngine, submission: Option<SubmissionRecord>) -> Self {
        let status = match engine.status() {
            EngineStatus::NotStarted => "not_started",
            EngineStatus::InProgress(_) => "in_progress",
            EngineStatus::Complete => "complete",
        };
        Self {
            status,
            progress: engine.progress(),
            step: engine.current_step().map(StepDto::from),
            submission: submission.map(SubmissionDto::from),
        }
    }
}
