//! The workflow state machine.
//!
//! `WorkflowEngine` tracks one actor's position through one workflow:
//! 1. `start` enters the first step and resolves its submission.
//! 2. `advance` writes the current step's field values, carries mapped fields
//!    into the next step, and moves forward — gated at the last step on every
//!    required step being complete.
//! 3. `go_back` / `restart` move backward without ever raising.
//! 4. `to_state` / `from_state` round-trip the engine through the session
//!    store; an engine instance lives for one logical operation only.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use store::{Actor, SubmissionRecord, SubmissionScope, SubmissionStore};

use crate::error::EngineError;
use crate::mapper;
use crate::models::{EngineState, EngineStatus, StepDefinition, WorkflowDefinition};
use crate::progress::{self, Progress};
use crate::sequence::validate_steps;

pub struct WorkflowEngine {
    definition: Arc<WorkflowDefinition>,
    store: Arc<dyn SubmissionStore>,
    actor: Actor,
    /// 1-based; `total_steps + 1` is the completed pseudo-position.
    step: u32,
    started: bool,
    /// Visited step position → submission id, grown lazily.
    submissions: BTreeMap<u32, Uuid>,
}

impl WorkflowEngine {
    /// A fresh engine in the `NotStarted` state.
    ///
    /// # Errors
    /// Rejects definitions whose step sequence is invalid (see
    /// [`validate_steps`]).
    pub fn new(
        definition: Arc<WorkflowDefinition>,
        store: Arc<dyn SubmissionStore>,
        actor: Actor,
    ) -> Result<Self, EngineError> {
        validate_steps(&definition)?;
        Ok(Self {
            definition,
            store,
            actor,
            step: 1,
            started: false,
            submissions: BTreeMap::new(),
        })
    }

    /// Rebuild an engine from a persisted state blob.
    ///
    /// Round-trip contract: `from_state(definition, store, engine.to_state())`
    /// reconstructs an engine with identical observable behavior.  Malformed
    /// blobs are rejected with [`EngineError::InvalidState`].
    pub fn from_state(
        definition: Arc<WorkflowDefinition>,
        store: Arc<dyn SubmissionStore>,
        state: EngineState,
    ) -> Result<Self, EngineError> {
        validate_steps(&definition)?;
        state.validate(&definition)?;

        // `start` always records the step-1 submission, so an empty map at
        // step 1 can only mean the workflow was never entered (or was
        // restarted, which is the same thing).
        let started = state.step > 1 || !state.submissions.is_empty();

        Ok(Self {
            definition,
            store,
            actor: state.actor,
            step: state.step,
            started,
            submissions: state.submissions,
        })
    }

    /// The serializable session payload for this engine.
    pub fn to_state(&self) -> EngineState {
        EngineState {
            workflow_id: self.definition.id.clone(),
            step: self.step,
            submissions: self.submissions.clone(),
            actor: self.actor.clone(),
        }
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn status(&self) -> EngineStatus {
        if !self.started {
            EngineStatus::NotStarted
        } else if self.step > self.definition.total_steps() {
            EngineStatus::Complete
        } else {
            EngineStatus::InProgress(self.step)
        }
    }

    /// The step currently being filled out; `None` before `start` and after
    /// completion.
    pub fn current_step(&self) -> Option<&StepDefinition> {
        match self.status() {
            EngineStatus::InProgress(position) => self.definition.step_at(position),
            _ => None,
        }
    }

    pub fn progress(&self) -> Progress {
        progress::compute(self.step, self.definition.total_steps())
    }

    /// True at the last fillable step (not in the completed pseudo-state).
    pub fn is_at_final_step(&self) -> bool {
        self.started && self.step == self.definition.total_steps()
    }

    /// Enter the workflow.  `NotStarted → InProgress(1)`, resolving the first
    /// step's submission; on an engine that already started, this just
    /// re-resolves the current step.
    #[instrument(skip(self), fields(workflow_id = %self.definition.id))]
    pub async fn start(&mut self) -> Result<SubmissionRecord, EngineError> {
        if !self.started {
            info!("entering workflow at step 1");
            self.started = true;
            self.step = 1;
        }
        let position = self.step.min(self.definition.total_steps());
        self.resolve_submission(position).await
    }

    /// Write `values` into the current step's submission and move forward.
    ///
    /// Leaving a step applies its field mappings into the next step's (lazily
    /// resolved) submission.  Leaving the *last* step is gated: the transition
    /// to `Complete` is refused with `RequiredStepsIncomplete` while any
    /// required step's submission is incomplete — the written values are kept
    /// either way, and the engine stays at the last step.
    #[instrument(skip(self, values), fields(workflow_id = %self.definition.id, step = self.step))]
    pub async fn advance(
        &mut self,
        values: &BTreeMap<String, String>,
    ) -> Result<EngineStatus, EngineError> {
        let total = self.definition.total_steps();

        if self.started && self.step > total {
            // Already complete; nothing to advance into.
            return Ok(EngineStatus::Complete);
        }
        if !self.started {
            self.started = true;
            self.step = 1;
        }

        let current = self.resolve_submission(self.step).await?;
        let current = if values.is_empty() {
            current
        } else {
            self.store.update_fields(current.id, values).await?
        };

        if self.step < total {
            self.map_forward(&current).await?;
            self.step += 1;
            debug!("advanced to step {}", self.step);
            return Ok(EngineStatus::InProgress(self.step));
        }

        // Leaving the final step: completion gate.
        let missing = self.incomplete_required_steps().await?;
        if !missing.is_empty() {
            return Err(EngineError::RequiredStepsIncomplete { missing });
        }
        self.step = total + 1;
        info!("workflow complete");
        Ok(EngineStatus::Complete)
    }

    /// Move one step back.  Clamps: a no-op at step 1 (and before `start`);
    /// from `Complete` it re-enters the last fillable step, modeling "edit
    /// after completion".  Never raises.
    pub fn go_back(&mut self) -> EngineStatus {
        let total = self.definition.total_steps();
        if self.started {
            if self.step > total {
                self.step = total;
            } else if self.step > 1 {
                self.step -= 1;
            }
        }
        self.status()
    }

    /// Forget the actor's place — but not their data.  Stored submissions
    /// survive and find-or-create reattaches them if the same actor re-enters
    /// the workflow.
    pub fn restart(&mut self) -> EngineStatus {
        info!(workflow_id = %self.definition.id, "restarting workflow");
        self.started = false;
        self.step = 1;
        self.submissions.clear();
        self.status()
    }

    /// Whether every required step's submission is complete *and* the actor
    /// has advanced past the last step.
    pub async fn is_complete(&self) -> Result<bool, EngineError> {
        if !self.started || self.step <= self.definition.total_steps() {
            return Ok(false);
        }
        Ok(self.incomplete_required_steps().await?.is_empty())
    }

    /// The submission for the step currently being filled out, resolved (and
    /// created on first access) through the store.  `None` before `start` and
    /// after completion.
    pub async fn current_submission(
        &mut self,
    ) -> Result<Option<SubmissionRecord>, EngineError> {
        match self.status() {
            EngineStatus::InProgress(position) => {
                Ok(Some(self.resolve_submission(position).await?))
            }
            _ => Ok(None),
        }
    }

    /// Explicit submission resolution — no hidden memoization.  The state map
    /// only records the id, so a reloaded engine reattaches to the same
    /// submission through the same store call.
    async fn resolve_submission(
        &mut self,
        position: u32,
    ) -> Result<SubmissionRecord, EngineError> {
        let definition = Arc::clone(&self.definition);
        let step = definition.step_at(position).ok_or_else(|| {
            EngineError::InvalidState(format!("no step at position {position}"))
        })?;

        if let Some(id) = self.submissions.get(&position) {
            return Ok(self.store.get(*id).await?);
        }

        let scope = SubmissionScope::new(definition.id.clone(), self.actor.clone());
        let record = self.store.find_or_create(&scope, &step.form_id).await?;
        self.submissions.insert(position, record.id);
        Ok(record)
    }

    /// Copy the mapped fields of the step being left into the next step's
    /// submission, never clobbering values already present there.
    async fn map_forward(&mut self, source: &SubmissionRecord) -> Result<(), EngineError> {
        let definition = Arc::clone(&self.definition);
        let Some(step) = definition.step_at(self.step) else {
            return Ok(());
        };
        if step.field_mappings.is_empty() {
            return Ok(());
        }

        let target = self.resolve_submission(self.step + 1).await?;
        let writes = mapper::apply(&source.field_values, &target.field_values, &step.field_mappings);
        if !writes.is_empty() {
            debug!(
                "carrying {} shared field(s) into step {}",
                writes.len(),
                self.step + 1
            );
            self.store.update_fields(target.id, &writes).await?;
        }
        Ok(())
    }

    /// Positions of required steps whose submissions are missing or
    /// incomplete, in step order.
    async fn incomplete_required_steps(&self) -> Result<Vec<u32>, EngineError> {
        let mut missing = Vec::new();
        for step in self.definition.steps.iter().filter(|step| step.required) {
            match self.submissions.get(&step.position) {
                None => missing.push(step.position),
                Some(id) => {
                    if !self.store.get(*id).await?.complete {
                        missing.push(step.position);
                    }
                }
            }
        }
        Ok(missing)
    }
}
