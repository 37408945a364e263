//! Scenario tests for the workflow state machine.
//!
//! These run against the in-memory store and a form-rules stub, so no real
//! Postgres connection is required.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use store::{Actor, FormRules, MemorySubmissionStore};

use crate::machine::WorkflowEngine;
use crate::models::{EngineState, EngineStatus, FieldMapping, StepDefinition, WorkflowDefinition};
use crate::EngineError;

/// Rules stub: form id → its required field keys.
struct TestRules {
    required: HashMap<String, Vec<String>>,
}

impl TestRules {
    fn new(forms: &[(&str, &[&str])]) -> Self {
        Self {
            required: forms
                .iter()
                .map(|(form, keys)| {
                    let keys = keys.iter().map(|key| (*key).to_owned()).collect();
                    ((*form).to_owned(), keys)
                })
                .collect(),
        }
    }
}

impl FormRules for TestRules {
    fn contains(&self, form_id: &str) -> bool {
        self.required.contains_key(form_id)
    }

    fn is_complete(&self, form_id: &str, values: &BTreeMap<String, String>) -> bool {
        self.required.get(form_id).is_some_and(|keys| {
            keys.iter()
                .all(|key| values.get(key).is_some_and(|value| !value.is_empty()))
        })
    }
}

fn rules() -> Arc<TestRules> {
    Arc::new(TestRules::new(&[
        ("sc-100", &["name"]),
        ("sc-103", &[]),
        ("sc-104", &["signature"]),
    ]))
}

fn step(position: u32, form_id: &str, required: bool) -> StepDefinition {
    StepDefinition {
        position,
        form_id: form_id.into(),
        title: None,
        required,
        field_mappings: Vec::new(),
    }
}

/// Three steps: 1 and 3 required, 2 optional.
fn claim_workflow() -> Arc<WorkflowDefinition> {
    Arc::new(WorkflowDefinition::new(
        "small-claims",
        "Small Claims Filing",
        vec![
            step(1, "sc-100", true),
            step(2, "sc-103", false),
            step(3, "sc-104", true),
        ],
    ))
}

/// Same workflow, with step 1 carrying `name → name` into step 2.
fn mapped_workflow() -> Arc<WorkflowDefinition> {
    let mut steps = vec![
        step(1, "sc-100", true),
        step(2, "sc-103", false),
        step(3, "sc-104", true),
    ];
    steps[0].field_mappings.push(FieldMapping {
        from: "name".into(),
        to: "name".into(),
    });
    Arc::new(WorkflowDefinition::new(
        "small-claims",
        "Small Claims Filing",
        steps,
    ))
}

fn engine_with(
    definition: Arc<WorkflowDefinition>,
) -> (WorkflowEngine, Arc<MemorySubmissionStore>) {
    let store = Arc::new(MemorySubmissionStore::new(rules()));
    let engine = WorkflowEngine::new(definition, store.clone(), Actor::session("tok-1"))
        .expect("valid definition");
    (engine, store)
}

fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

// ============================================================
// Entering and walking the workflow
// ============================================================

#[tokio::test]
async fn start_enters_first_step_and_resolves_its_submission() {
    let (mut engine, store) = engine_with(claim_workflow());
    assert_eq!(engine.status(), EngineStatus::NotStarted);
    assert_eq!(engine.current_step(), None);

    let submission = engine.start().await.unwrap();
    assert_eq!(engine.status(), EngineStatus::InProgress(1));
    assert_eq!(submission.form_id, "sc-100");
    assert_eq!(store.len(), 1);

    // Entering again reattaches instead of creating.
    let again = engine.start().await.unwrap();
    assert_eq!(again.id, submission.id);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn required_steps_filled_walks_to_complete() {
    let (mut engine, _store) = engine_with(claim_workflow());
    engine.start().await.unwrap();

    let status = engine.advance(&values(&[("name", "Jane")])).await.unwrap();
    assert_eq!(status, EngineStatus::InProgress(2));

    // Skip the optional step.
    let status = engine.advance(&BTreeMap::new()).await.unwrap();
    assert_eq!(status, EngineStatus::InProgress(3));
    assert!(engine.is_at_final_step());
    assert!(!engine.is_complete().await.unwrap());

    let status = engine
        .advance(&values(&[("signature", "Jane Doe")]))
        .await
        .unwrap();
    assert_eq!(status, EngineStatus::Complete);
    assert!(engine.is_complete().await.unwrap());
    assert_eq!(engine.progress().percent, 100);
}

#[tokio::test]
async fn advance_before_start_enters_the_workflow_first() {
    let (mut engine, _store) = engine_with(claim_workflow());

    let status = engine.advance(&values(&[("name", "Jane")])).await.unwrap();
    assert_eq!(status, EngineStatus::InProgress(2));
    assert!(engine.to_state().submissions.contains_key(&1));
}

#[tokio::test]
async fn advance_clamps_when_already_complete() {
    let (mut engine, _store) = engine_with(claim_workflow());
    engine.start().await.unwrap();
    engine.advance(&values(&[("name", "Jane")])).await.unwrap();
    engine.advance(&BTreeMap::new()).await.unwrap();
    engine
        .advance(&values(&[("signature", "Jane Doe")]))
        .await
        .unwrap();
    assert_eq!(engine.status(), EngineStatus::Complete);

    let status = engine.advance(&BTreeMap::new()).await.unwrap();
    assert_eq!(status, EngineStatus::Complete);
}

// ============================================================
// Completion gating
// ============================================================

#[tokio::test]
async fn completion_is_refused_while_a_required_step_is_incomplete() {
    let (mut engine, _store) = engine_with(claim_workflow());
    engine.start().await.unwrap();

    // Leave step 1 without its required name.
    engine.advance(&BTreeMap::new()).await.unwrap();
    engine.advance(&BTreeMap::new()).await.unwrap();
    assert!(engine.is_at_final_step());

    let err = engine
        .advance(&values(&[("signature", "Jane Doe")]))
        .await
        .unwrap_err();
    match err {
        EngineError::RequiredStepsIncomplete { missing } => assert_eq!(missing, vec![1]),
        other => panic!("unexpected error: {other}"),
    }
    // The engine stays put; the signature written before the refusal is kept.
    assert_eq!(engine.status(), EngineStatus::InProgress(3));

    // Fix step 1, walk forward again, and finish.
    engine.go_back();
    engine.go_back();
    engine.advance(&values(&[("name", "Jane")])).await.unwrap();
    engine.advance(&BTreeMap::new()).await.unwrap();
    let status = engine.advance(&BTreeMap::new()).await.unwrap();
    assert_eq!(status, EngineStatus::Complete);
}

// ============================================================
// Field mapping
// ============================================================

#[tokio::test]
async fn leaving_a_step_carries_mapped_fields_forward() {
    let (mut engine, _store) = engine_with(mapped_workflow());
    engine.start().await.unwrap();
    engine.advance(&values(&[("name", "Jane")])).await.unwrap();

    let second = engine.current_submission().await.unwrap().unwrap();
    assert_eq!(second.form_id, "sc-103");
    assert_eq!(second.field_values["name"], "Jane");
}

#[tokio::test]
async fn mapping_never_overwrites_a_value_entered_on_the_target_step() {
    let (mut engine, _store) = engine_with(mapped_workflow());
    engine.start().await.unwrap();
    engine.advance(&values(&[("name", "Original")])).await.unwrap();

    // The user edits the carried value on step 2, then returns to step 1.
    engine
        .advance(&values(&[("name", "Prior Value")]))
        .await
        .unwrap();
    engine.go_back();
    engine.go_back();
    assert_eq!(engine.status(), EngineStatus::InProgress(1));

    engine.advance(&values(&[("name", "Changed")])).await.unwrap();
    let second = engine.current_submission().await.unwrap().unwrap();
    assert_eq!(second.field_values["name"], "Prior Value");
}

// ============================================================
// Backward navigation and restart
// ============================================================

#[tokio::test]
async fn go_back_clamps_at_the_first_step_and_reenters_from_complete() {
    let (mut engine, _store) = engine_with(claim_workflow());

    // Before start, going back is a no-op.
    assert_eq!(engine.go_back(), EngineStatus::NotStarted);

    engine.start().await.unwrap();
    assert_eq!(engine.go_back(), EngineStatus::InProgress(1));

    engine.advance(&values(&[("name", "Jane")])).await.unwrap();
    engine.advance(&BTreeMap::new()).await.unwrap();
    engine
        .advance(&values(&[("signature", "Jane Doe")]))
        .await
        .unwrap();
    assert_eq!(engine.status(), EngineStatus::Complete);

    // Editing after completion re-enters the last fillable step.
    assert_eq!(engine.go_back(), EngineStatus::InProgress(3));
}

#[tokio::test]
async fn restart_forgets_position_but_not_data() {
    let (mut engine, store) = engine_with(claim_workflow());
    engine.start().await.unwrap();
    engine.advance(&values(&[("name", "Jane")])).await.unwrap();
    let step_one_id = engine.to_state().submissions[&1];

    assert_eq!(engine.restart(), EngineStatus::NotStarted);
    let state = engine.to_state();
    assert_eq!(state.step, 1);
    assert!(state.submissions.is_empty());

    // The submission survives the restart...
    assert_eq!(store.len(), 1);

    // ...and re-entry reattaches to it with the data intact.
    let reattached = engine.start().await.unwrap();
    assert_eq!(reattached.id, step_one_id);
    assert_eq!(reattached.field_values["name"], "Jane");
}

// ============================================================
// Serialization
// ============================================================

#[tokio::test]
async fn state_round_trips_losslessly() {
    let (mut engine, store) = engine_with(claim_workflow());
    engine.start().await.unwrap();
    engine.advance(&values(&[("name", "Jane")])).await.unwrap();

    let state = engine.to_state();
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["workflow_id"], "small-claims");
    assert_eq!(json["step"], 2);
    assert_eq!(
        json["actor"],
        serde_json::json!({"session_token": "tok-1"})
    );

    let reloaded: EngineState = serde_json::from_value(json).unwrap();
    let rebuilt =
        WorkflowEngine::from_state(claim_workflow(), store.clone(), reloaded).unwrap();
    assert_eq!(rebuilt.status(), EngineStatus::InProgress(2));
    assert_eq!(rebuilt.to_state(), state);

    // Idempotent: another round trip changes nothing.
    let twice = WorkflowEngine::from_state(claim_workflow(), store, rebuilt.to_state()).unwrap();
    assert_eq!(twice.to_state(), state);
}

#[tokio::test]
async fn not_started_state_round_trips_as_not_started() {
    let (engine, store) = engine_with(claim_workflow());
    let state = engine.to_state();
    assert_eq!(state.step, 1);
    assert!(state.submissions.is_empty());

    let rebuilt = WorkflowEngine::from_state(claim_workflow(), store, state).unwrap();
    assert_eq!(rebuilt.status(), EngineStatus::NotStarted);
}

#[tokio::test]
async fn malformed_state_blobs_are_rejected() {
    let actor = Actor::session("tok-1");
    let blank = |workflow_id: &str, step: u32| EngineState {
        workflow_id: workflow_id.into(),
        step,
        submissions: BTreeMap::new(),
        actor: actor.clone(),
    };
    let store = || Arc::new(MemorySubmissionStore::new(rules()));

    // Wrong workflow.
    assert!(matches!(
        WorkflowEngine::from_state(claim_workflow(), store(), blank("other", 1)),
        Err(EngineError::InvalidState(_))
    ));

    // Position 0 and position past the completed pseudo-state.
    assert!(matches!(
        WorkflowEngine::from_state(claim_workflow(), store(), blank("small-claims", 0)),
        Err(EngineError::InvalidState(_))
    ));
    assert!(matches!(
        WorkflowEngine::from_state(claim_workflow(), store(), blank("small-claims", 5)),
        Err(EngineError::InvalidState(_))
    ));

    // Submission recorded for a step that doesn't exist.
    let mut phantom = blank("small-claims", 2);
    phantom
        .submissions
        .insert(7, uuid::Uuid::from_u128(0xfeed));
    assert!(matches!(
        WorkflowEngine::from_state(claim_workflow(), store(), phantom),
        Err(EngineError::InvalidState(_))
    ));
}

#[tokio::test]
async fn actor_blob_with_both_identities_is_rejected() {
    let raw = serde_json::json!({
        "workflow_id": "small-claims",
        "step": 1,
        "submissions": {},
        "actor": {"user_id": "u-1", "session_token": "tok-1"}
    });
    assert!(serde_json::from_value::<EngineState>(raw).is_err());
}

// ============================================================
// Progress and construction
// ============================================================

#[tokio::test]
async fn progress_reports_rounded_percent_mid_workflow() {
    let steps = (1..=4).map(|position| step(position, "sc-103", false)).collect();
    let definition = Arc::new(WorkflowDefinition::new("four-steps", "Four Steps", steps));
    let store = Arc::new(MemorySubmissionStore::new(rules()));
    let mut engine =
        WorkflowEngine::new(definition, store, Actor::user("u-1")).expect("valid definition");

    engine.start().await.unwrap();
    engine.advance(&BTreeMap::new()).await.unwrap();
    engine.advance(&BTreeMap::new()).await.unwrap();

    let progress = engine.progress();
    assert_eq!(
        (progress.current, progress.total, progress.percent),
        (3, 4, 50)
    );
}

#[test]
fn invalid_definitions_are_rejected_at_construction() {
    let definition = Arc::new(WorkflowDefinition::new(
        "bad",
        "Bad",
        vec![step(1, "sc-100", false), step(3, "sc-104", false)],
    ));
    let store = Arc::new(MemorySubmissionStore::new(rules()));
    assert!(matches!(
        WorkflowEngine::new(definition, store, Actor::user("u-1")),
        Err(EngineError::PositionGap { .. })
    ));
}
