//! The `SubmissionStore` and `FormRules` traits — the store's two seams.

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{SubmissionRecord, SubmissionScope};

/// Submission persistence contract.
///
/// Implementations must make `find_or_create` idempotent: repeated calls with
/// the same `(scope, form_id)` return the same logical submission, and no
/// duplicate rows are ever created for that key.  The Postgres implementation
/// gets this from a unique index; the in-memory one from its key map.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Find the submission for `(scope, form_id)`, creating an empty draft on
    /// first access.
    ///
    /// # Errors
    /// [`StoreError::UnknownForm`] when `form_id` does not resolve to a known
    /// form; persistence failures pass through unchanged.
    async fn find_or_create(
        &self,
        scope: &SubmissionScope,
        form_id: &str,
    ) -> Result<SubmissionRecord, StoreError>;

    /// Merge `values` into the submission's field map and re-evaluate its
    /// completeness flag.  Returns the updated record.
    async fn update_fields(
        &self,
        id: Uuid,
        values: &BTreeMap<String, String>,
    ) -> Result<SubmissionRecord, StoreError>;

    /// Fetch a submission by id.
    async fn get(&self, id: Uuid) -> Result<SubmissionRecord, StoreError>;
}

/// Per-form completeness rules, supplied by the form catalog.
///
/// The store evaluates a submission's `complete` flag through this trait on
/// every create and update, so the workflow engine can gate completion without
/// knowing what any form looks like.
pub trait FormRules: Send + Sync {
    /// Whether `form_id` resolves to a known form.
    fn contains(&self, form_id: &str) -> bool;

    /// Whether `values` satisfy the form's required fields.
    fn is_complete(&self, form_id: &str, values: &BTreeMap<String, String>) -> bool;
}
