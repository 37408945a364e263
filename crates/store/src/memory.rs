//! `MemorySubmissionStore` — an in-process `SubmissionStore`.
//!
//! Backs the engine in tests and in storage-less deployments (no
//! `DATABASE_URL`).  Enforces the same find-or-create key discipline as the
//! Postgres schema, just with a map instead of a unique index.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Actor, SubmissionRecord, SubmissionScope};
use crate::traits::{FormRules, SubmissionStore};

/// (workflow_id, form_id, actor) — the uniqueness key.
type SubmissionKey = (String, String, Actor);

#[derive(Default)]
struct Inner {
    by_key: HashMap<SubmissionKey, Uuid>,
    by_id: HashMap<Uuid, SubmissionRecord>,
}

pub struct MemorySubmissionStore {
    rules: Arc<dyn FormRules>,
    inner: Mutex<Inner>,
}

impl MemorySubmissionStore {
    pub fn new(rules: Arc<dyn FormRules>) -> Self {
        Self {
            rules,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Number of submissions currently held.  Test-facing.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn find_or_create(
        &self,
        scope: &SubmissionScope,
        form_id: &str,
    ) -> Result<SubmissionRecord, StoreError> {
        if !self.rules.contains(form_id) {
            return Err(StoreError::UnknownForm(form_id.to_owned()));
        }

        let key: SubmissionKey = (
            scope.workflow_id.clone(),
            form_id.to_owned(),
            scope.actor.clone(),
        );

        let mut inner = self.inner.lock().unwrap();

        if let Some(id) = inner.by_key.get(&key) {
            return Ok(inner.by_id[id].clone());
        }

        let now = Utc::now();
        let fields = BTreeMap::new();
        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            workflow_id: scope.workflow_id.clone(),
            form_id: form_id.to_owned(),
            actor: scope.actor.clone(),
            complete: self.rules.is_complete(form_id, &fields),
            field_values: fields,
            created_at: now,
            updated_at: now,
        };

        inner.by_key.insert(key, record.id);
        inner.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        values: &BTreeMap<String, String>,
    ) -> Result<SubmissionRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner.by_id.get_mut(&id).ok_or(StoreError::NotFound)?;

        for (key, value) in values {
            record.field_values.insert(key.clone(), value.clone());
        }
        record.complete = self
            .rules
            .is_complete(&record.form_id, &record.field_values);
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn get(&self, id: Uuid) -> Result<SubmissionRecord, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.by_id.get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rules stub: every form named here exists; "sig" is its only required
    /// field when `require_sig` is set.
    struct StubRules {
        forms: Vec<String>,
        require_sig: bool,
    }

    impl FormRules for StubRules {
        fn contains(&self, form_id: &str) -> bool {
            self.forms.iter().any(|f| f == form_id)
        }

        fn is_complete(&self, _form_id: &str, values: &BTreeMap<String, String>) -> bool {
            !self.require_sig || values.get("sig").is_some_and(|v| !v.is_empty())
        }
    }

    fn store(require_sig: bool) -> MemorySubmissionStore {
        MemorySubmissionStore::new(Arc::new(StubRules {
            forms: vec!["sc-100".into(), "sc-103".into()],
            require_sig,
        }))
    }

    fn scope() -> SubmissionScope {
        SubmissionScope::new("small-claims", Actor::session("tok-1"))
    }

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let store = store(false);

        let first = store.find_or_create(&scope(), "sc-100").await.unwrap();
        let second = store.find_or_create(&scope(), "sc-100").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn distinct_actors_get_distinct_submissions() {
        let store = store(false);
        let anon = store.find_or_create(&scope(), "sc-100").await.unwrap();
        let user_scope = SubmissionScope::new("small-claims", Actor::user("u-1"));
        let user = store.find_or_create(&user_scope, "sc-100").await.unwrap();

        assert_ne!(anon.id, user.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn unknown_form_is_rejected() {
        let store = store(false);
        let err = store.find_or_create(&scope(), "sc-999").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownForm(id) if id == "sc-999"));
    }

    #[tokio::test]
    async fn update_merges_fields_and_reevaluates_completeness() {
        let store = store(true);
        let draft = store.find_or_create(&scope(), "sc-100").await.unwrap();
        assert!(!draft.complete);

        let mut values = BTreeMap::new();
        values.insert("name".to_owned(), "Jane".to_owned());
        let updated = store.update_fields(draft.id, &values).await.unwrap();
        assert_eq!(updated.field_values["name"], "Jane");
        assert!(!updated.complete);

        let mut values = BTreeMap::new();
        values.insert("sig".to_owned(), "Jane Doe".to_owned());
        let signed = store.update_fields(draft.id, &values).await.unwrap();
        // Earlier fields survive the merge.
        assert_eq!(signed.field_values["name"], "Jane");
        assert!(signed.complete);
    }

    #[tokio::test]
    async fn update_of_missing_submission_is_not_found() {
        let store = store(false);
        let err = store
            .update_fields(Uuid::new_v4(), &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
