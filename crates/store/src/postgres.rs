//! `PgSubmissionStore` — the Postgres `SubmissionStore`.
//!
//! Find-or-create atomicity comes from the `submissions_owner_scope` unique
//! index (see `migrations/`): the insert is `ON CONFLICT DO NOTHING` and the
//! winning row is re-selected, so concurrent first accesses to the same step
//! converge on one submission without any engine-level locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Actor, SubmissionRecord, SubmissionScope};
use crate::pool::DbPool;
use crate::traits::{FormRules, SubmissionStore};

/// Row shape of the `submissions` table.
#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: Uuid,
    workflow_id: String,
    form_id: String,
    user_id: Option<String>,
    session_token: Option<String>,
    field_values: Json<BTreeMap<String, String>>,
    complete: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_record(self) -> Result<SubmissionRecord, StoreError> {
        let actor = match (self.user_id, self.session_token) {
            (Some(id), None) => Actor::User(id),
            (None, Some(token)) => Actor::Session(token),
            // Unreachable for rows written through this crate; the schema
            // CHECK constraint enforces exactly one owner column.
            _ => return Err(StoreError::MalformedOwner(self.id)),
        };

        Ok(SubmissionRecord {
            id: self.id,
            workflow_id: self.workflow_id,
            form_id: self.form_id,
            actor,
            field_values: self.field_values.0,
            complete: self.complete,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgSubmissionStore {
    pool: DbPool,
    rules: Arc<dyn FormRules>,
}

impl PgSubmissionStore {
    pub fn new(pool: DbPool, rules: Arc<dyn FormRules>) -> Self {
        Self { pool, rules }
    }

    async fn select_by_scope(
        &self,
        scope: &SubmissionScope,
        form_id: &str,
    ) -> Result<SubmissionRow, StoreError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, workflow_id, form_id, user_id, session_token,
                   field_values, complete, created_at, updated_at
            FROM submissions
            WHERE workflow_id = $1
              AND form_id = $2
              AND user_id IS NOT DISTINCT FROM $3
              AND session_token IS NOT DISTINCT FROM $4
            "#,
        )
        .bind(&scope.workflow_id)
        .bind(form_id)
        .bind(scope.actor.user_id())
        .bind(scope.actor.session_token())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row)
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn find_or_create(
        &self,
        scope: &SubmissionScope,
        form_id: &str,
    ) -> Result<SubmissionRecord, StoreError> {
        if !self.rules.contains(form_id) {
            return Err(StoreError::UnknownForm(form_id.to_owned()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let empty: BTreeMap<String, String> = BTreeMap::new();
        let complete = self.rules.is_complete(form_id, &empty);

        let inserted = sqlx::query(
            r#"
            INSERT INTO submissions
                (id, workflow_id, form_id, user_id, session_token,
                 field_values, complete, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (workflow_id, form_id,
                         (COALESCE(user_id, '')), (COALESCE(session_token, '')))
            DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&scope.workflow_id)
        .bind(form_id)
        .bind(scope.actor.user_id())
        .bind(scope.actor.session_token())
        .bind(Json(&empty))
        .bind(complete)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            debug!("submission already exists for ({}, {form_id})", scope.workflow_id);
        }

        // Re-select: returns our insert or the row that won the conflict.
        self.select_by_scope(scope, form_id).await?.into_record()
    }

    async fn update_fields(
        &self,
        id: Uuid,
        values: &BTreeMap<String, String>,
    ) -> Result<SubmissionRecord, StoreError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, workflow_id, form_id, user_id, session_token,
                   field_values, complete, created_at, updated_at
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        let mut record = row.into_record()?;
        for (key, value) in values {
            record.field_values.insert(key.clone(), value.clone());
        }
        record.complete = self
            .rules
            .is_complete(&record.form_id, &record.field_values);
        record.updated_at = Utc::now();

        // Read-modify-write; concurrent tabs resolve last-write-wins, which is
        // the documented session model.
        sqlx::query(
            r#"
            UPDATE submissions
            SET field_values = $1, complete = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(Json(&record.field_values))
        .bind(record.complete)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<SubmissionRecord, StoreError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, workflow_id, form_id, user_id, session_token,
                   field_values, complete, created_at, updated_at
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        row.into_record()
    }
}
