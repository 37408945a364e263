//! Typed error types for the store crate.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("submission not found")]
    NotFound,

    #[error("unknown form: '{0}'")]
    UnknownForm(String),

    /// A row whose owner columns violate the exactly-one-owner rule.
    /// The schema CHECK constraint makes this unreachable for rows written
    /// through this crate.
    #[error("submission {0} has malformed owner columns")]
    MalformedOwner(Uuid),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// An actor blob that sets both identities, or neither.
#[derive(Debug, Error)]
#[error("actor must carry exactly one of user_id or session_token")]
pub struct InvalidActor;
