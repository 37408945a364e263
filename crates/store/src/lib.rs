//! `store` crate — submission persistence.
//!
//! Defines the [`SubmissionStore`] trait the engine dispatches through, the
//! shared actor/record types, and two implementations: Postgres (find-or-create
//! atomicity enforced by a unique index in the schema) and in-memory (tests and
//! storage-less deployments).  No workflow logic lives here.

pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod postgres;
pub mod traits;

pub use error::{InvalidActor, StoreError};
pub use memory::MemorySubmissionStore;
pub use models::{Actor, ActorBlob, SubmissionRecord, SubmissionScope};
pub use pool::DbPool;
pub use postgres::PgSubmissionStore;
pub use traits::{FormRules, SubmissionStore};
