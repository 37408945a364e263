//! Shared submission types: actor identity, scope keys, and the record
//! returned by every store operation.
//!
//! These live in the store crate (rather than the engine) so that both the
//! engine and individual store implementations can import them without a
//! circular dependency.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidActor;

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The identity that owns a set of submissions: a registered user or an
/// anonymous browser session.
///
/// Exactly one of the two — the enum makes "both" and "neither" unrepresentable
/// in memory, and [`ActorBlob`] validation rejects them on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "ActorBlob", into = "ActorBlob")]
pub enum Actor {
    /// A registered user, identified by their account id.
    User(String),
    /// An anonymous visitor, identified by an opaque session token.
    Session(String),
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    pub fn session(token: impl Into<String>) -> Self {
        Self::Session(token.into())
    }

    /// The user id, when this actor is a registered user.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User(id) => Some(id),
            Self::Session(_) => None,
        }
    }

    /// The session token, when this actor is anonymous.
    pub fn session_token(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(token) => Some(token),
        }
    }
}

/// Wire shape of an actor: `{"user_id": …}` or `{"session_token": …}`.
///
/// Kept separate from [`Actor`] so deserialization can reject blobs that set
/// both keys or neither, instead of silently picking one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorBlob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl TryFrom<ActorBlob> for Actor {
    type Error = InvalidActor;

    fn try_from(blob: ActorBlob) -> Result<Self, InvalidActor> {
        match (blob.user_id, blob.session_token) {
            (Some(id), None) => Ok(Actor::User(id)),
            (None, Some(token)) => Ok(Actor::Session(token)),
            _ => Err(InvalidActor),
        }
    }
}

impl From<Actor> for ActorBlob {
    fn from(actor: Actor) -> Self {
        match actor {
            Actor::User(id) => ActorBlob {
                user_id: Some(id),
                session_token: None,
            },
            Actor::Session(token) => ActorBlob {
                user_id: None,
                session_token: Some(token),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionScope
// ---------------------------------------------------------------------------

/// The scope a submission is keyed under: which workflow it belongs to and
/// which actor owns it.  Together with the form id this is the full
/// find-or-create key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionScope {
    pub workflow_id: String,
    pub actor: Actor,
}

impl SubmissionScope {
    pub fn new(workflow_id: impl Into<String>, actor: Actor) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            actor,
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionRecord
// ---------------------------------------------------------------------------

/// One actor's field values for one form within one workflow.
///
/// Created as an empty draft on first access to a step, updated repeatedly as
/// the user edits fields, never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub workflow_id: String,
    pub form_id: String,
    pub actor: Actor,
    /// field key → entered value
    pub field_values: BTreeMap<String, String>,
    /// Whether the field values satisfy the form's required fields, as judged
    /// by the [`FormRules`](crate::traits::FormRules) the store was built with.
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
