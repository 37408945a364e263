//! In-memory session store for engine state blobs.
//!
//! Keyed per (actor, workflow).  There is no engine-level locking for two
//! tabs racing on the same key — the last writer wins, which is the
//! documented session model.  Expiry is the deployment's concern (this store
//! lives as long as the process).

use std::collections::HashMap;
use std::sync::Mutex;

use engine::EngineState;
use store::Actor;

type SessionKey = (Actor, String);

#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<SessionKey, EngineState>>,
}

impl SessionStore {
    /// The persisted state for (actor, workflow), if the actor has one.
    pub fn load(&self, actor: &Actor, workflow_id: &str) -> Option<EngineState> {
        let inner = self.inner.lock().unwrap();
        inner
            .get(&(actor.clone(), workflow_id.to_owned()))
            .cloned()
    }

    /// Persist a state blob under its own (actor, workflow) key.
    pub fn save(&self, state: EngineState) {
        let key = (state.actor.clone(), state.workflow_id.clone());
        self.inner.lock().unwrap().insert(key, state);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
