use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SessionStoreError;
use crate::session::store::{Session, SessionStore};

/// In-memory session store.
///
/// Backs the test suite and local development without a database. Same
/// semantics as the Postgres store: duplicate ids rejected on create,
/// revoke/delete are no-ops for absent ids.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> Result<Session, SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        if sessions.contains_key(&session.id) {
            return Err(SessionStoreError::Duplicate(session.id.clone()));
        }
        sessions.insert(session.id.clone(), session.clone());

        Ok(session.clone())
    }

    async fn get(&self, id: &str) -> Result<Session, SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?
            .get(id)
            .cloned()
            .ok_or_else(|| SessionStoreError::NotFound(id.to_string()))
    }

    async fn revoke(&self, id: &str) -> Result<(), SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        if let Some(session) = sessions.get_mut(id) {
            session.is_revoked = true;
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?
            .remove(id);

        Ok(())
    }
}
