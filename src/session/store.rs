use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionStoreError;

/// One session per issued refresh token.
///
/// `id` always equals the `jti` claim of the refresh token it anchors; that
/// equality is how refresh, logout, and revoke locate the record from a
/// presented token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_email: String,
    pub refresh_token: String,
    pub is_revoked: bool,
    pub expires_at: DateTime<Utc>,
}

/// Persistence seam for session records.
///
/// Every check re-reads the store; nothing is cached in-process, so a revoke
/// is visible to the next refresh immediately.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with `Duplicate` on id collision.
    async fn create(&self, session: &Session) -> Result<Session, SessionStoreError>;

    /// Fetch a session by id. Fails with `NotFound` if absent.
    async fn get(&self, id: &str) -> Result<Session, SessionStoreError>;

    /// Set the revoked flag. Idempotent; an absent id is a no-op.
    async fn revoke(&self, id: &str) -> Result<(), SessionStoreError>;

    /// Remove the session. Idempotent; an absent id is a no-op.
    async fn delete(&self, id: &str) -> Result<(), SessionStoreError>;
}
