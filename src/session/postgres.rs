use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::SessionStoreError;
use crate::session::store::{Session, SessionStore};

/// Postgres-backed session store over the `sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(err: sqlx::Error, id: &str) -> SessionStoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            SessionStoreError::Duplicate(id.to_string())
        }
        _ => SessionStoreError::Storage(err.to_string()),
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &Session) -> Result<Session, SessionStoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_email, refresh_token, is_revoked, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_email)
        .bind(&session.refresh_token)
        .bind(session.is_revoked)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &session.id))?;

        Ok(session.clone())
    }

    async fn get(&self, id: &str) -> Result<Session, SessionStoreError> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_email, refresh_token, is_revoked, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionStoreError::Storage(e.to_string()))?
        .ok_or_else(|| SessionStoreError::NotFound(id.to_string()))
    }

    async fn revoke(&self, id: &str) -> Result<(), SessionStoreError> {
        // Zero rows affected is fine: revoking twice, or revoking an already
        // deleted session, is not an error.
        sqlx::query("UPDATE sessions SET is_revoked = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionStoreError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        Ok(())
    }
}
