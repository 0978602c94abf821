/// Auth Orchestrator
///
/// Composes the credential verifier, token maker, and session store into the
/// four session-lifecycle operations: login, refresh, logout, revoke. This is
/// the only place where cross-cutting auth policy lives; the session state
/// machine (no-session -> active -> revoked/expired -> no-session) is driven
/// entirely from here.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::auth::claims::UserClaims;
use crate::auth::password::verify_password;
use crate::auth::token::TokenMaker;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, SessionStoreError};
use crate::session::{Session, SessionStore};

/// Everything a successful login hands back to the caller.
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Result of a refresh: a new access token only, the refresh token is never
/// rotated.
#[derive(Debug, Clone)]
pub struct RenewedAccessToken {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

pub struct AuthService {
    token_maker: TokenMaker,
    store: Arc<dyn SessionStore>,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthService {
    pub fn new(token_maker: TokenMaker, store: Arc<dyn SessionStore>, jwt: &JwtSettings) -> Self {
        Self {
            token_maker,
            store,
            access_token_ttl: Duration::seconds(jwt.access_token_expiry),
            refresh_token_ttl: Duration::seconds(jwt.refresh_token_expiry),
        }
    }

    /// Verify credentials and open a new session.
    ///
    /// The access token reuses the refresh token's id, so a later logout or
    /// revoke keyed off the caller's access-token claims resolves the session
    /// this login created. Session persistence failures surface as errors;
    /// login never reports success without a retrievable session.
    ///
    /// # Errors
    /// `InvalidCredentials` on password mismatch; internal errors if token
    /// creation or session persistence fails.
    pub async fn login(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
        password: &str,
        password_hash: &str,
    ) -> Result<LoginTokens, AppError> {
        if !verify_password(password, password_hash)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let (refresh_token, refresh_claims) =
            self.token_maker
                .create_token(user_id, email, is_admin, self.refresh_token_ttl)?;
        let (access_token, access_claims) = self.token_maker.create_token_with_id(
            &refresh_claims.jti,
            user_id,
            email,
            is_admin,
            self.access_token_ttl,
        )?;

        let session = Session {
            id: refresh_claims.jti.clone(),
            user_email: email.to_string(),
            refresh_token: refresh_token.clone(),
            is_revoked: false,
            expires_at: refresh_claims.expires_at(),
        };
        self.store.create(&session).await?;

        tracing::info!(user_id = user_id, session_id = %session.id, "Session created");

        Ok(LoginTokens {
            session_id: session.id,
            access_token,
            refresh_token,
            access_token_expires_at: access_claims.expires_at(),
            refresh_token_expires_at: refresh_claims.expires_at(),
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The session is re-read from the store on every call, so a concurrent
    /// revoke is honored immediately. Expiry is enforced lazily here through
    /// the token verification itself; there is no background sweep.
    ///
    /// # Errors
    /// Unauthorized (`TokenInvalid` / `SessionNotFound` / `SessionRevoked` /
    /// `SessionMismatch`) on any verification failure; internal error if the
    /// new token cannot be issued.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RenewedAccessToken, AppError> {
        let claims = self.token_maker.verify_token(refresh_token)?;

        let session = self.store.get(&claims.jti).await.map_err(|e| match e {
            SessionStoreError::NotFound(_) => AppError::Auth(AuthError::SessionNotFound),
            other => other.into(),
        })?;

        if session.is_revoked {
            return Err(AppError::Auth(AuthError::SessionRevoked));
        }
        // Bind the token to the session owner; a token paired with someone
        // else's session record must not mint access tokens.
        if session.user_email != claims.email {
            return Err(AppError::Auth(AuthError::SessionMismatch));
        }

        let (access_token, access_claims) = self.token_maker.create_token_with_id(
            &session.id,
            claims.id,
            &claims.email,
            claims.is_admin,
            self.access_token_ttl,
        )?;

        Ok(RenewedAccessToken {
            access_token,
            access_token_expires_at: access_claims.expires_at(),
        })
    }

    /// Terminate the caller's session by deleting its record.
    ///
    /// The claims come from the authenticated-request gate; their token id is
    /// the session key.
    pub async fn logout(&self, claims: &UserClaims) -> Result<(), AppError> {
        self.store.delete(&claims.jti).await?;
        tracing::info!(user_id = claims.id, session_id = %claims.jti, "Session deleted");
        Ok(())
    }

    /// Revoke the caller's session without deleting it.
    ///
    /// The record persists for audit; further refreshes against it fail.
    pub async fn revoke(&self, claims: &UserClaims) -> Result<(), AppError> {
        self.store.revoke(&claims.jti).await?;
        tracing::info!(user_id = claims.id, session_id = %claims.jti, "Session revoked");
        Ok(())
    }

    pub fn token_maker(&self) -> &TokenMaker {
        &self.token_maker
    }
}
