/// JWT Claims structure
///
/// The payload embedded in every signed token: user identity plus the
/// standard registered claims (RFC 7519). Access and refresh tokens share
/// this shape and differ only in their validity window.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaims {
    /// Owning user's database id
    pub id: i64,
    /// User email
    pub email: String,
    /// Admin flag, checked by admin-gated routes
    pub is_admin: bool,
    /// Unique token id; for refresh tokens this is also the session id
    pub jti: String,
    /// Subject (email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl UserClaims {
    /// Create claims with a freshly generated token id.
    pub fn new(user_id: i64, email: &str, is_admin: bool, ttl: Duration) -> Self {
        Self::with_token_id(&Uuid::new_v4().to_string(), user_id, email, is_admin, ttl)
    }

    /// Create claims reusing an existing token id.
    ///
    /// The access token of a login pair, and every access token minted by a
    /// refresh, carry the refresh token's id so that logout and revoke can
    /// resolve the backing session from whichever token the caller presents.
    pub fn with_token_id(
        token_id: &str,
        user_id: i64,
        email: &str,
        is_admin: bool,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: user_id,
            email: email.to_string(),
            is_admin,
            jti: token_id.to_string(),
            sub: email.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }

    /// Expiry as a UTC timestamp, for session records and responses.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}
