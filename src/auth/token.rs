/// JWT Token Generation and Validation
///
/// `TokenMaker` is a value object holding the symmetric signing secret,
/// injected at construction. Stateless apart from the secret: both encode
/// and decode are pure functions of secret + input.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::UserClaims;
use crate::error::{AppError, AuthError};

#[derive(Clone)]
pub struct TokenMaker {
    secret: String,
}

impl TokenMaker {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Create a signed token with a freshly generated token id.
    ///
    /// # Errors
    /// Returns an internal error if signing fails.
    pub fn create_token(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
        ttl: Duration,
    ) -> Result<(String, UserClaims), AppError> {
        self.sign(UserClaims::new(user_id, email, is_admin, ttl))
    }

    /// Create a signed token reusing a caller-supplied token id.
    ///
    /// Used when an access token must carry the same id as the refresh token
    /// whose session backs it.
    pub fn create_token_with_id(
        &self,
        token_id: &str,
        user_id: i64,
        email: &str,
        is_admin: bool,
        ttl: Duration,
    ) -> Result<(String, UserClaims), AppError> {
        self.sign(UserClaims::with_token_id(token_id, user_id, email, is_admin, ttl))
    }

    fn sign(&self, claims: UserClaims) -> Result<(String, UserClaims), AppError> {
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate a token and extract its claims.
    ///
    /// Only HS256 is accepted; a token whose header names any other algorithm
    /// is rejected outright. Expiry is checked with zero leeway. Every
    /// failure collapses to the same `TokenInvalid` error so callers learn
    /// nothing about which check rejected them; the detail is logged.
    pub fn verify_token(&self, token: &str) -> Result<UserClaims, AppError> {
        // UserClaims has no optional fields, so a missing claim already
        // fails deserialization; the validation itself checks alg + expiry.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT validation error: {}", e);
            AppError::Auth(AuthError::TokenInvalid)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn maker() -> TokenMaker {
        TokenMaker::new(TEST_SECRET)
    }

    #[test]
    fn create_and_verify_roundtrip() {
        let maker = maker();
        let (token, claims) = maker
            .create_token(7, "test@example.com", true, Duration::minutes(15))
            .expect("Failed to create token");

        let verified = maker.verify_token(&token).expect("Failed to verify token");

        assert_eq!(verified.id, 7);
        assert_eq!(verified.email, "test@example.com");
        assert!(verified.is_admin);
        assert_eq!(verified.jti, claims.jti);
        assert_eq!(verified.sub, "test@example.com");
    }

    #[test]
    fn token_ids_are_unique_across_calls() {
        let maker = maker();
        let (_, a) = maker
            .create_token(1, "a@x.com", false, Duration::hours(1))
            .unwrap();
        let (_, b) = maker
            .create_token(1, "a@x.com", false, Duration::hours(1))
            .unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let (token, _) = maker()
            .create_token(1, "a@x.com", false, Duration::hours(1))
            .unwrap();

        let other = TokenMaker::new("a-completely-different-secret-key-value");
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn expired_token_fails_verification() {
        let maker = maker();
        let (token, _) = maker
            .create_token(1, "a@x.com", false, Duration::seconds(-120))
            .unwrap();

        assert!(maker.verify_token(&token).is_err());
    }

    #[test]
    fn tampered_token_fails_verification() {
        let maker = maker();
        let (token, _) = maker
            .create_token(1, "a@x.com", false, Duration::hours(1))
            .unwrap();

        let tampered = format!("{}X", token);
        assert!(maker.verify_token(&tampered).is_err());
    }

    #[test]
    fn garbage_token_fails_verification() {
        assert!(maker().verify_token("invalid.token.here").is_err());
    }

    #[test]
    fn non_hs256_algorithm_is_rejected() {
        // Same secret, same claim shape, but HS384 in the header. The
        // verifier only accepts HS256.
        let claims = crate::auth::claims::UserClaims::new(1, "a@x.com", false, Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(maker().verify_token(&token).is_err());
    }

    #[test]
    fn failures_are_indistinguishable() {
        let maker = maker();
        let (expired, _) = maker
            .create_token(1, "a@x.com", false, Duration::seconds(-120))
            .unwrap();

        let err_expired = maker.verify_token(&expired).unwrap_err();
        let err_garbage = maker.verify_token("not-a-jwt").unwrap_err();

        match (err_expired, err_garbage) {
            (
                AppError::Auth(AuthError::TokenInvalid),
                AppError::Auth(AuthError::TokenInvalid),
            ) => (),
            other => panic!("Expected TokenInvalid for both, got {:?}", other),
        }
    }
}
