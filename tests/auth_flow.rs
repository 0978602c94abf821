//! Session lifecycle tests against the auth orchestrator with an in-memory
//! session store: login, refresh, revoke, and logout, including the failure
//! paths that must stay indistinguishable to callers.

use std::sync::Arc;

use ecomm_api::auth::{hash_password, AuthService, TokenMaker};
use ecomm_api::configuration::JwtSettings;
use ecomm_api::error::{AppError, AuthError};
use ecomm_api::session::{InMemorySessionStore, SessionStore};

const SECRET: &str = "integration-test-secret-at-least-32-chars";

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: SECRET.to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 86400,
    }
}

struct TestHarness {
    service: AuthService,
    store: Arc<InMemorySessionStore>,
    password_hash: String,
}

fn harness() -> TestHarness {
    let store = Arc::new(InMemorySessionStore::new());
    let service = AuthService::new(
        TokenMaker::new(SECRET),
        store.clone(),
        &jwt_settings(),
    );
    let password_hash = hash_password("Secret123").expect("Failed to hash password");
    TestHarness {
        service,
        store,
        password_hash,
    }
}

fn assert_unauthorized(result: Result<impl std::fmt::Debug, AppError>, expected: AuthError) {
    match result {
        Err(AppError::Auth(actual)) => assert_eq!(actual, expected),
        other => panic!("Expected Auth({:?}), got {:?}", expected, other),
    }
}

#[tokio::test]
async fn login_issues_token_pair_with_shared_session_id() {
    let h = harness();

    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .expect("login failed");

    let maker = h.service.token_maker();
    let access = maker.verify_token(&tokens.access_token).unwrap();
    let refresh = maker.verify_token(&tokens.refresh_token).unwrap();

    // session id == refresh token's unique claim id == access token's
    assert_eq!(tokens.session_id, refresh.jti);
    assert_eq!(access.jti, refresh.jti);

    // 15 minute access TTL, 24 hour refresh TTL
    assert_eq!(access.exp - access.iat, 900);
    assert_eq!(refresh.exp - refresh.iat, 86400);

    // the session record anchors the refresh token
    let session = h.store.get(&tokens.session_id).await.unwrap();
    assert_eq!(session.user_email, "a@x.com");
    assert_eq!(session.refresh_token, tokens.refresh_token);
    assert_eq!(session.expires_at.timestamp(), refresh.exp);
    assert!(!session.is_revoked);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized_and_creates_no_session() {
    let h = harness();

    assert_unauthorized(
        h.service
            .login(1, "a@x.com", false, "WrongPass1", &h.password_hash)
            .await,
        AuthError::InvalidCredentials,
    );
}

#[tokio::test]
async fn refresh_mints_access_token_for_same_identity() {
    let h = harness();
    let tokens = h
        .service
        .login(9, "admin@x.com", true, "Secret123", &h.password_hash)
        .await
        .unwrap();

    let renewed = h.service.refresh(&tokens.refresh_token).await.unwrap();
    let claims = h
        .service
        .token_maker()
        .verify_token(&renewed.access_token)
        .unwrap();

    assert_eq!(claims.id, 9);
    assert_eq!(claims.email, "admin@x.com");
    assert!(claims.is_admin);
    assert_eq!(claims.jti, tokens.session_id);
    assert!(renewed.access_token_expires_at.timestamp() > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn concurrent_refreshes_are_independent() {
    // No rotation: each refresh yields a fresh access token and none
    // invalidates the others.
    let h = harness();
    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();

    let first = h.service.refresh(&tokens.refresh_token).await.unwrap();
    let second = h.service.refresh(&tokens.refresh_token).await.unwrap();

    let maker = h.service.token_maker();
    assert!(maker.verify_token(&first.access_token).is_ok());
    assert!(maker.verify_token(&second.access_token).is_ok());
}

#[tokio::test]
async fn refresh_with_invalid_token_is_unauthorized() {
    let h = harness();
    assert_unauthorized(
        h.service.refresh("not.a.token").await,
        AuthError::TokenInvalid,
    );
}

#[tokio::test]
async fn refresh_with_foreign_secret_token_is_unauthorized() {
    let h = harness();
    let forged_maker = TokenMaker::new("attacker-controlled-secret-of-32-chars!");
    let (forged, _) = forged_maker
        .create_token(1, "a@x.com", true, chrono::Duration::hours(24))
        .unwrap();

    assert_unauthorized(h.service.refresh(&forged).await, AuthError::TokenInvalid);
}

#[tokio::test]
async fn refresh_after_revoke_is_unauthorized() {
    let h = harness();
    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();
    let claims = h
        .service
        .token_maker()
        .verify_token(&tokens.access_token)
        .unwrap();

    h.service.revoke(&claims).await.unwrap();

    assert_unauthorized(
        h.service.refresh(&tokens.refresh_token).await,
        AuthError::SessionRevoked,
    );

    // the record is retained for audit, only flagged
    let session = h.store.get(&tokens.session_id).await.unwrap();
    assert!(session.is_revoked);
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let h = harness();
    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();
    let claims = h
        .service
        .token_maker()
        .verify_token(&tokens.access_token)
        .unwrap();

    h.service.revoke(&claims).await.unwrap();
    h.service.revoke(&claims).await.unwrap();

    assert!(h.store.get(&tokens.session_id).await.unwrap().is_revoked);
}

#[tokio::test]
async fn refresh_against_mismatched_session_owner_is_unauthorized() {
    let h = harness();
    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();

    // Simulate a tampered/mismatched record: same id, different owner.
    h.store.delete(&tokens.session_id).await.unwrap();
    let mut session = ecomm_api::session::Session {
        id: tokens.session_id.clone(),
        user_email: "someone-else@x.com".to_string(),
        refresh_token: tokens.refresh_token.clone(),
        is_revoked: false,
        expires_at: tokens.refresh_token_expires_at,
    };
    h.store.create(&session).await.unwrap();

    assert_unauthorized(
        h.service.refresh(&tokens.refresh_token).await,
        AuthError::SessionMismatch,
    );

    // a revoked flag takes precedence over the mismatch check
    session.is_revoked = true;
    h.store.delete(&session.id).await.unwrap();
    h.store.create(&session).await.unwrap();
    assert_unauthorized(
        h.service.refresh(&tokens.refresh_token).await,
        AuthError::SessionRevoked,
    );
}

#[tokio::test]
async fn logout_deletes_session_and_blocks_further_refresh() {
    let h = harness();
    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();

    // logout is keyed off the access token's claims; the shared token id
    // guarantees it finds the session the refresh token anchors
    let claims = h
        .service
        .token_maker()
        .verify_token(&tokens.access_token)
        .unwrap();
    h.service.logout(&claims).await.unwrap();

    assert!(h.store.get(&tokens.session_id).await.is_err());
    assert_unauthorized(
        h.service.refresh(&tokens.refresh_token).await,
        AuthError::SessionNotFound,
    );

    // logging out again is harmless
    h.service.logout(&claims).await.unwrap();
}

#[tokio::test]
async fn logout_works_from_renewed_access_token() {
    let h = harness();
    let tokens = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();

    let renewed = h.service.refresh(&tokens.refresh_token).await.unwrap();
    let claims = h
        .service
        .token_maker()
        .verify_token(&renewed.access_token)
        .unwrap();

    h.service.logout(&claims).await.unwrap();

    assert_unauthorized(
        h.service.refresh(&tokens.refresh_token).await,
        AuthError::SessionNotFound,
    );
}

#[tokio::test]
async fn concurrent_logins_coexist() {
    let h = harness();

    let first = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();
    let second = h
        .service
        .login(1, "a@x.com", false, "Secret123", &h.password_hash)
        .await
        .unwrap();

    assert_ne!(first.session_id, second.session_id);

    // terminating one session leaves the other intact
    let claims = h
        .service
        .token_maker()
        .verify_token(&first.access_token)
        .unwrap();
    h.service.logout(&claims).await.unwrap();

    assert!(h.service.refresh(&second.refresh_token).await.is_ok());
    assert_unauthorized(
        h.service.refresh(&first.refresh_token).await,
        AuthError::SessionNotFound,
    );
}
