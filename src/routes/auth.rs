/// Authentication Routes
///
/// Login, token refresh, logout, and session revocation. The session
/// lifecycle policy lives in `AuthService`; these handlers only shape
/// requests and responses.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{AuthService, UserClaims};
use crate::error::{AppError, AuthError};
use crate::validators::is_valid_email;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct RenewAccessTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

/// POST /auth/login
///
/// Authenticate with email and password; returns an access/refresh token
/// pair and the id of the session backing the refresh token.
///
/// # Errors
/// - 400: invalid email format
/// - 401: unknown email or wrong password (indistinguishable by design)
/// - 500: token creation or session persistence failure
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    // Unknown email falls through to the same error as a bad password to
    // prevent user enumeration.
    let (user_id, user_email, password_hash, is_admin) =
        sqlx::query_as::<_, (i64, String, String, bool)>(
            "SELECT id, email, password_hash, is_admin FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let tokens = auth
        .login(user_id, &user_email, is_admin, &form.password, &password_hash)
        .await?;

    tracing::info!(user_id = user_id, "User logged in successfully");

    Ok(HttpResponse::Ok().json(LoginResponse {
        session_id: tokens.session_id,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
    }))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new access token. The refresh token is not
/// rotated.
///
/// # Errors
/// - 401: invalid/expired token, or session absent/revoked/mismatched
/// - 500: access token issuance failure
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let renewed = auth.refresh(&form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(RenewAccessTokenResponse {
        access_token: renewed.access_token,
        access_token_expires_at: renewed.access_token_expires_at,
    }))
}

/// POST /auth/logout
///
/// Delete the caller's session. Subsequent refreshes with the session's
/// refresh token fail as not found.
pub async fn logout(
    claims: web::ReqData<UserClaims>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    auth.logout(&claims).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /auth/revoke
///
/// Revoke the caller's session without deleting it; the record is kept for
/// audit but can no longer mint access tokens.
pub async fn revoke(
    claims: web::ReqData<UserClaims>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    auth.revoke(&claims).await?;
    Ok(HttpResponse::NoContent().finish())
}
