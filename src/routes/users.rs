/// User Routes
///
/// Registration is open; listing and deletion are admin-only; users update
/// their own record.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{hash_password, UserClaims};
use crate::error::{AppError, DatabaseError};
use crate::validators::{is_valid_email, is_valid_name};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
}

/// POST /users
///
/// Register a new user.
///
/// # Errors
/// - 400: invalid email/name or weak password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let name = is_valid_name(&form.name)?;
    let password_hash = hash_password(&form.password)?;

    let (user_id,) = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO users (name, email, password_hash, is_admin, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .bind(form.is_admin)
    .bind(Utc::now())
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = user_id, "User created");

    Ok(HttpResponse::Created().json(UserResponse {
        id: user_id,
        name,
        email,
        is_admin: form.is_admin,
    }))
}

/// GET /users (admin)
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let users = sqlx::query_as::<_, (i64, String, String, bool)>(
        "SELECT id, name, email, is_admin FROM users ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await?
    .into_iter()
    .map(|(id, name, email, is_admin)| UserResponse {
        id,
        name,
        email,
        is_admin,
    })
    .collect();

    Ok(HttpResponse::Ok().json(ListUsersResponse { users }))
}

/// PATCH /users/me
///
/// Update the caller's own name and/or password. Absent fields keep their
/// current values.
pub async fn update_user(
    claims: web::ReqData<UserClaims>,
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = match &form.name {
        Some(name) => Some(is_valid_name(name)?),
        None => None,
    };
    let password_hash = match &form.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let row = sqlx::query_as::<_, (i64, String, String, bool)>(
        r#"
        UPDATE users
        SET name = COALESCE($1, name),
            password_hash = COALESCE($2, password_hash),
            updated_at = $3
        WHERE id = $4
        RETURNING id, name, email, is_admin
        "#,
    )
    .bind(name)
    .bind(password_hash)
    .bind(Utc::now())
    .bind(claims.id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("user".to_string())))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: row.0,
        name: row.1,
        email: row.2,
        is_admin: row.3,
    }))
}

/// DELETE /users/{id} (admin)
pub async fn delete_user(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(
            "user".to_string(),
        )));
    }

    tracing::info!(user_id = user_id, "User deleted");
    Ok(HttpResponse::NoContent().finish())
}
