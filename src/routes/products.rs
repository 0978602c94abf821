/// Product Routes
///
/// Plain field-mapping CRUD. Reads are public; mutations are admin-gated in
/// the router.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, DatabaseError};

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub image: String,
    pub category: String,
    pub description: String,
    pub rating: i64,
    pub num_reviews: i64,
    pub price: f64,
    pub count_in_stock: i64,
}

/// Partial update: absent fields keep their current values.
#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub rating: Option<i64>,
    pub num_reviews: Option<i64>,
    pub price: Option<f64>,
    pub count_in_stock: Option<i64>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub category: String,
    pub description: String,
    pub rating: i64,
    pub num_reviews: i64,
    pub price: f64,
    pub count_in_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

const PRODUCT_COLUMNS: &str =
    "id, name, image, category, description, rating, num_reviews, price, count_in_stock, created_at, updated_at";

/// POST /products (admin)
pub async fn create_product(
    form: web::Json<ProductRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let product = sqlx::query_as::<_, ProductResponse>(&format!(
        r#"
        INSERT INTO products (name, image, category, description, rating, num_reviews, price, count_in_stock, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
    ))
    .bind(&form.name)
    .bind(&form.image)
    .bind(&form.category)
    .bind(&form.description)
    .bind(form.rating)
    .bind(form.num_reviews)
    .bind(form.price)
    .bind(form.count_in_stock)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(product_id = product.id, "Product created");
    Ok(HttpResponse::Created().json(product))
}

/// GET /products/{id}
pub async fn get_product(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let product = sqlx::query_as::<_, ProductResponse>(&format!(
        "SELECT {} FROM products WHERE id = $1",
        PRODUCT_COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("product".to_string())))?;

    Ok(HttpResponse::Ok().json(product))
}

/// GET /products
pub async fn list_products(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let products = sqlx::query_as::<_, ProductResponse>(&format!(
        "SELECT {} FROM products ORDER BY id",
        PRODUCT_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(products))
}

/// PATCH /products/{id} (admin)
pub async fn update_product(
    path: web::Path<i64>,
    form: web::Json<UpdateProductRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let product = sqlx::query_as::<_, ProductResponse>(&format!(
        r#"
        UPDATE products
        SET name = COALESCE($1, name),
            image = COALESCE($2, image),
            category = COALESCE($3, category),
            description = COALESCE($4, description),
            rating = COALESCE($5, rating),
            num_reviews = COALESCE($6, num_reviews),
            price = COALESCE($7, price),
            count_in_stock = COALESCE($8, count_in_stock),
            updated_at = $9
        WHERE id = $10
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
    ))
    .bind(&form.name)
    .bind(&form.image)
    .bind(&form.category)
    .bind(&form.description)
    .bind(form.rating)
    .bind(form.num_reviews)
    .bind(form.price)
    .bind(form.count_in_stock)
    .bind(Utc::now())
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("product".to_string())))?;

    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /products/{id} (admin)
pub async fn delete_product(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(
            "product".to_string(),
        )));
    }

    tracing::info!(product_id = product_id, "Product deleted");
    Ok(HttpResponse::NoContent().finish())
}
