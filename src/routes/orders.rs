/// Order Routes
///
/// Orders are scoped to the authenticated caller; items are written in the
/// same transaction as their order.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::UserClaims;
use crate::error::{AppError, DatabaseError};

#[derive(Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i64,
    pub image: String,
    pub price: f64,
    pub product_id: i64,
}

#[derive(Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    payment_method: String,
    tax_price: f64,
    shipping_price: f64,
    total_price: f64,
    created_at: DateTime<Utc>,
}

async fn load_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, AppError> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT name, quantity, image, price, product_id FROM order_items WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

fn to_response(row: OrderRow, items: Vec<OrderItem>) -> OrderResponse {
    OrderResponse {
        id: row.id,
        items,
        payment_method: row.payment_method,
        tax_price: row.tax_price,
        shipping_price: row.shipping_price,
        total_price: row.total_price,
        created_at: row.created_at,
    }
}

/// POST /orders
pub async fn create_order(
    claims: web::ReqData<UserClaims>,
    form: web::Json<OrderRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut tx = pool.begin().await?;

    let (order_id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
        r#"
        INSERT INTO orders (user_id, payment_method, tax_price, shipping_price, total_price, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, created_at
        "#,
    )
    .bind(claims.id)
    .bind(&form.payment_method)
    .bind(form.tax_price)
    .bind(form.shipping_price)
    .bind(form.total_price)
    .bind(Utc::now())
    .fetch_one(&mut tx)
    .await?;

    for item in &form.items {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, name, quantity, image, price, product_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.image)
        .bind(item.price)
        .bind(item.product_id)
        .execute(&mut tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(order_id = order_id, user_id = claims.id, "Order created");

    Ok(HttpResponse::Created().json(OrderResponse {
        id: order_id,
        items: form.items.clone(),
        payment_method: form.payment_method.clone(),
        tax_price: form.tax_price,
        shipping_price: form.shipping_price,
        total_price: form.total_price,
        created_at,
    }))
}

/// GET /orders
pub async fn list_orders(
    claims: web::ReqData<UserClaims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, payment_method, tax_price, shipping_price, total_price, created_at
        FROM orders
        WHERE user_id = $1
        ORDER BY id
        "#,
    )
    .bind(claims.id)
    .fetch_all(pool.get_ref())
    .await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = load_items(pool.get_ref(), row.id).await?;
        orders.push(to_response(row, items));
    }

    Ok(HttpResponse::Ok().json(orders))
}

/// GET /orders/{id}
pub async fn get_order(
    claims: web::ReqData<UserClaims>,
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, payment_method, tax_price, shipping_price, total_price, created_at
        FROM orders
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(path.into_inner())
    .bind(claims.id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("order".to_string())))?;

    let items = load_items(pool.get_ref(), row.id).await?;
    Ok(HttpResponse::Ok().json(to_response(row, items)))
}
