use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemData, CartList},
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{CartProduct, ProductSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    original_price: i64,
    discounted_price: i64,
    image_url: Option<String>,
}

pub async fn list_cart(
    pool: &DbPool,
    user: &CurrentUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT cp.id AS cart_id, cp.quantity,
               p.id AS product_id, p.name, p.original_price, p.discounted_price,
               (SELECT i.url FROM images i
                WHERE i.product_id = p.id
                ORDER BY i.position ASC LIMIT 1) AS image_url
        FROM cart_products cp
        JOIN products p ON p.id = cp.product_id
        WHERE cp.user_id = $1
        ORDER BY cp.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_products WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(pool)
        .await?;

    let items = rows
        .into_iter()
        .map(|row| CartItemData {
            id: row.cart_id,
            product: ProductSummary {
                id: row.product_id,
                name: row.name,
                original_price: row.original_price,
                discounted_price: row.discounted_price,
                image_url: row.image_url,
            },
            quantity: row.quantity,
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

pub async fn add_to_cart(
    pool: &DbPool,
    user: &CurrentUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartProduct>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    let exist: Option<CartProduct> =
        sqlx::query_as("SELECT * FROM cart_products WHERE user_id = $1 AND product_id = $2")
            .bind(user.id)
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;

    let cart_product = if let Some(item) = exist {
        sqlx::query_as::<_, CartProduct>(
            r#"
            UPDATE cart_products
            SET quantity = $3
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(user.id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as(
            r#"
            INSERT INTO cart_products (id, user_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "cart_update",
        Some("cart_products"),
        Some(serde_json::json!({
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_product, None))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &CurrentUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_products WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "cart_remove",
        Some("cart_products"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
