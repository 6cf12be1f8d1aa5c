use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductSummary;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItemData>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemData {
    pub id: Uuid,
    pub product: ProductSummary,
    pub quantity: i32,
}
