use cart::domain::{Cart, CartId, CartLine, Sku};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub id: CartId,
    pub cart: Cart,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub sku: Sku,
    #[serde(default = "default_qty")]
    pub qty: i64,
}

fn default_qty() -> i64 {
    1
}

#[derive(Deserialize)]
pub struct SetQtyRequest {
    pub qty: u32,
}

#[derive(Deserialize)]
pub struct ReplaceCartRequest {
    pub lines: Vec<CartLine>,
}

impl ReplaceCartRequest {
    pub fn into_cart(self) -> Cart {
        self.lines
            .into_iter()
            .map(|line| (line.sku.id.clone(), line))
            .collect()
    }
}
