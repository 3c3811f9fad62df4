use crate::domain::{Cart, CartId, Sku};
use async_trait::async_trait;
use shared::{Result, TtlSecs};
use std::collections::HashMap;

// Ports are the pluggable extension points for cart storage tiers

/// Port shared by every cart storage tier.
///
/// `None` from `set_qty` / `remove_item` means the line did not exist. It is a
/// normal outcome and never an error.
#[async_trait]
pub trait CartStore: Send + Sync + 'static {
    /// Create an empty cart and return its id
    async fn create_cart(&self) -> Result<CartId>;

    /// Read the cart. Absent carts read as empty. Never refreshes the TTL.
    async fn get_cart(&self, id: &CartId) -> Result<Cart>;

    /// Replace the whole cart
    async fn set_cart(&self, id: &CartId, cart: Cart) -> Result<()>;

    /// Add `delta` to the line for `sku.id`, storing `sku` as the line's
    /// snapshot. A line that drops to zero or below is removed.
    async fn increment_qty(&self, id: &CartId, sku: Sku, delta: i64) -> Result<Cart>;

    /// Overwrite an existing line's quantity; zero removes the line
    async fn set_qty(&self, id: &CartId, sku_id: &str, qty: u32) -> Result<Option<Cart>>;

    async fn remove_item(&self, id: &CartId, sku_id: &str) -> Result<Option<Cart>>;

    async fn delete_cart(&self, id: &CartId) -> Result<()>;
}

/// Port for the remote key/hash/TTL store behind the primary cart tier.
/// Each command is atomic on its own key; nothing spans two keys.
#[async_trait]
pub trait HashStore: Send + Sync + 'static {
    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()>;

    /// Write several fields at once. An empty slice writes nothing.
    async fn hset_multiple(&self, key: &str, items: &[(String, String)]) -> Result<()>;

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn hexists(&self, key: &str, field: &str) -> Result<bool>;

    /// Returns whether the field was present
    async fn hdel(&self, key: &str, field: &str) -> Result<bool>;

    async fn expire(&self, key: &str, ttl: TtlSecs) -> Result<()>;

    async fn del(&self, key: &str) -> Result<()>;
}
