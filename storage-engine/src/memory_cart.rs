use async_trait::async_trait;
use cart::domain::{Cart, CartId, CartLine, Sku, clamp_delta, line_qty};
use cart::ports::CartStore;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use shared::{Result, TtlSecs};
use std::fmt::Debug;
use std::future::ready;
use std::time::Duration;

/// Moka-backed in-process cart store.
///
/// Entries expire `ttl` after their last write. Reads do not extend the
/// lifetime. Per-cart updates run through moka's atomic compute so concurrent
/// writers to one cart do not lose each other's changes.
pub struct MemoryCartStore {
    carts: Cache<CartId, Cart>,
}

impl MemoryCartStore {
    /// Create a store with the given TTL and an optional cap on stored carts
    pub fn new(ttl: TtlSecs, max_carts: Option<u64>) -> Self {
        Self::with_time_to_live(ttl.as_duration(), max_carts)
    }

    pub fn with_time_to_live(ttl: Duration, max_carts: Option<u64>) -> Self {
        let mut builder = Cache::builder().name("carts").time_to_live(ttl);

        if let Some(capacity) = max_carts {
            builder = builder.max_capacity(capacity);
        }

        Self {
            carts: builder.build(),
        }
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn create_cart(&self) -> Result<CartId> {
        let id = CartId::generate();
        self.carts.insert(id.clone(), Cart::new()).await;
        Ok(id)
    }

    async fn get_cart(&self, id: &CartId) -> Result<Cart> {
        Ok(self.carts.get(id).await.unwrap_or_default())
    }

    async fn set_cart(&self, id: &CartId, mut cart: Cart) -> Result<()> {
        cart.retain(|_, line| line.qty > 0);

        if cart.is_empty() {
            self.carts.invalidate(id).await;
        } else {
            self.carts.insert(id.clone(), cart).await;
        }
        Ok(())
    }

    async fn increment_qty(&self, id: &CartId, sku: Sku, delta: i64) -> Result<Cart> {
        let result = self
            .carts
            .entry_by_ref(id)
            .and_compute_with(|entry| {
                let mut cart = entry.map(|e| e.into_value()).unwrap_or_default();
                let current = cart.get(&sku.id).map(|line| i64::from(line.qty)).unwrap_or(0);

                match line_qty(current + clamp_delta(delta)) {
                    Some(qty) => {
                        cart.insert(sku.id.clone(), CartLine::new(sku, qty));
                    }
                    None => {
                        cart.remove(&sku.id);
                    }
                }
                ready(Op::Put(cart))
            })
            .await;

        Ok(match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => entry.into_value(),
            _ => Cart::new(),
        })
    }

    async fn set_qty(&self, id: &CartId, sku_id: &str, qty: u32) -> Result<Option<Cart>> {
        let result = self
            .carts
            .entry_by_ref(id)
            .and_compute_with(|entry| {
                let Some(mut cart) = entry.map(|e| e.into_value()) else {
                    return ready(Op::Nop);
                };
                if qty == 0 {
                    if cart.remove(sku_id).is_none() {
                        return ready(Op::Nop);
                    }
                } else {
                    let Some(line) = cart.get_mut(sku_id) else {
                        return ready(Op::Nop);
                    };
                    line.qty = qty;
                }
                ready(Op::Put(cart))
            })
            .await;

        Ok(match result {
            CompResult::ReplacedWith(entry) => Some(entry.into_value()),
            _ => None,
        })
    }

    async fn remove_item(&self, id: &CartId, sku_id: &str) -> Result<Option<Cart>> {
        let result = self
            .carts
            .entry_by_ref(id)
            .and_compute_with(|entry| {
                let Some(mut cart) = entry.map(|e| e.into_value()) else {
                    return ready(Op::Nop);
                };
                if cart.remove(sku_id).is_none() {
                    return ready(Op::Nop);
                }
                ready(Op::Put(cart))
            })
            .await;

        Ok(match result {
            CompResult::ReplacedWith(entry) => Some(entry.into_value()),
            _ => None,
        })
    }

    async fn delete_cart(&self, id: &CartId) -> Result<()> {
        self.carts.invalidate(id).await;
        Ok(())
    }
}

impl Debug for MemoryCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCartStore")
            .field("entry_count", &self.carts.entry_count())
            .field("weighted_size", &self.carts.weighted_size())
            .finish()
    }
}
