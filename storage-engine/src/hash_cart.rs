use crate::redis_hash::RedisHashStore;
use async_trait::async_trait;
use cart::domain::{Cart, CartId, CartLine, Sku, clamp_delta, line_qty};
use cart::ports::{CartStore, HashStore};
use serde::{Deserialize, Serialize};
use shared::{Error, Result, TtlSecs};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::warn;

/// Primary cart tier on a remote hash store.
///
/// Every cart lives in two hashes that share one TTL:
/// `<cart id>` maps SKU id to quantity and `<cart id>:sku` maps SKU id to
/// the JSON snapshot `{"sku": ...}`. The two hashes are written one after
/// the other, never in a transaction.
pub struct HashCartStore<H: HashStore> {
    hashes: Arc<H>,
    ttl: TtlSecs,
}

pub type RedisCartStore = HashCartStore<RedisHashStore>;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    sku: &'a Sku,
}

#[derive(Deserialize)]
struct Snapshot {
    sku: Sku,
}

fn snapshot_key(id: &CartId) -> String {
    format!("{}:sku", id)
}

fn encode_snapshot(sku: &Sku) -> Result<String> {
    Ok(serde_json::to_string(&SnapshotRef { sku })?)
}

impl<H: HashStore> HashCartStore<H> {
    pub fn new(hashes: Arc<H>, ttl: TtlSecs) -> Self {
        Self { hashes, ttl }
    }

    /// Slide the expiration of both hashes, even if only one was written
    async fn touch(&self, id: &CartId) -> Result<()> {
        self.hashes.expire(id.as_str(), self.ttl).await?;
        self.hashes.expire(&snapshot_key(id), self.ttl).await
    }

    async fn remove_line(&self, id: &CartId, sku_id: &str) -> Result<()> {
        self.hashes.hdel(id.as_str(), sku_id).await?;
        self.hashes.hdel(&snapshot_key(id), sku_id).await?;
        Ok(())
    }
}

#[async_trait]
impl<H: HashStore> CartStore for HashCartStore<H> {
    async fn create_cart(&self) -> Result<CartId> {
        let id = CartId::generate();
        self.hashes.hset_multiple(id.as_str(), &[]).await?;
        self.hashes.expire(id.as_str(), self.ttl).await?;
        Ok(id)
    }

    async fn get_cart(&self, id: &CartId) -> Result<Cart> {
        let quantities = self.hashes.hget_all(id.as_str()).await?;
        if quantities.is_empty() {
            return Ok(Cart::new());
        }

        let snapshots = self.hashes.hget_all(&snapshot_key(id)).await?;
        let mut cart = Cart::new();

        for (sku_id, raw_qty) in quantities {
            let raw_qty = raw_qty.parse::<i64>().map_err(|e| {
                Error::Serialization(format!("quantity of '{}' in cart {}: {}", sku_id, id, e))
            })?;
            let Some(qty) = line_qty(raw_qty) else {
                continue;
            };

            let Some(raw_snapshot) = snapshots.get(&sku_id) else {
                warn!("Cart {} has a quantity but no snapshot for '{}'", id, sku_id);
                continue;
            };
            let snapshot: Snapshot = serde_json::from_str(raw_snapshot)?;
            cart.insert(sku_id, CartLine::new(snapshot.sku, qty));
        }

        Ok(cart)
    }

    async fn set_cart(&self, id: &CartId, cart: Cart) -> Result<()> {
        self.hashes.del(id.as_str()).await?;
        self.hashes.del(&snapshot_key(id)).await?;

        let lines: Vec<_> = cart.iter().filter(|(_, line)| line.qty > 0).collect();
        if lines.is_empty() {
            return Ok(());
        }

        let quantities: Vec<(String, String)> = lines
            .iter()
            .map(|(sku_id, line)| (sku_id.to_string(), line.qty.to_string()))
            .collect();
        let snapshots = lines
            .iter()
            .map(|(sku_id, line)| -> Result<(String, String)> {
                Ok((sku_id.to_string(), encode_snapshot(&line.sku)?))
            })
            .collect::<Result<Vec<_>>>()?;

        self.hashes.hset_multiple(id.as_str(), &quantities).await?;
        self.hashes.hset_multiple(&snapshot_key(id), &snapshots).await?;
        self.touch(id).await
    }

    async fn increment_qty(&self, id: &CartId, sku: Sku, delta: i64) -> Result<Cart> {
        let snapshot = encode_snapshot(&sku)?;

        let raw_qty = self
            .hashes
            .hincr_by(id.as_str(), &sku.id, clamp_delta(delta))
            .await?;
        match line_qty(raw_qty) {
            Some(qty) => {
                // Stored quantities never exceed the line limit
                if i64::from(qty) != raw_qty {
                    self.hashes.hset(id.as_str(), &sku.id, &qty.to_string()).await?;
                }
                self.hashes.hset(&snapshot_key(id), &sku.id, &snapshot).await?;
            }
            None => self.remove_line(id, &sku.id).await?,
        }

        self.touch(id).await?;
        self.get_cart(id).await
    }

    async fn set_qty(&self, id: &CartId, sku_id: &str, qty: u32) -> Result<Option<Cart>> {
        if !self.hashes.hexists(id.as_str(), sku_id).await? {
            return Ok(None);
        }

        if qty == 0 {
            self.remove_line(id, sku_id).await?;
        } else {
            self.hashes.hset(id.as_str(), sku_id, &qty.to_string()).await?;
        }

        self.touch(id).await?;
        self.get_cart(id).await.map(Some)
    }

    async fn remove_item(&self, id: &CartId, sku_id: &str) -> Result<Option<Cart>> {
        if !self.hashes.hdel(id.as_str(), sku_id).await? {
            return Ok(None);
        }

        self.hashes.hdel(&snapshot_key(id), sku_id).await?;
        self.touch(id).await?;
        self.get_cart(id).await.map(Some)
    }

    async fn delete_cart(&self, id: &CartId) -> Result<()> {
        self.hashes.del(id.as_str()).await?;
        self.hashes.del(&snapshot_key(id)).await
    }
}

impl<H: HashStore> Debug for HashCartStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashCartStore")
            .field("ttl", &self.ttl)
            .finish()
    }
}
