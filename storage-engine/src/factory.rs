use crate::hash_cart::HashCartStore;
use crate::memory_cart::MemoryCartStore;
use crate::redis_hash::RedisHashStore;
use cart::ports::{CartStore, HashStore};
use cart::resilient::ResilientCartStore;
use shared::config::{Backend, Config};
use std::sync::Arc;
use tracing::{info, warn};

/// Wrap a hash store in the primary cart tier, with a memory fallback behind it
pub fn resilient_store<H: HashStore>(hashes: Arc<H>, config: &Config) -> ResilientCartStore {
    let primary = Arc::new(HashCartStore::new(hashes, config.ttl));
    let fallback = Arc::new(MemoryCartStore::new(config.ttl, config.memory_max_carts));

    ResilientCartStore::with_failure_threshold(primary, fallback, config.failure_threshold)
}

/// Build the cart store selected by the configuration.
/// If Redis is selected but unreachable at startup, carts are kept in memory.
pub async fn build_cart_store(config: &Config) -> Arc<dyn CartStore> {
    let redis_url = match (config.backend, config.redis_url.as_deref()) {
        (Backend::Memory, _) => {
            info!("Using in-memory cart store (ttl={}s)", config.ttl.0);
            return memory_store(config);
        }
        (Backend::Redis, None) => {
            warn!("CART_BACKEND is redis but CART_REDIS_URL is not set. Running in-memory mode.");
            return memory_store(config);
        }
        (Backend::Redis, Some(url)) => url,
    };

    match RedisHashStore::connect(redis_url).await {
        Ok(hashes) => {
            info!(
                "Using Redis cart store (ttl={}s, failure threshold={})",
                config.ttl.0, config.failure_threshold
            );
            Arc::new(resilient_store(Arc::new(hashes), config))
        }
        Err(e) => {
            warn!("Failed to connect to Redis: {}. Running in-memory mode.", e);
            memory_store(config)
        }
    }
}

fn memory_store(config: &Config) -> Arc<dyn CartStore> {
    Arc::new(MemoryCartStore::new(config.ttl, config.memory_max_carts))
}
