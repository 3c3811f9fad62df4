use async_trait::async_trait;
use cart::ports::HashStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use shared::{Error, Result, TtlSecs};
use std::collections::HashMap;
use std::fmt::Debug;

/// `HashStore` backed by Redis hashes.
/// The connection manager reconnects on its own; it is cheap to clone per call.
#[derive(Clone)]
pub struct RedisHashStore {
    connection: ConnectionManager,
}

fn backend(err: redis::RedisError) -> Error {
    Error::Backend(err.to_string())
}

impl RedisHashStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Config(format!("invalid CART_REDIS_URL: {}", e)))?;
        let connection = client.get_connection_manager().await.map_err(backend)?;
        Ok(Self { connection })
    }

    fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

#[async_trait]
impl HashStore for RedisHashStore {
    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        let mut conn = self.connection();
        let value: i64 = conn.hincr(key, field, delta).await.map_err(backend)?;
        Ok(value)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn.hset(key, field, value).await.map_err(backend)?;
        Ok(())
    }

    async fn hset_multiple(&self, key: &str, items: &[(String, String)]) -> Result<()> {
        // HSET without fields is a syntax error in Redis
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection();
        let _: () = conn.hset_multiple(key, items).await.map_err(backend)?;
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.connection();
        let fields: HashMap<String, String> = conn.hgetall(key).await.map_err(backend)?;
        Ok(fields)
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut conn = self.connection();
        let exists: bool = conn.hexists(key, field).await.map_err(backend)?;
        Ok(exists)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool> {
        let mut conn = self.connection();
        let removed: i64 = conn.hdel(key, field).await.map_err(backend)?;
        Ok(removed > 0)
    }

    async fn expire(&self, key: &str, ttl: TtlSecs) -> Result<()> {
        let seconds = i64::try_from(ttl.0).unwrap_or(i64::MAX);
        let mut conn = self.connection();
        let _: () = conn.expire(key, seconds).await.map_err(backend)?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn.del(key).await.map_err(backend)?;
        Ok(())
    }
}

impl Debug for RedisHashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisHashStore")
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}
