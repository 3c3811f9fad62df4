use crate::TtlSecs;
use tracing::warn;

/// Consecutive primary failures after which the cart store stops using Redis
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Redis,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub backend: Backend,
    pub redis_url: Option<String>,
    pub ttl: TtlSecs,
    pub failure_threshold: u32,
    pub memory_max_carts: Option<u64>,
}

impl Config {
    const DEFAULT_HOST: &'static str = "localhost";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    // 30 days
    pub const DEFAULT_TTL_SECS: u64 = 60 * 60 * 24 * 30;

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unset or malformed
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("CART_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let http_port = lookup("CART_HTTP_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(Self::DEFAULT_HTTP_PORT);

        let redis_url = lookup("CART_REDIS_URL").filter(|url| !url.trim().is_empty());
        let backend = match lookup("CART_BACKEND").as_deref().map(str::trim) {
            Some("redis") => Backend::Redis,
            Some("memory") => Backend::Memory,
            Some(other) => {
                warn!("Unknown CART_BACKEND '{}', choosing from CART_REDIS_URL", other);
                Self::backend_for(&redis_url)
            }
            None => Self::backend_for(&redis_url),
        };

        let ttl = match lookup("CART_TTL_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => TtlSecs(secs),
            Some(_) => {
                warn!(
                    "CART_TTL_SECS must be a positive integer, using {}",
                    Self::DEFAULT_TTL_SECS
                );
                TtlSecs(Self::DEFAULT_TTL_SECS)
            }
            None => TtlSecs(Self::DEFAULT_TTL_SECS),
        };

        let failure_threshold = match lookup("CART_FAILURE_THRESHOLD").map(|v| v.parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                warn!(
                    "CART_FAILURE_THRESHOLD must be a positive integer, using {}",
                    DEFAULT_FAILURE_THRESHOLD
                );
                DEFAULT_FAILURE_THRESHOLD
            }
            None => DEFAULT_FAILURE_THRESHOLD,
        };

        Self {
            host,
            http_port,
            backend,
            redis_url,
            ttl,
            failure_threshold,
            memory_max_carts: lookup("CART_MEMORY_MAX_CARTS").and_then(|v| v.parse::<u64>().ok()),
        }
    }

    fn backend_for(redis_url: &Option<String>) -> Backend {
        if redis_url.is_some() {
            Backend::Redis
        } else {
            Backend::Memory
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}
