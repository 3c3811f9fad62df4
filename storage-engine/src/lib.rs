pub mod factory;
pub mod hash_cart;
pub mod memory_cart;
pub mod redis_hash;

pub use factory::{build_cart_store, resilient_store};
pub use hash_cart::{HashCartStore, RedisCartStore};
pub use memory_cart::MemoryCartStore;
pub use redis_hash::RedisHashStore;
