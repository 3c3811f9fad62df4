use crate::domain::{Cart, CartId, Sku};
use crate::ports::CartStore;
use async_trait::async_trait;
use futures::future::BoxFuture;
use shared::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, warn};

pub use shared::config::DEFAULT_FAILURE_THRESHOLD;

/// Cart store that serves from the primary tier and falls back to a local tier.
///
/// A failed primary operation is re-run on the fallback and counted. Once
/// `failure_threshold` consecutive operations have failed the circuit opens
/// and every later call goes to the fallback only. The circuit never closes
/// again for the lifetime of this instance.
pub struct ResilientCartStore {
    primary: Arc<dyn CartStore>,
    fallback: Arc<dyn CartStore>,
    failure_threshold: u32,
    consecutive_failures: AtomicU32,
    circuit_open: AtomicBool,
}

impl ResilientCartStore {
    pub fn new(primary: Arc<dyn CartStore>, fallback: Arc<dyn CartStore>) -> Self {
        Self::with_failure_threshold(primary, fallback, DEFAULT_FAILURE_THRESHOLD)
    }

    /// A threshold of zero is treated as one
    pub fn with_failure_threshold(
        primary: Arc<dyn CartStore>,
        fallback: Arc<dyn CartStore>,
        failure_threshold: u32,
    ) -> Self {
        Self {
            primary,
            fallback,
            failure_threshold: failure_threshold.max(1),
            consecutive_failures: AtomicU32::new(0),
            circuit_open: AtomicBool::new(false),
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        self.circuit_open.load(Ordering::Acquire)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Run one logical operation against the primary, or against the fallback
    /// when the circuit is open or the primary attempt failed.
    async fn dispatch<'a, T, F>(&'a self, operation: &'static str, call: F) -> Result<T>
    where
        T: Send + 'a,
        F: Fn(&'a dyn CartStore) -> BoxFuture<'a, Result<T>> + Send + Sync,
    {
        if !self.is_circuit_open() {
            match call(self.primary.as_ref()).await {
                Ok(value) => {
                    self.consecutive_failures.store(0, Ordering::Release);
                    return Ok(value);
                }
                Err(err) => self.record_failure(operation, &err),
            }
        }

        call(self.fallback.as_ref()).await
    }

    fn record_failure(&self, operation: &str, err: &Error) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;

        if failures >= self.failure_threshold {
            // Only the call that flips the flag reports the trip
            if !self.circuit_open.swap(true, Ordering::AcqRel) {
                warn!("Falling back to MemoryCartStore after repeated Redis failures");
            }
        } else {
            debug!(
                "Primary cart store failed on {} ({}/{}): {}",
                operation, failures, self.failure_threshold, err
            );
        }
    }
}

#[async_trait]
impl CartStore for ResilientCartStore {
    async fn create_cart(&self) -> Result<CartId> {
        self.dispatch("create_cart", |store| store.create_cart()).await
    }

    async fn get_cart(&self, id: &CartId) -> Result<Cart> {
        self.dispatch("get_cart", |store| store.get_cart(id)).await
    }

    async fn set_cart(&self, id: &CartId, cart: Cart) -> Result<()> {
        self.dispatch("set_cart", |store| store.set_cart(id, cart.clone())).await
    }

    async fn increment_qty(&self, id: &CartId, sku: Sku, delta: i64) -> Result<Cart> {
        self.dispatch("increment_qty", |store| store.increment_qty(id, sku.clone(), delta))
            .await
    }

    async fn set_qty(&self, id: &CartId, sku_id: &str, qty: u32) -> Result<Option<Cart>> {
        self.dispatch("set_qty", |store| store.set_qty(id, sku_id, qty)).await
    }

    async fn remove_item(&self, id: &CartId, sku_id: &str) -> Result<Option<Cart>> {
        self.dispatch("remove_item", |store| store.remove_item(id, sku_id))
            .await
    }

    async fn delete_cart(&self, id: &CartId) -> Result<()> {
        self.dispatch("delete_cart", |store| store.delete_cart(id)).await
    }
}

impl Debug for ResilientCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientCartStore")
            .field("failure_threshold", &self.failure_threshold)
            .field("consecutive_failures", &self.consecutive_failures())
            .field("circuit_open", &self.is_circuit_open())
            .finish()
    }
}
