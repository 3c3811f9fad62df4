use cart::ports::CartStore;
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub cart_store: Arc<dyn CartStore>,
}

impl AppState {
    pub fn new(cart_store: Arc<dyn CartStore>) -> Self {
        Self { cart_store }
    }
}
