#![deny(clippy::all)]

pub mod domain;
pub mod ports;
pub mod resilient;

pub use domain::{Cart, CartId, CartLine, Sku, SkuId};
pub use ports::{CartStore, HashStore};
pub use resilient::{DEFAULT_FAILURE_THRESHOLD, ResilientCartStore};
