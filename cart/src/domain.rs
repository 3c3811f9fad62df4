use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub type SkuId = String;

/// A cart is keyed by SKU id. Lines with a quantity of zero are never stored.
pub type Cart = BTreeMap<SkuId, CartLine>;

/// Largest quantity a single line can hold. Increments past it saturate.
pub const MAX_LINE_QTY: u32 = u32::MAX;

/// Map a raw stored or computed quantity onto a line quantity.
/// `None` means the line must not exist.
pub fn line_qty(raw: i64) -> Option<u32> {
    if raw <= 0 {
        None
    } else {
        Some(u32::try_from(raw).unwrap_or(MAX_LINE_QTY))
    }
}

/// Bound an increment so applying it to any stored quantity cannot overflow
pub fn clamp_delta(delta: i64) -> i64 {
    let bound = i64::from(MAX_LINE_QTY);
    delta.clamp(-bound, bound)
}

/// Cart identifier handed out by `create_cart` and carried in the cart cookie
/// afterwards. Ids arriving from outside go through `CartId::parse`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(String);

impl CartId {
    /// Generate a fresh random (v4) identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept only v4 UUIDs, normalized to the hyphenated lowercase form
    /// that `generate` produces.
    pub fn parse(raw: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(raw)
            .map_err(|e| Error::InvalidCartId(format!("'{}': {}", raw, e)))?;
        if uuid.get_version_num() != 4 {
            return Err(Error::InvalidCartId(format!("'{}' is not a v4 UUID", raw)));
        }
        Ok(Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CartId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CartId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Product snapshot taken when the item was added. Only `id` is interpreted;
/// every other attribute is carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Sku {
    pub fn new(id: impl Into<SkuId>) -> Self {
        Self {
            id: id.into(),
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub sku: Sku,
    pub qty: u32,
}

impl CartLine {
    pub fn new(sku: Sku, qty: u32) -> Self {
        Self { sku, qty }
    }
}
