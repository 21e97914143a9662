mod catalog;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::models::product::{Collection, Product};

pub const TAG_PRODUCTS: &str = "products";
pub const TAG_COLLECTIONS: &str = "collections";
pub const TAG_COLLECTION_PRODUCTS: &str = "collection-products";

/// Minutes-scale lifetime for catalog reads, matching the storefront's
/// revalidation cadence.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub(crate) struct Timed<T> {
  pub(crate) at: Instant,
  pub(crate) value: T,
}

/// Read-side catalog cache: tag-keyed entries with time-based expiry.
/// Entries are only ever replaced wholesale; carts and orders are never
/// cached.
#[derive(Debug)]
pub struct Cache {
  pub(crate) ttl: Duration,
  pub(crate) products: RwLock<HashMap<String, Timed<Vec<Product>>>>,
  pub(crate) collections: RwLock<Option<Timed<Vec<Collection>>>>,
}

impl Cache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, products: RwLock::new(HashMap::new()), collections: RwLock::new(None) }
  }
}
