use std::time::Instant;

use crate::models::product::{Collection, Product};
use crate::store::cache::{Cache, Timed, TAG_COLLECTIONS};

impl Cache {
  pub fn products_get(&self, key: &str) -> Option<Vec<Product>> {
    let entries = self.products.read().unwrap();
    entries
      .get(key)
      .filter(|entry| entry.at.elapsed() <= self.ttl)
      .map(|entry| entry.value.clone())
  }

  pub fn products_put(&self, key: impl Into<String>, value: Vec<Product>) {
    let mut entries = self.products.write().unwrap();
    entries.insert(key.into(), Timed { at: Instant::now(), value });
  }

  pub fn collections_get(&self) -> Option<Vec<Collection>> {
    let entry = self.collections.read().unwrap();
    entry
      .as_ref()
      .filter(|entry| entry.at.elapsed() <= self.ttl)
      .map(|entry| entry.value.clone())
  }

  pub fn collections_put(&self, value: Vec<Collection>) {
    let mut entry = self.collections.write().unwrap();
    *entry = Some(Timed { at: Instant::now(), value });
  }

  /// Drops every entry under a tag. Product-list keys are prefixed with
  /// their tag, so prefix matching is enough.
  pub fn invalidate(&self, tag: &str) {
    if tag == TAG_COLLECTIONS {
      let mut entry = self.collections.write().unwrap();
      *entry = None;
      return;
    }
    let mut entries = self.products.write().unwrap();
    entries.retain(|key, _| !key.starts_with(tag));
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::store::cache::{TAG_COLLECTION_PRODUCTS, TAG_PRODUCTS};

  fn product(id: &str) -> Product {
    Product { id: id.to_string(), ..Product::default() }
  }

  #[test]
  fn test_hit_within_ttl() {
    let cache = Cache::new(Duration::from_secs(60));
    cache.products_put("products:all", vec![product("p1")]);

    let hit = cache.products_get("products:all").unwrap();
    assert_eq!(hit.len(), 1);
    assert_eq!(hit[0].id, "p1");
    assert!(cache.products_get("products:other").is_none());
  }

  #[test]
  fn test_expired_entry_misses() {
    let cache = Cache::new(Duration::ZERO);
    cache.products_put("products:all", vec![product("p1")]);
    assert!(cache.products_get("products:all").is_none());
  }

  #[test]
  fn test_invalidate_by_tag_prefix() {
    let cache = Cache::new(Duration::from_secs(60));
    cache.products_put(format!("{TAG_PRODUCTS}:all"), vec![product("p1")]);
    cache.products_put(format!("{TAG_COLLECTION_PRODUCTS}:sale"), vec![product("p2")]);

    cache.invalidate(TAG_COLLECTION_PRODUCTS);
    assert!(cache.products_get(&format!("{TAG_COLLECTION_PRODUCTS}:sale")).is_none());
    assert!(cache.products_get(&format!("{TAG_PRODUCTS}:all")).is_some());
  }

  #[test]
  fn test_collections_round_trip() {
    let cache = Cache::new(Duration::from_secs(60));
    assert!(cache.collections_get().is_none());

    cache.collections_put(vec![Collection::default()]);
    assert_eq!(cache.collections_get().unwrap().len(), 1);

    cache.invalidate(TAG_COLLECTIONS);
    assert!(cache.collections_get().is_none());
  }
}
