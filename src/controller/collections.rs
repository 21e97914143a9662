use crate::controller::products::{list_cache_key, sort_by_price};
use crate::controller::Controller;
use crate::models::adapt::{adapt_collection, adapt_product};
use crate::models::errors::AppError;
use crate::models::product::{Collection, Product, ProductListParams, ProductSortKey};
use crate::store::cache::TAG_COLLECTION_PRODUCTS;

const COLLECTION_LIST_LIMIT: i64 = 10;

pub async fn collection_list(c: &Controller) -> Result<Vec<Collection>, AppError> {
  if let Some(hit) = c.cache.collections_get() {
    return Ok(hit);
  }

  let collections: Vec<Collection> = c
    .store
    .collection_list(COLLECTION_LIST_LIMIT)
    .await?
    .into_iter()
    .map(adapt_collection)
    .collect();

  c.cache.collections_put(collections.clone());
  Ok(collections)
}

pub async fn collection_by_handle(
  c: &Controller,
  handle: &str,
) -> Result<Option<Collection>, AppError> {
  let collections = collection_list(c).await?;
  Ok(collections.into_iter().find(|collection| collection.handle == handle))
}

pub async fn collection_products(
  c: &Controller,
  handle: &str,
  params: &ProductListParams,
) -> Result<Vec<Product>, AppError> {
  let key = list_cache_key(TAG_COLLECTION_PRODUCTS, Some(handle), params);
  if let Some(hit) = c.cache.products_get(&key) {
    return Ok(hit);
  }

  let mut products: Vec<Product> = c
    .store
    .collection_products(handle, params)
    .await?
    .into_iter()
    .map(adapt_product)
    .collect();

  if params.sort_key == ProductSortKey::Price {
    sort_by_price(&mut products, params.reverse);
  }

  c.cache.products_put(key, products.clone());
  Ok(products)
}
