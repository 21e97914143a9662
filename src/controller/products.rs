use crate::controller::Controller;
use crate::models::adapt::adapt_product;
use crate::models::errors::AppError;
use crate::models::product::{Product, ProductListParams, ProductSortKey};
use crate::store::cache::TAG_PRODUCTS;

pub(crate) fn list_cache_key(tag: &str, scope: Option<&str>, params: &ProductListParams) -> String {
  format!(
    "{}:{}:{}:{}:{}:{}",
    tag,
    scope.unwrap_or("all"),
    params.sort_key.as_str(),
    params.reverse,
    params.limit,
    params.query.as_deref().unwrap_or(""),
  )
}

/// Price ordering is resolved here, over the adapted price range; column
/// sorts were already applied by the store.
pub(crate) fn sort_by_price(products: &mut [Product], reverse: bool) {
  products.sort_by(|a, b| {
    let left = a.price_range.min_variant_price.to_decimal();
    let right = b.price_range.min_variant_price.to_decimal();
    if reverse { right.cmp(&left) } else { left.cmp(&right) }
  });
}

pub async fn product_list(
  c: &Controller,
  params: &ProductListParams,
) -> Result<Vec<Product>, AppError> {
  let key = list_cache_key(TAG_PRODUCTS, None, params);
  if let Some(hit) = c.cache.products_get(&key) {
    return Ok(hit);
  }

  let mut products: Vec<Product> =
    c.store.product_list(params).await?.into_iter().map(adapt_product).collect();

  if params.sort_key == ProductSortKey::Price {
    sort_by_price(&mut products, params.reverse);
  }

  c.cache.products_put(key, products.clone());
  Ok(products)
}

pub async fn product_by_handle(
  c: &Controller,
  handle: &str,
) -> Result<Option<Product>, AppError> {
  let key = format!("{TAG_PRODUCTS}:handle:{handle}");
  if let Some(hit) = c.cache.products_get(&key) {
    return Ok(hit.into_iter().next());
  }

  let product = c.store.product_by_handle(handle).await?.map(adapt_product);
  if let Some(ref product) = product {
    c.cache.products_put(key, vec![product.clone()]);
  }
  Ok(product)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::money::Money;
  use crate::models::product::{PriceRange, Variant};

  fn product_with_min_price(id: &str, amount: &str) -> Product {
    Product {
      id: id.to_string(),
      price_range: PriceRange {
        min_variant_price: Money { amount: amount.into(), currency_code: "INR".into() },
        max_variant_price: Money { amount: amount.into(), currency_code: "INR".into() },
      },
      variants: vec![Variant::default()],
      ..Product::default()
    }
  }

  #[test]
  fn test_sort_by_price() {
    let mut products = vec![
      product_with_min_price("a", "700.00"),
      product_with_min_price("b", "100.00"),
      product_with_min_price("c", "400.00"),
    ];

    sort_by_price(&mut products, false);
    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);

    sort_by_price(&mut products, true);
    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
  }

  #[test]
  fn test_cache_key_includes_all_params() {
    let params = ProductListParams {
      limit: 24,
      sort_key: ProductSortKey::Title,
      reverse: false,
      query: Some("shirt".to_string()),
    };
    assert_eq!(list_cache_key(TAG_PRODUCTS, None, &params), "products:all:title:false:24:shirt");
    assert_eq!(
      list_cache_key(TAG_PRODUCTS, Some("sale"), &params),
      "products:sale:title:false:24:shirt"
    );
  }
}
