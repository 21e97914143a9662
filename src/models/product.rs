use serde::{Deserialize, Serialize};

use crate::models::money::Money;

pub const PRODUCT_LIST_DEFAULT_LIMIT: i64 = 100;
pub const PRODUCT_LIST_MAX_LIMIT: i64 = 250;

/// One selected option on a variant, e.g. color=red.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
  pub name: String,
  pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
  pub id: String,
  pub name: String,
}

/// A product option definition: name plus its ordered set of values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
  pub id: String,
  pub name: String,
  pub values: Vec<OptionValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
  pub url: String,
  pub alt_text: String,
  pub width: i32,
  pub height: i32,
}

/// A purchasable configuration of a product with its own price and
/// availability.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
  pub id: String,
  pub title: String,
  pub available_for_sale: bool,
  pub price: Money,
  pub selected_options: Vec<SelectedOption>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
  pub min_variant_price: Money,
  pub max_variant_price: Money,
}

/// Presentation record for a product. Derived fields (truncated
/// description, featured image, price range, option-value ids) are filled
/// in by `models::adapt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: String,
  pub title: String,
  pub description: String,
  pub handle: String,
  pub available_for_sale: bool,
  pub currency_code: String,
  pub options: Vec<ProductOption>,
  pub images: Vec<ProductImage>,
  pub featured_image: ProductImage,
  pub price_range: PriceRange,
  pub variants: Vec<Variant>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
  pub id: String,
  pub title: String,
  pub handle: String,
  pub description: String,
  pub image: Option<ProductImage>,
  pub path: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductSortKey {
  CreatedAt,
  Title,
  Price,
}

impl ProductSortKey {
  pub fn from_str(key: &str) -> ProductSortKey {
    match key {
      "title" => ProductSortKey::Title,
      "price" => ProductSortKey::Price,
      _ => ProductSortKey::CreatedAt,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ProductSortKey::CreatedAt => "created_at",
      ProductSortKey::Title => "title",
      ProductSortKey::Price => "price",
    }
  }
}

/// Listing query parameters: title search, sort key, direction, limit.
#[derive(Clone, Debug)]
pub struct ProductListParams {
  pub limit: i64,
  pub sort_key: ProductSortKey,
  pub reverse: bool,
  pub query: Option<String>,
}

impl Default for ProductListParams {
  fn default() -> Self {
    // Newest first.
    Self {
      limit: PRODUCT_LIST_DEFAULT_LIMIT,
      sort_key: ProductSortKey::CreatedAt,
      reverse: true,
      query: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sort_key_round_trip() {
    assert_eq!(ProductSortKey::from_str("title"), ProductSortKey::Title);
    assert_eq!(ProductSortKey::from_str("price"), ProductSortKey::Price);
    assert_eq!(ProductSortKey::from_str("anything"), ProductSortKey::CreatedAt);
    assert_eq!(ProductSortKey::Price.as_str(), "price");
  }
}
