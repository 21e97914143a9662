use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::models::money::Money;
use crate::models::product::{
  OptionValue, PriceRange, Product, ProductImage, ProductListParams, ProductOption,
  SelectedOption, Variant, PRODUCT_LIST_MAX_LIMIT,
};
use crate::store::database::dbstore::StorefrontStoreImpl;
use crate::store::database::errors::{handle_db_error, DBError};

#[derive(Debug, FromRow)]
pub(super) struct ProductRow {
  pub id: String,
  pub title: String,
  pub description: String,
  pub handle: String,
  pub available_for_sale: bool,
  pub currency_code: Option<String>,
}

#[derive(Debug, FromRow)]
struct VariantRow {
  id: String,
  product_id: String,
  title: String,
  price: Option<Decimal>,
  currency_code: Option<String>,
  available_for_sale: bool,
}

#[derive(Debug, FromRow)]
struct SelectedOptionRow {
  variant_id: Option<String>,
  name: String,
  value: String,
}

#[derive(Debug, FromRow)]
struct OptionRow {
  id: String,
  product_id: String,
  name: String,
}

#[derive(Debug, FromRow)]
struct OptionValueRow {
  id: String,
  option_id: String,
  value: String,
}

#[derive(Debug, FromRow)]
struct ImageRow {
  product_id: String,
  url: String,
  alt_text: String,
  width: i32,
  height: i32,
}

const PRODUCT_COLUMNS: &str =
  "id, title, description, handle, available_for_sale, currency_code";

pub(super) async fn product_list(
  s: &StorefrontStoreImpl,
  params: &ProductListParams,
) -> Result<Vec<Product>, DBError> {
  let op = "storefront.store.product_list";

  // Sort column is resolved from a closed enum, never from raw input.
  // Price ordering happens after assembly, on the variants.
  let order_column = match params.sort_key.as_str() {
    "title" => "title",
    _ => "created_at",
  };
  let direction = if params.reverse { "DESC" } else { "ASC" };
  let limit = params.limit.clamp(1, PRODUCT_LIST_MAX_LIMIT);

  let rows: Vec<ProductRow> = match &params.query {
    Some(query) => {
      let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE title ILIKE $1 \
         ORDER BY {order_column} {direction} LIMIT $2",
      );
      sqlx::query_as::<_, ProductRow>(&sql)
        .bind(format!("%{}%", query))
        .bind(limit)
        .fetch_all(s.db.as_ref())
        .await
        .map_err(|err| handle_db_error(err, op))?
    }
    None => {
      let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY {order_column} {direction} LIMIT $1",
      );
      sqlx::query_as::<_, ProductRow>(&sql)
        .bind(limit)
        .fetch_all(s.db.as_ref())
        .await
        .map_err(|err| handle_db_error(err, op))?
    }
  };

  assemble_products(s, rows, op).await
}

pub(super) async fn product_by_handle(
  s: &StorefrontStoreImpl,
  handle: &str,
) -> Result<Option<Product>, DBError> {
  let op = "storefront.store.product_by_handle";

  let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE handle = $1");
  let row: Option<ProductRow> = sqlx::query_as::<_, ProductRow>(&sql)
    .bind(handle)
    .fetch_optional(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  match row {
    None => Ok(None),
    Some(row) => Ok(assemble_products(s, vec![row], op).await?.into_iter().next()),
  }
}

/// Load the related option/image/variant rows for a page of products and
/// stitch them into presentation records. Derivations (first sentence,
/// featured image, price range) are left to `models::adapt`.
pub(super) async fn assemble_products(
  s: &StorefrontStoreImpl,
  rows: Vec<ProductRow>,
  op: &str,
) -> Result<Vec<Product>, DBError> {
  if rows.is_empty() {
    return Ok(vec![]);
  }

  let product_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();

  let variant_rows: Vec<VariantRow> = sqlx::query_as::<_, VariantRow>(
    "SELECT id, product_id, title, price, currency_code, available_for_sale \
     FROM product_variants WHERE product_id = ANY($1) ORDER BY price",
  )
  .bind(&product_ids)
  .fetch_all(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let variant_ids: Vec<String> = variant_rows.iter().map(|v| v.id.clone()).collect();
  let selected_rows: Vec<SelectedOptionRow> = if variant_ids.is_empty() {
    vec![]
  } else {
    sqlx::query_as::<_, SelectedOptionRow>(
      "SELECT variant_id, name, value FROM variant_selected_options \
       WHERE variant_id = ANY($1) ORDER BY name",
    )
    .bind(&variant_ids)
    .fetch_all(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?
  };

  let option_rows: Vec<OptionRow> = sqlx::query_as::<_, OptionRow>(
    "SELECT id, product_id, name FROM product_options WHERE product_id = ANY($1) ORDER BY name",
  )
  .bind(&product_ids)
  .fetch_all(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let option_ids: Vec<String> = option_rows.iter().map(|o| o.id.clone()).collect();
  let value_rows: Vec<OptionValueRow> = if option_ids.is_empty() {
    vec![]
  } else {
    sqlx::query_as::<_, OptionValueRow>(
      "SELECT id, option_id, value FROM product_option_values \
       WHERE option_id = ANY($1) ORDER BY value",
    )
    .bind(&option_ids)
    .fetch_all(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?
  };

  let image_rows: Vec<ImageRow> = sqlx::query_as::<_, ImageRow>(
    "SELECT product_id, url, alt_text, width, height FROM product_images \
     WHERE product_id = ANY($1) ORDER BY id",
  )
  .bind(&product_ids)
  .fetch_all(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let mut selected_by_variant: HashMap<String, Vec<SelectedOption>> = HashMap::new();
  for row in selected_rows {
    let Some(variant_id) = row.variant_id else { continue };
    selected_by_variant
      .entry(variant_id)
      .or_default()
      .push(SelectedOption { name: row.name, value: row.value });
  }

  let mut variants_by_product: HashMap<String, Vec<Variant>> = HashMap::new();
  for row in variant_rows {
    let selected_options = selected_by_variant.remove(&row.id).unwrap_or_default();
    variants_by_product.entry(row.product_id.clone()).or_default().push(Variant {
      id: row.id,
      title: row.title,
      available_for_sale: row.available_for_sale,
      price: Money::new(
        row.price.unwrap_or_default(),
        row.currency_code.unwrap_or_default(),
      ),
      selected_options,
    });
  }

  let mut values_by_option: HashMap<String, Vec<OptionValue>> = HashMap::new();
  for row in value_rows {
    values_by_option
      .entry(row.option_id)
      .or_default()
      .push(OptionValue { id: row.id, name: row.value });
  }

  let mut options_by_product: HashMap<String, Vec<ProductOption>> = HashMap::new();
  for row in option_rows {
    let values = values_by_option.remove(&row.id).unwrap_or_default();
    options_by_product
      .entry(row.product_id.clone())
      .or_default()
      .push(ProductOption { id: row.id, name: row.name, values });
  }

  let mut images_by_product: HashMap<String, Vec<ProductImage>> = HashMap::new();
  for row in image_rows {
    images_by_product.entry(row.product_id.clone()).or_default().push(ProductImage {
      url: row.url,
      alt_text: row.alt_text,
      width: row.width,
      height: row.height,
    });
  }

  let products = rows
    .into_iter()
    .map(|row| Product {
      variants: variants_by_product.remove(&row.id).unwrap_or_default(),
      options: options_by_product.remove(&row.id).unwrap_or_default(),
      images: images_by_product.remove(&row.id).unwrap_or_default(),
      featured_image: ProductImage::default(),
      price_range: PriceRange::default(),
      currency_code: row.currency_code.unwrap_or_default(),
      id: row.id,
      title: row.title,
      description: row.description,
      handle: row.handle,
      available_for_sale: row.available_for_sale,
    })
    .collect();

  Ok(products)
}
