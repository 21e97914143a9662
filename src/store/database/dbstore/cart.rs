use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::FromRow;
use ulid::Ulid;

use crate::models::cart::{cart_totals, line_cost, Cart, CartLine, Merchandise};
use crate::models::money::{Money, DEFAULT_CURRENCY};
use crate::models::product::{ProductImage, SelectedOption};
use crate::store::database::dbstore::StorefrontStoreImpl;
use crate::store::database::errors::{handle_db_error, DBError};

#[derive(Debug, FromRow)]
struct CartLineRow {
  id: String,
  quantity: i32,
  variant_id: Option<String>,
  variant_title: Option<String>,
  price: Option<Decimal>,
  currency_code: Option<String>,
  product_title: Option<String>,
  product_handle: Option<String>,
  image_url: Option<String>,
  image_alt_text: Option<String>,
}

#[derive(Debug, FromRow)]
struct SelectedOptionRow {
  variant_id: Option<String>,
  name: String,
  value: String,
}

pub(super) async fn cart_create(s: &StorefrontStoreImpl) -> Result<Cart, DBError> {
  let op = "storefront.store.cart_create";

  let cart_id = Ulid::new().to_string();
  sqlx::query("INSERT INTO carts (id) VALUES ($1)")
    .bind(&cart_id)
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  Ok(Cart { id: cart_id, ..Cart::empty() })
}

pub(super) async fn cart_get(
  s: &StorefrontStoreImpl,
  cart_id: &str,
) -> Result<Option<Cart>, DBError> {
  let op = "storefront.store.cart_get";

  let found: Option<String> = sqlx::query_scalar("SELECT id FROM carts WHERE id = $1")
    .bind(cart_id)
    .fetch_optional(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  let Some(cart_id) = found else {
    return Ok(None);
  };

  let line_rows: Vec<CartLineRow> = sqlx::query_as::<_, CartLineRow>(
    "SELECT ci.id, ci.quantity, v.id AS variant_id, v.title AS variant_title, \
            v.price, v.currency_code, p.title AS product_title, p.handle AS product_handle, \
            (SELECT i.url FROM product_images i WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) \
              AS image_url, \
            (SELECT i.alt_text FROM product_images i WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) \
              AS image_alt_text \
     FROM cart_items ci \
     LEFT JOIN product_variants v ON v.id = ci.variant_id \
     LEFT JOIN products p ON p.id = v.product_id \
     WHERE ci.cart_id = $1 \
     ORDER BY ci.id",
  )
  .bind(&cart_id)
  .fetch_all(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let variant_ids: Vec<String> =
    line_rows.iter().filter_map(|r| r.variant_id.clone()).collect();
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

  let mut selected_by_variant: HashMap<String, Vec<SelectedOption>> = HashMap::new();
  for row in selected_rows {
    let Some(variant_id) = row.variant_id else { continue };
    selected_by_variant
      .entry(variant_id)
      .or_default()
      .push(SelectedOption { name: row.name, value: row.value });
  }

  let lines: Vec<CartLine> = line_rows
    .into_iter()
    .map(|row| {
      // Missing variants or prices degrade to a zero-priced line rather
      // than failing the whole cart read.
      let unit_price = Money::new(
        row.price.unwrap_or_default(),
        row.currency_code.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
      );
      let variant_id = row.variant_id.unwrap_or_default();
      let selected_options = selected_by_variant.remove(&variant_id).unwrap_or_default();
      CartLine {
        id: row.id,
        quantity: row.quantity as i64,
        cost: line_cost(row.quantity as i64, &unit_price),
        merchandise: Merchandise {
          id: variant_id,
          title: row.variant_title.unwrap_or_default(),
          price: unit_price,
          selected_options,
          product_title: row.product_title.unwrap_or_default(),
          product_handle: row.product_handle.unwrap_or_default(),
          product_image: ProductImage {
            url: row.image_url.unwrap_or_default(),
            alt_text: row.image_alt_text.unwrap_or_default(),
            width: 0,
            height: 0,
          },
        },
      }
    })
    .collect();

  let (cost, total_quantity) = cart_totals(&lines);
  Ok(Some(Cart { id: cart_id, lines, cost, total_quantity }))
}

/// Two-step add: read any existing quantity for (cart, variant), then
/// upsert the summed quantity on the (cart_id, variant_id) conflict key.
pub(super) async fn cart_add_line(
  s: &StorefrontStoreImpl,
  cart_id: &str,
  variant_id: &str,
  quantity: i64,
) -> Result<Option<Cart>, DBError> {
  let op = "storefront.store.cart_add_line";

  let existing: Option<i32> =
    sqlx::query_scalar("SELECT quantity FROM cart_items WHERE cart_id = $1 AND variant_id = $2")
      .bind(cart_id)
      .bind(variant_id)
      .fetch_optional(s.db.as_ref())
      .await
      .map_err(|err| handle_db_error(err, op))?;

  let new_quantity = existing.unwrap_or(0) as i64 + quantity;

  sqlx::query(
    "INSERT INTO cart_items (id, cart_id, variant_id, quantity) VALUES ($1, $2, $3, $4) \
     ON CONFLICT (cart_id, variant_id) DO UPDATE SET quantity = EXCLUDED.quantity",
  )
  .bind(Ulid::new().to_string())
  .bind(cart_id)
  .bind(variant_id)
  .bind(new_quantity)
  .execute(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  cart_get(s, cart_id).await
}

pub(super) async fn cart_update_line(
  s: &StorefrontStoreImpl,
  cart_id: &str,
  line_id: &str,
  quantity: i64,
) -> Result<Option<Cart>, DBError> {
  let op = "storefront.store.cart_update_line";

  sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2 AND cart_id = $3")
    .bind(quantity)
    .bind(line_id)
    .bind(cart_id)
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  cart_get(s, cart_id).await
}

pub(super) async fn cart_remove_line(
  s: &StorefrontStoreImpl,
  cart_id: &str,
  line_id: &str,
) -> Result<Option<Cart>, DBError> {
  let op = "storefront.store.cart_remove_line";

  sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
    .bind(line_id)
    .bind(cart_id)
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  cart_get(s, cart_id).await
}

pub(super) async fn cart_clear(s: &StorefrontStoreImpl, cart_id: &str) -> Result<(), DBError> {
  let op = "storefront.store.cart_clear";

  sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
    .bind(cart_id)
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  Ok(())
}
