use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use ulid::Ulid;

use crate::models::money::{Money, DEFAULT_CURRENCY};
use crate::models::order::{Order, OrderDraft, OrderItem, OrderStatus};
use crate::store::database::dbstore::StorefrontStoreImpl;
use crate::store::database::errors::{handle_db_error, DBError};

#[derive(Debug, FromRow)]
struct OrderRow {
  id: String,
  user_id: Option<String>,
  shipping_address: String,
  contact_email: String,
  contact_phone: String,
  total: Decimal,
  currency_code: String,
  status: String,
  created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
  id: String,
  order_id: Option<String>,
  variant_id: Option<String>,
  quantity: i32,
  price: Decimal,
  total_amount: Decimal,
  currency_code: String,
}

const ORDER_COLUMNS: &str =
  "id, user_id, shipping_address, contact_email, contact_phone, total, currency_code, \
   status, created_at";

/// Writes the order row and its item snapshots in one transaction: either
/// the whole order lands or none of it does.
pub(super) async fn order_create(
  s: &StorefrontStoreImpl,
  draft: &OrderDraft,
) -> Result<Order, DBError> {
  let op = "storefront.store.order_create";

  let mut tx = s.db.begin().await.map_err(|err| handle_db_error(err, op))?;

  let order_id = Ulid::new().to_string();
  let created_at: DateTime<Utc> = sqlx::query_scalar(
    "INSERT INTO orders \
       (id, user_id, shipping_address, contact_email, contact_phone, total, currency_code, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
     RETURNING created_at",
  )
  .bind(&order_id)
  .bind(&draft.user_id)
  .bind(&draft.shipping_address)
  .bind(&draft.contact_email)
  .bind(&draft.contact_phone)
  .bind(draft.total.to_decimal())
  .bind(&draft.total.currency_code)
  .bind(OrderStatus::Pending.as_str())
  .fetch_one(&mut *tx)
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let mut items = Vec::with_capacity(draft.items.len());
  for item in &draft.items {
    let item_id = Ulid::new().to_string();
    sqlx::query(
      "INSERT INTO order_items (id, order_id, variant_id, quantity, price, total_amount, currency_code) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&item_id)
    .bind(&order_id)
    .bind(&item.variant_id)
    .bind(item.quantity)
    .bind(item.price.to_decimal())
    .bind(item.total.to_decimal())
    .bind(&item.total.currency_code)
    .execute(&mut *tx)
    .await
    .map_err(|err| handle_db_error(err, op))?;

    items.push(OrderItem {
      id: item_id,
      variant_id: item.variant_id.clone(),
      quantity: item.quantity,
      price: item.price.clone(),
      total: item.total.clone(),
    });
  }

  tx.commit().await.map_err(|err| handle_db_error(err, op))?;

  Ok(Order {
    id: order_id,
    user_id: draft.user_id.clone(),
    shipping_address: draft.shipping_address.clone(),
    contact_email: draft.contact_email.clone(),
    contact_phone: draft.contact_phone.clone(),
    total: draft.total.clone(),
    status: OrderStatus::Pending,
    created_at,
    items,
  })
}

pub(super) async fn order_get(
  s: &StorefrontStoreImpl,
  order_id: &str,
) -> Result<Option<Order>, DBError> {
  let op = "storefront.store.order_get";

  let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
  let row: Option<OrderRow> = sqlx::query_as::<_, OrderRow>(&sql)
    .bind(order_id)
    .fetch_optional(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  let Some(row) = row else {
    return Ok(None);
  };

  let mut orders = attach_items(s, vec![row], op).await?;
  Ok(orders.pop())
}

pub(super) async fn orders_for_user(
  s: &StorefrontStoreImpl,
  user_id: &str,
) -> Result<Vec<Order>, DBError> {
  let op = "storefront.store.orders_for_user";

  let sql =
    format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC");
  let rows: Vec<OrderRow> = sqlx::query_as::<_, OrderRow>(&sql)
    .bind(user_id)
    .fetch_all(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  attach_items(s, rows, op).await
}

pub(super) async fn order_set_status(
  s: &StorefrontStoreImpl,
  order_id: &str,
  status: OrderStatus,
) -> Result<(), DBError> {
  let op = "storefront.store.order_set_status";

  sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
    .bind(status.as_str())
    .bind(order_id)
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  Ok(())
}

async fn attach_items(
  s: &StorefrontStoreImpl,
  rows: Vec<OrderRow>,
  op: &str,
) -> Result<Vec<Order>, DBError> {
  if rows.is_empty() {
    return Ok(vec![]);
  }

  let order_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
  let item_rows: Vec<OrderItemRow> = sqlx::query_as::<_, OrderItemRow>(
    "SELECT id, order_id, variant_id, quantity, price, total_amount, currency_code \
     FROM order_items WHERE order_id = ANY($1) ORDER BY id",
  )
  .bind(&order_ids)
  .fetch_all(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
  for row in item_rows {
    let Some(order_id) = row.order_id else { continue };
    let currency =
      if row.currency_code.is_empty() { DEFAULT_CURRENCY.to_string() } else { row.currency_code };
    items_by_order.entry(order_id).or_default().push(OrderItem {
      id: row.id,
      variant_id: row.variant_id.unwrap_or_default(),
      quantity: row.quantity as i64,
      price: Money::new(row.price, currency.clone()),
      total: Money::new(row.total_amount, currency),
    });
  }

  let orders = rows
    .into_iter()
    .map(|row| Order {
      items: items_by_order.remove(&row.id).unwrap_or_default(),
      total: Money::new(row.total, row.currency_code.clone()),
      status: OrderStatus::from_str(&row.status),
      id: row.id,
      user_id: row.user_id,
      shipping_address: row.shipping_address,
      contact_email: row.contact_email,
      contact_phone: row.contact_phone,
      created_at: row.created_at,
    })
    .collect();

  Ok(orders)
}
