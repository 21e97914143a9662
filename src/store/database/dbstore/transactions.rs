use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use ulid::Ulid;

use crate::models::money::Money;
use crate::models::order::{Transaction, TransactionDraft, TransactionStatus};
use crate::store::database::dbstore::StorefrontStoreImpl;
use crate::store::database::errors::{handle_db_error, DBError};

#[derive(Debug, FromRow)]
struct TransactionRow {
  id: String,
  order_id: String,
  gateway_order_id: Option<String>,
  payment_id: Option<String>,
  amount: Decimal,
  currency_code: String,
  status: String,
  created_at: DateTime<Utc>,
}

pub(super) async fn transaction_create(
  s: &StorefrontStoreImpl,
  draft: &TransactionDraft,
) -> Result<Transaction, DBError> {
  let op = "storefront.store.transaction_create";

  let transaction_id = Ulid::new().to_string();
  let created_at: DateTime<Utc> = sqlx::query_scalar(
    "INSERT INTO transactions (id, order_id, gateway_order_id, amount, currency_code, status) \
     VALUES ($1, $2, $3, $4, $5, $6) RETURNING created_at",
  )
  .bind(&transaction_id)
  .bind(&draft.order_id)
  .bind(&draft.gateway_order_id)
  .bind(draft.amount.to_decimal())
  .bind(&draft.amount.currency_code)
  .bind(TransactionStatus::Pending.as_str())
  .fetch_one(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  Ok(Transaction {
    id: transaction_id,
    order_id: draft.order_id.clone(),
    gateway_order_id: Some(draft.gateway_order_id.clone()),
    payment_id: None,
    amount: draft.amount.clone(),
    status: TransactionStatus::Pending,
    created_at,
  })
}

/// The most recent payment attempt for an order; older attempts stay
/// around as history.
pub(super) async fn transaction_latest(
  s: &StorefrontStoreImpl,
  order_id: &str,
) -> Result<Option<Transaction>, DBError> {
  let op = "storefront.store.transaction_latest";

  let row: Option<TransactionRow> = sqlx::query_as::<_, TransactionRow>(
    "SELECT id, order_id, gateway_order_id, payment_id, amount, currency_code, status, created_at \
     FROM transactions WHERE order_id = $1 ORDER BY created_at DESC LIMIT 1",
  )
  .bind(order_id)
  .fetch_optional(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  Ok(row.map(|row| Transaction {
    id: row.id,
    order_id: row.order_id,
    gateway_order_id: row.gateway_order_id,
    payment_id: row.payment_id,
    amount: Money::new(row.amount, row.currency_code),
    status: TransactionStatus::from_str(&row.status),
    created_at: row.created_at,
  }))
}

pub(super) async fn transaction_mark(
  s: &StorefrontStoreImpl,
  transaction_id: &str,
  status: TransactionStatus,
  payment_id: Option<&str>,
) -> Result<(), DBError> {
  let op = "storefront.store.transaction_mark";

  sqlx::query(
    "UPDATE transactions SET status = $1, payment_id = COALESCE($2, payment_id) WHERE id = $3",
  )
  .bind(status.as_str())
  .bind(payment_id)
  .bind(transaction_id)
  .execute(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  Ok(())
}
