use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::info;
use ulid::Ulid;

use crate::controller::checkout::PaymentHandoff;
use crate::controller::Controller;
use crate::models::errors::AppError;
use crate::models::order::{
  Order, OrderStatus, Transaction, TransactionDraft, TransactionStatus,
};

pub const MAX_VERIFY_ATTEMPTS: u32 = 10;
pub const INITIAL_VERIFY_BACKOFF: Duration = Duration::from_secs(2);
pub const MAX_VERIFY_BACKOFF: Duration = Duration::from_secs(30);

/// Polling bounds. Verification retries double the delay up to the cap
/// and give up after `max_attempts`, leaving the transaction pending.
#[derive(Clone, Debug)]
pub struct PaymentPoll {
  pub max_attempts: u32,
  pub initial_backoff: Duration,
  pub max_backoff: Duration,
}

impl Default for PaymentPoll {
  fn default() -> Self {
    Self {
      max_attempts: MAX_VERIFY_ATTEMPTS,
      initial_backoff: INITIAL_VERIFY_BACKOFF,
      max_backoff: MAX_VERIFY_BACKOFF,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
  Loading,
  Pending,
  Success,
  Failed,
}

impl From<TransactionStatus> for PaymentState {
  fn from(status: TransactionStatus) -> PaymentState {
    match status {
      TransactionStatus::Pending => PaymentState::Pending,
      TransactionStatus::Success => PaymentState::Success,
      TransactionStatus::Failed => PaymentState::Failed,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusView {
  pub state: PaymentState,
  pub order: Order,
  pub transaction: Transaction,
}

/// One verification pass: ask the gateway what happened to the latest
/// payment attempt, persist any terminal outcome, then report the stored
/// state.
pub async fn check_payment(c: &Controller, order_id: &str) -> Result<PaymentStatusView, AppError> {
  let path = "storefront.controller.check_payment";

  let transaction = c
    .store
    .transaction_latest(order_id)
    .await?
    .ok_or_else(|| AppError::not_found(path, "no payment attempt exists for this order"))?;

  if !transaction.status.is_terminal() {
    verify_transaction(c, &transaction).await?;
  }

  let transaction = c
    .store
    .transaction_latest(order_id)
    .await?
    .ok_or_else(|| AppError::not_found(path, "no payment attempt exists for this order"))?;
  let order = c
    .store
    .order_get(order_id)
    .await?
    .ok_or_else(|| AppError::not_found(path, "order is not found"))?;

  Ok(PaymentStatusView { state: transaction.status.into(), order, transaction })
}

/// Re-checks until the transaction is terminal, with doubling backoff and
/// a hard attempt ceiling. Exhausting the bound returns the last observed
/// (still pending) state instead of spinning forever.
pub async fn poll_payment(c: &Controller, order_id: &str) -> Result<PaymentStatusView, AppError> {
  let mut view = check_payment(c, order_id).await?;
  let mut backoff = c.poll.initial_backoff;

  for _ in 1..c.poll.max_attempts {
    if view.transaction.status.is_terminal() {
      break;
    }
    sleep(backoff).await;
    backoff = (backoff * 2).min(c.poll.max_backoff);
    view = check_payment(c, order_id).await?;
  }

  Ok(view)
}

/// Starts a fresh payment attempt for an order whose last attempt failed:
/// a new gateway order and a new pending transaction.
pub async fn retry_payment(c: &Controller, order_id: &str) -> Result<PaymentHandoff, AppError> {
  let path = "storefront.controller.retry_payment";

  let order = c
    .store
    .order_get(order_id)
    .await?
    .ok_or_else(|| AppError::not_found(path, "order is not found"))?;

  let latest = c.store.transaction_latest(order_id).await?;
  match latest {
    Some(transaction) if transaction.status == TransactionStatus::Failed => {}
    _ => {
      return Err(AppError::validation(
        path,
        "payment retry is only allowed after a failed attempt",
      ));
    }
  }

  let receipt = format!("receipt_{}", Ulid::new());
  let gateway_order = c
    .gateway
    .create_order(order.total.amount_minor(), &order.total.currency_code, &receipt)
    .await?;

  c.store
    .transaction_create(&TransactionDraft {
      order_id: order.id.clone(),
      gateway_order_id: gateway_order.id.clone(),
      amount: order.total.clone(),
    })
    .await?;

  info!(order_id = %order.id, gateway_order_id = %gateway_order.id, "payment retry initiated");

  Ok(PaymentHandoff {
    gateway_order_id: gateway_order.id,
    amount_minor: order.total.amount_minor(),
    currency_code: order.total.currency_code,
  })
}

async fn verify_transaction(c: &Controller, transaction: &Transaction) -> Result<(), AppError> {
  let Some(gateway_order_id) = transaction.gateway_order_id.as_deref() else {
    // Nothing to verify against; the attempt stays pending.
    return Ok(());
  };

  let payments = c.gateway.order_payments(gateway_order_id).await?;

  if let Some(captured) = payments.iter().find(|p| p.is_captured()) {
    c.store
      .transaction_mark(&transaction.id, TransactionStatus::Success, Some(&captured.id))
      .await?;
    c.store.order_set_status(&transaction.order_id, OrderStatus::Paid).await?;
    return Ok(());
  }

  if !payments.is_empty() && payments.iter().all(|p| p.is_failed()) {
    let failed_id = payments.first().map(|p| p.id.as_str());
    c.store
      .transaction_mark(&transaction.id, TransactionStatus::Failed, failed_id)
      .await?;
    c.store.order_set_status(&transaction.order_id, OrderStatus::Failed).await?;
  }

  Ok(())
}
