use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use ulid::Ulid;

use crate::controller::Controller;
use crate::models::errors::AppError;
use crate::models::order::{order_draft_from_cart, CheckoutForm, Order, TransactionDraft};

/// Everything the client-side payment widget needs to take over.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentHandoff {
  pub gateway_order_id: String,
  pub amount_minor: i64,
  pub currency_code: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutOutcome {
  pub order: Order,
  /// Absent for zero-total orders, which need no payment.
  pub payment: Option<PaymentHandoff>,
}

/// Checkout orchestration: validate, write the order and its items in one
/// transaction, clear the cart only once that write committed, then hand
/// off to the payment gateway when there is anything to pay.
pub async fn checkout(
  c: &Controller,
  cart_id: &str,
  form: &CheckoutForm,
) -> Result<CheckoutOutcome, AppError> {
  let path = "storefront.controller.checkout";

  let cart = c
    .store
    .cart_get(cart_id)
    .await?
    .ok_or_else(|| AppError::not_found(path, "cart is not found"))?;

  form.validate(&cart)?;

  let draft = order_draft_from_cart(&cart, form);
  let order = c.store.order_create(&draft).await?;
  info!(order_id = %order.id, status = %order.status, total = %order.total.amount, "order created");

  // The order is in; losing the cart clear would only leave stale lines,
  // so it must not fail the checkout.
  if let Err(err) = c.store.cart_clear(cart_id).await {
    warn!(error = %err, cart_id, "failed to clear cart after checkout");
  }

  if order.total.to_decimal() <= Decimal::ZERO {
    return Ok(CheckoutOutcome { order, payment: None });
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

  Ok(CheckoutOutcome {
    payment: Some(PaymentHandoff {
      gateway_order_id: gateway_order.id,
      amount_minor: order.total.amount_minor(),
      currency_code: order.total.currency_code.clone(),
    }),
    order,
  })
}
