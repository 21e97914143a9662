pub mod razorpay;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::errors::{AppError, AppErrorKind};

/// Errors returned by the payment gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
  /// Network or TLS failure from the underlying HTTP client.
  #[error("gateway HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  /// The gateway answered with an error status or error payload.
  #[error("gateway API error: {0}")]
  Api(String),

  /// The response body could not be deserialized into the expected shape.
  #[error("gateway response decode error for {context}: {source}")]
  Decode {
    context: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Gateway-side order reference created before the client widget collects
/// payment details. Amounts are in minor units.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayOrder {
  pub id: String,
  pub amount: i64,
  pub currency: String,
  pub status: String,
}

/// One payment attempt as reported by the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayPayment {
  pub id: String,
  pub status: String,
  pub amount: i64,
}

impl GatewayPayment {
  pub fn is_captured(&self) -> bool {
    self.status == "captured"
  }

  pub fn is_failed(&self) -> bool {
    self.status == "failed"
  }
}

/// External payment gateway: creates gateway orders for handoff to the
/// client-side widget and reports the payments recorded against them.
#[async_trait]
pub trait PaymentGateway: fmt::Debug + Send + Sync {
  async fn create_order(
    &self,
    amount_minor: i64,
    currency: &str,
    receipt: &str,
  ) -> Result<GatewayOrder, GatewayError>;

  async fn order_payments(
    &self,
    gateway_order_id: &str,
  ) -> Result<Vec<GatewayPayment>, GatewayError>;
}

impl From<GatewayError> for AppError {
  fn from(err: GatewayError) -> AppError {
    AppError::new(
      AppErrorKind::Gateway,
      "storefront.gateway",
      "payment gateway call failed",
      Some(Box::new(err)),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_payment_status_predicates() {
    let payment = GatewayPayment { id: "pay_1".into(), status: "captured".into(), amount: 500 };
    assert!(payment.is_captured());
    assert!(!payment.is_failed());

    let payment = GatewayPayment { id: "pay_2".into(), status: "created".into(), amount: 500 };
    assert!(!payment.is_captured());
    assert!(!payment.is_failed());
  }
}
