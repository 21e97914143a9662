use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::gateway::{GatewayError, GatewayOrder, GatewayPayment, PaymentGateway};

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay REST client. The server side only creates orders and reads
/// the payments recorded against them; card collection happens in the
/// gateway's own client-side widget.
#[derive(Debug)]
pub struct RazorpayClient {
  client: Client,
  key_id: String,
  key_secret: String,
  base_url: String,
}

#[derive(Debug)]
pub struct RazorpayClientArgs {
  pub key_id: String,
  pub key_secret: String,
  /// Override for tests and mock servers; production uses the default.
  pub base_url: Option<String>,
  pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct PaymentsEnvelope {
  items: Vec<GatewayPayment>,
}

impl RazorpayClient {
  pub fn new(args: RazorpayClientArgs) -> Result<Self, GatewayError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(args.timeout_secs))
      .connect_timeout(Duration::from_secs(10))
      .build()?;

    let base_url = args
      .base_url
      .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
      .trim_end_matches('/')
      .to_string();

    Ok(Self { client, key_id: args.key_id, key_secret: args.key_secret, base_url })
  }

  async fn read_body(
    &self,
    response: reqwest::Response,
    context: &str,
  ) -> Result<serde_json::Value, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(GatewayError::Api(format!("{context} returned {status}: {body}")));
    }

    serde_json::from_str(&body)
      .map_err(|err| GatewayError::Decode { context: context.to_string(), source: err })
  }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
  async fn create_order(
    &self,
    amount_minor: i64,
    currency: &str,
    receipt: &str,
  ) -> Result<GatewayOrder, GatewayError> {
    let url = format!("{}/v1/orders", self.base_url);
    let response = self
      .client
      .post(&url)
      .basic_auth(&self.key_id, Some(&self.key_secret))
      .json(&json!({
        "amount": amount_minor,
        "currency": currency,
        "receipt": receipt,
        "payment_capture": 1,
      }))
      .send()
      .await?;

    let body = self.read_body(response, "create_order").await?;
    serde_json::from_value(body)
      .map_err(|err| GatewayError::Decode { context: "create_order".to_string(), source: err })
  }

  async fn order_payments(
    &self,
    gateway_order_id: &str,
  ) -> Result<Vec<GatewayPayment>, GatewayError> {
    let url = format!("{}/v1/orders/{}/payments", self.base_url, gateway_order_id);
    let response = self
      .client
      .get(&url)
      .basic_auth(&self.key_id, Some(&self.key_secret))
      .send()
      .await?;

    let body = self.read_body(response, "order_payments").await?;
    let envelope: PaymentsEnvelope = serde_json::from_value(body)
      .map_err(|err| GatewayError::Decode { context: "order_payments".to_string(), source: err })?;

    Ok(envelope.items)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_payments_envelope_decodes() {
    let body = r#"{
      "entity": "collection",
      "count": 1,
      "items": [
        { "id": "pay_29QQoUBi66xm2f", "status": "captured", "amount": 60000, "currency": "INR" }
      ]
    }"#;

    let envelope: PaymentsEnvelope = serde_json::from_str(body).unwrap();
    assert_eq!(envelope.items.len(), 1);
    assert!(envelope.items[0].is_captured());
    assert_eq!(envelope.items[0].amount, 60000);
  }

  #[test]
  fn test_base_url_is_normalized() {
    let client = RazorpayClient::new(RazorpayClientArgs {
      key_id: "rzp_test".to_string(),
      key_secret: "secret".to_string(),
      base_url: Some("http://127.0.0.1:9000/".to_string()),
      timeout_secs: 5,
    })
    .unwrap();

    assert_eq!(client.base_url, "http://127.0.0.1:9000");
  }
}
