use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::models::cart::Cart;
use crate::models::errors::AppError;
use crate::models::money::Money;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[display("pending")]
  Pending,
  #[display("paid")]
  Paid,
  #[display("failed")]
  Failed,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Paid => "paid",
      OrderStatus::Failed => "failed",
    }
  }

  pub fn from_str(status: &str) -> OrderStatus {
    match status {
      "paid" => OrderStatus::Paid,
      "failed" => OrderStatus::Failed,
      _ => OrderStatus::Pending,
    }
  }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  #[display("pending")]
  Pending,
  #[display("success")]
  Success,
  #[display("failed")]
  Failed,
}

impl TransactionStatus {
  /// Success and failure are terminal: polling stops there.
  pub fn is_terminal(&self) -> bool {
    !matches!(self, TransactionStatus::Pending)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      TransactionStatus::Pending => "pending",
      TransactionStatus::Success => "success",
      TransactionStatus::Failed => "failed",
    }
  }

  pub fn from_str(status: &str) -> TransactionStatus {
    match status {
      "success" => TransactionStatus::Success,
      "failed" => TransactionStatus::Failed,
      _ => TransactionStatus::Pending,
    }
  }
}

/// Order line snapshot: unit price and line total at checkout time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: String,
  pub variant_id: String,
  pub quantity: i64,
  pub price: Money,
  pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: String,
  pub user_id: Option<String>,
  pub shipping_address: String,
  pub contact_email: String,
  pub contact_phone: String,
  pub total: Money,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub items: Vec<OrderItem>,
}

#[derive(Clone, Debug)]
pub struct OrderItemDraft {
  pub variant_id: String,
  pub quantity: i64,
  pub price: Money,
  pub total: Money,
}

#[derive(Clone, Debug)]
pub struct OrderDraft {
  pub user_id: Option<String>,
  pub shipping_address: String,
  pub contact_email: String,
  pub contact_phone: String,
  pub total: Money,
  pub items: Vec<OrderItemDraft>,
}

/// One payment attempt against an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub id: String,
  pub order_id: String,
  pub gateway_order_id: Option<String>,
  pub payment_id: Option<String>,
  pub amount: Money,
  pub status: TransactionStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct TransactionDraft {
  pub order_id: String,
  pub gateway_order_id: String,
  pub amount: Money,
}

/// Saved shipping address for a signed-in user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub id: String,
  pub user_id: String,
  pub name: String,
  pub address_line1: String,
  pub address_line2: Option<String>,
  pub city: String,
  pub state: String,
  pub postal_code: String,
  pub country: String,
  pub phone: String,
  pub is_default: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AddressDraft {
  /// Filled from the route, not the request body.
  #[serde(default)]
  pub user_id: String,
  pub name: String,
  pub address_line1: String,
  pub address_line2: Option<String>,
  pub city: String,
  pub state: String,
  pub postal_code: String,
  pub country: String,
  pub phone: String,
  pub is_default: bool,
}

/// Contact and shipping data collected at checkout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckoutForm {
  pub user_id: Option<String>,
  pub name: String,
  pub email: String,
  pub phone: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
  pub country: String,
}

impl CheckoutForm {
  /// One-line shipping address snapshot stored on the order.
  pub fn shipping_address(&self) -> String {
    format!(
      "{}, {}, {}, {}, {}, {}",
      self.name, self.address, self.city, self.state, self.pincode, self.country
    )
  }

  /// Fills the shipping fields from a saved address.
  pub fn with_address(mut self, address: &Address) -> CheckoutForm {
    self.name = address.name.clone();
    self.phone = address.phone.clone();
    self.address = match &address.address_line2 {
      Some(line2) if !line2.is_empty() => format!("{}, {}", address.address_line1, line2),
      _ => address.address_line1.clone(),
    };
    self.city = address.city.clone();
    self.state = address.state.clone();
    self.pincode = address.postal_code.clone();
    self.country = address.country.clone();
    self
  }

  pub fn validate(&self, cart: &Cart) -> Result<(), AppError> {
    let path = "storefront.models.checkout_form_validate";
    let invalid = |msg: &str| AppError::validation(path, msg);

    if cart.is_empty() {
      return Err(invalid("cart is empty"));
    }

    let required = [
      ("name", &self.name),
      ("email", &self.email),
      ("phone", &self.phone),
      ("address", &self.address),
      ("city", &self.city),
      ("state", &self.state),
      ("pincode", &self.pincode),
      ("country", &self.country),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(invalid(&format!("{field} is required")));
      }
    }

    if !self.email.contains('@') {
      return Err(invalid("email is invalid"));
    }

    Ok(())
  }
}

/// Order draft built from a cart and a checkout form. The draft total is
/// the cart total, which already carries the flat shipping charge, so the
/// order invariant holds: total = sum of item totals + shipping.
pub fn order_draft_from_cart(cart: &Cart, form: &CheckoutForm) -> OrderDraft {
  let items = cart
    .lines
    .iter()
    .map(|line| OrderItemDraft {
      variant_id: line.merchandise.id.clone(),
      quantity: line.quantity,
      price: line.merchandise.price.clone(),
      total: line.cost.clone(),
    })
    .collect();

  OrderDraft {
    user_id: form.user_id.clone(),
    shipping_address: form.shipping_address(),
    contact_email: form.email.clone(),
    contact_phone: form.phone.clone(),
    total: cart.cost.total_amount.clone(),
    items,
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal::Decimal;

  use super::*;
  use crate::models::cart::{apply, CartAction, FLAT_SHIPPING_COST};
  use crate::models::product::{Product, Variant};

  fn form() -> CheckoutForm {
    CheckoutForm {
      user_id: None,
      name: "Asha Rao".to_string(),
      email: "asha@example.com".to_string(),
      phone: "9000000000".to_string(),
      address: "12 Lake Road".to_string(),
      city: "Pune".to_string(),
      state: "MH".to_string(),
      pincode: "411001".to_string(),
      country: "India".to_string(),
    }
  }

  fn cart_with_one_line() -> Cart {
    let variant = Variant {
      id: "v1".to_string(),
      title: "Tee".to_string(),
      available_for_sale: true,
      price: Money { amount: "500.00".to_string(), currency_code: "INR".to_string() },
      selected_options: vec![],
    };
    apply(
      &Cart::empty(),
      &CartAction::AddItem { variant, product: Product::default(), previous_quantity: 0 },
    )
  }

  #[test]
  fn test_validate_rejects_empty_cart() {
    let err = form().validate(&Cart::empty()).unwrap_err();
    assert!(err.message.contains("cart is empty"));
  }

  #[test]
  fn test_validate_requires_contact_fields() {
    let cart = cart_with_one_line();
    let mut bad = form();
    bad.email = String::new();
    assert!(bad.validate(&cart).is_err());

    let mut bad = form();
    bad.email = "not-an-email".to_string();
    assert!(bad.validate(&cart).is_err());

    assert!(form().validate(&cart).is_ok());
  }

  #[test]
  fn test_shipping_address_snapshot() {
    assert_eq!(
      form().shipping_address(),
      "Asha Rao, 12 Lake Road, Pune, MH, 411001, India"
    );
  }

  #[test]
  fn test_order_draft_total_equals_items_plus_shipping() {
    let cart = cart_with_one_line();
    let draft = order_draft_from_cart(&cart, &form());

    let items_total: Decimal = draft.items.iter().map(|i| i.total.to_decimal()).sum();
    let expected = items_total + Decimal::from(FLAT_SHIPPING_COST);
    assert_eq!(draft.total.to_decimal(), expected);
    assert_eq!(draft.items.len(), 1);
    assert_eq!(draft.items[0].price.amount, "500.00");
    assert_eq!(draft.shipping_address, "Asha Rao, 12 Lake Road, Pune, MH, 411001, India");
  }
}
