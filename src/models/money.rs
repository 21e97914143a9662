use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rusty_money::{iso, Money as DisplayMoney};
use serde::{Deserialize, Serialize};

/// Carts are single-currency; lines without a currency fall back to this.
pub const DEFAULT_CURRENCY: &str = "INR";

/// A decimal amount paired with its ISO currency code. The amount is kept
/// as a two-decimal string at module boundaries so totals survive
/// serialization without float drift.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
  pub amount: String,
  pub currency_code: String,
}

impl Money {
  pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
    Self { amount: format!("{:.2}", amount), currency_code: currency_code.into() }
  }

  pub fn zero(currency_code: impl Into<String>) -> Self {
    Self::new(Decimal::ZERO, currency_code)
  }

  /// Tolerant parse: missing or malformed amounts count as zero.
  pub fn to_decimal(&self) -> Decimal {
    Decimal::from_str(self.amount.trim()).unwrap_or_default()
  }

  /// Amount in minor units (paise for INR), as payment gateways expect.
  pub fn amount_minor(&self) -> i64 {
    (self.to_decimal() * Decimal::from(100)).to_i64().unwrap_or(0)
  }

  pub fn is_zero(&self) -> bool {
    self.to_decimal().is_zero()
  }
}

impl Default for Money {
  fn default() -> Self {
    Self::zero(DEFAULT_CURRENCY)
  }
}

/// Human display string for an amount, e.g. `₹500.00`. Unknown currency
/// codes fall back to `CODE amount`.
pub fn format_price(money: &Money) -> String {
  match iso::find(&money.currency_code) {
    Some(currency) => DisplayMoney::from_minor(money.amount_minor(), currency).to_string(),
    None => format!("{} {}", money.currency_code, money.amount),
  }
}
