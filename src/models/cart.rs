use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::models::money::{Money, DEFAULT_CURRENCY};
use crate::models::product::{Product, ProductImage, SelectedOption, Variant};

/// Flat shipping charged on any non-empty cart, in major units.
pub const FLAT_SHIPPING_COST: i64 = 100;

/// Variant snapshot carried by a cart line. Unit price is captured at
/// add time; line totals are always recomputed from it, never from a
/// re-read of the catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Merchandise {
  pub id: String,
  pub title: String,
  pub price: Money,
  pub selected_options: Vec<SelectedOption>,
  pub product_title: String,
  pub product_handle: String,
  pub product_image: ProductImage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
  pub id: String,
  pub quantity: i64,
  /// Line total = unit price x quantity.
  pub cost: Money,
  pub merchandise: Merchandise,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartCost {
  pub subtotal_amount: Money,
  pub total_amount: Money,
  pub total_tax_amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
  pub id: String,
  pub lines: Vec<CartLine>,
  pub cost: CartCost,
  pub total_quantity: i64,
}

impl Cart {
  pub fn empty() -> Cart {
    Cart {
      id: String::new(),
      lines: vec![],
      cost: CartCost {
        subtotal_amount: Money::zero(DEFAULT_CURRENCY),
        total_amount: Money::zero(DEFAULT_CURRENCY),
        total_tax_amount: Money::zero(DEFAULT_CURRENCY),
      },
      total_quantity: 0,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

pub fn line_cost(quantity: i64, unit_price: &Money) -> Money {
  Money::new(unit_price.to_decimal() * Decimal::from(quantity), unit_price.currency_code.clone())
}

/// Aggregate cost and quantity over a set of lines. Subtotal is the sum of
/// line totals (missing amounts count as zero), total adds the flat
/// shipping cost whenever the subtotal is positive, tax is a placeholder
/// zero. The aggregate currency comes from the first line. Input lines are
/// not touched.
pub fn cart_totals(lines: &[CartLine]) -> (CartCost, i64) {
  let currency = lines
    .first()
    .map(|l| l.cost.currency_code.clone())
    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

  let subtotal: Decimal = lines.iter().map(|l| l.cost.to_decimal()).sum();
  let total_quantity: i64 = lines.iter().map(|l| l.quantity).sum();

  let shipping =
    if subtotal > Decimal::ZERO { Decimal::from(FLAT_SHIPPING_COST) } else { Decimal::ZERO };

  let cost = CartCost {
    subtotal_amount: Money::new(subtotal, currency.clone()),
    total_amount: Money::new(subtotal + shipping, currency.clone()),
    total_tax_amount: Money::zero(currency),
  };

  (cost, total_quantity)
}

/// A pending local cart mutation, applied optimistically over the last
/// authoritative snapshot until the backend response supersedes it.
#[derive(Clone, Debug)]
pub enum CartAction {
  AddItem { variant: Variant, product: Product, previous_quantity: i64 },
  UpdateItem { variant_id: String, next_quantity: i64 },
  Clear,
}

/// Pure reducer: applies one action to a cart snapshot and returns the
/// next snapshot with its aggregates recomputed.
pub fn apply(cart: &Cart, action: &CartAction) -> Cart {
  match action {
    CartAction::AddItem { variant, product, previous_quantity } => {
      let target_quantity = previous_quantity + 1;
      let mut lines = cart.lines.clone();

      match lines.iter_mut().find(|l| l.merchandise.id == variant.id) {
        Some(line) => {
          let unit = unit_price_of(line);
          line.quantity = target_quantity;
          line.cost =
            Money::new(unit * Decimal::from(target_quantity), line.cost.currency_code.clone());
        }
        None => {
          // New lines get a temporary id until the backend assigns one.
          lines.insert(
            0,
            CartLine {
              id: format!("temp-{}", Ulid::new()),
              quantity: target_quantity,
              cost: line_cost(target_quantity, &variant.price),
              merchandise: Merchandise {
                id: variant.id.clone(),
                title: variant.title.clone(),
                price: variant.price.clone(),
                selected_options: variant.selected_options.clone(),
                product_title: product.title.clone(),
                product_handle: product.handle.clone(),
                product_image: product.featured_image.clone(),
              },
            },
          );
        }
      }

      rebuild(cart.id.clone(), lines)
    }

    CartAction::UpdateItem { variant_id, next_quantity } => {
      let mut lines: Vec<CartLine> = Vec::with_capacity(cart.lines.len());
      for line in &cart.lines {
        if line.merchandise.id != *variant_id {
          lines.push(line.clone());
          continue;
        }
        if *next_quantity <= 0 {
          continue; // quantity zero or below removes the line
        }
        let unit = unit_price_of(line);
        let mut updated = line.clone();
        updated.quantity = *next_quantity;
        updated.cost =
          Money::new(unit * Decimal::from(*next_quantity), line.cost.currency_code.clone());
        lines.push(updated);
      }

      if lines.is_empty() {
        return Cart::empty();
      }
      rebuild(cart.id.clone(), lines)
    }

    CartAction::Clear => Cart::empty(),
  }
}

/// Unit price derived from the line's own totals. Assumes the unit price
/// never changes mid-session.
fn unit_price_of(line: &CartLine) -> Decimal {
  if line.quantity <= 0 {
    return line.merchandise.price.to_decimal();
  }
  line.cost.to_decimal() / Decimal::from(line.quantity)
}

fn rebuild(id: String, lines: Vec<CartLine>) -> Cart {
  let (cost, total_quantity) = cart_totals(&lines);
  Cart { id, lines, cost, total_quantity }
}
