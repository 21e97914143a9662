use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::money::Money;
use crate::models::product::{
  Collection, OptionValue, PriceRange, Product, ProductImage, ProductOption, Variant,
};

const DESCRIPTION_PREVIEW_MAX_CHARS: usize = 100;

// First sentence-terminated prefix. The terminator class is repeated so a
// previously truncated "..." tail matches as a whole and re-adapting is a
// no-op.
fn sentence_regex() -> &'static Regex {
  static RE_SENTENCE: OnceLock<Regex> = OnceLock::new();
  RE_SENTENCE.get_or_init(|| Regex::new(r"^[^.!?]*[.!?]+").unwrap())
}

fn whitespace_regex() -> &'static Regex {
  static RE_WHITESPACE: OnceLock<Regex> = OnceLock::new();
  RE_WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// First sentence of a description: everything up to the first `.`, `!` or
/// `?`. Terminator-less text longer than 100 characters is cut to 100 plus
/// an ellipsis; shorter text passes through trimmed.
pub fn first_sentence(text: &str) -> String {
  let cleaned = text.trim();
  if cleaned.is_empty() {
    return String::new();
  }

  if let Some(found) = sentence_regex().find(cleaned) {
    return found.as_str().trim().to_string();
  }

  if cleaned.chars().count() > DESCRIPTION_PREVIEW_MAX_CHARS {
    let cut: String = cleaned.chars().take(DESCRIPTION_PREVIEW_MAX_CHARS).collect();
    return format!("{}...", cut.trim());
  }

  cleaned.to_string()
}

/// Stable id for an option or option value: the explicit id when one
/// exists, otherwise the lowercased name with whitespace runs replaced by
/// hyphens.
pub fn option_value_id(explicit: &str, name: &str) -> String {
  if !explicit.is_empty() {
    return explicit.to_string();
  }
  whitespace_regex().replace_all(&name.to_lowercase(), "-").to_string()
}

/// Price range over a product's variants: min and max unit price. Products
/// without variants get a zero range in the fallback currency.
pub fn price_range_of(variants: &[Variant], fallback_currency: &str) -> PriceRange {
  let currency = variants
    .first()
    .map(|v| v.price.currency_code.clone())
    .filter(|c| !c.is_empty())
    .unwrap_or_else(|| fallback_currency.to_string());

  let prices: Vec<Decimal> = variants.iter().map(|v| v.price.to_decimal()).collect();
  let min = prices.iter().min().copied().unwrap_or_default();
  let max = prices.iter().max().copied().unwrap_or_default();

  PriceRange {
    min_variant_price: Money::new(min, currency.clone()),
    max_variant_price: Money::new(max, currency),
  }
}

/// Raw -> presentation mapping for a product. All derivations are
/// deterministic and idempotent: adapting an already adapted product is a
/// fixpoint.
pub fn adapt_product(product: Product) -> Product {
  let description = first_sentence(&product.description);
  let featured_image: ProductImage = product.images.first().cloned().unwrap_or_default();
  let price_range = price_range_of(&product.variants, &product.currency_code);

  let options: Vec<ProductOption> = product
    .options
    .into_iter()
    .map(|option| {
      let id = option_value_id(&option.id, &option.name);
      let values: Vec<OptionValue> = option
        .values
        .into_iter()
        .map(|value| {
          let id = option_value_id(&value.id, &value.name);
          OptionValue { id, name: value.name }
        })
        .collect();
      ProductOption { id, name: option.name, values }
    })
    .collect();

  let currency_code = if product.currency_code.is_empty() {
    price_range.min_variant_price.currency_code.clone()
  } else {
    product.currency_code
  };

  Product {
    id: product.id,
    title: product.title,
    description,
    handle: product.handle,
    available_for_sale: product.available_for_sale,
    currency_code,
    options,
    images: product.images,
    featured_image,
    price_range,
    variants: product.variants,
  }
}

/// Raw -> presentation mapping for a collection: fills the browse path.
pub fn adapt_collection(collection: Collection) -> Collection {
  let path = format!("/shop/{}", collection.handle);
  Collection { path, ..collection }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::money::DEFAULT_CURRENCY;

  fn variant(id: &str, amount: &str) -> Variant {
    Variant {
      id: id.to_string(),
      title: id.to_string(),
      available_for_sale: true,
      price: Money { amount: amount.to_string(), currency_code: "INR".to_string() },
      selected_options: vec![],
    }
  }

  fn image(url: &str) -> ProductImage {
    ProductImage { url: url.to_string(), alt_text: "".to_string(), width: 600, height: 600 }
  }

  #[test]
  fn test_first_sentence_stops_at_terminator() {
    assert_eq!(first_sentence("Hello world. More text."), "Hello world.");
    assert_eq!(first_sentence("Ready? Set. Go!"), "Ready?");
  }

  #[test]
  fn test_first_sentence_truncates_long_text_without_terminator() {
    let text = "a".repeat(150);
    let got = first_sentence(&text);
    assert_eq!(got, format!("{}...", "a".repeat(100)));
  }

  #[test]
  fn test_first_sentence_passes_short_text_through() {
    assert_eq!(first_sentence("  just a fragment  "), "just a fragment");
    assert_eq!(first_sentence(""), "");
  }

  #[test]
  fn test_first_sentence_is_idempotent() {
    let long = "b".repeat(150);
    let cases = ["Hello world. More text.", "no terminator here", long.as_str()];
    for case in cases {
      let once = first_sentence(case);
      assert_eq!(first_sentence(&once), once, "case: {case}");
    }
  }

  #[test]
  fn test_option_value_id_derivation() {
    assert_eq!(option_value_id("", "Navy Blue"), "navy-blue");
    assert_eq!(option_value_id("opt_1", "Navy Blue"), "opt_1");
    assert_eq!(option_value_id("", "Size"), "size");
  }

  #[test]
  fn test_price_range_is_min_and_max_over_variants() {
    let variants = vec![variant("a", "700.00"), variant("b", "250.00"), variant("c", "500.00")];
    let range = price_range_of(&variants, DEFAULT_CURRENCY);
    assert_eq!(range.min_variant_price.amount, "250.00");
    assert_eq!(range.max_variant_price.amount, "700.00");
  }

  #[test]
  fn test_price_range_of_no_variants_is_zero() {
    let range = price_range_of(&[], DEFAULT_CURRENCY);
    assert_eq!(range.min_variant_price.amount, "0.00");
    assert_eq!(range.min_variant_price.currency_code, "INR");
  }

  #[test]
  fn test_featured_image_is_first_or_placeholder() {
    let with_images = Product {
      images: vec![image("https://cdn/one.jpg"), image("https://cdn/two.jpg")],
      ..Product::default()
    };
    assert_eq!(adapt_product(with_images).featured_image.url, "https://cdn/one.jpg");

    let without = adapt_product(Product::default());
    assert_eq!(without.featured_image, ProductImage::default());
  }

  #[test]
  fn test_adapt_product_is_idempotent() {
    let product = Product {
      id: "p1".to_string(),
      title: "Linen Shirt".to_string(),
      description: "Breathable linen. Cut loose for summer.".to_string(),
      handle: "linen-shirt".to_string(),
      available_for_sale: true,
      currency_code: String::new(),
      options: vec![ProductOption {
        id: String::new(),
        name: "Color".to_string(),
        values: vec![
          OptionValue { id: String::new(), name: "Navy Blue".to_string() },
          OptionValue { id: "v-white".to_string(), name: "White".to_string() },
        ],
      }],
      images: vec![image("https://cdn/shirt.jpg")],
      featured_image: ProductImage::default(),
      price_range: PriceRange::default(),
      variants: vec![variant("v1", "1200.00"), variant("v2", "900.00")],
    };

    let once = adapt_product(product);
    let twice = adapt_product(once.clone());

    assert_eq!(once, twice);
    assert_eq!(once.description, "Breathable linen.");
    assert_eq!(once.options[0].id, "color");
    assert_eq!(once.options[0].values[0].id, "navy-blue");
    assert_eq!(once.options[0].values[1].id, "v-white");
    assert_eq!(once.currency_code, "INR");
    assert_eq!(once.price_range.min_variant_price.amount, "900.00");
  }

  #[test]
  fn test_adapt_collection_fills_path() {
    let collection = Collection { handle: "new-arrivals".to_string(), ..Collection::default() };
    let adapted = adapt_collection(collection);
    assert_eq!(adapted.path, "/shop/new-arrivals");
    assert_eq!(adapt_collection(adapted.clone()), adapted);
  }
}
