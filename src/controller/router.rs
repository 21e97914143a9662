use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::controller::checkout::{checkout, CheckoutOutcome, PaymentHandoff};
use crate::controller::payment::{check_payment, retry_payment, PaymentStatusView};
use crate::controller::{collections, products, Controller};
use crate::models::cart::Cart;
use crate::models::errors::{AppError, AppErrorKind};
use crate::models::order::{Address, AddressDraft, CheckoutForm, Order};
use crate::models::product::{Collection, Product, ProductListParams, ProductSortKey};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
  pub q: Option<String>,
  pub sort: Option<String>,
  pub reverse: Option<bool>,
  pub limit: Option<i64>,
}

impl ProductListQuery {
  fn into_params(self) -> ProductListParams {
    let defaults = ProductListParams::default();
    ProductListParams {
      limit: self.limit.unwrap_or(defaults.limit),
      sort_key: self.sort.as_deref().map(ProductSortKey::from_str).unwrap_or(defaults.sort_key),
      reverse: self.reverse.unwrap_or(defaults.reverse),
      query: self.q.filter(|q| !q.trim().is_empty()),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct AddLineBody {
  pub variant_id: String,
  pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineBody {
  pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
  pub cart_id: String,
  #[serde(flatten)]
  pub form: CheckoutForm,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
  error: &'static str,
  message: String,
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match self.kind {
      AppErrorKind::Validation => StatusCode::BAD_REQUEST,
      AppErrorKind::NotFound => StatusCode::NOT_FOUND,
      AppErrorKind::Gateway => StatusCode::BAD_GATEWAY,
      AppErrorKind::Store | AppErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let body = ErrorBody { error: self.kind.as_str(), message: self.message };
    (status, Json(body)).into_response()
  }
}

/// The storefront's informal routes, mapped 1:1 onto controller
/// operations. Rendering stays with the frontend framework; this surface
/// speaks JSON.
pub fn build_router(controller: Arc<Controller>) -> Router {
  Router::new()
    .route("/api/products", get(product_list))
    .route("/api/products/{handle}", get(product_by_handle))
    .route("/api/collections", get(collection_list))
    .route("/api/collections/{handle}", get(collection_by_handle))
    .route("/api/collections/{handle}/products", get(collection_products))
    .route("/api/carts", post(cart_create))
    .route("/api/carts/{id}", get(cart_get).delete(cart_clear))
    .route("/api/carts/{id}/lines", post(cart_add_line))
    .route("/api/carts/{id}/lines/{line_id}", patch(cart_update_line).delete(cart_remove_line))
    .route("/api/checkout", post(checkout_submit))
    .route("/api/payment/status/{order_id}", get(payment_status))
    .route("/api/payment/retry/{order_id}", post(payment_retry))
    .route("/api/accounts/{user_id}/addresses", get(address_list).post(address_create))
    .route("/api/accounts/{user_id}/orders", get(order_list))
    .layer(TraceLayer::new_for_http())
    .with_state(controller)
}

async fn product_list(
  State(c): State<Arc<Controller>>,
  Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
  Ok(Json(products::product_list(&c, &query.into_params()).await?))
}

async fn product_by_handle(
  State(c): State<Arc<Controller>>,
  Path(handle): Path<String>,
) -> Result<Json<Product>, AppError> {
  products::product_by_handle(&c, &handle)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::not_found("storefront.http.product_by_handle", "product is not found"))
}

async fn collection_list(
  State(c): State<Arc<Controller>>,
) -> Result<Json<Vec<Collection>>, AppError> {
  Ok(Json(collections::collection_list(&c).await?))
}

async fn collection_by_handle(
  State(c): State<Arc<Controller>>,
  Path(handle): Path<String>,
) -> Result<Json<Collection>, AppError> {
  collections::collection_by_handle(&c, &handle)
    .await?
    .map(Json)
    .ok_or_else(|| {
      AppError::not_found("storefront.http.collection_by_handle", "collection is not found")
    })
}

async fn collection_products(
  State(c): State<Arc<Controller>>,
  Path(handle): Path<String>,
  Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
  Ok(Json(collections::collection_products(&c, &handle, &query.into_params()).await?))
}

async fn cart_create(State(c): State<Arc<Controller>>) -> Result<Json<Cart>, AppError> {
  Ok(Json(c.store.cart_create().await?))
}

async fn cart_get(
  State(c): State<Arc<Controller>>,
  Path(cart_id): Path<String>,
) -> Result<Json<Cart>, AppError> {
  c.store
    .cart_get(&cart_id)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::not_found("storefront.http.cart_get", "cart is not found"))
}

async fn cart_add_line(
  State(c): State<Arc<Controller>>,
  Path(cart_id): Path<String>,
  Json(body): Json<AddLineBody>,
) -> Result<Json<Cart>, AppError> {
  let quantity = body.quantity.unwrap_or(1);
  c.store
    .cart_add_line(&cart_id, &body.variant_id, quantity)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::not_found("storefront.http.cart_add_line", "cart is not found"))
}

async fn cart_update_line(
  State(c): State<Arc<Controller>>,
  Path((cart_id, line_id)): Path<(String, String)>,
  Json(body): Json<UpdateLineBody>,
) -> Result<Json<Cart>, AppError> {
  // Quantity zero or below removes the line.
  let fresh = if body.quantity <= 0 {
    c.store.cart_remove_line(&cart_id, &line_id).await?
  } else {
    c.store.cart_update_line(&cart_id, &line_id, body.quantity).await?
  };

  fresh
    .map(Json)
    .ok_or_else(|| AppError::not_found("storefront.http.cart_update_line", "cart is not found"))
}

async fn cart_remove_line(
  State(c): State<Arc<Controller>>,
  Path((cart_id, line_id)): Path<(String, String)>,
) -> Result<Json<Cart>, AppError> {
  c.store
    .cart_remove_line(&cart_id, &line_id)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::not_found("storefront.http.cart_remove_line", "cart is not found"))
}

async fn cart_clear(
  State(c): State<Arc<Controller>>,
  Path(cart_id): Path<String>,
) -> Result<StatusCode, AppError> {
  c.store.cart_clear(&cart_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

async fn checkout_submit(
  State(c): State<Arc<Controller>>,
  Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutOutcome>, AppError> {
  Ok(Json(checkout(&c, &body.cart_id, &body.form).await?))
}

async fn payment_status(
  State(c): State<Arc<Controller>>,
  Path(order_id): Path<String>,
) -> Result<Json<PaymentStatusView>, AppError> {
  // One verification pass per request; the page keeps polling.
  Ok(Json(check_payment(&c, &order_id).await?))
}

async fn payment_retry(
  State(c): State<Arc<Controller>>,
  Path(order_id): Path<String>,
) -> Result<Json<PaymentHandoff>, AppError> {
  Ok(Json(retry_payment(&c, &order_id).await?))
}

async fn address_list(
  State(c): State<Arc<Controller>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<Address>>, AppError> {
  Ok(Json(c.store.address_list(&user_id).await?))
}

async fn address_create(
  State(c): State<Arc<Controller>>,
  Path(user_id): Path<String>,
  Json(mut draft): Json<AddressDraft>,
) -> Result<Json<Address>, AppError> {
  draft.user_id = user_id;
  Ok(Json(c.store.address_create(&draft).await?))
}

async fn order_list(
  State(c): State<Arc<Controller>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, AppError> {
  Ok(Json(c.store.orders_for_user(&user_id).await?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_product_list_query_maps_to_params() {
    let query = ProductListQuery {
      q: Some("shirt".to_string()),
      sort: Some("price".to_string()),
      reverse: Some(false),
      limit: Some(24),
    };
    let params = query.into_params();
    assert_eq!(params.sort_key, ProductSortKey::Price);
    assert_eq!(params.limit, 24);
    assert!(!params.reverse);
    assert_eq!(params.query.as_deref(), Some("shirt"));
  }

  #[test]
  fn test_blank_search_is_dropped() {
    let query =
      ProductListQuery { q: Some("   ".to_string()), sort: None, reverse: None, limit: None };
    let params = query.into_params();
    assert!(params.query.is_none());
    assert_eq!(params.sort_key, ProductSortKey::CreatedAt);
    assert!(params.reverse);
  }
}
