pub mod dbstore;
pub mod errors;

use std::fmt;

use async_trait::async_trait;

use crate::models::cart::Cart;
use crate::models::order::{
  Address, AddressDraft, Order, OrderDraft, OrderStatus, Transaction, TransactionDraft,
  TransactionStatus,
};
use crate::models::product::{Collection, Product, ProductListParams};
use crate::store::database::errors::DBError;

/// Persistence surface of the storefront: catalog reads plus cart, order
/// and transaction writes. Reads return `None` for missing rows; every
/// other failure is a `DBError`.
#[async_trait]
pub trait StorefrontStore: fmt::Debug + Send + Sync {
  async fn product_list(&self, params: &ProductListParams) -> Result<Vec<Product>, DBError>;
  async fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, DBError>;

  async fn collection_list(&self, limit: i64) -> Result<Vec<Collection>, DBError>;
  async fn collection_products(
    &self,
    handle: &str,
    params: &ProductListParams,
  ) -> Result<Vec<Product>, DBError>;

  async fn cart_create(&self) -> Result<Cart, DBError>;
  async fn cart_get(&self, cart_id: &str) -> Result<Option<Cart>, DBError>;
  async fn cart_add_line(
    &self,
    cart_id: &str,
    variant_id: &str,
    quantity: i64,
  ) -> Result<Option<Cart>, DBError>;
  async fn cart_update_line(
    &self,
    cart_id: &str,
    line_id: &str,
    quantity: i64,
  ) -> Result<Option<Cart>, DBError>;
  async fn cart_remove_line(&self, cart_id: &str, line_id: &str)
    -> Result<Option<Cart>, DBError>;
  async fn cart_clear(&self, cart_id: &str) -> Result<(), DBError>;

  async fn order_create(&self, draft: &OrderDraft) -> Result<Order, DBError>;
  async fn order_get(&self, order_id: &str) -> Result<Option<Order>, DBError>;
  async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, DBError>;
  async fn order_set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), DBError>;

  async fn transaction_create(&self, draft: &TransactionDraft) -> Result<Transaction, DBError>;
  async fn transaction_latest(&self, order_id: &str) -> Result<Option<Transaction>, DBError>;
  async fn transaction_mark(
    &self,
    transaction_id: &str,
    status: TransactionStatus,
    payment_id: Option<&str>,
  ) -> Result<(), DBError>;

  async fn address_list(&self, user_id: &str) -> Result<Vec<Address>, DBError>;
  async fn address_create(&self, draft: &AddressDraft) -> Result<Address, DBError>;
}
