use async_trait::async_trait;

use crate::models::cart::Cart;
use crate::models::order::{
  Address, AddressDraft, Order, OrderDraft, OrderStatus, Transaction, TransactionDraft,
  TransactionStatus,
};
use crate::models::product::{Collection, Product, ProductListParams};
use crate::store::database::dbstore::{
  addresses, cart, collections, orders, products, transactions, StorefrontStoreImpl,
};
use crate::store::database::errors::DBError;
use crate::store::database::StorefrontStore;

#[async_trait]
impl StorefrontStore for StorefrontStoreImpl {
  async fn product_list(&self, params: &ProductListParams) -> Result<Vec<Product>, DBError> {
    products::product_list(self, params).await
  }

  async fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, DBError> {
    products::product_by_handle(self, handle).await
  }

  async fn collection_list(&self, limit: i64) -> Result<Vec<Collection>, DBError> {
    collections::collection_list(self, limit).await
  }

  async fn collection_products(
    &self,
    handle: &str,
    params: &ProductListParams,
  ) -> Result<Vec<Product>, DBError> {
    collections::collection_products(self, handle, params).await
  }

  async fn cart_create(&self) -> Result<Cart, DBError> {
    cart::cart_create(self).await
  }

  async fn cart_get(&self, cart_id: &str) -> Result<Option<Cart>, DBError> {
    cart::cart_get(self, cart_id).await
  }

  async fn cart_add_line(
    &self,
    cart_id: &str,
    variant_id: &str,
    quantity: i64,
  ) -> Result<Option<Cart>, DBError> {
    cart::cart_add_line(self, cart_id, variant_id, quantity).await
  }

  async fn cart_update_line(
    &self,
    cart_id: &str,
    line_id: &str,
    quantity: i64,
  ) -> Result<Option<Cart>, DBError> {
    cart::cart_update_line(self, cart_id, line_id, quantity).await
  }

  async fn cart_remove_line(
    &self,
    cart_id: &str,
    line_id: &str,
  ) -> Result<Option<Cart>, DBError> {
    cart::cart_remove_line(self, cart_id, line_id).await
  }

  async fn cart_clear(&self, cart_id: &str) -> Result<(), DBError> {
    cart::cart_clear(self, cart_id).await
  }

  async fn order_create(&self, draft: &OrderDraft) -> Result<Order, DBError> {
    orders::order_create(self, draft).await
  }

  async fn order_get(&self, order_id: &str) -> Result<Option<Order>, DBError> {
    orders::order_get(self, order_id).await
  }

  async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, DBError> {
    orders::orders_for_user(self, user_id).await
  }

  async fn order_set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), DBError> {
    orders::order_set_status(self, order_id, status).await
  }

  async fn transaction_create(&self, draft: &TransactionDraft) -> Result<Transaction, DBError> {
    transactions::transaction_create(self, draft).await
  }

  async fn transaction_latest(&self, order_id: &str) -> Result<Option<Transaction>, DBError> {
    transactions::transaction_latest(self, order_id).await
  }

  async fn transaction_mark(
    &self,
    transaction_id: &str,
    status: TransactionStatus,
    payment_id: Option<&str>,
  ) -> Result<(), DBError> {
    transactions::transaction_mark(self, transaction_id, status, payment_id).await
  }

  async fn address_list(&self, user_id: &str) -> Result<Vec<Address>, DBError> {
    addresses::address_list(self, user_id).await
  }

  async fn address_create(&self, draft: &AddressDraft) -> Result<Address, DBError> {
    addresses::address_create(self, draft).await
  }
}
