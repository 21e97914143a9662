//! In-memory store and gateway fakes backing the controller tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ulid::Ulid;

use crate::controller::payment::PaymentPoll;
use crate::controller::{Controller, ControllerArgs};
use crate::gateway::{GatewayError, GatewayOrder, GatewayPayment, PaymentGateway};
use crate::models::cart::{cart_totals, line_cost, Cart, CartLine, Merchandise};
use crate::models::money::Money;
use crate::models::order::{
  Address, AddressDraft, Order, OrderDraft, OrderItem, OrderStatus, Transaction,
  TransactionDraft, TransactionStatus,
};
use crate::models::product::{Collection, Product, ProductImage, ProductListParams};
use crate::store::cache::Cache;
use crate::store::database::errors::{DBError, DBErrorKind};
use crate::store::database::StorefrontStore;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
  carts: Mutex<HashMap<String, Cart>>,
  orders: Mutex<Vec<Order>>,
  transactions: Mutex<Vec<Transaction>>,
  addresses: Mutex<Vec<Address>>,
  /// variant id -> unit price, used to build line snapshots on add.
  catalog: Mutex<HashMap<String, Money>>,
  fail_cart_writes: AtomicBool,
  fail_order_create: AtomicBool,
}

impl MemoryStore {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn seed_variant(&self, variant_id: &str, amount: &str) {
    self.catalog.lock().unwrap().insert(
      variant_id.to_string(),
      Money { amount: amount.to_string(), currency_code: "INR".to_string() },
    );
  }

  pub(crate) fn fail_cart_writes(&self) {
    self.fail_cart_writes.store(true, Ordering::SeqCst);
  }

  pub(crate) fn fail_order_create(&self) {
    self.fail_order_create.store(true, Ordering::SeqCst);
  }

  pub(crate) fn insert_empty_cart(&self) -> String {
    let id = Ulid::new().to_string();
    self.carts.lock().unwrap().insert(id.clone(), Cart { id: id.clone(), ..Cart::empty() });
    id
  }

  pub(crate) fn insert_cart_with_line(
    &self,
    variant_id: &str,
    quantity: i64,
    amount: &str,
  ) -> String {
    let id = self.insert_empty_cart();
    let unit = Money { amount: amount.to_string(), currency_code: "INR".to_string() };
    let lines = vec![CartLine {
      id: Ulid::new().to_string(),
      quantity,
      cost: line_cost(quantity, &unit),
      merchandise: merchandise_for(variant_id, &unit),
    }];
    let (cost, total_quantity) = cart_totals(&lines);
    self
      .carts
      .lock()
      .unwrap()
      .insert(id.clone(), Cart { id: id.clone(), lines, cost, total_quantity });
    id
  }

  pub(crate) fn insert_order(&self, total: &str) -> String {
    let id = Ulid::new().to_string();
    self.orders.lock().unwrap().push(Order {
      id: id.clone(),
      user_id: None,
      shipping_address: "Asha Rao, 12 Lake Road, Pune, MH, 411001, India".to_string(),
      contact_email: "asha@example.com".to_string(),
      contact_phone: "9000000000".to_string(),
      total: Money { amount: total.to_string(), currency_code: "INR".to_string() },
      status: OrderStatus::Pending,
      created_at: Utc::now(),
      items: vec![],
    });
    id
  }

  pub(crate) async fn push_transaction(&self, draft: &TransactionDraft) {
    self.transaction_create(draft).await.unwrap();
  }

  pub(crate) fn cart_snapshot(&self, cart_id: &str) -> Option<Cart> {
    self.carts.lock().unwrap().get(cart_id).cloned()
  }

  pub(crate) fn latest_transaction(&self, order_id: &str) -> Option<Transaction> {
    self
      .transactions
      .lock()
      .unwrap()
      .iter()
      .rev()
      .find(|t| t.order_id == order_id)
      .cloned()
  }

  pub(crate) fn transaction_count(&self, order_id: &str) -> usize {
    self.transactions.lock().unwrap().iter().filter(|t| t.order_id == order_id).count()
  }

  pub(crate) fn order_count(&self) -> usize {
    self.orders.lock().unwrap().len()
  }

  fn forced_failure(&self, op: &str) -> DBError {
    DBError::new(DBErrorKind::Internal, None, "forced failure", op)
  }
}

fn merchandise_for(variant_id: &str, unit: &Money) -> Merchandise {
  Merchandise {
    id: variant_id.to_string(),
    title: format!("Variant {variant_id}"),
    price: unit.clone(),
    selected_options: vec![],
    product_title: "Product".to_string(),
    product_handle: "product".to_string(),
    product_image: ProductImage::default(),
  }
}

fn recompute(cart: &mut Cart) {
  let (cost, total_quantity) = cart_totals(&cart.lines);
  cart.cost = cost;
  cart.total_quantity = total_quantity;
}

#[async_trait]
impl StorefrontStore for MemoryStore {
  async fn product_list(&self, _params: &ProductListParams) -> Result<Vec<Product>, DBError> {
    Ok(vec![])
  }

  async fn product_by_handle(&self, _handle: &str) -> Result<Option<Product>, DBError> {
    Ok(None)
  }

  async fn collection_list(&self, _limit: i64) -> Result<Vec<Collection>, DBError> {
    Ok(vec![])
  }

  async fn collection_products(
    &self,
    _handle: &str,
    _params: &ProductListParams,
  ) -> Result<Vec<Product>, DBError> {
    Ok(vec![])
  }

  async fn cart_create(&self) -> Result<Cart, DBError> {
    if self.fail_cart_writes.load(Ordering::SeqCst) {
      return Err(self.forced_failure("test.memory_store.cart_create"));
    }
    let id = self.insert_empty_cart();
    Ok(self.cart_snapshot(&id).unwrap())
  }

  async fn cart_get(&self, cart_id: &str) -> Result<Option<Cart>, DBError> {
    Ok(self.cart_snapshot(cart_id))
  }

  async fn cart_add_line(
    &self,
    cart_id: &str,
    variant_id: &str,
    quantity: i64,
  ) -> Result<Option<Cart>, DBError> {
    if self.fail_cart_writes.load(Ordering::SeqCst) {
      return Err(self.forced_failure("test.memory_store.cart_add_line"));
    }
    let unit = self
      .catalog
      .lock()
      .unwrap()
      .get(variant_id)
      .cloned()
      .unwrap_or_default();

    let mut carts = self.carts.lock().unwrap();
    let Some(cart) = carts.get_mut(cart_id) else {
      return Ok(None);
    };

    match cart.lines.iter_mut().find(|l| l.merchandise.id == variant_id) {
      Some(line) => {
        line.quantity += quantity;
        line.cost = line_cost(line.quantity, &line.merchandise.price);
      }
      None => cart.lines.push(CartLine {
        id: Ulid::new().to_string(),
        quantity,
        cost: line_cost(quantity, &unit),
        merchandise: merchandise_for(variant_id, &unit),
      }),
    }
    recompute(cart);
    Ok(Some(cart.clone()))
  }

  async fn cart_update_line(
    &self,
    cart_id: &str,
    line_id: &str,
    quantity: i64,
  ) -> Result<Option<Cart>, DBError> {
    if self.fail_cart_writes.load(Ordering::SeqCst) {
      return Err(self.forced_failure("test.memory_store.cart_update_line"));
    }
    let mut carts = self.carts.lock().unwrap();
    let Some(cart) = carts.get_mut(cart_id) else {
      return Ok(None);
    };
    if let Some(line) = cart.lines.iter_mut().find(|l| l.id == line_id) {
      line.quantity = quantity;
      line.cost = line_cost(quantity, &line.merchandise.price);
    }
    recompute(cart);
    Ok(Some(cart.clone()))
  }

  async fn cart_remove_line(
    &self,
    cart_id: &str,
    line_id: &str,
  ) -> Result<Option<Cart>, DBError> {
    if self.fail_cart_writes.load(Ordering::SeqCst) {
      return Err(self.forced_failure("test.memory_store.cart_remove_line"));
    }
    let mut carts = self.carts.lock().unwrap();
    let Some(cart) = carts.get_mut(cart_id) else {
      return Ok(None);
    };
    cart.lines.retain(|l| l.id != line_id);
    recompute(cart);
    Ok(Some(cart.clone()))
  }

  async fn cart_clear(&self, cart_id: &str) -> Result<(), DBError> {
    if self.fail_cart_writes.load(Ordering::SeqCst) {
      return Err(self.forced_failure("test.memory_store.cart_clear"));
    }
    let mut carts = self.carts.lock().unwrap();
    if let Some(cart) = carts.get_mut(cart_id) {
      cart.lines.clear();
      recompute(cart);
    }
    Ok(())
  }

  async fn order_create(&self, draft: &OrderDraft) -> Result<Order, DBError> {
    if self.fail_order_create.load(Ordering::SeqCst) {
      return Err(self.forced_failure("test.memory_store.order_create"));
    }
    let order = Order {
      id: Ulid::new().to_string(),
      user_id: draft.user_id.clone(),
      shipping_address: draft.shipping_address.clone(),
      contact_email: draft.contact_email.clone(),
      contact_phone: draft.contact_phone.clone(),
      total: draft.total.clone(),
      status: OrderStatus::Pending,
      created_at: Utc::now(),
      items: draft
        .items
        .iter()
        .map(|item| OrderItem {
          id: Ulid::new().to_string(),
          variant_id: item.variant_id.clone(),
          quantity: item.quantity,
          price: item.price.clone(),
          total: item.total.clone(),
        })
        .collect(),
    };
    self.orders.lock().unwrap().push(order.clone());
    Ok(order)
  }

  async fn order_get(&self, order_id: &str) -> Result<Option<Order>, DBError> {
    Ok(self.orders.lock().unwrap().iter().find(|o| o.id == order_id).cloned())
  }

  async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, DBError> {
    Ok(
      self
        .orders
        .lock()
        .unwrap()
        .iter()
        .filter(|o| o.user_id.as_deref() == Some(user_id))
        .cloned()
        .collect(),
    )
  }

  async fn order_set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), DBError> {
    let mut orders = self.orders.lock().unwrap();
    if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
      order.status = status;
    }
    Ok(())
  }

  async fn transaction_create(&self, draft: &TransactionDraft) -> Result<Transaction, DBError> {
    let transaction = Transaction {
      id: Ulid::new().to_string(),
      order_id: draft.order_id.clone(),
      gateway_order_id: Some(draft.gateway_order_id.clone()),
      payment_id: None,
      amount: draft.amount.clone(),
      status: TransactionStatus::Pending,
      created_at: Utc::now(),
    };
    self.transactions.lock().unwrap().push(transaction.clone());
    Ok(transaction)
  }

  async fn transaction_latest(&self, order_id: &str) -> Result<Option<Transaction>, DBError> {
    Ok(self.latest_transaction(order_id))
  }

  async fn transaction_mark(
    &self,
    transaction_id: &str,
    status: TransactionStatus,
    payment_id: Option<&str>,
  ) -> Result<(), DBError> {
    let mut transactions = self.transactions.lock().unwrap();
    if let Some(transaction) = transactions.iter_mut().find(|t| t.id == transaction_id) {
      transaction.status = status;
      if let Some(payment_id) = payment_id {
        transaction.payment_id = Some(payment_id.to_string());
      }
    }
    Ok(())
  }

  async fn address_list(&self, user_id: &str) -> Result<Vec<Address>, DBError> {
    Ok(
      self
        .addresses
        .lock()
        .unwrap()
        .iter()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect(),
    )
  }

  async fn address_create(&self, draft: &AddressDraft) -> Result<Address, DBError> {
    let address = Address {
      id: Ulid::new().to_string(),
      user_id: draft.user_id.clone(),
      name: draft.name.clone(),
      address_line1: draft.address_line1.clone(),
      address_line2: draft.address_line2.clone(),
      city: draft.city.clone(),
      state: draft.state.clone(),
      postal_code: draft.postal_code.clone(),
      country: draft.country.clone(),
      phone: draft.phone.clone(),
      is_default: draft.is_default,
      created_at: Utc::now(),
    };
    self.addresses.lock().unwrap().push(address.clone());
    Ok(address)
  }
}

#[derive(Debug, Default)]
pub(crate) struct FakeGateway {
  payments: Mutex<HashMap<String, Vec<GatewayPayment>>>,
  payment_reads: AtomicUsize,
  fail_create_order: AtomicBool,
}

impl FakeGateway {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn record_payment(&self, gateway_order_id: &str, payment: GatewayPayment) {
    self
      .payments
      .lock()
      .unwrap()
      .entry(gateway_order_id.to_string())
      .or_default()
      .push(payment);
  }

  pub(crate) fn fail_create_order(&self) {
    self.fail_create_order.store(true, Ordering::SeqCst);
  }

  pub(crate) fn payment_reads(&self) -> usize {
    self.payment_reads.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
  async fn create_order(
    &self,
    amount_minor: i64,
    currency: &str,
    _receipt: &str,
  ) -> Result<GatewayOrder, GatewayError> {
    if self.fail_create_order.load(Ordering::SeqCst) {
      return Err(GatewayError::Api("forced failure".to_string()));
    }
    Ok(GatewayOrder {
      id: format!("gw_order_{}", Ulid::new()),
      amount: amount_minor,
      currency: currency.to_string(),
      status: "created".to_string(),
    })
  }

  async fn order_payments(
    &self,
    gateway_order_id: &str,
  ) -> Result<Vec<GatewayPayment>, GatewayError> {
    self.payment_reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.payments.lock().unwrap().get(gateway_order_id).cloned().unwrap_or_default())
  }
}

pub(crate) fn test_controller(
  store: Arc<MemoryStore>,
  gateway: Arc<FakeGateway>,
) -> Controller {
  Controller::new(ControllerArgs {
    store,
    gateway,
    cache: Arc::new(Cache::new(Duration::from_secs(300))),
    poll: PaymentPoll {
      max_attempts: 10,
      initial_backoff: Duration::ZERO,
      max_backoff: Duration::ZERO,
    },
  })
}
