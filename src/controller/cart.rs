use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::warn;

use crate::models::cart::{apply, Cart, CartAction};
use crate::models::errors::AppError;
use crate::models::product::{Product, Variant};
use crate::store::database::StorefrontStore;

/// The slice of the backing store a cart session needs. Kept narrow so the
/// session store can be exercised against fakes.
#[async_trait]
pub trait CartBackend: fmt::Debug + Send + Sync {
  async fn fetch(&self) -> Result<Option<Cart>, AppError>;
  async fn add_line(&self, variant_id: &str, quantity: i64) -> Result<Option<Cart>, AppError>;
  async fn update_line(&self, line_id: &str, quantity: i64) -> Result<Option<Cart>, AppError>;
  async fn remove_line(&self, line_id: &str) -> Result<Option<Cart>, AppError>;
  async fn clear(&self) -> Result<(), AppError>;
}

/// Cart persistence scoped to one browsing session. The cart row is
/// created lazily on the first add, mirroring the cookie-backed flow.
#[derive(Debug)]
pub struct SessionCartBackend {
  store: Arc<dyn StorefrontStore>,
  cart_id: Mutex<Option<String>>,
}

impl SessionCartBackend {
  pub fn new(store: Arc<dyn StorefrontStore>, cart_id: Option<String>) -> Self {
    Self { store, cart_id: Mutex::new(cart_id) }
  }

  pub async fn cart_id(&self) -> Option<String> {
    self.cart_id.lock().await.clone()
  }

  async fn ensure_cart_id(&self) -> Result<String, AppError> {
    let mut guard = self.cart_id.lock().await;

    // A remembered id may point at a cart that no longer exists.
    if let Some(id) = guard.as_ref() {
      if self.store.cart_get(id).await?.is_some() {
        return Ok(id.clone());
      }
    }

    let cart = self.store.cart_create().await?;
    *guard = Some(cart.id.clone());
    Ok(cart.id)
  }
}

#[async_trait]
impl CartBackend for SessionCartBackend {
  async fn fetch(&self) -> Result<Option<Cart>, AppError> {
    let Some(cart_id) = self.cart_id().await else {
      return Ok(None);
    };
    Ok(self.store.cart_get(&cart_id).await?)
  }

  async fn add_line(&self, variant_id: &str, quantity: i64) -> Result<Option<Cart>, AppError> {
    let cart_id = self.ensure_cart_id().await?;
    Ok(self.store.cart_add_line(&cart_id, variant_id, quantity).await?)
  }

  async fn update_line(&self, line_id: &str, quantity: i64) -> Result<Option<Cart>, AppError> {
    let Some(cart_id) = self.cart_id().await else {
      return Ok(None);
    };
    Ok(self.store.cart_update_line(&cart_id, line_id, quantity).await?)
  }

  async fn remove_line(&self, line_id: &str) -> Result<Option<Cart>, AppError> {
    let Some(cart_id) = self.cart_id().await else {
      return Ok(None);
    };
    Ok(self.store.cart_remove_line(&cart_id, line_id).await?)
  }

  async fn clear(&self) -> Result<(), AppError> {
    let Some(cart_id) = self.cart_id().await else {
      return Ok(());
    };
    Ok(self.store.cart_clear(&cart_id).await?)
  }
}

#[derive(Debug)]
struct CartState {
  /// Last authoritative snapshot from the backend.
  base: Option<Cart>,
  /// Actions applied locally and not yet confirmed.
  pending: Vec<CartAction>,
}

/// Session cart store with optimistic updates. Consumers subscribe to the
/// visible cart; operations publish the locally-applied action before the
/// backend round trip, and each authoritative response replaces the base
/// snapshot wholesale (never a field merge). A failed backend call keeps
/// the optimistic view and surfaces the error to the caller; there is no
/// automatic rollback.
#[derive(Debug)]
pub struct CartStore {
  backend: Arc<dyn CartBackend>,
  state: Mutex<CartState>,
  tx: watch::Sender<Cart>,
}

impl CartStore {
  pub fn new(backend: Arc<dyn CartBackend>) -> Self {
    let (tx, _) = watch::channel(Cart::empty());
    Self { backend, state: Mutex::new(CartState { base: None, pending: vec![] }), tx }
  }

  /// Fetches the authoritative cart, e.g. when the session mounts.
  pub async fn load(&self) -> Result<(), AppError> {
    let fresh = self.backend.fetch().await?;
    let mut state = self.state.lock().await;
    state.base = fresh;
    state.pending.clear();
    self.publish(&state);
    Ok(())
  }

  pub fn subscribe(&self) -> watch::Receiver<Cart> {
    self.tx.subscribe()
  }

  /// The UI-visible cart: base snapshot with pending actions applied.
  pub fn cart(&self) -> Cart {
    self.tx.borrow().clone()
  }

  /// Increments the variant's line by one, inserting it at quantity one
  /// when absent. Visible immediately; reconciled when the backend
  /// responds.
  pub async fn add(&self, variant: &Variant, product: &Product) -> Result<(), AppError> {
    {
      let mut state = self.state.lock().await;
      let previous_quantity = state
        .base
        .as_ref()
        .and_then(|cart| cart.lines.iter().find(|l| l.merchandise.id == variant.id))
        .map(|line| line.quantity)
        .unwrap_or(0);

      state.pending.push(CartAction::AddItem {
        variant: variant.clone(),
        product: product.clone(),
        previous_quantity,
      });
      self.publish(&state);
    }

    let result = self.backend.add_line(&variant.id, 1).await;
    self.reconcile(result).await
  }

  /// Sets a line's quantity; zero or below removes it.
  pub async fn update(
    &self,
    line_id: &str,
    variant_id: &str,
    next_quantity: i64,
  ) -> Result<(), AppError> {
    {
      let mut state = self.state.lock().await;
      state.pending.push(CartAction::UpdateItem {
        variant_id: variant_id.to_string(),
        next_quantity,
      });
      self.publish(&state);
    }

    let result = if next_quantity <= 0 {
      self.backend.remove_line(line_id).await
    } else {
      self.backend.update_line(line_id, next_quantity).await
    };
    self.reconcile(result).await
  }

  /// Empties the cart locally and on the backend.
  pub async fn clear(&self) -> Result<(), AppError> {
    {
      let mut state = self.state.lock().await;
      state.base = Some(Cart::empty());
      state.pending.clear();
      self.publish(&state);
    }

    match self.backend.clear().await {
      Ok(()) => Ok(()),
      Err(err) => {
        warn!(error = %err, "cart backend clear failed");
        Err(err)
      }
    }
  }

  /// Drops local state without touching the backend; used after checkout
  /// has already cleared the server-side cart.
  pub async fn reset_local(&self) {
    let mut state = self.state.lock().await;
    state.base = Some(Cart::empty());
    state.pending.clear();
    self.publish(&state);
  }

  async fn reconcile(&self, result: Result<Option<Cart>, AppError>) -> Result<(), AppError> {
    match result {
      Ok(fresh) => {
        let mut state = self.state.lock().await;
        if let Some(fresh) = fresh {
          // Authoritative response supersedes the whole overlay.
          state.base = Some(fresh);
          state.pending.clear();
        }
        self.publish(&state);
        Ok(())
      }
      Err(err) => {
        // Optimistic state stays as-is until a later authoritative
        // response lands.
        warn!(error = %err, "cart backend call failed");
        Err(err)
      }
    }
  }

  fn publish(&self, state: &CartState) {
    let base = state.base.clone().unwrap_or_else(Cart::empty);
    let visible = state.pending.iter().fold(base, |cart, action| apply(&cart, action));
    let _ = self.tx.send(visible);
  }
}
