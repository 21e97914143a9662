mod addresses;
mod cart;
mod collections;
mod orders;
mod products;
mod router;
mod transactions;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

#[derive(Debug)]
pub struct StorefrontStoreImpl {
  pub(crate) db: Arc<Pool<Postgres>>,
}

#[derive(Debug)]
pub struct StorefrontStoreImplArgs {
  pub db: Arc<Pool<Postgres>>,
}

impl StorefrontStoreImpl {
  pub fn new(args: StorefrontStoreImplArgs) -> Self {
    Self { db: args.db }
  }
}
