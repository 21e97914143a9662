pub mod cart;
pub mod checkout;
pub mod collections;
pub mod payment;
pub mod products;
pub mod router;

#[cfg(test)]
pub(crate) mod support;

use std::sync::Arc;

use crate::controller::payment::PaymentPoll;
use crate::gateway::PaymentGateway;
use crate::store::cache::Cache;
use crate::store::database::StorefrontStore;

#[derive(Debug)]
pub struct Controller {
  pub(crate) store: Arc<dyn StorefrontStore>,
  pub(crate) gateway: Arc<dyn PaymentGateway>,
  pub(crate) cache: Arc<Cache>,
  pub(crate) poll: PaymentPoll,
}

#[derive(Debug)]
pub struct ControllerArgs {
  pub store: Arc<dyn StorefrontStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub cache: Arc<Cache>,
  pub poll: PaymentPoll,
}

impl Controller {
  pub fn new(args: ControllerArgs) -> Controller {
    Controller { store: args.store, gateway: args.gateway, cache: args.cache, poll: args.poll }
  }
}
