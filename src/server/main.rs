use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tracing::info;

use crate::controller::payment::PaymentPoll;
use crate::controller::router::build_router;
use crate::controller::{Controller, ControllerArgs};
use crate::gateway::razorpay::{RazorpayClient, RazorpayClientArgs};
use crate::models::config::Config;
use crate::store::cache::{Cache, DEFAULT_CACHE_TTL};
use crate::store::database::dbstore::{StorefrontStoreImpl, StorefrontStoreImplArgs};

pub struct Server {
  pub(crate) config: Config,
  pub(crate) db: Option<Arc<Pool<Postgres>>>,
}

#[derive(Debug)]
pub struct ServerArgs {
  /// Defaults to `config.yaml` in the working directory.
  pub config_path: Option<PathBuf>,
}

impl Server {
  pub async fn new(args: ServerArgs) -> Result<Self, Box<dyn Error>> {
    let config = Server::init_service_config(args.config_path.as_deref())?;

    let mut server = Self { config, db: None };
    server.init_database().await?;

    Ok(server)
  }

  pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
    let db = self.db.clone().ok_or("database is not initialized")?;

    let store = Arc::new(StorefrontStoreImpl::new(StorefrontStoreImplArgs { db }));
    let cache = Arc::new(Cache::new(DEFAULT_CACHE_TTL));
    let gateway = Arc::new(RazorpayClient::new(RazorpayClientArgs {
      key_id: self.config.gateway.key_id.clone(),
      key_secret: self.config.gateway.key_secret.clone(),
      base_url: self.config.gateway.base_url.clone(),
      timeout_secs: self.config.gateway.timeout_secs,
    })?);

    let controller = Arc::new(Controller::new(ControllerArgs {
      store,
      gateway,
      cache,
      poll: PaymentPoll::default(),
    }));

    let app = build_router(controller);
    let addr =
      format!("{}:{}", self.config.service.http_host, self.config.service.http_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, env = %self.config.service.env, "storefront service listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
  }
}

async fn shutdown_signal() {
  let ctrl_c = async {
    tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
  };

  #[cfg(unix)]
  let terminate = async {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
      .expect("failed to install signal handler")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }

  info!("received shutdown signal, starting graceful shutdown");
}
