use std::error::Error;

use forli_storefront::server::main::{Server, ServerArgs};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).init();

  let args = ServerArgs { config_path: None };

  let server = Server::new(args).await;
  match server {
    Ok(mut srv) => srv.run().await,
    Err(e) => Err(e),
  }
}
