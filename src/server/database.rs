use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::models::errors::AppError;
use crate::server::main::Server;

impl Server {
  pub(super) async fn init_database(&mut self) -> Result<(), Box<dyn Error>> {
    let cfg = &self.config.database;

    let db = PgPoolOptions::new()
      .max_connections(cfg.max_open_conns)
      .min_connections(cfg.max_idle_conns)
      .max_lifetime(Duration::from_millis(cfg.conn_max_lifetime_ms))
      .idle_timeout(Duration::from_millis(cfg.conn_max_idle_time_ms))
      .connect(&cfg.url)
      .await
      .map_err(|err| {
        AppError::internal(
          "storefront.server.init_database",
          "failed to connect to database",
          Some(Box::new(err)),
        )
      })?;

    self.db = Some(Arc::new(db));

    Ok(())
  }
}
