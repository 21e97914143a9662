use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
  pub service: ServiceConfig,
  pub database: DatabaseConfig,
  pub gateway: GatewayConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceConfig {
  pub env: String,
  pub http_host: String,
  pub http_port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
  pub url: String,
  pub max_open_conns: u32,
  pub max_idle_conns: u32,
  pub conn_max_lifetime_ms: u64,
  pub conn_max_idle_time_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GatewayConfig {
  pub key_id: String,
  pub key_secret: String,
  pub base_url: Option<String>,
  pub timeout_secs: u64,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      service: ServiceConfig {
        env: "".to_string(),
        http_host: "".to_string(),
        http_port: 0,
      },
      database: DatabaseConfig {
        url: "".to_string(),
        max_open_conns: 10,
        max_idle_conns: 2,
        conn_max_lifetime_ms: 1_800_000,
        conn_max_idle_time_ms: 300_000,
      },
      gateway: GatewayConfig {
        key_id: "".to_string(),
        key_secret: "".to_string(),
        base_url: None,
        timeout_secs: 10,
      },
    }
  }
}
