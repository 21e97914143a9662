use std::error::Error;
use std::fs;
use std::path::Path;

use crate::models::config::Config;
use crate::models::errors::AppError;
use crate::server::main::Server;

impl Server {
  pub(super) fn init_service_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));

    let yaml_string = fs::read_to_string(path).map_err(|err| {
      AppError::internal(
        "storefront.server.init_service_config",
        "failed to load service config file",
        Some(Box::new(err)),
      )
    })?;

    let parsed_config: Config = serde_yaml::from_str(&yaml_string).map_err(|err| {
      AppError::internal(
        "storefront.server.init_service_config",
        "failed to parse config data",
        Some(Box::new(err)),
      )
    })?;

    Ok(parsed_config)
  }
}
