use std::{io, path::Path};

use thiserror::Error;
use tokio::fs::read_to_string;

use crate::driver_config::DriverConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Read(#[from] io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub async fn get_config(config_path: impl AsRef<Path>) -> Result<DriverConfig, ConfigError> {
    let config = read_to_string(config_path).await?;
    let config = serde_json::from_str::<DriverConfig>(&config)?;
    Ok(config)
}
