//! Configuration parsing and types.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use tracing::warn;

pub use parser::load_config;
pub use types::*;

use crate::common::error::ConfigError;

/// Load a config file, apply environment overrides and validate the result.
pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(load_config(path)?);

    if config.mc_password.as_deref() == Some("") {
        warn!("mc_password is set but empty; connecting without a password");
    }

    validate::validate_config(&config)?;
    Ok(config)
}
