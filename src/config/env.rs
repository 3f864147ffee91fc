//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `MCRELAY_USER` - game account username
//! - `MCRELAY_PASSWORD` - game account password
//! - `MCRELAY_LANG_FILE` - localization file path
//! - `MCRELAY_REDIS_HOST` - Redis host
//! - `MCRELAY_REDIS_PORT` - Redis port

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "MCRELAY";

/// Apply environment variable overrides to a config.
///
/// This allows the account password to be provided via the environment
/// instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(user) = env::var(format!("{}_USER", ENV_PREFIX)) {
        config.mc_user = user;
    }
    if let Ok(password) = env::var(format!("{}_PASSWORD", ENV_PREFIX)) {
        config.mc_password = Some(password);
    }
    if let Ok(lang_file) = env::var(format!("{}_LANG_FILE", ENV_PREFIX)) {
        config.lang_file = Some(lang_file);
    }

    if let Ok(host) = env::var(format!("{}_REDIS_HOST", ENV_PREFIX)) {
        config.redis.host = host;
    }
    if let Ok(port) = env::var(format!("{}_REDIS_PORT", ENV_PREFIX)) {
        if let Ok(port) = port.parse() {
            config.redis.port = port;
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `MCRELAY_CONFIG` environment variable, otherwise returns "mcrelay.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "mcrelay.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;
    use std::collections::BTreeMap;

    fn make_test_config() -> Config {
        Config {
            mc_user: "relaybot".to_string(),
            mc_password: None,
            lang_file: None,
            redis: RedisConfig::default(),
            minecraft: BTreeMap::new(),
            filters: None,
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "MCRELAY");
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("MCRELAY_CONFIG");
        assert_eq!(get_config_path(), "mcrelay.conf");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("MCRELAY_USER");
        env::remove_var("MCRELAY_REDIS_HOST");

        let result = apply_env_overrides(make_test_config());

        assert_eq!(result.mc_user, "relaybot");
        assert_eq!(result.redis.host, "127.0.0.1");
    }
}
