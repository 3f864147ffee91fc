//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use fancy_regex::Regex;

use crate::common::error::ConfigError;
use crate::config::types::{ColorMode, Config};

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.mc_user.trim().is_empty() {
        errors.push("mc_user is required".to_string());
    }

    if config.redis.host.is_empty() {
        errors.push("redis.host must not be empty".to_string());
    }
    if config.redis.port == 0 {
        errors.push("redis.port must be non-zero".to_string());
    }

    if config.minecraft.is_empty() {
        errors.push("minecraft is empty - no servers configured".to_string());
    }

    for (key, server) in &config.minecraft {
        if server.host.is_empty() {
            errors.push(format!("minecraft.{}.host is required", key));
        }
        if server.port == Some(0) {
            errors.push(format!("minecraft.{}.port must be non-zero", key));
        }
        if matches!(&server.name, Some(name) if name.is_empty()) {
            errors.push(format!("minecraft.{}.name must not be empty", key));
        }
        if let Some(ref colors) = server.colors {
            if ColorMode::parse(colors).is_none() {
                errors.push(format!(
                    "minecraft.{}.colors '{}' is invalid (use: raw, strip, irc)",
                    key, colors
                ));
            }
        }
    }

    // Validate filter patterns (try to compile them)
    if let Some(ref filters) = config.filters {
        if let Some(ref pattern) = filters.relay_echo_pattern {
            if Regex::new(pattern).is_err() {
                errors.push(format!(
                    "filters.relay_echo_pattern is not a valid regex: '{}'",
                    pattern
                ));
            }
        }
        if let Some(ref patterns) = filters.patterns {
            for (i, pattern) in patterns.iter().enumerate() {
                if Regex::new(pattern).is_err() {
                    errors.push(format!(
                        "filters.patterns[{}] is not a valid regex: '{}'",
                        i, pattern
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
