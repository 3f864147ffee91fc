//! Configuration type definitions.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::common::error::ConfigError;
use crate::common::types::{Credentials, ServerIdentity, DEFAULT_PORT};

/// Default localization file path.
pub const DEFAULT_LANG_FILE: &str = "en_US.lang";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mc_user: String,
    pub mc_password: Option<String>,
    pub lang_file: Option<String>,
    #[serde(default)]
    pub redis: RedisConfig,
    pub minecraft: BTreeMap<String, ServerConfig>,
    pub filters: Option<FiltersConfig>,
}

/// A single game server entry under `minecraft`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: Option<u16>,
    /// Display name used for the relay channel instead of `host:port`.
    pub name: Option<String>,
    /// Newline-separated chat lines sent once per session.
    pub autorun: Option<String>,
    /// Rotate the player in place to keep the session alive.
    pub keep_alive: Option<bool>,
    /// Color handling for published text: "raw", "strip" or "irc".
    pub colors: Option<String>,
}

/// Redis pub/sub endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
        }
    }
}

fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

/// Message filtering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    /// Replaces the built-in `[Name -> Name]` relay echo pattern.
    pub relay_echo_pattern: Option<String>,
    /// Additional patterns; matching messages are not relayed.
    pub patterns: Option<Vec<String>>,
}

/// How color escapes are treated in published text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Publish text unchanged.
    #[default]
    Raw,
    /// Remove color escapes.
    Strip,
    /// Rewrite color escapes as IRC control codes.
    Irc,
}

impl ColorMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "strip" => Some(Self::Strip),
            "irc" => Some(Self::Irc),
            _ => None,
        }
    }
}

impl Config {
    pub fn lang_file(&self) -> &str {
        self.lang_file.as_deref().unwrap_or(DEFAULT_LANG_FILE)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.mc_user.clone(),
            self.mc_password.clone().filter(|p| !p.is_empty()),
        )
    }

    /// Look up a server entry by its key under `minecraft`.
    pub fn server(&self, key: &str) -> Result<&ServerConfig, ConfigError> {
        self.minecraft
            .get(key)
            .ok_or_else(|| ConfigError::UnknownServer {
                name: key.to_string(),
                known: self
                    .minecraft
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl ServerConfig {
    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity::new(
            self.host.clone(),
            self.port.unwrap_or(DEFAULT_PORT),
            self.name.clone(),
        )
    }

    /// Greeting lines in order, without empty lines.
    pub fn greeting(&self) -> Vec<String> {
        self.autorun
            .as_deref()
            .map(|script| {
                script
                    .split('\n')
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn keep_alive_enabled(&self) -> bool {
        self.keep_alive.unwrap_or(true)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.colors
            .as_deref()
            .and_then(ColorMode::parse)
            .unwrap_or_default()
    }
}
