//! Shared types used across the application.

use std::fmt;

/// Default Minecraft server port.
pub const DEFAULT_PORT: u16 = 25565;

/// Prefix of every relay channel name.
pub const CHANNEL_PREFIX: &str = "mcrelay:";

/// The game server this process relays for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub host: String,
    pub port: u16,
    pub name: Option<String>,
}

impl ServerIdentity {
    pub fn new(host: impl Into<String>, port: u16, name: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            name,
        }
    }

    /// Display name if configured, otherwise `host:port`.
    pub fn identity_string(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}:{}", self.host, self.port),
        }
    }

    /// Pub/sub channel the relayed chat is published to.
    pub fn channel_name(&self) -> String {
        format!("{}{}", CHANNEL_PREFIX, self.identity_string())
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Account credentials handed to the transport.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Player position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}
