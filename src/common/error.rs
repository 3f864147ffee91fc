//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Unknown server '{name}' (configured: {known})")]
    UnknownServer { name: String, known: String },
}

/// Localization catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read localization file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Per-message normalization failures. The affected message is dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Malformed chat payload: {message}")]
    MalformedPayload { message: String },

    #[error("Unknown translation key: {key}")]
    UnknownTranslationKey { key: String },

    #[error("Placeholder %{index}$s in '{key}' is out of range ({count} arguments)")]
    ArgumentIndexOutOfRange {
        key: String,
        index: usize,
        count: usize,
    },
}

/// Protocol-related errors (framing and packet decoding).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Packet too short: need {needed} bytes, got {got}")]
    PacketTooShort { needed: usize, got: usize },

    #[error("VarInt is too long")]
    VarIntTooLong,

    #[error("Frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Invalid string encoding: {message}")]
    InvalidString { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
