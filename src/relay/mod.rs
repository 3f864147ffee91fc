//! Relay of accepted chat to the publish/subscribe bus.

pub mod publisher;
pub mod redis;

pub use publisher::Relay;
pub use redis::RedisPublisher;
