//! Redis PUBLISH sink.
//!
//! A background task owns the Redis connection and publishes queued
//! messages. Messages that cannot be published are dropped; the connection
//! is re-established on the next message.

use std::time::Duration;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::relay::publisher::Publisher;

/// Limit for connecting and for each reply.
const REDIS_TIMEOUT: Duration = Duration::from_secs(5);

/// A queued `PUBLISH channel message` command.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PublishCommand {
    channel: String,
    message: String,
}

/// Fire-and-forget Redis publisher.
#[derive(Debug, Clone)]
pub struct RedisPublisher {
    queue: mpsc::UnboundedSender<PublishCommand>,
}

impl RedisPublisher {
    /// Start the writer task for the Redis server at `host:port`.
    ///
    /// No connection is made until the first message. The task ends once
    /// every publisher handle is dropped and the queue is drained.
    pub fn spawn(host: impl Into<String>, port: u16) -> RedisResult<(Self, JoinHandle<()>)> {
        let host = host.into();
        info!("Publishing relayed chat to Redis at {}:{}", host, port);

        let client = Client::open(ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo::default(),
        })?;

        let (queue, queue_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(client, queue_rx));
        Ok((Self { queue }, handle))
    }
}

impl Publisher for RedisPublisher {
    fn publish(&self, channel: &str, message: &str) {
        let command = PublishCommand {
            channel: channel.to_string(),
            message: message.to_string(),
        };
        if let Err(e) = self.queue.send(command) {
            warn!("Redis writer stopped, dropping message: {}", e.0.message);
        }
    }
}

async fn connect(client: &Client) -> RedisResult<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(REDIS_TIMEOUT)
        .set_response_timeout(REDIS_TIMEOUT);
    client.get_connection_manager_with_config(config).await
}

async fn run_writer(client: Client, mut queue: mpsc::UnboundedReceiver<PublishCommand>) {
    let mut connection: Option<ConnectionManager> = None;

    while let Some(command) = queue.recv().await {
        if connection.is_none() {
            match connect(&client).await {
                Ok(manager) => {
                    debug!("Connected to Redis");
                    connection = Some(manager);
                }
                Err(e) => {
                    warn!("Redis unavailable, dropping message for {}: {}", command.channel, e);
                    continue;
                }
            }
        }

        if let Some(conn) = connection.as_mut() {
            let result: RedisResult<()> = conn.publish(&command.channel, &command.message).await;
            if let Err(e) = result {
                warn!("Redis publish failed, message dropped: {}", e);
                connection = None;
            }
        }
    }

    debug!("Redis writer stopped");
}
