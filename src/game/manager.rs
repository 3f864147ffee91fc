//! Reconnect loop around game sessions.

use std::time::Duration;

use backon::BackoffBuilder;
use tokio::sync::watch;
use tracing::info;

use crate::common::error::ConfigError;
use crate::common::types::{Credentials, ServerIdentity};
use crate::game::session::{Session, SessionContext, SessionOutcome};
use crate::protocol::transport::Connector;

/// Delay between a disconnect and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Fixed delay, unlimited retries.
fn reconnect_backoff(delay: Duration) -> impl Iterator<Item = Duration> {
    backon::ConstantBuilder::default()
        .with_delay(delay)
        .without_max_times()
        .build()
}

/// Keeps one session alive for the configured server, reconnecting after
/// every disconnect until shutdown.
pub struct SessionManager<C> {
    connector: C,
    identity: ServerIdentity,
    credentials: Credentials,
    context: SessionContext,
    reconnect_delay: Duration,
}

impl<C: Connector> SessionManager<C> {
    pub fn new(
        connector: C,
        identity: ServerIdentity,
        credentials: Credentials,
        context: SessionContext,
    ) -> Result<Self, ConfigError> {
        if identity.host.trim().is_empty() || identity.port == 0 {
            return Err(ConfigError::ValidationError {
                message: format!("invalid server identity '{}'", identity),
            });
        }
        if credentials.username.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "username is required".to_string(),
            });
        }

        Ok(Self {
            connector,
            identity,
            credentials,
            context,
            reconnect_delay: RECONNECT_DELAY,
        })
    }

    /// Run sessions until shutdown is signalled.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut backoff = reconnect_backoff(self.reconnect_delay);

        loop {
            if *shutdown_rx.borrow() {
                info!("Shutdown signal detected, stopping reconnection loop");
                break;
            }

            info!("Connecting to {} as {}...", self.identity, self.credentials.username);
            let connection = self.connector.connect(&self.identity, &self.credentials);
            let session = Session::new(connection, self.context.clone());

            match session.run(&mut shutdown_rx).await {
                SessionOutcome::Shutdown => break,
                SessionOutcome::Disconnected(reason) => {
                    info!("Session with {} ended: {}", self.identity, reason);
                }
            }

            let delay = backoff.next().unwrap_or(self.reconnect_delay);
            info!("Reconnecting in {:.1} seconds...", delay.as_secs_f64());

            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("Shutdown signal received during reconnect delay");
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::chat::{ChatPipeline, LocalizationCatalog, MessageNormalizer, NoiseFilter};
    use crate::common::types::Position;
    use crate::config::types::ColorMode;
    use crate::game::session::SessionSettings;
    use crate::protocol::transport::testing::MockConnector;
    use crate::protocol::transport::{Outbound, TransportEvent};
    use crate::relay::publisher::testing::RecordingPublisher;
    use crate::relay::Relay;

    fn make_context(recorder: Arc<RecordingPublisher>) -> SessionContext {
        SessionContext {
            settings: Arc::new(SessionSettings {
                greeting: vec!["/login pw".to_string()],
                ..SessionSettings::default()
            }),
            pipeline: Arc::new(ChatPipeline::new(
                MessageNormalizer::new(Arc::new(LocalizationCatalog::default())),
                NoiseFilter::new(),
                ColorMode::Raw,
            )),
            relay: Relay::new("mcrelay:lobby", recorder),
        }
    }

    fn make_manager() -> (
        SessionManager<MockConnector>,
        tokio::sync::mpsc::UnboundedReceiver<crate::protocol::transport::testing::MockAttempt>,
    ) {
        let (connector, attempts) = MockConnector::new();
        let manager = SessionManager::new(
            connector,
            ServerIdentity::new("lobby.example.org", 25565, None),
            Credentials::new("relaybot", None),
            make_context(Arc::new(RecordingPublisher::default())),
        )
        .unwrap();
        (manager, attempts)
    }

    #[test]
    fn test_rejects_empty_identity() {
        let (connector, _attempts) = MockConnector::new();
        let result = SessionManager::new(
            connector,
            ServerIdentity::new("", 25565, None),
            Credentials::new("relaybot", None),
            make_context(Arc::new(RecordingPublisher::default())),
        );
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_rejects_missing_username() {
        let (connector, _attempts) = MockConnector::new();
        let result = SessionManager::new(
            connector,
            ServerIdentity::new("lobby.example.org", 25565, None),
            Credentials::new("", None),
            make_context(Arc::new(RecordingPublisher::default())),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_backoff_is_constant() {
        let delays: Vec<Duration> = reconnect_backoff(RECONNECT_DELAY).take(50).collect();
        assert_eq!(delays.len(), 50);
        assert!(delays.iter().all(|d| *d == RECONNECT_DELAY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnects_once_after_end() {
        let (manager, mut attempts) = make_manager();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { manager.run(shutdown_rx).await });

        let mut first = attempts.recv().await.unwrap();
        first.events.send(TransportEvent::Connected).unwrap();
        first
            .events
            .send(TransportEvent::Position(Position::default()))
            .unwrap();
        first.events.send(TransportEvent::Closed("end".to_string())).unwrap();

        let mut second = attempts.recv().await.unwrap();
        assert_eq!(second.at - first.at, RECONNECT_DELAY);
        assert_eq!(
            first.written(),
            vec![
                Outbound::Chat("/login pw".to_string()),
                Outbound::Position(Position::default()),
            ]
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(attempts.try_recv().is_err());

        // Fresh session: the greeting is sent again.
        second.events.send(TransportEvent::Connected).unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(second.written(), vec![Outbound::Chat("/login pw".to_string())]);

        // Fresh session: keep-alive starts again on the first position.
        let spawn = Position {
            yaw: 30.0,
            ..Position::default()
        };
        second.events.send(TransportEvent::Position(spawn)).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(
            second.written(),
            vec![
                Outbound::Position(spawn),
                Outbound::Position(Position {
                    yaw: 45.0,
                    ..Position::default()
                }),
            ]
        );

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempts_retry_every_delay() {
        let (manager, mut attempts) = make_manager();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { manager.run(shutdown_rx).await });

        let mut previous = None;
        for _ in 0..4 {
            let attempt = attempts.recv().await.unwrap();
            if let Some(at) = previous {
                assert_eq!(attempt.at - at, RECONNECT_DELAY);
            }
            previous = Some(attempt.at);
            attempt
                .events
                .send(TransportEvent::Error("refused".to_string()))
                .unwrap();
            attempt
                .events
                .send(TransportEvent::Closed("refused".to_string()))
                .unwrap();
        }

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_reconnect_delay() {
        let (manager, mut attempts) = make_manager();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { manager.run(shutdown_rx).await });

        let first = attempts.recv().await.unwrap();
        first.events.send(TransportEvent::Closed("end".to_string())).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        assert!(attempts.try_recv().is_err());
        assert_eq!(tokio::time::Instant::now() - first.at, Duration::from_secs(1));
    }
}
