//! Session transport.
//!
//! A transport connection is a pair of channels: typed events flowing from
//! the server and outbound packets flowing to it. The TCP implementation runs
//! the framed connection in its own task and translates packets to events.
//!
//! `TcpConnector` uses the simplified framing of `protocol::game::connector`,
//! not the full game protocol.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::common::error::ConnectionError;
use crate::common::types::{Credentials, Position, ServerIdentity};
use crate::protocol::game::packets::{Chat, Handshake, KeepAlive, Kick, Login, PositionLook};
use crate::protocol::game::{new_game_connection, GameConnection};
use crate::protocol::packets::opcodes::*;
use crate::protocol::packets::{packet_name, Packet, PacketDecode};

/// Events delivered by a transport connection, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The player joined the server; the session is usable.
    Connected,
    /// A transport-level failure. A `Closed` event follows if the
    /// connection cannot continue.
    Error(String),
    /// The connection is gone. Sent at most once, always last.
    Closed(String),
    /// Raw JSON chat component received.
    Chat(String),
    /// Position and orientation set by the server.
    Position(Position),
}

/// Packets the session writes to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Chat(String),
    Position(Position),
}

impl From<Outbound> for Packet {
    fn from(outbound: Outbound) -> Self {
        match outbound {
            Outbound::Chat(message) => Chat { message }.into(),
            Outbound::Position(position) => PositionLook(position).into(),
        }
    }
}

/// One transport connection owned by a single session.
///
/// Dropping the connection closes the underlying transport.
#[derive(Debug)]
pub struct Connection {
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub outbound: mpsc::UnboundedSender<Outbound>,
}

/// Opens transport connections.
pub trait Connector: Send + Sync {
    /// Start connecting. Progress and failures arrive as events.
    fn connect(&self, identity: &ServerIdentity, credentials: &Credentials) -> Connection;
}

/// Connector speaking the simplified TCP framing.
#[derive(Debug, Default, Clone)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, identity: &ServerIdentity, credentials: &Credentials) -> Connection {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        let identity = identity.clone();
        let credentials = credentials.clone();
        tokio::spawn(async move {
            let result = async {
                info!("Connecting to game server at {}", identity);
                let stream = TcpStream::connect((identity.host.as_str(), identity.port))
                    .await
                    .map_err(|e| ConnectionError::ConnectFailed {
                        host: identity.host.clone(),
                        port: identity.port,
                        source: e,
                    })?;
                run_connection(stream, &identity, &credentials, &event_tx, outbound_rx).await
            }
            .await;

            finish(&event_tx, result);
        });

        Connection { events, outbound }
    }
}

/// Report the end of a connection as `Error` (if any) followed by `Closed`.
fn finish(event_tx: &mpsc::UnboundedSender<TransportEvent>, result: Result<String, ConnectionError>) {
    let reason = match result {
        Ok(reason) => reason,
        Err(e) => {
            let reason = e.to_string();
            let _ = event_tx.send(TransportEvent::Error(reason.clone()));
            reason
        }
    };
    // The session may already be gone.
    let _ = event_tx.send(TransportEvent::Closed(reason));
}

/// Drive one connection until the server or the session ends it.
///
/// Returns the reason the connection ended.
pub async fn run_connection<S>(
    stream: S,
    identity: &ServerIdentity,
    credentials: &Credentials,
    event_tx: &mpsc::UnboundedSender<TransportEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
) -> Result<String, ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut connection = new_game_connection(stream);

    if credentials.password.is_some() {
        debug!("Password configured; the offline handshake does not send it");
    }

    let handshake = Handshake {
        username: credentials.username.clone(),
        host: identity.host.clone(),
        port: identity.port,
    };
    connection.send(handshake.into()).await?;
    debug!("Sent handshake as {}", credentials.username);

    loop {
        tokio::select! {
            packet = connection.next() => {
                match packet {
                    Some(Ok(packet)) => {
                        if let Some(reason) = handle_packet(&mut connection, event_tx, packet).await? {
                            return Ok(reason);
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(ConnectionError::ConnectionClosed),
                }
            }

            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(outbound) => connection.send(outbound.into()).await?,
                    // Session dropped its connection handle.
                    None => return Ok("session closed".to_string()),
                }
            }
        }
    }
}

/// Handle one inbound packet. Returns a reason if the server ended the session.
async fn handle_packet<S>(
    connection: &mut GameConnection<S>,
    event_tx: &mpsc::UnboundedSender<TransportEvent>,
    packet: Packet,
) -> Result<Option<String>, ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut payload: Bytes = packet.payload;

    let event = match packet.id {
        KEEP_ALIVE => {
            let keep_alive = KeepAlive::decode(&mut payload)?;
            connection.send(keep_alive.into()).await?;
            None
        }
        LOGIN => {
            let login = Login::decode(&mut payload)?;
            debug!("Joined as entity {}", login.entity_id);
            Some(TransportEvent::Connected)
        }
        CHAT => match Chat::decode(&mut payload) {
            Ok(chat) => Some(TransportEvent::Chat(chat.message)),
            Err(e) => {
                warn!("Skipping undecodable chat packet: {}", e);
                None
            }
        },
        POSITION_LOOK => match PositionLook::decode(&mut payload) {
            Ok(PositionLook(position)) => Some(TransportEvent::Position(position)),
            Err(e) => {
                warn!("Skipping undecodable position packet: {}", e);
                None
            }
        },
        KICK => {
            let reason = Kick::decode(&mut payload)
                .map(|kick| kick.reason)
                .unwrap_or_else(|_| "kicked".to_string());
            info!("Kicked by server: {}", reason);
            return Ok(Some(reason));
        }
        id => {
            debug!("Ignoring packet {:#04x} ({})", id, packet_name(id));
            None
        }
    };

    if let Some(event) = event {
        if event_tx.send(event).is_err() {
            return Ok(Some("session closed".to_string()));
        }
    }
    Ok(None)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::write_string;
    use bytes::{BufMut, BytesMut};
    use tokio::net::TcpListener;

    fn frame(id: u8, payload: &[u8]) -> Packet {
        Packet::new(id, Bytes::copy_from_slice(payload))
    }

    fn string_payload(value: &str) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_string(&mut buf, value);
        buf.to_vec()
    }

    #[tokio::test]
    async fn test_tcp_session_flow() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut server = new_game_connection(stream);

            let handshake = server.next().await.unwrap().unwrap();
            assert_eq!(handshake.id, HANDSHAKE);
            let mut payload = handshake.payload.clone();
            assert_eq!(
                crate::protocol::packets::read_string(&mut payload).unwrap(),
                "relaybot"
            );

            server.send(frame(LOGIN, &[0, 0, 0, 7])).await.unwrap();
            server.send(frame(KEEP_ALIVE, &[0, 0, 0x30, 0x39])).await.unwrap();
            let echo = server.next().await.unwrap().unwrap();
            assert_eq!(echo, frame(KEEP_ALIVE, &[0, 0, 0x30, 0x39]));

            server
                .send(frame(CHAT, &string_payload(r#"{"text":"hi"}"#)))
                .await
                .unwrap();

            let mut position = BytesMut::new();
            for v in [1.0f64, 2.0, 3.0] {
                position.put_f64(v);
            }
            position.put_f32(45.0);
            position.put_f32(0.0);
            position.put_u8(1);
            server.send(frame(POSITION_LOOK, &position)).await.unwrap();

            let chat = server.next().await.unwrap().unwrap();
            assert_eq!(chat, Packet::from(Outbound::Chat("hello".to_string())));

            server.send(frame(KICK, &string_payload("Server closed"))).await.unwrap();
        });

        let identity = ServerIdentity::new("127.0.0.1", addr.port(), None);
        let credentials = Credentials::new("relaybot", None);
        let mut connection = TcpConnector.connect(&identity, &credentials);

        assert_eq!(connection.events.recv().await, Some(TransportEvent::Connected));
        assert_eq!(
            connection.events.recv().await,
            Some(TransportEvent::Chat(r#"{"text":"hi"}"#.to_string()))
        );
        assert_eq!(
            connection.events.recv().await,
            Some(TransportEvent::Position(Position {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                yaw: 45.0,
                pitch: 0.0,
                on_ground: true,
            }))
        );

        connection
            .outbound
            .send(Outbound::Chat("hello".to_string()))
            .unwrap();

        assert_eq!(
            connection.events.recv().await,
            Some(TransportEvent::Closed("Server closed".to_string()))
        );
        assert_eq!(connection.events.recv().await, None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_reports_error_then_closed() {
        // Bind and drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let identity = ServerIdentity::new("127.0.0.1", port, None);
        let mut connection = TcpConnector.connect(&identity, &Credentials::new("bot", None));

        assert!(matches!(
            connection.events.recv().await,
            Some(TransportEvent::Error(_))
        ));
        assert!(matches!(
            connection.events.recv().await,
            Some(TransportEvent::Closed(_))
        ));
        assert_eq!(connection.events.recv().await, None);
    }

    #[tokio::test]
    async fn test_server_eof_closes_with_error() {
        let (client_stream, server_stream) = tokio::io::duplex(1024);
        let (event_tx, mut events) = mpsc::unbounded_channel();
        let (_outbound, outbound_rx) = mpsc::unbounded_channel();
        drop(server_stream);

        let identity = ServerIdentity::new("localhost", 25565, None);
        let result = run_connection(
            client_stream,
            &identity,
            &Credentials::new("bot", None),
            &event_tx,
            outbound_rx,
        )
        .await;
        assert!(result.is_err());

        finish(&event_tx, result);
        assert!(matches!(events.recv().await, Some(TransportEvent::Error(_))));
        assert!(matches!(events.recv().await, Some(TransportEvent::Closed(_))));
    }
}
