//! Game server protocol: packet framing, packet types and the session transport.

pub mod game;
pub mod packets;
pub mod transport;

pub use transport::TcpConnector;
