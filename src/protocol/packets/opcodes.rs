//! Packet ids of the simplified framing. They follow the legacy protocol's
//! numbering and do not match any current game release.

// --- Connection ---
/// Both ways: liveness check, echoed back by the client.
pub const KEEP_ALIVE: u8 = 0x00;
/// Server -> Client: the player has joined the world.
pub const LOGIN: u8 = 0x01;
/// Client -> Server: first packet after the TCP connect.
pub const HANDSHAKE: u8 = 0x02;
/// Server -> Client: the server is closing the session.
pub const KICK: u8 = 0xFF;

// --- Chat ---
pub const CHAT: u8 = 0x03;

// --- Movement ---
pub const POSITION_LOOK: u8 = 0x0D;

/// Get a human-readable name for a packet id.
pub fn packet_name(id: u8) -> &'static str {
    match id {
        KEEP_ALIVE => "KEEP_ALIVE",
        LOGIN => "LOGIN",
        HANDSHAKE => "HANDSHAKE",
        CHAT => "CHAT",
        POSITION_LOOK => "POSITION_LOOK",
        KICK => "KICK",
        _ => "UNKNOWN",
    }
}
