//! Game server packet definitions.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::common::error::ProtocolResult;
use crate::common::types::Position;
use crate::protocol::packets::opcodes::*;
use crate::protocol::packets::{
    ensure_remaining, read_string, write_string, Packet, PacketDecode, PacketEncode,
};

/// Implements `From<T> for Packet` by encoding `T` under `id`.
macro_rules! impl_into_packet {
    ($ty:ty, $id:expr) => {
        impl From<$ty> for Packet {
            fn from(value: $ty) -> Self {
                let mut buf = BytesMut::new();
                value.encode(&mut buf);
                Packet::new($id, buf.freeze())
            }
        }
    };
}

/// HANDSHAKE packet, sent by the client right after connecting.
#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub username: String,
    pub host: String,
    pub port: u16,
}

impl PacketEncode for Handshake {
    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.username);
        write_string(buf, &self.host);
        buf.put_i32(self.port as i32);
    }
}

impl_into_packet!(Handshake, HANDSHAKE);

/// LOGIN packet: the server accepted the player into the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Login {
    pub entity_id: i32,
}

impl PacketDecode for Login {
    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        ensure_remaining(buf, 4)?;
        Ok(Login {
            entity_id: buf.get_i32(),
        })
    }
}

/// KEEP_ALIVE packet. The client answers with the same id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeepAlive {
    pub id: i32,
}

impl PacketDecode for KeepAlive {
    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        ensure_remaining(buf, 4)?;
        Ok(KeepAlive { id: buf.get_i32() })
    }
}

impl PacketEncode for KeepAlive {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.id);
    }
}

impl_into_packet!(KeepAlive, KEEP_ALIVE);

/// CHAT packet. Inbound messages carry a JSON chat component, outbound
/// messages are plain text as typed by a player.
#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub message: String,
}

impl PacketDecode for Chat {
    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        Ok(Chat {
            message: read_string(buf)?,
        })
    }
}

impl PacketEncode for Chat {
    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.message);
    }
}

impl_into_packet!(Chat, CHAT);

/// POSITION_LOOK packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionLook(pub Position);

impl PositionLook {
    const SIZE: usize = 8 * 3 + 4 * 2 + 1;
}

impl PacketDecode for PositionLook {
    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        ensure_remaining(buf, Self::SIZE)?;
        Ok(PositionLook(Position {
            x: buf.get_f64(),
            y: buf.get_f64(),
            z: buf.get_f64(),
            yaw: buf.get_f32(),
            pitch: buf.get_f32(),
            on_ground: buf.get_u8() != 0,
        }))
    }
}

impl PacketEncode for PositionLook {
    fn encode(&self, buf: &mut BytesMut) {
        let p = &self.0;
        buf.put_f64(p.x);
        buf.put_f64(p.y);
        buf.put_f64(p.z);
        buf.put_f32(p.yaw);
        buf.put_f32(p.pitch);
        buf.put_u8(p.on_ground as u8);
    }
}

impl_into_packet!(PositionLook, POSITION_LOOK);

/// KICK packet: the server ends the session with a reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Kick {
    pub reason: String,
}

impl PacketDecode for Kick {
    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        Ok(Kick {
            reason: read_string(buf)?,
        })
    }
}
