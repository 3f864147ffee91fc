//! Game server TCP connection and codec.
//!
//! This is a simplified framing, not the wire format of any released game
//! version: modern VarInt length prefixes carry single-byte packet ids from
//! the legacy protocol. It speaks to servers or proxies using the same
//! framing.

use bytes::{Buf, BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, Framed};

use crate::common::error::ProtocolError;
use crate::protocol::packets::{peek_varint, write_varint, Packet};

/// Largest frame accepted from the server.
pub const MAX_FRAME_SIZE: usize = 2 * 1024 * 1024;

/// Codec for game server packets.
///
/// Every frame is a VarInt length followed by that many bytes: one id byte
/// and the packet payload.
#[derive(Debug, Default)]
pub struct GamePacketCodec;

impl GamePacketCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for GamePacketCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some((frame_len, prefix_len)) = peek_varint(src)? else {
            return Ok(None);
        };
        let frame_len = frame_len as usize;

        if frame_len == 0 {
            return Err(ProtocolError::PacketTooShort { needed: 1, got: 0 });
        }
        if frame_len > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: frame_len,
                max: MAX_FRAME_SIZE,
            });
        }

        if src.len() < prefix_len + frame_len {
            src.reserve(prefix_len + frame_len - src.len());
            return Ok(None);
        }

        src.advance(prefix_len);
        let id = src.get_u8();
        let payload = src.split_to(frame_len - 1).freeze();

        Ok(Some(Packet { id, payload }))
    }
}

impl Encoder<Packet> for GamePacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let frame_len = item.payload.len() + 1;

        dst.reserve(5 + frame_len);
        write_varint(dst, frame_len as u32);
        dst.put_u8(item.id);
        dst.put_slice(&item.payload);

        Ok(())
    }
}

/// A framed game server connection.
pub type GameConnection<S> = Framed<S, GamePacketCodec>;

/// Create a new game connection from a stream.
pub fn new_game_connection<S: AsyncRead + AsyncWrite>(stream: S) -> GameConnection<S> {
    Framed::new(stream, GamePacketCodec::new())
}
