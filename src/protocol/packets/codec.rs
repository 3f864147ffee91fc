//! Packet encoding and decoding traits.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::common::error::{ProtocolError, ProtocolResult};

/// Longest VarInt encoding in bytes.
pub const MAX_VARINT_LEN: usize = 5;

/// Longest string accepted from the server, in bytes.
pub const MAX_STRING_LEN: usize = 262_144;

/// A game protocol packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: u8,
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet with the given id and payload.
    pub fn new(id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }
}

/// Trait for types that can be encoded into packet payload.
pub trait PacketEncode {
    fn encode(&self, buf: &mut BytesMut);
}

/// Trait for types that can be decoded from packet payload.
pub trait PacketDecode: Sized {
    fn decode(buf: &mut Bytes) -> ProtocolResult<Self>;
}

/// Read a VarInt from the start of `src` without consuming it.
///
/// Returns `None` if `src` ends before the VarInt does.
pub fn peek_varint(src: &[u8]) -> ProtocolResult<Option<(u32, usize)>> {
    let mut value: u32 = 0;
    for (i, byte) in src.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(ProtocolError::VarIntTooLong);
        }
        value |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }
    if src.len() >= MAX_VARINT_LEN {
        return Err(ProtocolError::VarIntTooLong);
    }
    Ok(None)
}

pub fn read_varint(buf: &mut Bytes) -> ProtocolResult<u32> {
    match peek_varint(buf)? {
        Some((value, len)) => {
            buf.advance(len);
            Ok(value)
        }
        None => Err(ProtocolError::PacketTooShort {
            needed: buf.len() + 1,
            got: buf.len(),
        }),
    }
}

pub fn write_varint(buf: &mut BytesMut, mut value: u32) {
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
}

/// Read a VarInt-prefixed UTF-8 string.
pub fn read_string(buf: &mut Bytes) -> ProtocolResult<String> {
    let len = read_varint(buf)? as usize;
    if len > MAX_STRING_LEN {
        return Err(ProtocolError::InvalidString {
            message: format!("string of {} bytes exceeds {} byte limit", len, MAX_STRING_LEN),
        });
    }
    ensure_remaining(buf, len)?;
    let raw = buf.split_to(len);
    String::from_utf8(raw.to_vec()).map_err(|e| ProtocolError::InvalidString {
        message: e.to_string(),
    })
}

pub fn write_string(buf: &mut BytesMut, value: &str) {
    write_varint(buf, value.len() as u32);
    buf.put_slice(value.as_bytes());
}

/// Fail with `PacketTooShort` unless `buf` holds at least `needed` bytes.
pub fn ensure_remaining(buf: &Bytes, needed: usize) -> ProtocolResult<()> {
    if buf.remaining() < needed {
        return Err(ProtocolError::PacketTooShort {
            needed,
            got: buf.remaining(),
        });
    }
    Ok(())
}
