//! Serverbound play packets whose bodies are stable across versions.
//!
//! Only the fields the waiting server reads are decoded; trailing fields
//! are skipped.

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Chat messages are capped at 256 characters by every client.
pub const MAX_CHAT: usize = 256;

/// Player position / position + rotation — Client → Server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlayer {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ProtoDecode for MovePlayer {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let x = codec::read_f64(buf)?;
        let y = codec::read_f64(buf)?;
        let z = codec::read_f64(buf)?;
        buf.advance(buf.remaining());
        Ok(Self { x, y, z })
    }
}

/// Chat message — Client → Server. Before 1.19 commands arrive here with a
/// leading slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub message: String,
}

impl ProtoDecode for ChatMessage {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let message = codec::read_string_max(buf, MAX_CHAT)?;
        buf.advance(buf.remaining());
        Ok(Self { message })
    }
}

/// Chat command (1.19+) — Client → Server. The command has no slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommand {
    pub command: String,
}

impl ProtoDecode for ChatCommand {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let command = codec::read_string_max(buf, MAX_CHAT)?;
        buf.advance(buf.remaining());
        Ok(Self { command })
    }
}

/// Plugin message, both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPayload {
    pub channel: String,
    pub data: Bytes,
}

impl ProtoDecode for CustomPayload {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let channel = codec::read_string(buf)?;
        let data = codec::read_remaining(buf);
        Ok(Self { channel, data })
    }
}

impl ProtoEncode for CustomPayload {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.channel);
        buf.put_slice(&self.data);
    }
}
