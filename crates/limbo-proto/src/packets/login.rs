//! Login-state packets.

use bytes::{Buf, BufMut, Bytes};

use crate::chat::Component;
use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

/// Player names are at most 16 characters.
pub const MAX_NAME: usize = 16;

/// LoginStart (0x00) — Client → Server.
///
/// Later versions append a signature or uuid; only the name is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub name: String,
}

impl ProtoDecode for LoginStart {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let name = codec::read_string_max(buf, MAX_NAME)?;
        buf.advance(buf.remaining());
        Ok(Self { name })
    }
}

/// LoginPluginRequest (0x04) — Server → Client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPluginRequest {
    pub message_id: i32,
    pub channel: String,
    pub data: Bytes,
}

impl ProtoEncode for LoginPluginRequest {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.message_id).proto_encode(buf);
        codec::write_string(buf, &self.channel);
        buf.put_slice(&self.data);
    }
}

/// LoginPluginResponse (0x02) — Client → Server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPluginResponse {
    pub message_id: i32,
    /// `None` when the client did not understand the channel.
    pub data: Option<Bytes>,
}

impl ProtoDecode for LoginPluginResponse {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let message_id = VarInt::proto_decode(buf)?.0;
        let successful = codec::read_bool(buf)?;
        let data = successful.then(|| codec::read_remaining(buf));
        Ok(Self { message_id, data })
    }
}

/// SetCompression (0x03) — Server → Client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompression {
    pub threshold: i32,
}

impl ProtoEncode for SetCompression {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.threshold).proto_encode(buf);
    }
}

/// LoginDisconnect (0x00) — Server → Client. Always a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginDisconnect {
    pub reason: Component,
}

impl LoginDisconnect {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            reason: Component::text(message),
        }
    }
}

impl ProtoEncode for LoginDisconnect {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.reason.to_json());
    }
}
