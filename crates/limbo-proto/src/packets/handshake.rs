//! Handshake / Intention (0x00) — Client → Server.

use bytes::Buf;

use crate::codec::{self, ProtoDecode};
use crate::error::ProtoError;
use crate::types::VarInt;

/// Longest host string accepted; forwarded records pack several fields into it.
pub const MAX_HOST: usize = 32767;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    Status,
    Login,
    /// 1.20.5+ transfer intent, handled like login.
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub protocol_version: i32,
    /// Host as typed by the player, or a NUL-separated forwarding record.
    pub server_address: String,
    pub server_port: u16,
    pub next_state: NextState,
}

impl ProtoDecode for Handshake {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let protocol_version = VarInt::proto_decode(buf)?.0;
        let server_address = codec::read_string_max(buf, MAX_HOST)?;
        let server_port = codec::read_u16(buf)?;
        let next_state = match VarInt::proto_decode(buf)?.0 {
            1 => NextState::Status,
            2 => NextState::Login,
            3 => NextState::Transfer,
            other => return Err(ProtoError::UnknownNextState(other)),
        };
        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }
}
