//! Packets whose layout and ids are the same in every supported version.
//!
//! Play-state packet ids vary per version; the adapters carry those tables.

pub mod handshake;
pub mod login;
pub mod play;
pub mod status;

pub use handshake::{Handshake, NextState};
pub use login::{
    LoginDisconnect, LoginPluginRequest, LoginPluginResponse, LoginStart, SetCompression,
};
pub use play::{ChatCommand, ChatMessage, CustomPayload, MovePlayer};
pub use status::{PingRequest, PongResponse, StatusResponse};

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::ProtoEncode;
use crate::types::VarInt;

/// Fixed packet ids outside the play state.
pub mod id {
    pub mod handshake {
        pub const INTENTION: i32 = 0x00;
    }

    pub mod status {
        pub const REQUEST: i32 = 0x00;
        pub const PING: i32 = 0x01;
        pub const RESPONSE: i32 = 0x00;
        pub const PONG: i32 = 0x01;
    }

    pub mod login {
        // Server → Client
        pub const DISCONNECT: i32 = 0x00;
        pub const SUCCESS: i32 = 0x02;
        pub const SET_COMPRESSION: i32 = 0x03;
        pub const PLUGIN_REQUEST: i32 = 0x04;
        // Client → Server
        pub const START: i32 = 0x00;
        pub const PLUGIN_RESPONSE: i32 = 0x02;
        pub const ACKNOWLEDGED: i32 = 0x03;
    }
}

/// Serialize a packet id and body into one payload ready for framing.
pub fn encode_packet(id: i32, packet: &impl ProtoEncode) -> Bytes {
    let mut buf = BytesMut::new();
    VarInt(id).proto_encode(&mut buf);
    packet.proto_encode(&mut buf);
    buf.freeze()
}

/// Serialize a packet id followed by a body written by `body`.
pub fn build_packet(id: i32, body: impl FnOnce(&mut BytesMut)) -> Bytes {
    let mut buf = BytesMut::new();
    VarInt(id).proto_encode(&mut buf);
    body(&mut buf);
    buf.freeze()
}

/// Serialize a packet id followed by a pre-serialized body.
pub fn raw_packet(id: i32, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(body.len() + VarInt::MAX_BYTES);
    VarInt(id).proto_encode(&mut buf);
    buf.put_slice(body);
    buf.freeze()
}
