//! Server list ping: StatusResponse (0x00), PingRequest / PongResponse (0x01).

use bytes::{Buf, BufMut};
use serde::Serialize;

use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// JSON body of the status response.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: crate::chat::Component,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
}

impl ProtoEncode for StatusResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".into());
        codec::write_string(buf, &json);
    }
}

/// Ping payload, echoed back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRequest {
    pub payload: i64,
}

impl ProtoDecode for PingRequest {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            payload: codec::read_i64(buf)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PongResponse {
    pub payload: i64,
}

impl ProtoEncode for PongResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i64(self.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Component;
    use bytes::BytesMut;

    #[test]
    fn status_json_shape() {
        let resp = StatusResponse {
            version: StatusVersion {
                name: "1.20.1".into(),
                protocol: 763,
            },
            players: StatusPlayers { max: 100, online: 3 },
            description: Component::text("Waiting Server"),
        };
        let mut buf = BytesMut::new();
        resp.proto_encode(&mut buf);
        let mut frozen = buf.freeze();
        let json = codec::read_string(&mut frozen).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["version"]["protocol"], 763);
        assert_eq!(v["players"]["online"], 3);
        assert_eq!(v["description"]["text"], "Waiting Server");
    }

    #[test]
    fn ping_echo() {
        let mut buf = BytesMut::new();
        buf.put_i64(0x1122334455667788);
        let ping = PingRequest::proto_decode(&mut buf.freeze()).unwrap();
        let mut out = BytesMut::new();
        PongResponse { payload: ping.payload }.proto_encode(&mut out);
        assert_eq!(&out[..], &0x1122334455667788i64.to_be_bytes());
    }
}
