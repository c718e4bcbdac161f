//! Length-prefixed framing with optional threshold compression.
//!
//! Uncompressed: `VarInt(len) | payload`.
//! Compressed: `VarInt(len) | VarInt(data_len) | body`, where `data_len` is 0
//! and `body` is the raw payload below the threshold, otherwise `data_len` is
//! the payload size and `body` is zlib.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::compression;
use crate::error::ProtoError;
use crate::types::VarInt;

/// Largest frame length expressible in a three-byte VarInt.
pub const MAX_FRAME: usize = 2_097_151;

/// Per-connection frame state.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    threshold: Option<usize>,
    level: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    pub fn new() -> Self {
        Self {
            threshold: None,
            level: 6,
        }
    }

    /// Enable compression for payloads of at least `threshold` bytes.
    /// A negative threshold disables compression.
    pub fn set_threshold(&mut self, threshold: i32) {
        self.threshold = (threshold >= 0).then_some(threshold as usize);
    }

    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    /// Frame one packet payload (id + body).
    pub fn encode(&self, payload: &[u8]) -> Result<Bytes, ProtoError> {
        let mut out = BytesMut::with_capacity(payload.len() + 8);
        match self.threshold {
            None => {
                VarInt(payload.len() as i32).proto_encode(&mut out);
                out.put_slice(payload);
            }
            Some(threshold) if payload.len() < threshold => {
                VarInt(payload.len() as i32 + 1).proto_encode(&mut out);
                out.put_u8(0);
                out.put_slice(payload);
            }
            Some(_) => {
                let compressed = compression::compress(payload, self.level)?;
                let data_len = VarInt(payload.len() as i32);
                VarInt((data_len.encoded_len() + compressed.len()) as i32).proto_encode(&mut out);
                data_len.proto_encode(&mut out);
                out.put_slice(&compressed);
            }
        }
        if out.len() > MAX_FRAME + 3 {
            return Err(ProtoError::FrameTooLarge(out.len()));
        }
        Ok(out.freeze())
    }

    /// Split one packet payload off the front of `buf`.
    ///
    /// Returns `Ok(None)` until a whole frame has arrived.
    pub fn decode(&self, buf: &mut BytesMut) -> Result<Option<Bytes>, ProtoError> {
        let Some((len, prefix)) = VarInt::peek(buf)? else {
            return Ok(None);
        };
        if len.0 < 0 {
            return Err(ProtoError::NegativeLength(len.0));
        }
        let len = len.0 as usize;
        if len > MAX_FRAME {
            return Err(ProtoError::FrameTooLarge(len));
        }
        if buf.len() < prefix + len {
            return Ok(None);
        }
        buf.advance(prefix);
        let mut frame = buf.split_to(len).freeze();

        let Some(threshold) = self.threshold else {
            return Ok(Some(frame));
        };
        let data_len = VarInt::proto_decode(&mut frame)?.0;
        if data_len < 0 {
            return Err(ProtoError::NegativeLength(data_len));
        }
        if data_len == 0 {
            return Ok(Some(frame));
        }
        let data_len = data_len as usize;
        if data_len < threshold {
            return Err(ProtoError::DecompressError(format!(
                "compressed packet of {data_len} bytes is below threshold {threshold}"
            )));
        }
        Ok(Some(Bytes::from(compression::decompress(&frame, data_len)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_frame() {
        let codec = FrameCodec::new();
        let framed = codec.encode(&[0x00, 0x01, 0x02]).unwrap();
        assert_eq!(&framed[..], &[0x03, 0x00, 0x01, 0x02]);

        let mut buf = BytesMut::from(&framed[..]);
        let payload = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], &[0x00, 0x01, 0x02]);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_frame_waits() {
        let codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0x05, 0x00, 0x01][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn two_frames_in_one_read() {
        let codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0x01, 0xAA, 0x02, 0xBB, 0xCC][..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &[0xAA]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &[0xBB, 0xCC]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn below_threshold_is_sent_raw() {
        let mut codec = FrameCodec::new();
        codec.set_threshold(1500);
        let framed = codec.encode(&[0x26, 0x01]).unwrap();
        assert_eq!(&framed[..], &[0x03, 0x00, 0x26, 0x01]);
        let mut buf = BytesMut::from(&framed[..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &[0x26, 0x01]);
    }

    #[test]
    fn above_threshold_is_compressed() {
        let mut codec = FrameCodec::new();
        codec.set_threshold(256);
        let payload = vec![0x27u8; 16384];
        let framed = codec.encode(&payload).unwrap();
        assert!(framed.len() < payload.len());
        let mut buf = BytesMut::from(&framed[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), Bytes::from(payload));
    }

    #[test]
    fn negative_threshold_disables() {
        let mut codec = FrameCodec::new();
        codec.set_threshold(256);
        codec.set_threshold(-1);
        assert_eq!(codec.threshold(), None);
    }

    #[test]
    fn oversized_length_rejected() {
        let codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0xFF, 0xFF, 0xFF, 0x07][..]);
        assert!(matches!(codec.decode(&mut buf), Err(ProtoError::FrameTooLarge(_))));
    }
}
