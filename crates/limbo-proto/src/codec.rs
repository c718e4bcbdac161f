//! Protocol encoding/decoding traits and helpers.

use bytes::{Buf, BufMut, Bytes};

use crate::error::ProtoError;
use crate::types::VarInt;

/// Default upper bound for strings read from clients (in characters).
pub const MAX_STRING: usize = 32767;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a protocol string (VarInt byte length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarInt(s.len() as i32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a protocol string of at most `max_chars` characters.
pub fn read_string_max(buf: &mut impl Buf, max_chars: usize) -> Result<String, ProtoError> {
    let len = VarInt::proto_decode(buf)?.0;
    if len < 0 {
        return Err(ProtoError::NegativeLength(len));
    }
    let len = len as usize;
    // UTF-8 needs at most 4 bytes per char
    if len > max_chars * 4 {
        return Err(ProtoError::StringTooLong {
            len,
            max: max_chars * 4,
        });
    }
    ensure_remaining(buf, len)?;
    let data = buf.copy_to_bytes(len);
    let s = String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)?;
    if s.chars().count() > max_chars {
        return Err(ProtoError::StringTooLong { len, max: max_chars });
    }
    Ok(s)
}

/// Read a protocol string with the default limit.
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    read_string_max(buf, MAX_STRING)
}

/// Write a `DataOutput.writeUTF` style string (u16 length + bytes).
///
/// Used inside BungeeCord plugin-message payloads.
pub fn write_utf(buf: &mut impl BufMut, s: &str) {
    let bytes = s.as_bytes();
    let len = bytes.len().min(u16::MAX as usize);
    buf.put_u16(len as u16);
    buf.put_slice(&bytes[..len]);
}

pub fn write_bool(buf: &mut impl BufMut, v: bool) {
    buf.put_u8(v as u8);
}

pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtoError> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8() != 0)
}

pub fn read_f64(buf: &mut impl Buf) -> Result<f64, ProtoError> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_f64())
}

pub fn read_i64(buf: &mut impl Buf) -> Result<i64, ProtoError> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_i64())
}

pub fn read_u16(buf: &mut impl Buf) -> Result<u16, ProtoError> {
    ensure_remaining(buf, 2)?;
    Ok(buf.get_u16())
}

/// Write a VarInt-prefixed byte array.
pub fn write_byte_array(buf: &mut impl BufMut, data: &[u8]) {
    VarInt(data.len() as i32).proto_encode(buf);
    buf.put_slice(data);
}

/// Take everything left in the buffer.
pub fn read_remaining(buf: &mut impl Buf) -> Bytes {
    buf.copy_to_bytes(buf.remaining())
}

/// Protocol angle: a full turn in 256 steps.
pub fn angle(degrees: f32) -> u8 {
    ((degrees / 360.0 * 256.0) as i32).rem_euclid(256) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn string_roundtrip() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "Hello, limbo!");
        assert_eq!(buf[0], 13);
        let result = read_string(&mut buf.freeze()).unwrap();
        assert_eq!(result, "Hello, limbo!");
    }

    #[test]
    fn string_unicode() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "\n\u{e300}\n");
        let result = read_string(&mut buf.freeze()).unwrap();
        assert_eq!(result, "\n\u{e300}\n");
    }

    #[test]
    fn string_buffer_too_short() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "Hello");
        let truncated = buf.freeze().slice(..3);
        assert!(read_string(&mut truncated.clone()).is_err());
    }

    #[test]
    fn string_limit_enforced() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "seventeen_chars__");
        assert!(matches!(
            read_string_max(&mut buf.freeze(), 16),
            Err(ProtoError::StringTooLong { .. })
        ));
    }

    #[test]
    fn utf_uses_u16_length() {
        let mut buf = BytesMut::new();
        write_utf(&mut buf, "Connect");
        assert_eq!(&buf[..2], &[0x00, 0x07]);
        assert_eq!(&buf[2..], b"Connect");
    }

    #[test]
    fn angles() {
        assert_eq!(angle(0.0), 0);
        assert_eq!(angle(90.0), 64);
        assert_eq!(angle(180.0), 128);
        assert_eq!(angle(-90.0), 192);
    }
}
