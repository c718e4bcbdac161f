//! Zlib compression for compressed-mode frames.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::ProtoError;

/// Largest uncompressed packet a client may announce.
pub const MAX_DECOMPRESSED: usize = 8 * 1024 * 1024;

/// Compress data with zlib at the given level (0-9).
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>, ProtoError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| ProtoError::CompressError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ProtoError::CompressError(e.to_string()))
}

/// Decompress zlib data whose uncompressed size was announced as `expected`.
///
/// The output must match the announced size exactly.
pub fn decompress(data: &[u8], expected: usize) -> Result<Vec<u8>, ProtoError> {
    if expected > MAX_DECOMPRESSED {
        return Err(ProtoError::DecompressError(format!(
            "announced size {expected} exceeds limit {MAX_DECOMPRESSED}"
        )));
    }
    let mut out = Vec::with_capacity(expected);
    ZlibDecoder::new(data)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| ProtoError::DecompressError(e.to_string()))?;
    if out.len() != expected {
        return Err(ProtoError::DecompressError(format!(
            "announced size {expected}, got {}",
            out.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_roundtrip() {
        let data = b"Hello, World! This is a test of zlib compression. Repeated data: AAAAAAAAAAAAAAAAAAAAAAAAA";
        let compressed = compress(data, 6).unwrap();
        // zlib header
        assert_eq!(compressed[0], 0x78);
        let decompressed = decompress(&compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn size_mismatch_rejected() {
        let data = vec![7u8; 2000];
        let compressed = compress(&data, 6).unwrap();
        assert!(decompress(&compressed, 1999).is_err());
        assert!(decompress(&compressed, 2001).is_err());
    }

    #[test]
    fn oversized_announcement_rejected() {
        assert!(decompress(&[], MAX_DECOMPRESSED + 1).is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(decompress(&[0xDE, 0xAD, 0xBE, 0xEF], 4).is_err());
    }
}
