//! Status-relay digests: hex HMAC-SHA512 over the inner JSON string.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::CryptoError;

type HmacSha512 = Hmac<Sha512>;

/// Hex digest for `message`.
pub fn sign_status(secret: &[u8], message: &[u8]) -> Result<String, CryptoError> {
    let mut mac = HmacSha512::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a hex digest (either case) in constant time.
pub fn verify_status(secret: &[u8], message: &[u8], digest_hex: &str) -> Result<(), CryptoError> {
    let digest = hex::decode(digest_hex).map_err(|_| CryptoError::InvalidHex)?;
    let mut mac = HmacSha512::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(message);
    mac.verify_slice(&digest)
        .map_err(|_| CryptoError::SignatureMismatch)
}
