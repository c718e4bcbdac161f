//! Modern (challenge/response) player-info forwarding signatures.
//!
//! The proxy answers the login plugin request with
//! `HMAC-SHA256(secret, payload) || payload`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Length of the leading HMAC-SHA256 tag.
pub const SIGNATURE_LEN: usize = 32;

/// Verify the signed response and return the payload that follows the tag.
///
/// Comparison is constant time.
pub fn verify_forwarding<'a>(secret: &[u8], data: &'a [u8]) -> Result<&'a [u8], CryptoError> {
    if data.len() < SIGNATURE_LEN {
        return Err(CryptoError::TooShort(data.len()));
    }
    let (signature, payload) = data.split_at(SIGNATURE_LEN);
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(payload);
    mac.verify_slice(signature)
        .map_err(|_| CryptoError::SignatureMismatch)?;
    Ok(payload)
}

/// Produce `tag || payload`, as a proxy would.
pub fn sign_forwarding(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(payload);
    let mut out = mac.finalize().into_bytes().to_vec();
    out.extend_from_slice(payload);
    Ok(out)
}
