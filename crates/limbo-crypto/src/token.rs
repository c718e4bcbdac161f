//! Voting-link tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::CryptoError;

/// Hex HMAC-SHA256 of the player's uuid bytes.
pub fn voting_token(secret: &[u8], uuid: &[u8; 16]) -> Result<String, CryptoError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(uuid);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_stable_per_uuid() {
        let a = voting_token(b"s", &[1; 16]).unwrap();
        assert_eq!(a, voting_token(b"s", &[1; 16]).unwrap());
        assert_ne!(a, voting_token(b"s", &[2; 16]).unwrap());
        assert_eq!(a.len(), 64);
    }
}
