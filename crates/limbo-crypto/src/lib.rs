//! Cryptography: forwarded-identity signatures, status-relay digests,
//! voting tokens and offline-mode uuids.

pub mod forwarding;
pub mod offline;
pub mod status;
pub mod token;

pub use forwarding::{sign_forwarding, verify_forwarding};
pub use offline::offline_uuid;
pub use status::{sign_status, verify_status};
pub use token::voting_token;

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length")]
    InvalidKey,

    #[error("signed data too short: {0} bytes")]
    TooShort(usize),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("digest is not valid hex")]
    InvalidHex,
}
