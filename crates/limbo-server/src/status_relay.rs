//! Signed server status lines pushed by the proxy on `rtgame:status`.
//!
//! An update is `{"servers": "<json>", "hmac": "<hex>"}` where the digest
//! is HMAC-SHA512 over the inner string. The inner JSON maps server keys to
//! `{"lines": [<component>, ...]}`.

use std::collections::HashMap;

use limbo_crypto::CryptoError;
use limbo_proto::Component;
use serde::Deserialize;
use thiserror::Error;

pub const STATUS_CHANNEL: &str = "rtgame:status";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no status secret configured")]
    NoSecret,

    #[error("malformed update: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("digest rejected: {0}")]
    Digest(#[from] CryptoError),
}

#[derive(Deserialize)]
struct Envelope {
    servers: String,
    hmac: String,
}

#[derive(Deserialize)]
struct ServerStatus {
    #[serde(default)]
    lines: Vec<serde_json::Value>,
}

/// Last known status lines per server key.
#[derive(Debug, Default)]
pub struct StatusTable {
    servers: HashMap<String, Vec<Component>>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, server: &str) -> Option<&[Component]> {
        self.servers.get(server).map(Vec::as_slice)
    }

    /// Verify `payload` and replace the entries it names. Returns the keys
    /// that changed. A rejected update leaves the table untouched.
    pub fn apply(&mut self, secret: Option<&[u8]>, payload: &[u8]) -> Result<Vec<String>, RelayError> {
        let secret = secret.ok_or(RelayError::NoSecret)?;
        let envelope: Envelope = serde_json::from_slice(payload)?;
        limbo_crypto::verify_status(secret, envelope.servers.as_bytes(), &envelope.hmac)?;

        let update: HashMap<String, ServerStatus> = serde_json::from_str(&envelope.servers)?;
        let mut changed = Vec::with_capacity(update.len());
        for (server, status) in update {
            let lines = status.lines.into_iter().map(Component).collect();
            self.servers.insert(server.clone(), lines);
            changed.push(server);
        }
        changed.sort();
        Ok(changed)
    }
}
