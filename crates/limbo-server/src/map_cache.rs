//! Serialized map-data bodies, shared by every connection.
//!
//! A body depends only on the map format and the tile, so each one is built
//! once and reused. The packet id is prefixed at send time because one
//! format spans several protocol eras.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MapPacketCache {
    bodies: HashMap<String, HashMap<i32, Bytes>>,
    built: u64,
}

impl MapPacketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached body for `(format, id)`, building it with `build` on the
    /// first request.
    pub fn get_or_build(&mut self, format: &str, id: i32, build: impl FnOnce() -> Bytes) -> Bytes {
        if let Some(body) = self.bodies.get(format).and_then(|m| m.get(&id)) {
            return body.clone();
        }
        let body = build();
        self.built += 1;
        debug!(format, id, total = self.built, "map body serialized");
        self.bodies
            .entry(format.to_owned())
            .or_default()
            .insert(id, body.clone());
        body
    }

    /// How many bodies have been serialized so far.
    #[cfg(test)]
    pub fn built(&self) -> u64 {
        self.built
    }
}
