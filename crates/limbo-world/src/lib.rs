//! World content: config-derived limbo worlds, pre-baked packets, map tiles,
//! tag payloads and registry codecs.
//!
//! Everything here is loaded once at startup and immutable afterwards.

pub mod bounds;
pub mod config;
pub mod content;
pub mod error;
pub mod map;
pub mod packets;
pub mod world;
pub mod world_set;

pub use bounds::Aabb;
pub use config::ContentConfig;
pub use content::Content;
pub use error::WorldError;
pub use map::{Direction, Map, MapPart, MapRegistry};
pub use packets::RawPacket;
pub use world::{HologramPlacement, MapPlacement, Portal, Spawn, Weather, World};
pub use world_set::WorldSet;
