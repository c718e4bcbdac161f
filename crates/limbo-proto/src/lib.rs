//! Minecraft Java Edition protocol types, framing and version-independent packets.
//!
//! Everything here is stable across protocol 578 (1.15.2) and later: the
//! handshake, status and login packets, the data types and the frame format.
//! Play-state layouts differ per version and live with the version adapters.

pub mod chat;
pub mod codec;
pub mod compression;
pub mod error;
pub mod frame;
pub mod packets;
pub mod types;

pub use chat::{ChatFormat, Component};
pub use error::ProtoError;
pub use types::{BlockPos, Uuid, VarInt, VarLong};
