//! TCP transport for the Java Edition protocol.
//!
//! One task per socket owns framing and compression state. Decoded packet
//! payloads flow to a single consumer as [`NetEvent`]s; the consumer talks
//! back through a cloneable [`ServerHandle`].

pub mod error;
pub mod server;
mod session;

pub use error::NetError;
pub use server::{ConnId, NetConfig, NetEvent, NetServer, ServerCommand, ServerHandle};
