//! Big-endian NBT (Named Binary Tag) for Minecraft Java Edition.
//!
//! Two root framings are supported:
//! - **Named**: tag type, root name, payload. Used by `.dat` files and by
//!   packets before protocol 764 (1.20.2).
//! - **Nameless**: tag type, payload. Used by packets from 1.20.2 on. Any tag
//!   may be the root, which text components rely on (a plain string root).
//!
//! Files on disk may additionally be gzip'd; [`read_file`] accepts both.

pub mod error;
mod io;
pub mod tag;

pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag};

use std::io::Read;

use bytes::{Buf, BufMut};
use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read a named-root compound.
pub fn read_nbt(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    io::read_named(buf)
}

/// Write a named-root compound.
pub fn write_nbt(buf: &mut impl BufMut, root: &NbtRoot) {
    io::write_named(buf, root)
}

/// Read a nameless-root compound.
pub fn read_nbt_nameless(buf: &mut impl Buf) -> Result<NbtCompound, NbtError> {
    io::read_nameless(buf)
}

/// Write any tag as a nameless root.
pub fn write_nbt_nameless(buf: &mut impl BufMut, tag: &NbtTag) {
    io::write_nameless(buf, tag)
}

/// Decode the contents of an NBT file, gzip'd or raw.
pub fn read_file(raw: &[u8]) -> Result<NbtRoot, NbtError> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return read_nbt(&mut &raw[..]);
    }
    let mut data = Vec::new();
    GzDecoder::new(raw)
        .read_to_end(&mut data)
        .map_err(NbtError::Gzip)?;
    read_nbt(&mut data.as_slice())
}
