//! Pre-baked packet files.
//!
//! File names follow `<order>[_dn]_<packet_name>[_<suffix>].bin`; the body
//! is the exact packet payload without id or length.

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::WorldError;

/// One replayable packet. `name` is resolved to a wire id per protocol at
/// send time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPacket {
    pub order: u32,
    pub name: String,
    pub payload: Bytes,
}

/// Split a packet file name into its order and packet name.
pub fn parse_file_name(file_name: &str) -> Option<(u32, String)> {
    let stem = file_name.strip_suffix(".bin")?;
    let (order, rest) = stem.split_once('_')?;
    if order.is_empty() || !order.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let order = order.parse().ok()?;
    let rest = rest.strip_prefix("dn_").unwrap_or(rest);

    // The name is the longest run of `[a-z_]`; anything after it is a suffix
    // that must itself start with an underscore.
    let end = rest
        .find(|c: char| !(c.is_ascii_lowercase() || c == '_'))
        .unwrap_or(rest.len());
    let mut name = &rest[..end];
    if end < rest.len() {
        // Back off to the last underscore so the suffix keeps its separator.
        let cut = name.rfind('_')?;
        name = &name[..cut];
    }
    let name = name.trim_end_matches('_');
    if name.is_empty() {
        return None;
    }
    Some((order, name.to_owned()))
}

/// Load every `*.bin` in `dir`, sorted by numeric order. Files with the
/// same order keep file name order.
pub fn load_packets(dir: &Path) -> Result<Vec<RawPacket>, WorldError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| WorldError::io(dir, e))? {
        let entry = entry.map_err(|e| WorldError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "bin") {
            files.push(path);
        }
    }
    files.sort();

    let mut packets = Vec::with_capacity(files.len());
    for path in files {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let Some((order, name)) = parse_file_name(file_name) else {
            warn!(path = %path.display(), "unrecognized packet file name, skipped");
            continue;
        };
        let payload = std::fs::read(&path).map_err(|e| WorldError::io(&path, e))?;
        debug!(order, name = %name, bytes = payload.len(), "loaded packet");
        packets.push(RawPacket {
            order,
            name,
            payload: Bytes::from(payload),
        });
    }
    packets.sort_by_key(|p| p.order);
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(parse_file_name("0001_dn_chunk_data.bin"), Some((1, "chunk_data".into())));
        assert_eq!(parse_file_name("12_update_light.bin"), Some((12, "update_light".into())));
        assert_eq!(
            parse_file_name("3_chunk_data_0-1.bin"),
            Some((3, "chunk_data".into()))
        );
        assert_eq!(
            parse_file_name("4_dn_block_entity_data_17.bin"),
            Some((4, "block_entity_data".into()))
        );
        assert_eq!(parse_file_name("chunk.bin"), None);
        assert_eq!(parse_file_name("5_chunk.dat"), None);
    }

    #[test]
    fn order_is_numeric_not_lexical() {
        let dir = std::env::temp_dir().join("limbo-world-packets-numeric");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("10_dn_update_light.bin"), [10u8]).unwrap();
        std::fs::write(dir.join("2_dn_chunk_data.bin"), [2u8]).unwrap();
        std::fs::write(dir.join("2_dn_block_entity_data_1.bin"), [2u8, 1]).unwrap();
        std::fs::write(dir.join("9_dn_chunk_data.bin"), [9u8]).unwrap();

        let packets = load_packets(&dir).unwrap();
        let order: Vec<(u32, &str)> = packets.iter().map(|p| (p.order, p.name.as_str())).collect();
        assert_eq!(
            order,
            [
                (2, "block_entity_data"),
                (2, "chunk_data"),
                (9, "chunk_data"),
                (10, "update_light"),
            ]
        );
    }

    #[test]
    fn loads_sorted_by_name() {
        let dir = std::env::temp_dir().join("limbo-world-packets-sorted");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("2_dn_update_light.bin"), [2u8]).unwrap();
        std::fs::write(dir.join("1_dn_chunk_data.bin"), [1u8, 1]).unwrap();
        std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

        let packets = load_packets(&dir).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].name, "chunk_data");
        assert_eq!(&packets[0].payload[..], &[1, 1]);
        assert_eq!(packets[1].name, "update_light");
    }
}
