//! Everything loaded from disk at startup.

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use limbo_nbt::{NbtCompound, NbtRoot};
use tracing::{info, warn};

use crate::config::ContentConfig;
use crate::error::WorldError;
use crate::map::MapRegistry;
use crate::world_set::WorldSet;

#[derive(Debug, Default)]
pub struct Content {
    pub worlds: WorldSet,
    pub maps: MapRegistry,
    /// Tag packet payloads by tag format.
    pub tags: HashMap<String, Bytes>,
    /// Dimension codecs / registry data by name.
    pub registries: HashMap<String, NbtCompound>,
}

impl Content {
    /// Load `packets/`, `maps/`, `tags/` and `registries/` below `root`.
    pub fn load(root: &Path, config: &ContentConfig) -> Result<Self, WorldError> {
        let worlds = WorldSet::load(&root.join("packets"), config)?;

        let maps_dir = root.join("maps");
        let maps = if maps_dir.is_dir() {
            MapRegistry::load(&maps_dir, &config.maps)?
        } else {
            if !config.maps.is_empty() {
                warn!("{} does not exist, no maps loaded", maps_dir.display());
            }
            MapRegistry::default()
        };

        let mut tags = HashMap::new();
        for (stem, path) in files_with_extension(&root.join("tags"), "bin")? {
            let data = std::fs::read(&path).map_err(|e| WorldError::io(&path, e))?;
            tags.insert(stem, Bytes::from(data));
        }

        let mut registries = HashMap::new();
        for (stem, path) in files_with_extension(&root.join("registries"), "nbt")? {
            registries.insert(stem, read_nbt_file(&path)?.compound);
        }

        info!(
            tags = tags.len(),
            registries = registries.len(),
            "content loaded"
        );
        Ok(Self {
            worlds,
            maps,
            tags,
            registries,
        })
    }
}

/// `(stem, path)` of every `*.ext` file in `dir`. A missing directory is
/// empty.
fn files_with_extension(
    dir: &Path,
    ext: &str,
) -> Result<Vec<(String, std::path::PathBuf)>, WorldError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| WorldError::io(dir, e))? {
        let path = entry.map_err(|e| WorldError::io(dir, e))?.path();
        if path.extension().is_some_and(|e| e == ext) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                out.push((stem.to_owned(), path.clone()));
            }
        }
    }
    Ok(out)
}

/// Read a named-root NBT file, gzip'd or not.
pub(crate) fn read_nbt_file(path: &Path) -> Result<NbtRoot, WorldError> {
    let raw = std::fs::read(path).map_err(|e| WorldError::io(path, e))?;
    limbo_nbt::read_file(&raw).map_err(|source| WorldError::Nbt {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use limbo_nbt::NbtTag;

    #[test]
    fn loads_tags_and_plain_registries() {
        let root = std::env::temp_dir().join("limbo-content-load");
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("packets/lobby/1_16")).unwrap();
        std::fs::create_dir_all(root.join("tags")).unwrap();
        std::fs::create_dir_all(root.join("registries")).unwrap();
        std::fs::write(root.join("tags/1_16.bin"), [1u8, 2, 3]).unwrap();

        let mut codec = NbtCompound::new();
        codec.insert("answer".into(), NbtTag::Int(42));
        let mut raw = bytes::BytesMut::new();
        limbo_nbt::write_nbt(&mut raw, &NbtRoot::new("", codec));
        std::fs::write(root.join("registries/1_16.nbt"), &raw).unwrap();

        let cfg: ContentConfig = toml::from_str(
            r#"
            [[worlds]]
            name = "lobby"
            folder = "lobby"
            "#,
        )
        .unwrap();

        let content = Content::load(&root, &cfg).unwrap();
        assert_eq!(&content.tags["1_16"][..], &[1, 2, 3]);
        assert_eq!(content.registries["1_16"].get("answer"), Some(&NbtTag::Int(42)));
        assert_eq!(content.worlds.worlds("1_16").len(), 1);
    }
}
