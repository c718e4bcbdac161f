//! Wall maps: tiled 128x128 color buffers and their placement geometry.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{error, info};

use crate::config::MapEntry;
use crate::content::read_nbt_file;
use crate::error::WorldError;

/// Bytes of color data in one map item.
pub const MAP_SIZE: usize = 128 * 128;

/// Item frame facing. Discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Bottom = 0,
    Top = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Direction {
    pub fn id(self) -> i32 {
        self as i32
    }
}

impl FromStr for Direction {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bottom" | "down" => Ok(Direction::Bottom),
            "top" | "up" => Ok(Direction::Top),
            "north" => Ok(Direction::North),
            "south" => Ok(Direction::South),
            "west" => Ok(Direction::West),
            "east" => Ok(Direction::East),
            _ => Err(WorldError::BadDirection(s.to_owned())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Bottom => "bottom",
            Direction::Top => "top",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        };
        f.write_str(s)
    }
}

/// Entity position of the frame holding tile `(xo, yo)` of a map anchored
/// at `anchor`. Tiles grow right and down as seen by a viewer facing the
/// wall.
pub fn tile_position(anchor: [f64; 3], facing: Direction, xo: u32, yo: u32) -> [f64; 3] {
    let [x, y, z] = anchor;
    let (xo, yo) = (xo as f64, yo as f64);
    match facing {
        Direction::North => [x + 0.5 - xo, y + 0.5 - yo, z - 0.03125],
        Direction::South => [x + 0.5 + xo, y + 0.5 - yo, z + 1.03125],
        Direction::West => [x - 0.03125, y + 0.5 - yo, z + 0.5 - xo],
        Direction::East => [x + 1.03125, y + 0.5 - yo, z + 0.5 + xo],
        Direction::Bottom => [x + 0.5 + xo, y - 0.03125, z + 0.5 - yo],
        Direction::Top => [x + 0.5 + xo, y + 1.03125, z + 0.5 + yo],
    }
}

#[derive(Clone, PartialEq)]
pub struct MapPart {
    pub id: i32,
    pub colors: Box<[u8; MAP_SIZE]>,
}

impl fmt::Debug for MapPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapPart").field("id", &self.id).finish_non_exhaustive()
    }
}

impl MapPart {
    /// Read `data.colors` from a gzip'd map `.dat` file.
    pub fn load(id: i32, path: &Path) -> Result<Self, WorldError> {
        let root = read_nbt_file(path)?;
        let bad = |reason: &str| WorldError::BadMapTile {
            path: path.to_owned(),
            reason: reason.to_owned(),
        };
        let colors = root
            .compound
            .get("data")
            .and_then(|d| d.as_compound())
            .and_then(|d| d.get("colors"))
            .and_then(|c| c.as_byte_array())
            .ok_or_else(|| bad("missing data.colors"))?;
        if colors.len() != MAP_SIZE {
            return Err(bad(&format!("expected {MAP_SIZE} colors, got {}", colors.len())));
        }
        let mut buf = Box::new([0u8; MAP_SIZE]);
        for (dst, src) in buf.iter_mut().zip(colors) {
            *dst = *src as u8;
        }
        Ok(Self { id, colors: buf })
    }
}

#[derive(Debug, Clone)]
pub struct Map {
    pub name: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<MapPart>,
}

impl Map {
    /// Tile file name: `<name>[_x][_y].dat`, 1-based, each suffix present
    /// only when that dimension exceeds 1.
    pub fn tile_file_name(name: &str, width: u32, height: u32, x: u32, y: u32) -> String {
        let mut file = name.to_owned();
        if width > 1 {
            file.push_str(&format!("_{x}"));
        }
        if height > 1 {
            file.push_str(&format!("_{y}"));
        }
        file.push_str(".dat");
        file
    }

    /// Load every tile of one map for one format, assigning ids from
    /// `first_id` upward.
    pub fn load(
        name: &str,
        format: &str,
        dir: &Path,
        width: u32,
        height: u32,
        first_id: i32,
    ) -> Result<Self, WorldError> {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        let mut id = first_id;
        for x in 1..=width {
            for y in 1..=height {
                let path = dir.join(Self::tile_file_name(name, width, height, x, y));
                tiles.push(MapPart::load(id, &path)?);
                id += 1;
            }
        }
        Ok(Self {
            name: name.to_owned(),
            format: format.to_owned(),
            width,
            height,
            tiles,
        })
    }

    /// Tile at zero-based `(x, y)`.
    pub fn tile(&self, x: u32, y: u32) -> Option<&MapPart> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((x * self.height + y) as usize)
    }
}

/// All loaded maps, keyed by map format then name.
#[derive(Debug, Default)]
pub struct MapRegistry {
    formats: HashMap<String, HashMap<String, Map>>,
}

impl MapRegistry {
    /// Load every configured map from `maps/<name>/<format>/`. Maps without
    /// a name or folder are skipped with an error log.
    pub fn load(root: &Path, entries: &[MapEntry]) -> Result<Self, WorldError> {
        let mut registry = Self::default();
        let mut next_id: i32 = 0;

        for entry in entries {
            let Some(name) = entry.name.as_deref() else {
                error!("skipping map with no name");
                continue;
            };
            let dir = root.join(name);
            if !dir.is_dir() {
                error!(map = name, "map folder {} does not exist, skipped", dir.display());
                continue;
            }

            for format in subdirectories(&dir)? {
                let map = Map::load(
                    name,
                    &format,
                    &dir.join(&format),
                    entry.width,
                    entry.height,
                    next_id,
                )?;
                info!(map = name, format = %format, tiles = map.tiles.len(), "loaded map");
                next_id += (entry.width * entry.height) as i32;
                registry.insert(map);
            }
        }
        Ok(registry)
    }

    pub fn insert(&mut self, map: Map) {
        self.formats
            .entry(map.format.clone())
            .or_default()
            .insert(map.name.clone(), map);
    }

    pub fn get(&self, format: &str, name: &str) -> Option<&Map> {
        self.formats.get(format)?.get(name)
    }

    pub fn format(&self, format: &str) -> impl Iterator<Item = &Map> {
        self.formats.get(format).into_iter().flat_map(|m| m.values())
    }
}

/// Names of the immediate subdirectories of `dir`, sorted.
pub(crate) fn subdirectories(dir: &Path) -> Result<Vec<String>, WorldError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| WorldError::io(dir, e))? {
        let entry = entry.map_err(|e| WorldError::io(dir, e))?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use limbo_nbt::{NbtCompound, NbtRoot, NbtTag};

    pub(crate) fn write_tile(path: &Path, fill: i8) {
        let mut data = NbtCompound::new();
        data.insert("colors".into(), NbtTag::ByteArray(vec![fill; MAP_SIZE]));
        let mut root = NbtCompound::new();
        root.insert("data".into(), NbtTag::Compound(data));

        let mut raw = bytes::BytesMut::new();
        limbo_nbt::write_nbt(&mut raw, &NbtRoot::new("", root));
        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(&raw).unwrap();
        std::fs::write(path, gz.finish().unwrap()).unwrap();
    }

    #[test]
    fn tile_names() {
        assert_eq!(Map::tile_file_name("logo", 1, 1, 1, 1), "logo.dat");
        assert_eq!(Map::tile_file_name("logo", 2, 1, 2, 1), "logo_2.dat");
        assert_eq!(Map::tile_file_name("logo", 1, 3, 1, 3), "logo_3.dat");
        assert_eq!(Map::tile_file_name("logo", 2, 2, 1, 2), "logo_1_2.dat");
    }

    #[test]
    fn placement_geometry() {
        let a = [10.0, 64.0, -3.0];
        assert_eq!(tile_position(a, Direction::North, 1, 1), [9.5, 63.5, -3.03125]);
        assert_eq!(tile_position(a, Direction::South, 1, 0), [11.5, 64.5, -1.96875]);
        assert_eq!(tile_position(a, Direction::West, 1, 0), [9.96875, 64.5, -3.5]);
        assert_eq!(tile_position(a, Direction::East, 0, 1), [11.03125, 63.5, -2.5]);
        assert_eq!(tile_position(a, Direction::Bottom, 0, 1), [10.5, 63.96875, -3.5]);
        assert_eq!(tile_position(a, Direction::Top, 1, 1), [11.5, 65.03125, -1.5]);
    }

    #[test]
    fn direction_parse() {
        assert_eq!("EAST".parse::<Direction>().unwrap(), Direction::East);
        assert_eq!(Direction::Top.id(), 1);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn registry_assigns_disjoint_ids_and_indexes_tiles() {
        let root = std::env::temp_dir().join("limbo-world-maps");
        let _ = std::fs::remove_dir_all(&root);
        for format in ["a", "b"] {
            let dir = root.join("wall").join(format);
            std::fs::create_dir_all(&dir).unwrap();
            for x in 1..=2 {
                for y in 1..=3 {
                    let fill = (x * 10 + y) as i8;
                    write_tile(&dir.join(Map::tile_file_name("wall", 2, 3, x, y)), fill);
                }
            }
        }

        let entries = [MapEntry {
            name: Some("wall".into()),
            width: 2,
            height: 3,
        }];
        let reg = MapRegistry::load(&root, &entries).unwrap();
        let a = reg.get("a", "wall").unwrap();
        let b = reg.get("b", "wall").unwrap();

        let mut ids: Vec<i32> = a.tiles.iter().chain(&b.tiles).map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);

        // x = 1, y = 2 (zero-based) was written from file wall_2_3.dat
        assert_eq!(a.tile(1, 2).unwrap().colors[0], 23);
        assert_eq!(a.tile(0, 0).unwrap().colors[0], 11);
        assert!(a.tile(2, 0).is_none());
    }

    #[test]
    fn short_color_data_rejected() {
        let dir = std::env::temp_dir().join("limbo-world-short-map");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.dat");
        let mut root = NbtCompound::new();
        root.insert("data".into(), NbtTag::Compound(NbtCompound::new()));
        let mut raw = bytes::BytesMut::new();
        limbo_nbt::write_nbt(&mut raw, &NbtRoot::new("", root));
        std::fs::write(&path, &raw).unwrap();
        assert!(matches!(MapPart::load(0, &path), Err(WorldError::BadMapTile { .. })));
    }
}
