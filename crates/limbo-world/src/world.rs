//! The immutable description of one limbo destination.

use std::path::Path;

use limbo_proto::{BlockPos, Component};
use serde_json::json;
use tracing::error;

use crate::bounds::{parse_numbers, parse_vec3, Aabb};
use crate::config::WorldEntry;
use crate::error::WorldError;
use crate::map::Direction;
use crate::packets::{load_packets, RawPacket};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Spawn {
    /// Parse `"x,y,z[,yaw[,pitch]]"`.
    pub fn parse(s: &str) -> Result<Self, WorldError> {
        let [x, y, z, yaw, pitch] = parse_numbers::<5>(s)?;
        Ok(Self {
            x,
            y,
            z,
            yaw: yaw as f32,
            pitch: pitch as f32,
        })
    }

    pub fn block(&self) -> BlockPos {
        BlockPos::floor(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weather {
    Clear,
    Rain,
}

impl Weather {
    pub fn from_config(s: &str) -> Self {
        if s.eq_ignore_ascii_case("rain") {
            Weather::Rain
        } else {
            Weather::Clear
        }
    }

    pub fn is_raining(self) -> bool {
        self == Weather::Rain
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    pub area: Aabb,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPlacement {
    pub map: String,
    pub anchor: [f64; 3],
    pub facing: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HologramPlacement {
    pub server: String,
    pub anchor: [f64; 3],
}

#[derive(Debug, Clone)]
pub struct World {
    pub name: String,
    pub dimension: String,
    pub time: i64,
    pub cycle: bool,
    pub weather: Weather,
    pub music: String,
    pub bounds: Option<Aabb>,
    pub spawn: Spawn,
    pub portals: Vec<Portal>,
    pub maps: Vec<MapPlacement>,
    pub holograms: Vec<HologramPlacement>,
    pub packets: Vec<RawPacket>,
    pub contributors: Vec<String>,
}

impl World {
    /// Build the world for one version family from its config entry and
    /// the family's packet folder.
    pub fn load(name: &str, entry: &WorldEntry, packet_dir: &Path) -> Result<Self, WorldError> {
        let env = &entry.environment;

        let bounds = entry
            .bounds
            .as_ref()
            .map(|b| Aabb::parse(&b.pos1, &b.pos2))
            .transpose()?;

        let portals = entry
            .portals
            .iter()
            .map(|p| {
                Ok(Portal {
                    area: Aabb::parse(&p.pos1, &p.pos2)?,
                    destination: p.server.clone(),
                })
            })
            .collect::<Result<Vec<_>, WorldError>>()?;

        let mut maps = Vec::with_capacity(entry.maps.len());
        for m in &entry.maps {
            let facing = match m.direction.parse::<Direction>() {
                Ok(d) => d,
                Err(e) => {
                    error!(world = name, map = %m.name, "{e}, placement skipped");
                    continue;
                }
            };
            maps.push(MapPlacement {
                map: m.name.clone(),
                anchor: parse_vec3(&m.pos)?,
                facing,
            });
        }

        let holograms = entry
            .status_holograms
            .iter()
            .map(|h| {
                Ok(HologramPlacement {
                    server: h.server.clone(),
                    anchor: parse_vec3(&h.pos)?,
                })
            })
            .collect::<Result<Vec<_>, WorldError>>()?;

        Ok(Self {
            name: name.to_owned(),
            dimension: env.dimension.clone(),
            time: env.time,
            cycle: env.cycle,
            weather: Weather::from_config(&env.weather),
            music: env.music.clone(),
            bounds,
            spawn: Spawn::parse(&entry.spawn)?,
            portals,
            maps,
            holograms,
            packets: load_packets(packet_dir)?,
            contributors: entry.contributors.clone(),
        })
    }

    /// Destination of the first portal containing `pos`.
    pub fn portal_at(&self, pos: BlockPos) -> Option<&str> {
        self.portals
            .iter()
            .find(|p| p.area.contains(pos))
            .map(|p| p.destination.as_str())
    }

    /// Worlds without bounds contain everything.
    pub fn within_bounds(&self, pos: BlockPos) -> bool {
        self.bounds.map_or(true, |b| b.contains(pos))
    }

    /// The `/credits` chat line.
    pub fn credits(&self) -> Component {
        let by = if self.contributors.is_empty() {
            "Unknown".to_owned()
        } else {
            self.contributors.join(", ")
        };
        Component(json!({
            "text": format!("\n{}", self.name),
            "bold": true,
            "color": "gold",
            "extra": [
                { "text": "\nMade by ", "bold": false, "color": "gray" },
                { "text": by, "bold": false, "color": "white" },
                { "text": "\n" },
            ]
        }))
    }
}
