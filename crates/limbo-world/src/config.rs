use serde::Deserialize;

/// The world and map sections of `config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub default_world: Option<String>,
    #[serde(default)]
    pub worlds: Vec<WorldEntry>,
    #[serde(default)]
    pub maps: Vec<MapEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorldEntry {
    pub name: Option<String>,
    pub folder: Option<String>,
    /// `"x,y,z[,yaw[,pitch]]"`.
    #[serde(default)]
    pub spawn: String,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub bounds: Option<BoxEntry>,
    #[serde(default)]
    pub environment: EnvironmentSection,
    #[serde(default)]
    pub portals: Vec<PortalEntry>,
    #[serde(default)]
    pub maps: Vec<MapPlacementEntry>,
    #[serde(default)]
    pub status_holograms: Vec<HologramEntry>,
}

#[derive(Debug, Deserialize)]
pub struct EnvironmentSection {
    #[serde(default)]
    pub time: i64,
    #[serde(default = "default_dimension")]
    pub dimension: String,
    #[serde(default = "default_weather")]
    pub weather: String,
    #[serde(default = "default_music")]
    pub music: String,
    #[serde(default)]
    pub cycle: bool,
}

fn default_dimension() -> String {
    "minecraft:overworld".into()
}

fn default_weather() -> String {
    "clear".into()
}

fn default_music() -> String {
    "minecraft:music.end".into()
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            time: 0,
            dimension: default_dimension(),
            weather: default_weather(),
            music: default_music(),
            cycle: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BoxEntry {
    #[serde(default)]
    pub pos1: String,
    #[serde(default)]
    pub pos2: String,
}

#[derive(Debug, Deserialize)]
pub struct PortalEntry {
    #[serde(default)]
    pub pos1: String,
    #[serde(default)]
    pub pos2: String,
    pub server: String,
}

#[derive(Debug, Deserialize)]
pub struct MapPlacementEntry {
    pub name: String,
    pub pos: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "north".into()
}

#[derive(Debug, Deserialize)]
pub struct HologramEntry {
    pub server: String,
    pub pos: String,
}

#[derive(Debug, Deserialize)]
pub struct MapEntry {
    pub name: Option<String>,
    #[serde(default = "one")]
    pub width: u32,
    #[serde(default = "one")]
    pub height: u32,
}

fn one() -> u32 {
    1
}
