use std::path::Path;

use limbo_world::ContentConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub content: ContentConfig,
    #[serde(default)]
    pub logging: LoggingSection,
    /// Shared secret for `rtgame:status` updates. Without it every update
    /// is dropped.
    #[serde(default)]
    pub status_secret: Option<String>,
    /// Voting link template with `{uuid}` and `{token}` placeholders.
    #[serde(default)]
    pub voting_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml_str = r#"
            default_world = "lobby"
            status_secret = "s3cret"
            voting_url = "https://vote.example/{uuid}/{token}"

            [logging]
            level = "debug"

            [[worlds]]
            name = "lobby"
            folder = "lobby"
            spawn = "0.5,64,0.5,180,0"
            contributors = ["a", "b"]

            [worlds.bounds]
            pos1 = "-50,0,-50"
            pos2 = "50,255,50"

            [worlds.environment]
            time = 6000
            weather = "rain"

            [[worlds.portals]]
            pos1 = "1,64,1"
            pos2 = "2,66,1"
            server = "survival"

            [[worlds.maps]]
            name = "logo"
            pos = "1,65,3"

            [[worlds.status_holograms]]
            server = "survival"
            pos = "0,66,0"

            [[maps]]
            name = "logo"
            width = 2
        "#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.status_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.content.default_world.as_deref(), Some("lobby"));

        let world = &config.content.worlds[0];
        assert_eq!(world.contributors, vec!["a", "b"]);
        assert_eq!(world.environment.time, 6000);
        assert_eq!(world.environment.dimension, "minecraft:overworld");
        assert_eq!(world.portals[0].server, "survival");
        assert_eq!(world.maps[0].direction, "north");
        assert_eq!(config.content.maps[0].width, 2);
        assert_eq!(config.content.maps[0].height, 1);
    }

    #[test]
    fn sections_default() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.status_secret.is_none());
        assert!(config.content.worlds.is_empty());
    }
}
