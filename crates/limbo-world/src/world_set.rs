//! Worlds grouped by version family (chunk format).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::ContentConfig;
use crate::error::WorldError;
use crate::map::subdirectories;
use crate::world::World;

#[derive(Debug, Default)]
struct Family {
    worlds: Vec<Arc<World>>,
    default: usize,
}

#[derive(Debug, Default)]
pub struct WorldSet {
    families: HashMap<String, Family>,
}

impl WorldSet {
    /// Load every configured world for every family folder found under
    /// `packets/<folder>/`.
    ///
    /// Entries without a name or folder, or whose folder is missing, are
    /// skipped with an error log. A family that was discovered but ends up
    /// with no worlds, or an empty result overall, is an error.
    pub fn load(packets_root: &Path, config: &ContentConfig) -> Result<Self, WorldError> {
        let mut set = Self::default();
        let default = config.default_world.as_deref();

        for entry in &config.worlds {
            let Some(name) = entry.name.as_deref() else {
                error!("skipping world with no name");
                continue;
            };
            let Some(folder) = entry.folder.as_deref() else {
                error!(world = name, "world has no folder, skipped");
                continue;
            };
            let dir = packets_root.join(folder);
            if !dir.is_dir() {
                error!(world = name, "folder {} does not exist, skipped", dir.display());
                continue;
            }

            let families = subdirectories(&dir)?;
            if families.is_empty() {
                error!(world = name, "folder {} has no version folders, skipped", dir.display());
                continue;
            }

            for family in families {
                let slot = set.families.entry(family.clone()).or_default();
                match World::load(name, entry, &dir.join(&family)) {
                    Ok(world) => {
                        info!(world = name, family = %family, packets = world.packets.len(), "loaded world");
                        if default == Some(name) {
                            slot.default = slot.worlds.len();
                        }
                        slot.worlds.push(Arc::new(world));
                    }
                    Err(e) => error!(world = name, family = %family, "failed to load world: {e}"),
                }
            }
        }

        for (family, slot) in &set.families {
            if slot.worlds.is_empty() {
                return Err(WorldError::EmptyFamily(family.clone()));
            }
        }
        if set.families.is_empty() {
            return Err(WorldError::NoWorlds);
        }
        Ok(set)
    }

    /// Add a world to a family. The first world of a family is its default.
    pub fn insert(&mut self, family: &str, world: World) {
        self.families
            .entry(family.to_owned())
            .or_default()
            .worlds
            .push(Arc::new(world));
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn worlds(&self, family: &str) -> &[Arc<World>] {
        self.families
            .get(family)
            .map(|f| f.worlds.as_slice())
            .unwrap_or_default()
    }

    pub fn default_world(&self, family: &str) -> Option<&Arc<World>> {
        let f = self.families.get(family)?;
        f.worlds.get(f.default)
    }

    pub fn first(&self, family: &str) -> Option<&Arc<World>> {
        self.worlds(family).first()
    }

    /// Index of `world` within its family, by identity.
    pub fn position(&self, family: &str, world: &Arc<World>) -> Option<usize> {
        self.worlds(family).iter().position(|w| Arc::ptr_eq(w, world))
    }

    /// The world after `current`, wrapping to the first.
    pub fn next(&self, family: &str, current: &Arc<World>) -> Arc<World> {
        self.step(family, current, 1)
    }

    /// The world before `current`, wrapping to the last.
    pub fn prev(&self, family: &str, current: &Arc<World>) -> Arc<World> {
        self.step(family, current, -1)
    }

    fn step(&self, family: &str, current: &Arc<World>, delta: isize) -> Arc<World> {
        let worlds = self.worlds(family);
        match self.position(family, current) {
            Some(i) if worlds.len() > 1 => {
                let n = worlds.len() as isize;
                let j = (i as isize + delta).rem_euclid(n) as usize;
                worlds[j].clone()
            }
            _ => current.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tests::sample_world;

    fn set_of(names: &[&str]) -> WorldSet {
        let mut set = WorldSet::default();
        for n in names {
            set.insert(
                "f",
                World {
                    name: (*n).into(),
                    ..sample_world()
                },
            );
        }
        set
    }

    #[test]
    fn next_wraps_to_first() {
        let set = set_of(&["a", "b", "c"]);
        let last = set.worlds("f")[2].clone();
        assert_eq!(set.next("f", &last).name, "a");
    }

    #[test]
    fn prev_wraps_to_last() {
        let set = set_of(&["a", "b", "c"]);
        let first = set.first("f").unwrap().clone();
        assert_eq!(set.prev("f", &first).name, "c");
        let mid = set.worlds("f")[1].clone();
        assert_eq!(set.prev("f", &mid).name, "a");
    }

    #[test]
    fn single_world_stays() {
        let set = set_of(&["only"]);
        let w = set.first("f").unwrap().clone();
        assert!(Arc::ptr_eq(&set.next("f", &w), &w));
    }

    #[test]
    fn unknown_family_is_empty() {
        let set = set_of(&["a"]);
        assert!(set.worlds("nope").is_empty());
        assert!(set.default_world("nope").is_none());
    }

    fn world_dir(root: &Path, folder: &str, families: &[&str]) {
        for f in families {
            std::fs::create_dir_all(root.join(folder).join(f)).unwrap();
        }
    }

    #[test]
    fn load_from_disk_picks_configured_default() {
        let root = std::env::temp_dir().join("limbo-world-set-default");
        let _ = std::fs::remove_dir_all(&root);
        world_dir(&root, "one", &["1_15", "1_16"]);
        world_dir(&root, "two", &["1_16"]);

        let cfg: ContentConfig = toml::from_str(
            r#"
            default_world = "two"
            [[worlds]]
            name = "one"
            folder = "one"
            [[worlds]]
            name = "two"
            folder = "two"
            [[worlds]]
            name = "ghost"
            folder = "missing"
            [[worlds]]
            folder = "one"
            "#,
        )
        .unwrap();

        let set = WorldSet::load(&root, &cfg).unwrap();
        assert_eq!(set.worlds("1_15").len(), 1);
        assert_eq!(set.worlds("1_16").len(), 2);
        assert_eq!(set.default_world("1_15").unwrap().name, "one");
        assert_eq!(set.default_world("1_16").unwrap().name, "two");
    }

    #[test]
    fn nothing_loaded_is_fatal() {
        let root = std::env::temp_dir().join("limbo-world-set-empty");
        std::fs::create_dir_all(&root).unwrap();
        let cfg = ContentConfig::default();
        assert!(matches!(WorldSet::load(&root, &cfg), Err(WorldError::NoWorlds)));
    }

    #[test]
    fn family_without_loadable_world_is_fatal() {
        let root = std::env::temp_dir().join("limbo-world-set-bad-family");
        let _ = std::fs::remove_dir_all(&root);
        world_dir(&root, "w", &["1_15"]);
        let cfg: ContentConfig = toml::from_str(
            r#"
            [[worlds]]
            name = "w"
            folder = "w"
            spawn = "not,a,number"
            "#,
        )
        .unwrap();
        assert!(matches!(WorldSet::load(&root, &cfg), Err(WorldError::EmptyFamily(f)) if f == "1_15"));
    }
}
