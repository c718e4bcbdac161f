//! Protocol-version adapters.
//!
//! Every supported protocol range is described by a [`VersionDef`]: a
//! partial record of packet tables, constants and behavior functions. At
//! startup [`VersionRegistry::new`] sorts the records and fills every unset
//! field from the nearest lower record, producing flat [`Adapter`]s. A
//! connection resolves its adapter once, from the handshake protocol
//! number, and calls through it for every packet it emits.

mod defs;
pub mod entities;
pub mod ids;
pub mod join;
pub mod login;
pub mod ui;
pub mod world;

use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use limbo_nbt::{NbtCompound, NbtRoot, NbtTag};
use limbo_proto::codec::ProtoEncode;
use limbo_proto::packets::build_packet;
use limbo_proto::{ChatFormat, Component, VarInt};
use limbo_world::{Content, World};
use thiserror::Error;
use tracing::trace;

use crate::connection::{Identity, Outbox, PlayState};
use crate::map_cache::MapPacketCache;

pub use ids::{Clientbound, ConfigIds, Serverbound};

/// Emits one behavior for the session in `ctx`.
pub type Emit = fn(&mut Ctx<'_>);
/// Emits the respawn packet for one leg: `true` is the `rtgame:reset`
/// leg, `false` the return to `rtgame:waiting`.
pub type RespawnFn = fn(&mut Ctx<'_>, bool);
/// Plays a named sound on a channel at the spawn point.
pub type SoundFn = fn(&mut Ctx<'_>, &str, i32);
pub type ChatFn = fn(&mut Ctx<'_>, &Component);
pub type LoginSuccessFn = fn(&mut BytesMut, &Identity);
/// Sends registry data, tags and finish-configuration.
pub type ConfigureFn = fn(&Adapter, &Content, &mut Outbox);
/// Writes a filled-map item stack bound to a map id.
pub type SlotFn = fn(&Adapter, &mut BytesMut, i32);
/// Dimension type settings for `(key, infiniburn suffix)`.
pub type DimensionFn = fn(&str, &str) -> NbtCompound;

/// Entity-metadata serializer type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaTypes {
    pub byte: i32,
    pub varint: i32,
    pub chat: i32,
    pub opt_chat: i32,
    pub slot: i32,
    pub boolean: i32,
}

/// How status holograms are rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HologramStyle {
    /// Two invisible armor stands with custom names, one per line.
    /// `living` spawns them with the mob packet.
    ArmorStand { entity: i32, living: bool },
    /// One text display showing both lines.
    TextDisplay {
        entity: i32,
        text_index: u8,
        width_index: u8,
        billboard_index: u8,
        y_offset: f64,
    },
}

impl HologramStyle {
    pub fn lines(&self) -> usize {
        match self {
            HologramStyle::ArmorStand { .. } => 2,
            HologramStyle::TextDisplay { .. } => 1,
        }
    }
}

/// Wire layout of the generic object spawn packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectLayout {
    /// `i32` data, no head yaw.
    Legacy,
    /// Head yaw angle and `varint` data.
    HeadYaw,
    /// 1.21.9: velocity packed into one leading value, zero as a single byte.
    PackedVelocity,
}

/// Wire layout of the map-data packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayout {
    /// Tracking flag and a mandatory icon count.
    Tracking,
    /// No tracking flag; icons are optional.
    OptionalIcons,
}

impl MapLayout {
    fn key(self) -> &'static str {
        match self {
            MapLayout::Tracking => "tracking",
            MapLayout::OptionalIcons => "optional-icons",
        }
    }
}

/// Scheduler delays, in ticks, after the respawn pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnDelays {
    pub world: u64,
    pub sound: u64,
    pub music: u64,
}

/// One fully resolved protocol adapter.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub protocol: i32,
    pub name: &'static str,
    /// Chunk format; selects the pre-baked packet folder and registry codec.
    pub family: &'static str,
    pub map_format: Option<&'static str>,
    pub tag_format: Option<&'static str>,
    pub chat_format: ChatFormat,
    /// NBT in packets has no root name (1.20.2 and later).
    pub nameless_nbt: bool,
    pub cb: Clientbound,
    pub sb: Serverbound,
    pub config: Option<ConfigIds>,
    pub meta: MetaTypes,
    pub hologram: HologramStyle,
    pub object_layout: ObjectLayout,
    pub frame_entity: i32,
    pub frame_item_index: u8,
    pub map_item: i32,
    pub delays: RespawnDelays,

    pub login_success: LoginSuccessFn,
    pub configure: Option<ConfigureFn>,
    pub dimension: DimensionFn,
    pub join: Emit,
    pub respawn: RespawnFn,
    pub spawn: Emit,
    pub empty_chunk: fn(&Adapter, &mut BytesMut, i32, i32),
    pub time: Emit,
    pub sound: SoundFn,
    pub chat: ChatFn,
    pub tablist: Emit,
    pub inventory: Emit,
    pub map_layout: MapLayout,
    pub frame_slot: SlotFn,
}

impl Adapter {
    /// NBT compound in this adapter's packet form.
    pub fn write_nbt(&self, buf: &mut BytesMut, compound: NbtCompound) {
        if self.nameless_nbt {
            limbo_nbt::write_nbt_nameless(buf, &NbtTag::Compound(compound));
        } else {
            limbo_nbt::write_nbt(buf, &NbtRoot::new("", compound));
        }
    }

    pub fn write_chat(&self, buf: &mut BytesMut, component: &Component) {
        component.write(buf, self.chat_format);
    }

    /// Key under which this adapter's map bodies are cached. Bodies
    /// depend on both the color format and the packet layout.
    pub fn map_cache_key(&self) -> Option<String> {
        self.map_format.map(|f| format!("{f}/{}", self.map_layout.key()))
    }
}

/// A partial adapter; `None` fields are inherited from the nearest lower
/// record at registration time.
#[derive(Default)]
pub struct VersionDef {
    pub protocol: i32,
    pub name: &'static str,
    pub family: Option<&'static str>,
    pub map_format: Option<Option<&'static str>>,
    pub tag_format: Option<Option<&'static str>>,
    pub chat_format: Option<ChatFormat>,
    pub nameless_nbt: Option<bool>,
    pub cb: Option<Clientbound>,
    pub sb: Option<Serverbound>,
    pub config: Option<Option<ConfigIds>>,
    pub meta: Option<MetaTypes>,
    pub hologram: Option<HologramStyle>,
    pub object_layout: Option<ObjectLayout>,
    pub frame_entity: Option<i32>,
    pub frame_item_index: Option<u8>,
    pub map_item: Option<i32>,
    pub delays: Option<RespawnDelays>,

    pub login_success: Option<LoginSuccessFn>,
    pub configure: Option<Option<ConfigureFn>>,
    pub dimension: Option<DimensionFn>,
    pub join: Option<Emit>,
    pub respawn: Option<RespawnFn>,
    pub spawn: Option<Emit>,
    pub empty_chunk: Option<fn(&Adapter, &mut BytesMut, i32, i32)>,
    pub time: Option<Emit>,
    pub sound: Option<SoundFn>,
    pub chat: Option<ChatFn>,
    pub tablist: Option<Emit>,
    pub inventory: Option<Emit>,
    pub map_layout: Option<MapLayout>,
    pub frame_slot: Option<SlotFn>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("protocol {protocol} ({name}) has no {field} and nothing to inherit it from")]
    MissingBehavior {
        protocol: i32,
        name: &'static str,
        field: &'static str,
    },

    #[error("protocol {0} is defined twice")]
    Duplicate(i32),
}

macro_rules! resolve {
    ($def:ident, $base:ident, { $($field:ident),+ $(,)? }) => {
        Adapter {
            protocol: $def.protocol,
            name: $def.name,
            $(
                $field: match ($def.$field, $base) {
                    (Some(value), _) => value,
                    (None, Some(base)) => base.$field.clone(),
                    (None, None) => {
                        return Err(RegistryError::MissingBehavior {
                            protocol: $def.protocol,
                            name: $def.name,
                            field: stringify!($field),
                        })
                    }
                },
            )+
        }
    };
}

impl VersionDef {
    fn resolve(self, base: Option<&Adapter>) -> Result<Adapter, RegistryError> {
        let def = self;
        Ok(resolve!(def, base, {
            family, map_format, tag_format, chat_format, nameless_nbt, cb, sb, config, meta,
            hologram, object_layout, frame_entity, frame_item_index, map_item, delays,
            login_success, configure, dimension, join, respawn, spawn, empty_chunk, time, sound,
            chat, tablist, inventory, map_layout, frame_slot,
        }))
    }
}

/// Resolved adapters sorted by minimum protocol.
#[derive(Debug, Default)]
pub struct VersionRegistry {
    adapters: Vec<Arc<Adapter>>,
}

impl VersionRegistry {
    pub fn new(mut defs: Vec<VersionDef>) -> Result<Self, RegistryError> {
        defs.sort_by_key(|d| d.protocol);
        let mut adapters: Vec<Arc<Adapter>> = Vec::with_capacity(defs.len());
        for def in defs {
            if adapters.last().is_some_and(|a| a.protocol == def.protocol) {
                return Err(RegistryError::Duplicate(def.protocol));
            }
            let adapter = def.resolve(adapters.last().map(|a| a.as_ref()))?;
            adapters.push(Arc::new(adapter));
        }
        Ok(Self { adapters })
    }

    /// Every supported release.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(defs::all())
    }

    /// The adapter with the largest minimum protocol not above `protocol`.
    pub fn select(&self, protocol: i32) -> Option<&Arc<Adapter>> {
        let idx = self.adapters.partition_point(|a| a.protocol <= protocol);
        idx.checked_sub(1).map(|i| &self.adapters[i])
    }

    pub fn adapters(&self) -> impl Iterator<Item = &Arc<Adapter>> {
        self.adapters.iter()
    }

    /// Family names of every adapter, without duplicates.
    pub fn families(&self) -> Vec<&'static str> {
        let mut families: Vec<&'static str> = self.adapters.iter().map(|a| a.family).collect();
        families.dedup();
        families
    }
}

/// Everything an adapter function may read or write while emitting
/// packets for one session.
pub struct Ctx<'a> {
    pub v: &'a Adapter,
    pub content: &'a Content,
    pub cache: &'a mut MapPacketCache,
    pub player: &'a Identity,
    pub bedrock: bool,
    pub play: &'a mut PlayState,
    pub out: &'a mut Outbox,
}

impl Ctx<'_> {
    /// Queue a packet. Ids the adapter does not have (`-1`) are dropped.
    pub fn send(&mut self, id: i32, body: impl FnOnce(&mut BytesMut)) {
        if id < 0 {
            trace!(player = %self.player.name, "packet not present in {}, skipped", self.v.name);
            return;
        }
        self.out.packet(build_packet(id, body));
    }

    pub fn world(&self) -> Arc<World> {
        self.play.world.clone()
    }

    /// A fresh local entity id.
    pub fn next_entity_id(&mut self) -> i32 {
        let id = self.play.next_entity_id;
        self.play.next_entity_id += 1;
        id
    }
}

pub(crate) fn varint(buf: &mut impl BufMut, value: i32) {
    VarInt(value).proto_encode(buf);
}
