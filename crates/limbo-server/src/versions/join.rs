//! Join-game and respawn packets, and the dimension data they carry.
//!
//! The client only rebuilds its world when the dimension or world name
//! changes, so every world switch is a respawn into `rtgame:reset` followed
//! by a respawn back into `rtgame:waiting`.

use bytes::{BufMut, BytesMut};
use limbo_nbt::{NbtCompound, NbtRoot, NbtTag};
use limbo_proto::codec::{write_bool, write_string};
use limbo_world::{Content, World};
use tracing::warn;

use super::{varint, Adapter, Ctx};

pub const WAITING: &str = "rtgame:waiting";
pub const RESET: &str = "rtgame:reset";

/// `(key, infiniburn suffix)` in registry order.
pub const STANDARD_DIMENSIONS: [(&str, &str); 3] = [
    ("minecraft:overworld", "overworld"),
    ("minecraft:the_nether", "nether"),
    ("minecraft:the_end", "end"),
];

const VOID_BIOME: &str = "minecraft:the_void";
const VOID_COLORS: [&str; 4] = ["sky_color", "fog_color", "water_color", "water_fog_color"];

fn compound<const N: usize>(entries: [(&str, NbtTag); N]) -> NbtCompound {
    entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

/// Registry index of a world's dimension. Anything unknown is the
/// overworld.
pub fn dimension_id(dimension: &str) -> usize {
    match dimension {
        "minecraft:the_nether" | "minecraft:nether" => 1,
        "minecraft:the_end" | "minecraft:end" => 2,
        _ => 0,
    }
}

/// Registry key of a world's dimension.
pub fn dimension_key(dimension: &str) -> &'static str {
    STANDARD_DIMENSIONS[dimension_id(dimension)].0
}

/// Pre-1.16 numeric dimension.
pub fn legacy_dimension(dimension: &str) -> i32 {
    match dimension_id(dimension) {
        1 => -1,
        2 => 1,
        _ => 0,
    }
}

fn settings(key: &str, infiniburn: String) -> NbtCompound {
    compound([
        ("piglin_safe", NbtTag::Byte(0)),
        ("natural", NbtTag::Byte(1)),
        ("ambient_light", NbtTag::Float(0.0)),
        ("infiniburn", NbtTag::String(infiniburn)),
        ("respawn_anchor_works", NbtTag::Byte(0)),
        ("has_skylight", NbtTag::Byte(1)),
        ("bed_works", NbtTag::Byte(0)),
        ("effects", NbtTag::String(key.to_owned())),
        ("has_raids", NbtTag::Byte(0)),
        ("logical_height", NbtTag::Int(256)),
        ("coordinate_scale", NbtTag::Double(1.0)),
        ("ultrawarm", NbtTag::Byte(0)),
        ("has_ceiling", NbtTag::Byte(0)),
    ])
}

pub fn dimension_1_16_2(key: &str, suffix: &str) -> NbtCompound {
    settings(key, format!("minecraft:infiniburn_{suffix}"))
}

pub fn dimension_1_17(key: &str, suffix: &str) -> NbtCompound {
    let mut dim = dimension_1_16_2(key, suffix);
    dim.insert("min_y".into(), NbtTag::Int(0));
    dim.insert("height".into(), NbtTag::Int(256));
    dim
}

pub fn dimension_1_18(key: &str, suffix: &str) -> NbtCompound {
    let mut dim = dimension_1_16_2(key, suffix);
    dim.insert("min_y".into(), NbtTag::Int(-64));
    dim.insert("height".into(), NbtTag::Int(384));
    dim
}

/// Infiniburn became a block tag reference.
pub fn dimension_1_18_2(key: &str, suffix: &str) -> NbtCompound {
    let mut dim = dimension_1_18(key, suffix);
    dim.insert(
        "infiniburn".into(),
        NbtTag::String(format!("#minecraft:infiniburn_{suffix}")),
    );
    dim
}

pub fn dimension_1_19(key: &str, suffix: &str) -> NbtCompound {
    let mut dim = dimension_1_18_2(key, suffix);
    dim.insert("monster_spawn_block_light_limit".into(), NbtTag::Int(0));
    dim.insert("monster_spawn_light_level".into(), NbtTag::Int(0));
    dim
}

/// Settings of the world's own dimension.
pub fn dimension_element(v: &Adapter, world: &World) -> NbtCompound {
    let (key, suffix) = STANDARD_DIMENSIONS[dimension_id(&world.dimension)];
    (v.dimension)(key, suffix)
}

/// The registry codec: the family's registry file with the three standard
/// dimension types inserted and the void biome blacked out.
pub fn codec(v: &Adapter, content: &Content) -> NbtCompound {
    let mut codec = match content.registries.get(v.family) {
        Some(c) => c.clone(),
        None => {
            warn!(family = v.family, "no registry data loaded, sending dimension types only");
            NbtCompound::new()
        }
    };

    let value = STANDARD_DIMENSIONS
        .iter()
        .enumerate()
        .map(|(id, (key, suffix))| {
            NbtTag::Compound(compound([
                ("name", NbtTag::String((*key).to_owned())),
                ("id", NbtTag::Int(id as i32)),
                ("element", NbtTag::Compound((v.dimension)(key, suffix))),
            ]))
        })
        .collect();
    codec.insert(
        "minecraft:dimension_type".into(),
        NbtTag::Compound(compound([
            ("type", NbtTag::String("minecraft:dimension_type".into())),
            ("value", NbtTag::List(value)),
        ])),
    );

    darken_void_biome(&mut codec);
    codec
}

fn darken_void_biome(codec: &mut NbtCompound) {
    let Some(biomes) = codec
        .get_mut("minecraft:worldgen/biome")
        .and_then(NbtTag::as_compound_mut)
        .and_then(|b| b.get_mut("value"))
        .and_then(NbtTag::as_list_mut)
    else {
        return;
    };
    for biome in biomes.iter_mut().filter_map(NbtTag::as_compound_mut) {
        if biome.get("name").and_then(NbtTag::as_string) != Some(VOID_BIOME) {
            continue;
        }
        let effects = biome
            .get_mut("element")
            .and_then(NbtTag::as_compound_mut)
            .and_then(|e| e.get_mut("effects"))
            .and_then(NbtTag::as_compound_mut);
        if let Some(effects) = effects {
            for key in VOID_COLORS {
                effects.insert(key.into(), NbtTag::Int(0));
            }
        }
    }
}

/// 1.16 codec: a flat list of dimension entries, including a custom
/// world dimension.
fn codec_1_16(world: &World) -> NbtRoot {
    let mut names: Vec<&str> = STANDARD_DIMENSIONS.iter().map(|(k, _)| *k).collect();
    if !names.contains(&world.dimension.as_str()) {
        names.push(&world.dimension);
    }
    let entries = names
        .into_iter()
        .map(|name| {
            NbtTag::Compound(compound([
                ("name", NbtTag::String(name.to_owned())),
                ("natural", NbtTag::Byte(1)),
                ("ambient_light", NbtTag::Float(0.0)),
                ("has_ceiling", NbtTag::Byte(0)),
                ("has_skylight", NbtTag::Byte(1)),
                ("shrunk", NbtTag::Byte(0)),
                ("ultrawarm", NbtTag::Byte(0)),
                ("has_raids", NbtTag::Byte(0)),
                ("respawn_anchor_works", NbtTag::Byte(0)),
                ("bed_works", NbtTag::Byte(0)),
                ("piglin_safe", NbtTag::Byte(0)),
                ("logical_height", NbtTag::Int(255)),
                ("infiniburn", NbtTag::String("minecraft:infiniburn_end".into())),
            ]))
        })
        .collect();
    NbtRoot::new("", compound([("dimension", NbtTag::List(entries))]))
}

fn world_names(buf: &mut BytesMut) {
    varint(buf, 2);
    write_string(buf, WAITING);
    write_string(buf, RESET);
}

fn world_name(reset: bool) -> &'static str {
    if reset {
        RESET
    } else {
        WAITING
    }
}

pub fn join_1_15(ctx: &mut Ctx<'_>) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.login, |buf| {
        buf.put_i32(0);
        buf.put_u8(1);
        buf.put_i32(legacy_dimension(&world.dimension));
        buf.put_i64(0);
        buf.put_u8(0);
        write_string(buf, "default");
        varint(buf, 7);
        write_bool(buf, false);
        write_bool(buf, true);
    });
}

pub fn join_1_16(ctx: &mut Ctx<'_>) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.login, |buf| {
        buf.put_i32(0);
        buf.put_u8(1);
        buf.put_u8(1);
        world_names(buf);
        limbo_nbt::write_nbt(buf, &codec_1_16(&world));
        write_string(buf, &world.dimension);
        write_string(buf, WAITING);
        buf.put_i64(0);
        buf.put_u8(0);
        varint(buf, 7);
        for flag in [false, true, false, false] {
            write_bool(buf, flag);
        }
    });
}

/// 1.16.2 up to 1.18.2: codec and dimension element both inline.
fn join_with_element(ctx: &mut Ctx<'_>, simulation_distance: bool) {
    let (v, world) = (ctx.v, ctx.world());
    let codec = codec(v, ctx.content);
    ctx.send(v.cb.login, |buf| {
        buf.put_i32(0);
        write_bool(buf, false);
        buf.put_u8(1);
        buf.put_i8(1);
        world_names(buf);
        v.write_nbt(buf, codec);
        v.write_nbt(buf, dimension_element(v, &world));
        write_string(buf, WAITING);
        buf.put_i64(0);
        varint(buf, 0);
        varint(buf, 7);
        if simulation_distance {
            varint(buf, 0);
        }
        for flag in [false, true, false, false] {
            write_bool(buf, flag);
        }
    });
}

pub fn join_1_16_2(ctx: &mut Ctx<'_>) {
    join_with_element(ctx, false);
}

pub fn join_1_18(ctx: &mut Ctx<'_>) {
    join_with_element(ctx, true);
}

/// 1.19 and 1.20: dimension by registry key, optional portal cooldown.
fn join_with_key(ctx: &mut Ctx<'_>, portal_cooldown: bool) {
    let (v, world) = (ctx.v, ctx.world());
    let codec = codec(v, ctx.content);
    ctx.send(v.cb.login, |buf| {
        buf.put_i32(0);
        write_bool(buf, false);
        buf.put_u8(1);
        buf.put_i8(1);
        world_names(buf);
        v.write_nbt(buf, codec);
        write_string(buf, dimension_key(&world.dimension));
        write_string(buf, WAITING);
        buf.put_i64(0);
        varint(buf, 0);
        varint(buf, 7);
        varint(buf, 0);
        // reduced debug, respawn screen, debug, flat, death location
        for flag in [false, true, false, false, false] {
            write_bool(buf, flag);
        }
        if portal_cooldown {
            varint(buf, 0);
        }
    });
}

pub fn join_1_19(ctx: &mut Ctx<'_>) {
    join_with_key(ctx, false);
}

pub fn join_1_20(ctx: &mut Ctx<'_>) {
    join_with_key(ctx, true);
}

/// How 1.20.2 and later name the spawn dimension.
#[derive(Clone, Copy)]
enum DimensionRef {
    Key,
    Id,
}

fn write_dimension(buf: &mut BytesMut, world: &World, by: DimensionRef) {
    match by {
        DimensionRef::Key => write_string(buf, dimension_key(&world.dimension)),
        DimensionRef::Id => varint(buf, dimension_id(&world.dimension) as i32),
    }
}

/// 1.20.2 and later: registries went to the configuration phase.
fn join_configured(ctx: &mut Ctx<'_>, by: DimensionRef, sea_level: Option<i32>) {
    let (v, world) = (ctx.v, ctx.world());
    ctx.send(v.cb.login, |buf| {
        buf.put_i32(0);
        write_bool(buf, false);
        world_names(buf);
        varint(buf, 0);
        varint(buf, 7);
        varint(buf, 0);
        // reduced debug, respawn screen, limited crafting
        for flag in [false, true, false] {
            write_bool(buf, flag);
        }
        write_dimension(buf, &world, by);
        write_string(buf, WAITING);
        buf.put_i64(0);
        buf.put_u8(1);
        buf.put_i8(1);
        // debug, flat, death location
        for flag in [false, false, false] {
            write_bool(buf, flag);
        }
        varint(buf, 0);
        if let Some(sea_level) = sea_level {
            varint(buf, sea_level);
        }
        if matches!(by, DimensionRef::Id) {
            // enforces secure chat
            write_bool(buf, false);
        }
    });
}

pub fn join_1_20_2(ctx: &mut Ctx<'_>) {
    join_configured(ctx, DimensionRef::Key, None);
}

pub fn join_1_20_5(ctx: &mut Ctx<'_>) {
    join_configured(ctx, DimensionRef::Id, None);
}

pub fn join_1_21_2(ctx: &mut Ctx<'_>) {
    join_configured(ctx, DimensionRef::Id, Some(64));
}

pub fn respawn_1_15(ctx: &mut Ctx<'_>, reset: bool) {
    let world = ctx.world();
    let waiting = legacy_dimension(&world.dimension);
    let dimension = match (reset, waiting) {
        (false, dim) => dim,
        (true, 1) => 0,
        (true, _) => 1,
    };
    ctx.send(ctx.v.cb.respawn, |buf| {
        buf.put_i32(dimension);
        buf.put_i64(0);
        buf.put_u8(1);
        write_string(buf, "default");
    });
}

pub fn respawn_1_16(ctx: &mut Ctx<'_>, reset: bool) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.respawn, |buf| {
        let dimension = if reset { STANDARD_DIMENSIONS[0].0 } else { world.dimension.as_str() };
        write_string(buf, dimension);
        write_string(buf, world_name(reset));
        buf.put_i64(0);
        buf.put_u8(1);
        buf.put_u8(1);
        for flag in [false, false, true] {
            write_bool(buf, flag);
        }
    });
}

pub fn respawn_1_16_2(ctx: &mut Ctx<'_>, reset: bool) {
    let (v, world) = (ctx.v, ctx.world());
    ctx.send(v.cb.respawn, |buf| {
        v.write_nbt(buf, dimension_element(v, &world));
        write_string(buf, world_name(reset));
        buf.put_i64(0);
        buf.put_u8(1);
        buf.put_u8(1);
        for flag in [false, false, true] {
            write_bool(buf, flag);
        }
    });
}

fn respawn_with_key(ctx: &mut Ctx<'_>, reset: bool, portal_cooldown: bool) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.respawn, |buf| {
        write_string(buf, dimension_key(&world.dimension));
        write_string(buf, world_name(reset));
        buf.put_i64(0);
        buf.put_u8(1);
        buf.put_u8(1);
        // debug, flat, copy metadata, death location
        for flag in [false, false, true, false] {
            write_bool(buf, flag);
        }
        if portal_cooldown {
            varint(buf, 0);
        }
    });
}

pub fn respawn_1_19(ctx: &mut Ctx<'_>, reset: bool) {
    respawn_with_key(ctx, reset, false);
}

pub fn respawn_1_20(ctx: &mut Ctx<'_>, reset: bool) {
    respawn_with_key(ctx, reset, true);
}

fn respawn_configured(ctx: &mut Ctx<'_>, reset: bool, by: DimensionRef, sea_level: Option<i32>) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.respawn, |buf| {
        write_dimension(buf, &world, by);
        write_string(buf, world_name(reset));
        buf.put_i64(0);
        buf.put_u8(1);
        buf.put_i8(1);
        // debug, flat, death location
        for flag in [false, false, false] {
            write_bool(buf, flag);
        }
        varint(buf, 0);
        if let Some(sea_level) = sea_level {
            varint(buf, sea_level);
        }
        // data kept
        buf.put_u8(0);
    });
}

pub fn respawn_1_20_2(ctx: &mut Ctx<'_>, reset: bool) {
    respawn_configured(ctx, reset, DimensionRef::Key, None);
}

pub fn respawn_1_20_5(ctx: &mut Ctx<'_>, reset: bool) {
    respawn_configured(ctx, reset, DimensionRef::Id, None);
}

pub fn respawn_1_21_2(ctx: &mut Ctx<'_>, reset: bool) {
    respawn_configured(ctx, reset, DimensionRef::Id, Some(64));
}

#[cfg(test)]
mod tests {
    use bytes::Buf;
    use limbo_proto::codec::read_string;

    use super::*;
    use crate::versions::tests::{registry, sample_world, split_id, Harness};

    #[test]
    fn dimension_lookup() {
        assert_eq!(dimension_id("minecraft:the_nether"), 1);
        assert_eq!(dimension_key("minecraft:end"), "minecraft:the_end");
        assert_eq!(dimension_key("custom:space"), "minecraft:overworld");
        assert_eq!(legacy_dimension("minecraft:the_nether"), -1);
        assert_eq!(legacy_dimension("minecraft:the_end"), 1);
        assert_eq!(legacy_dimension("minecraft:overworld"), 0);
    }

    #[test]
    fn dimension_settings_by_era() {
        let old = dimension_1_16_2("minecraft:overworld", "overworld");
        assert!(!old.contains_key("min_y"));
        assert_eq!(
            old["infiniburn"].as_string(),
            Some("minecraft:infiniburn_overworld")
        );

        let tall = dimension_1_18("minecraft:overworld", "overworld");
        assert_eq!(tall["min_y"].as_int(), Some(-64));
        assert_eq!(tall["height"].as_int(), Some(384));

        let new = dimension_1_19("minecraft:the_end", "end");
        assert_eq!(new["infiniburn"].as_string(), Some("#minecraft:infiniburn_end"));
        assert_eq!(new["effects"].as_string(), Some("minecraft:the_end"));
        assert!(new.contains_key("monster_spawn_light_level"));
    }

    #[test]
    fn codec_inserts_dimensions_and_darkens_void() {
        let reg = registry();
        let v = reg.select(759).unwrap();

        let void = compound([
            ("name", NbtTag::String(VOID_BIOME.into())),
            ("id", NbtTag::Int(0)),
            (
                "element",
                NbtTag::Compound(compound([(
                    "effects",
                    NbtTag::Compound(compound([("sky_color", NbtTag::Int(7907327))])),
                )])),
            ),
        ]);
        let mut content = Content::default();
        content.registries.insert(
            v.family.to_owned(),
            compound([(
                "minecraft:worldgen/biome",
                NbtTag::Compound(compound([("value", NbtTag::List(vec![NbtTag::Compound(void)]))])),
            )]),
        );

        let codec = codec(v, &content);
        let dims = codec["minecraft:dimension_type"].as_compound().unwrap()["value"]
            .as_list()
            .unwrap();
        assert_eq!(dims.len(), 3);
        assert_eq!(
            dims[1].as_compound().unwrap()["name"].as_string(),
            Some("minecraft:the_nether")
        );

        let biome = &codec["minecraft:worldgen/biome"].as_compound().unwrap()["value"]
            .as_list()
            .unwrap()[0];
        let effects = biome.as_compound().unwrap()["element"].as_compound().unwrap()["effects"]
            .as_compound()
            .unwrap();
        for key in VOID_COLORS {
            assert_eq!(effects[key].as_int(), Some(0));
        }
    }

    #[test]
    fn legacy_join_uses_numeric_dimension() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:the_nether"));
        let packets = h.run(reg.select(578).unwrap(), join_1_15);
        let (id, mut body) = split_id(packets[0].clone());
        assert_eq!(id, 0x26);
        assert_eq!(body.get_i32(), 0);
        assert_eq!(body.get_u8(), 1);
        assert_eq!(body.get_i32(), -1);
    }

    #[test]
    fn legacy_respawn_legs_differ() {
        let reg = registry();
        let v = reg.select(578).unwrap();
        for (dimension, reset_dim) in [("minecraft:the_end", 0), ("minecraft:overworld", 1)] {
            let mut h = Harness::new(sample_world(dimension));
            let packets = h.run(v, |ctx| {
                respawn_1_15(ctx, true);
                respawn_1_15(ctx, false);
            });
            let (_, mut reset) = split_id(packets[0].clone());
            let (_, mut waiting) = split_id(packets[1].clone());
            assert_eq!(reset.get_i32(), reset_dim);
            assert_eq!(waiting.get_i32(), legacy_dimension(dimension));
        }
    }

    #[test]
    fn respawn_switches_world_name() {
        let reg = registry();
        let v = reg.select(763).unwrap();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let packets = h.run(v, |ctx| {
            (ctx.v.respawn)(ctx, true);
            (ctx.v.respawn)(ctx, false);
        });
        let names: Vec<String> = packets
            .into_iter()
            .map(|p| {
                let (_, mut body) = split_id(p);
                assert_eq!(read_string(&mut body).unwrap(), "minecraft:overworld");
                read_string(&mut body).unwrap()
            })
            .collect();
        assert_eq!(names, vec![RESET, WAITING]);
    }

    #[test]
    fn configured_join_ends_with_flags() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:the_end"));

        let v = reg.select(764).unwrap();
        let (_, body_1_20_2) = split_id(h.run(v, join_1_20_2).remove(0));
        let v = reg.select(766).unwrap();
        let (_, body_1_20_5) = split_id(h.run(v, join_1_20_5).remove(0));
        let v = reg.select(768).unwrap();
        let (_, body_1_21_2) = split_id(h.run(v, join_1_21_2).remove(0));

        // key "minecraft:the_end" (18 bytes) became a 1-byte id, plus secure chat
        assert_eq!(body_1_20_2.len() - 17 + 1, body_1_20_5.len());
        // sea level 64 is one varint byte
        assert_eq!(body_1_20_5.len() + 1, body_1_21_2.len());
        assert_eq!(body_1_21_2[body_1_21_2.len() - 2], 64);
    }
}
