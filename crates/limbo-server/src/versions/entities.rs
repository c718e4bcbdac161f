//! Client-side entities: map frames, status holograms and debug markers.
//!
//! None of these exist on the server; they are spawned into the client's
//! world with ids from the session's counter and forgotten on respawn.

use bytes::{BufMut, Bytes, BytesMut};
use limbo_nbt::{NbtCompound, NbtTag};
use limbo_proto::codec::{write_bool, write_byte_array, write_string, ProtoEncode};
use limbo_proto::{BlockPos, Component, Uuid};
use limbo_world::map::{tile_position, MAP_SIZE};
use limbo_world::{Direction, HologramPlacement, Map, MapPart};
use tracing::warn;

use super::{varint, Adapter, Ctx, HologramStyle, MapLayout, ObjectLayout};

pub const MARKER_CHANNEL: &str = "minecraft:debug/game_test_add_marker";
pub const CLEAR_MARKERS_CHANNEL: &str = "minecraft:debug/game_test_clear";

const SPAWN_MARKER: [u8; 3] = [0, 100, 0];
const PORTAL_MARKER: [u8; 3] = [0, 150, 0];
const MAP_MARKER: [u8; 3] = [0, 125, 0];

const INVISIBLE: u8 = 0x20;
const HOLOGRAM_LINE_SPACING: f64 = 0.3;
const ARMOR_STAND_DROP: f64 = 2.0;
const TEXT_DISPLAY_WIDTH: i32 = 150;
const BILLBOARD_CENTER: u8 = 3;
const ARMOR_STAND_NAME: u8 = 2;
const ARMOR_STAND_NAME_VISIBLE: u8 = 3;
const ARMOR_STAND_NO_GRAVITY: u8 = 5;

/// Upper half of every client-side entity uuid.
const UUID_PREFIX: u128 = 0x6c69_6d62_6f00_0000 << 64;

fn entity_uuid(eid: i32) -> Uuid {
    Uuid(UUID_PREFIX | eid as u32 as u128)
}

fn meta_entry(buf: &mut BytesMut, index: u8, kind: i32) {
    buf.put_u8(index);
    varint(buf, kind);
}

fn spawn_object(ctx: &mut Ctx<'_>, kind: i32, pos: [f64; 3], data: i32) -> i32 {
    let eid = ctx.next_entity_id();
    let layout = ctx.v.object_layout;
    ctx.send(ctx.v.cb.spawn_entity, |buf| {
        varint(buf, eid);
        entity_uuid(eid).proto_encode(buf);
        varint(buf, kind);
        for c in pos {
            buf.put_f64(c);
        }
        if layout == ObjectLayout::PackedVelocity {
            buf.put_u8(0);
        }
        // pitch, yaw
        buf.put_u8(0);
        buf.put_u8(0);
        match layout {
            ObjectLayout::Legacy => buf.put_i32(data),
            ObjectLayout::HeadYaw | ObjectLayout::PackedVelocity => {
                buf.put_u8(0);
                varint(buf, data);
            }
        }
        if layout != ObjectLayout::PackedVelocity {
            for _ in 0..3 {
                buf.put_i16(0);
            }
        }
    });
    eid
}

/// Mob spawn packet, used for armor stands before 1.19.
fn spawn_living(ctx: &mut Ctx<'_>, kind: i32, pos: [f64; 3]) -> i32 {
    let eid = ctx.next_entity_id();
    ctx.send(ctx.v.cb.spawn_living, |buf| {
        varint(buf, eid);
        entity_uuid(eid).proto_encode(buf);
        varint(buf, kind);
        for c in pos {
            buf.put_f64(c);
        }
        // yaw, pitch, head pitch, velocity
        buf.put_bytes(0, 3);
        for _ in 0..3 {
            buf.put_i16(0);
        }
    });
    eid
}

/// Item stack with an NBT tag, named or not per the adapter.
pub fn slot_nbt(v: &Adapter, buf: &mut BytesMut, map_id: i32) {
    write_bool(buf, true);
    varint(buf, v.map_item);
    buf.put_i8(1);
    let mut tag = NbtCompound::new();
    tag.insert("map".into(), NbtTag::Int(map_id));
    v.write_nbt(buf, tag);
}

fn slot_components(v: &Adapter, buf: &mut BytesMut, map_id: i32, component: i32) {
    varint(buf, 1);
    varint(buf, v.map_item);
    // one added component, none removed
    varint(buf, 1);
    varint(buf, 0);
    varint(buf, component);
    varint(buf, map_id);
}

/// 1.20.5 and 1.21: `map_id` is data component 26.
pub fn slot_components_1_20_5(v: &Adapter, buf: &mut BytesMut, map_id: i32) {
    slot_components(v, buf, map_id, 26);
}

/// 1.21.2: `map_id` moved to 36.
pub fn slot_components_1_21_2(v: &Adapter, buf: &mut BytesMut, map_id: i32) {
    slot_components(v, buf, map_id, 36);
}

/// 1.21.5: 37.
pub fn slot_components_1_21_5(v: &Adapter, buf: &mut BytesMut, map_id: i32) {
    slot_components(v, buf, map_id, 37);
}

/// Invisible frame facing `facing`, holding the filled map `map_id`.
pub fn spawn_frame(ctx: &mut Ctx<'_>, pos: [f64; 3], facing: Direction, map_id: i32) -> i32 {
    let v = ctx.v;
    let eid = spawn_object(ctx, v.frame_entity, pos, facing.id());
    ctx.send(v.cb.entity_data, |buf| {
        varint(buf, eid);
        meta_entry(buf, 0, v.meta.byte);
        buf.put_u8(INVISIBLE);
        meta_entry(buf, v.frame_item_index, v.meta.slot);
        (v.frame_slot)(v, buf, map_id);
        buf.put_u8(0xFF);
    });
    eid
}

/// Map-data body for one tile, everything after the packet id.
pub fn map_body(layout: MapLayout, part: &MapPart) -> Bytes {
    let mut buf = BytesMut::with_capacity(MAP_SIZE + 16);
    varint(&mut buf, part.id);
    buf.put_i8(0);
    match layout {
        MapLayout::Tracking => {
            write_bool(&mut buf, true);
            write_bool(&mut buf, false);
            varint(&mut buf, 0);
        }
        MapLayout::OptionalIcons => {
            write_bool(&mut buf, false);
            write_bool(&mut buf, false);
        }
    }
    // full 128x128 update at offset 0,0
    buf.put_u8(128);
    buf.put_u8(128);
    buf.put_u8(0);
    buf.put_u8(0);
    write_byte_array(&mut buf, &part.colors[..]);
    buf.freeze()
}

/// Frames for every map placed in the world, then the color data of each
/// distinct map once.
pub fn send_maps(ctx: &mut Ctx<'_>, debug: bool) {
    let (v, world, content) = (ctx.v, ctx.world(), ctx.content);
    let (Some(format), Some(cache_key)) = (v.map_format, v.map_cache_key()) else {
        return;
    };

    let mut shown: Vec<&Map> = Vec::new();
    for placement in &world.maps {
        let Some(map) = content.maps.get(format, &placement.map) else {
            warn!(world = %world.name, format, "unknown map {}, skipped", placement.map);
            continue;
        };
        for xo in 0..map.width {
            for yo in 0..map.height {
                let Some(tile) = map.tile(xo, yo) else { continue };
                let pos = tile_position(placement.anchor, placement.facing, xo, yo);
                spawn_frame(ctx, pos, placement.facing, tile.id);
                if debug {
                    let [x, y, z] = pos;
                    let name = format!("{} map", placement.map);
                    marker(ctx, BlockPos::floor(x, y, z), &name, MAP_MARKER);
                }
            }
        }
        if !shown.iter().any(|m| std::ptr::eq(*m, map)) {
            shown.push(map);
        }
    }

    for map in shown {
        for tile in &map.tiles {
            let body = ctx
                .cache
                .get_or_build(&cache_key, tile.id, || map_body(v.map_layout, tile));
            ctx.send(v.cb.map_data, |buf| buf.put_slice(&body));
        }
    }
}

fn hologram_base(v: &Adapter, buf: &mut BytesMut) {
    match v.hologram {
        HologramStyle::ArmorStand { .. } => {
            meta_entry(buf, 0, v.meta.byte);
            buf.put_u8(INVISIBLE);
            meta_entry(buf, ARMOR_STAND_NO_GRAVITY, v.meta.boolean);
            write_bool(buf, true);
            meta_entry(buf, ARMOR_STAND_NAME_VISIBLE, v.meta.boolean);
            write_bool(buf, true);
        }
        HologramStyle::TextDisplay {
            width_index,
            billboard_index,
            ..
        } => {
            meta_entry(buf, width_index, v.meta.varint);
            varint(buf, TEXT_DISPLAY_WIDTH);
            meta_entry(buf, billboard_index, v.meta.byte);
            buf.put_u8(BILLBOARD_CENTER);
        }
    }
}

/// Spawn the entities of one status hologram, text left blank. Returns
/// their ids, top line first.
pub fn spawn_hologram(ctx: &mut Ctx<'_>, placement: &HologramPlacement) -> Vec<i32> {
    let v = ctx.v;
    let [x, y, z] = placement.anchor;
    let ids: Vec<i32> = match v.hologram {
        HologramStyle::ArmorStand { entity, living } => (0..v.hologram.lines())
            .map(|line| {
                let pos = [
                    x + 0.5,
                    y - ARMOR_STAND_DROP - HOLOGRAM_LINE_SPACING * line as f64,
                    z + 0.5,
                ];
                if living {
                    spawn_living(ctx, entity, pos)
                } else {
                    spawn_object(ctx, entity, pos, 0)
                }
            })
            .collect(),
        HologramStyle::TextDisplay {
            entity, y_offset, ..
        } => vec![spawn_object(ctx, entity, [x + 0.5, y + y_offset, z + 0.5], 0)],
    };
    for &eid in &ids {
        ctx.send(v.cb.entity_data, |buf| {
            varint(buf, eid);
            hologram_base(v, buf);
            buf.put_u8(0xFF);
        });
    }
    ids
}

/// Show `lines` on a hologram spawned by [`spawn_hologram`]. Armor stands
/// take one line each; a text display shows them all.
pub fn hologram_text(ctx: &mut Ctx<'_>, ids: &[i32], lines: &[Component]) {
    let v = ctx.v;
    match v.hologram {
        HologramStyle::ArmorStand { .. } => {
            for (eid, line) in ids.iter().zip(lines) {
                ctx.send(v.cb.entity_data, |buf| {
                    varint(buf, *eid);
                    meta_entry(buf, ARMOR_STAND_NAME, v.meta.opt_chat);
                    write_bool(buf, true);
                    v.write_chat(buf, line);
                    buf.put_u8(0xFF);
                });
            }
        }
        HologramStyle::TextDisplay { text_index, .. } => {
            let Some(&eid) = ids.first() else { return };
            let text = Component::join_lines(lines);
            ctx.send(v.cb.entity_data, |buf| {
                varint(buf, eid);
                meta_entry(buf, text_index, v.meta.chat);
                v.write_chat(buf, &text);
                buf.put_u8(0xFF);
            });
        }
    }
}

/// A floating debug label over one block.
pub fn marker(ctx: &mut Ctx<'_>, pos: BlockPos, name: &str, [r, g, b]: [u8; 3]) {
    let argb = u32::from_be_bytes([0xFF, r, g, b]);
    ctx.send(ctx.v.cb.custom_payload, |buf| {
        write_string(buf, MARKER_CHANNEL);
        pos.proto_encode(buf);
        buf.put_u32(argb);
        write_string(buf, name);
        buf.put_i32(i32::MAX);
    });
}

/// Markers on the spawn point and every portal block.
pub fn debug_markers(ctx: &mut Ctx<'_>) {
    let world = ctx.world();
    marker(ctx, world.spawn.block(), "Spawn", SPAWN_MARKER);
    for portal in &world.portals {
        let name = format!("Portal to {}", portal.destination);
        for block in portal.area.blocks() {
            marker(ctx, block, &name, PORTAL_MARKER);
        }
    }
}

pub fn clear_markers(ctx: &mut Ctx<'_>) {
    ctx.send(ctx.v.cb.custom_payload, |buf| {
        write_string(buf, CLEAR_MARKERS_CHANNEL)
    });
}

#[cfg(test)]
mod tests {
    use bytes::Buf;
    use limbo_proto::codec::{read_string, ProtoDecode};
    use limbo_proto::VarInt;
    use limbo_world::{Aabb, MapPlacement, Portal};

    use super::*;
    use crate::versions::tests::{registry, sample_world, split_id, Harness};

    fn read_varint(buf: &mut Bytes) -> i32 {
        VarInt::proto_decode(buf).unwrap().0
    }

    fn tile(id: i32) -> MapPart {
        MapPart {
            id,
            colors: Box::new([id as u8; MAP_SIZE]),
        }
    }

    fn harness_with_map(format: &str) -> Harness {
        let mut world = sample_world("minecraft:overworld");
        world.maps = vec![
            MapPlacement {
                map: "logo".into(),
                anchor: [1.0, 65.0, 3.0],
                facing: Direction::North,
            },
            MapPlacement {
                map: "logo".into(),
                anchor: [5.0, 65.0, 3.0],
                facing: Direction::North,
            },
            MapPlacement {
                map: "missing".into(),
                anchor: [0.0, 65.0, 0.0],
                facing: Direction::North,
            },
        ];
        let mut h = Harness::new(world);
        h.content.maps.insert(Map {
            name: "logo".into(),
            format: format.into(),
            width: 2,
            height: 1,
            tiles: vec![tile(0), tile(1)],
        });
        h
    }

    #[test]
    fn map_body_layouts() {
        let old = map_body(MapLayout::Tracking, &tile(3));
        let new = map_body(MapLayout::OptionalIcons, &tile(3));
        assert_eq!(old.len(), new.len() + 1);
        assert_eq!(&old[..5], &[3, 0, 1, 0, 0]);
        assert_eq!(&new[..4], &[3, 0, 0, 0]);
        assert_eq!(old[old.len() - 1], 3);
    }

    #[test]
    fn frames_then_distinct_map_data() {
        let reg = registry();
        let v = reg.select(763).unwrap();
        let mut h = harness_with_map("1.16");
        let packets = h.run(v, |ctx| send_maps(ctx, false));
        // two placements of a 2x1 map: 4 frames (spawn + metadata), data once
        assert_eq!(packets.len(), 4 * 2 + 2);
        let ids: Vec<i32> = packets.iter().map(|p| split_id(p.clone()).0).collect();
        assert_eq!(ids[0], v.cb.spawn_entity);
        assert_eq!(ids[1], v.cb.entity_data);
        assert_eq!(&ids[8..], &[v.cb.map_data, v.cb.map_data]);
        assert_eq!(h.cache.built(), 2);

        h.run(v, |ctx| send_maps(ctx, false));
        assert_eq!(h.cache.built(), 2);
    }

    #[test]
    fn maps_are_looked_up_by_format() {
        let reg = registry();
        let mut h = harness_with_map("1.12");
        assert!(h.run(reg.select(736).unwrap(), |ctx| send_maps(ctx, false)).is_empty());

        let v = reg.select(578).unwrap();
        assert_eq!(v.map_format, Some("1.12"));
        let packets = h.run(v, |ctx| send_maps(ctx, true));
        // frames, metadata and a marker per tile, then the data
        assert_eq!(packets.len(), 4 * 3 + 2);
    }

    #[test]
    fn frame_metadata_per_era() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        for (protocol, index) in [(578, 7), (755, 8), (769, 8), (770, 8), (771, 9), (773, 9)] {
            let v = reg.select(protocol).unwrap();
            let packets = h.run(v, |ctx| {
                spawn_frame(ctx, [0.5, 64.0, 0.5], Direction::South, 9);
            });
            let (_, mut meta) = split_id(packets[1].clone());
            read_varint(&mut meta);
            assert_eq!(meta.get_u8(), 0);
            assert_eq!(read_varint(&mut meta), v.meta.byte);
            assert_eq!(meta.get_u8(), INVISIBLE);
            assert_eq!(meta.get_u8(), index);
            assert_eq!(read_varint(&mut meta), v.meta.slot);
            assert_eq!(meta[meta.len() - 1], 0xFF);
        }
    }

    #[test]
    fn component_slot_names_map_id() {
        let reg = registry();
        let v = reg.select(768).unwrap();
        let mut buf = BytesMut::new();
        (v.frame_slot)(v, &mut buf, 5);
        let mut buf = buf.freeze();
        assert_eq!(read_varint(&mut buf), 1);
        assert_eq!(read_varint(&mut buf), v.map_item);
        assert_eq!(read_varint(&mut buf), 1);
        assert_eq!(read_varint(&mut buf), 0);
        assert_eq!(read_varint(&mut buf), 36);
        assert_eq!(read_varint(&mut buf), 5);

        let v = reg.select(770).unwrap();
        let mut buf = BytesMut::new();
        (v.frame_slot)(v, &mut buf, 5);
        let mut buf = buf.freeze();
        assert_eq!(read_varint(&mut buf), 1);
        assert_eq!(read_varint(&mut buf), 1042);
        buf.advance(2);
        assert_eq!(read_varint(&mut buf), 37);
    }

    #[test]
    fn object_spawn_drops_velocity_shorts_in_1_21_9() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let mut after_position = |protocol| {
            let packets = h.run(reg.select(protocol).unwrap(), |ctx| {
                spawn_frame(ctx, [0.5, 64.0, 0.5], Direction::South, 1);
            });
            let (_, mut body) = split_id(packets[0].clone());
            read_varint(&mut body);
            body.advance(16);
            read_varint(&mut body);
            body.advance(24);
            body
        };

        let mut old = after_position(772);
        old.advance(3);
        assert_eq!(read_varint(&mut old), Direction::South.id());
        assert_eq!(old.remaining(), 6);

        let mut packed = after_position(773);
        // zero velocity, pitch, yaw, head yaw
        assert_eq!(&packed[..4], &[0, 0, 0, 0]);
        packed.advance(4);
        assert_eq!(read_varint(&mut packed), Direction::South.id());
        assert!(packed.is_empty());
    }

    #[test]
    fn entity_ids_count_up() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let v = reg.select(578).unwrap();
        let placement = HologramPlacement {
            server: "survival".into(),
            anchor: [0.0, 66.0, 0.0],
        };
        let mut ids = Vec::new();
        h.run(v, |ctx| ids = spawn_hologram(ctx, &placement));
        assert_eq!(ids, vec![1000, 1001]);

        let v = reg.select(769).unwrap();
        h.run(v, |ctx| ids = spawn_hologram(ctx, &placement));
        assert_eq!(ids, vec![1002]);
    }

    #[test]
    fn armor_stands_take_a_line_each() {
        let reg = registry();
        let v = reg.select(759).unwrap();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let lines = [Component::text("Survival"), Component::text("12 online")];
        let packets = h.run(v, |ctx| hologram_text(ctx, &[7, 8], &lines));
        assert_eq!(packets.len(), 2);
        let (id, mut meta) = split_id(packets[1].clone());
        assert_eq!(id, v.cb.entity_data);
        assert_eq!(read_varint(&mut meta), 8);
        assert_eq!(meta.get_u8(), ARMOR_STAND_NAME);
        assert_eq!(read_varint(&mut meta), v.meta.opt_chat);
        assert_eq!(meta.get_u8(), 1);
        assert!(read_string(&mut meta).unwrap().contains("12 online"));
    }

    #[test]
    fn text_display_joins_lines() {
        let reg = registry();
        let v = reg.select(763).unwrap();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let lines = [Component::text("a"), Component::text("b")];
        let packets = h.run(v, |ctx| hologram_text(ctx, &[7], &lines));
        assert_eq!(packets.len(), 1);
        let (_, mut meta) = split_id(packets[0].clone());
        assert_eq!(read_varint(&mut meta), 7);
        assert_eq!(meta.get_u8(), 22);
        assert_eq!(read_varint(&mut meta), v.meta.chat);
        let text = read_string(&mut meta).unwrap();
        assert!(text.contains(r#""\n""#));
    }

    #[test]
    fn markers_cover_spawn_and_portal_blocks() {
        let reg = registry();
        let v = reg.select(769).unwrap();
        let mut world = sample_world("minecraft:overworld");
        world.portals = vec![Portal {
            area: Aabb::new(BlockPos::new(1, 64, 1), BlockPos::new(2, 65, 1)),
            destination: "survival".into(),
        }];
        let mut h = Harness::new(world);
        let packets = h.run(v, debug_markers);
        assert_eq!(packets.len(), 1 + 4);
        let (_, mut body) = split_id(packets[1].clone());
        assert_eq!(read_string(&mut body).unwrap(), MARKER_CHANNEL);
        body.advance(8);
        assert_eq!(body.get_u32(), 0xFF00_9600);
        assert_eq!(read_string(&mut body).unwrap(), "Portal to survival");
        assert_eq!(body.get_i32(), i32::MAX);
    }
}
