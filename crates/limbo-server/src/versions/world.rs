//! Spawn, environment, sound and chunk packets.

use bytes::{BufMut, BytesMut};
use limbo_nbt::{NbtCompound, NbtTag};
use limbo_proto::codec::{write_bool, write_string, ProtoEncode};
use limbo_proto::packets::raw_packet;
use tracing::debug;

use super::join::dimension_key;
use super::{varint, Adapter, Ctx};

pub const TELEPORT_SOUND: &str = "minecraft:entity.enderman.teleport";
pub const RESET_SOUND: &str = "minecraft:item.trident.thunder";
/// Vanilla background music stopped before the world's own track plays.
pub const VANILLA_MUSIC: [&str; 2] = ["minecraft:music.game", "minecraft:music.creative"];

pub const MUSIC_CHANNEL: i32 = 2;
pub const PLAYER_CHANNEL: i32 = 6;

/// Chunk radius cleared around the origin for Bedrock players.
pub const RESET_RADIUS: i32 = 8;
/// Chunk cache radius announced from 1.21.9.
const VIEW_DISTANCE: i32 = 10;

const LEVEL_EVENT_ENDER_EYE: i32 = 2003;
const GAME_EVENT_END_RAIN: u8 = 1;
const GAME_EVENT_BEGIN_RAIN: u8 = 2;
const GAME_EVENT_LEVEL_CHUNKS: u8 = 13;
const STOP_SOUND_BY_NAME: u8 = 2;
const VOID_BIOME: i32 = 127;

pub fn spawn_1_15(ctx: &mut Ctx<'_>) {
    position_with_dismount(ctx, false);
}

/// 1.17 to 1.19.3: dismount flag.
pub fn spawn_1_17(ctx: &mut Ctx<'_>) {
    position_with_dismount(ctx, true);
}

fn position_with_dismount(ctx: &mut Ctx<'_>, dismount: bool) {
    let spawn = ctx.world().spawn;
    ctx.send(ctx.v.cb.player_position, |buf| {
        buf.put_f64(spawn.x);
        buf.put_f64(spawn.y);
        buf.put_f64(spawn.z);
        buf.put_f32(spawn.yaw);
        buf.put_f32(spawn.pitch);
        buf.put_u8(0);
        varint(buf, 0);
        if dismount {
            write_bool(buf, true);
        }
    });
}

fn spawn_position(ctx: &mut Ctx<'_>) {
    let block = ctx.world().spawn.block();
    ctx.send(ctx.v.cb.spawn_position, |buf| {
        block.proto_encode(buf);
        buf.put_f32(0.0);
    });
}

/// 1.19.4 and later center the player on the spawn block.
pub fn spawn_1_19_4(ctx: &mut Ctx<'_>) {
    spawn_position(ctx);
    let spawn = ctx.world().spawn;
    ctx.send(ctx.v.cb.player_position, |buf| {
        buf.put_f64(spawn.x + 0.5);
        buf.put_f64(spawn.y);
        buf.put_f64(spawn.z + 0.5);
        buf.put_f32(spawn.yaw);
        buf.put_f32(spawn.pitch);
        buf.put_u8(0);
        varint(buf, 0);
    });
}

/// 1.20.3: the client waits for a level-chunks game event before it
/// leaves the loading screen.
pub fn spawn_1_20_3(ctx: &mut Ctx<'_>) {
    spawn_1_19_4(ctx);
    game_event(ctx, GAME_EVENT_LEVEL_CHUNKS);
}

/// 1.21.2: teleport id first, velocity, and an int flag set.
pub fn spawn_1_21_2(ctx: &mut Ctx<'_>) {
    spawn_position(ctx);
    teleport_1_21_2(ctx);
    game_event(ctx, GAME_EVENT_LEVEL_CHUNKS);
}

/// 1.21.9: the chunk cache is centered explicitly and the spawn point is
/// a global position with yaw and pitch.
pub fn spawn_1_21_9(ctx: &mut Ctx<'_>) {
    ctx.send(ctx.v.cb.center_chunk, |buf| {
        varint(buf, 0);
        varint(buf, 0);
    });
    ctx.send(ctx.v.cb.chunk_radius, |buf| varint(buf, VIEW_DISTANCE));
    let world = ctx.world();
    let spawn = world.spawn;
    ctx.send(ctx.v.cb.spawn_position, |buf| {
        write_string(buf, dimension_key(&world.dimension));
        spawn.block().proto_encode(buf);
        buf.put_f32(spawn.yaw);
        buf.put_f32(spawn.pitch);
    });
    teleport_1_21_2(ctx);
    game_event(ctx, GAME_EVENT_LEVEL_CHUNKS);
}

fn teleport_1_21_2(ctx: &mut Ctx<'_>) {
    let spawn = ctx.world().spawn;
    ctx.send(ctx.v.cb.player_position, |buf| {
        varint(buf, 0);
        buf.put_f64(spawn.x + 0.5);
        buf.put_f64(spawn.y);
        buf.put_f64(spawn.z + 0.5);
        for _ in 0..3 {
            buf.put_f64(0.0);
        }
        buf.put_f32(spawn.yaw);
        buf.put_f32(spawn.pitch);
        buf.put_i32(0);
    });
}

/// Ender eye particles and a teleport sound at the spawn point.
pub fn spawn_effect(ctx: &mut Ctx<'_>) {
    let block = ctx.world().spawn.block();
    ctx.send(ctx.v.cb.level_event, |buf| {
        buf.put_i32(LEVEL_EVENT_ENDER_EYE);
        block.proto_encode(buf);
        buf.put_i32(0);
        write_bool(buf, false);
    });
    (ctx.v.sound)(ctx, TELEPORT_SOUND, PLAYER_CHANNEL);
}

fn game_event(ctx: &mut Ctx<'_>, event: u8) {
    ctx.send(ctx.v.cb.game_event, |buf| {
        buf.put_u8(event);
        buf.put_f32(0.0);
    });
}

/// Rain on or off, only when it differs from what the client was last
/// told.
pub fn weather(ctx: &mut Ctx<'_>) {
    let raining = ctx.world().weather.is_raining();
    if ctx.play.raining == Some(raining) {
        return;
    }
    ctx.play.raining = Some(raining);
    game_event(
        ctx,
        if raining {
            GAME_EVENT_BEGIN_RAIN
        } else {
            GAME_EVENT_END_RAIN
        },
    );
}

/// World age, then time of day; a negative time of day freezes the sun.
pub fn time_1_15(ctx: &mut Ctx<'_>) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.time, |buf| {
        buf.put_i64(0);
        buf.put_i64(if world.cycle { world.time } else { -world.time });
    });
}

/// 1.21.2: the cycle is an explicit flag.
pub fn time_1_21_2(ctx: &mut Ctx<'_>) {
    let world = ctx.world();
    ctx.send(ctx.v.cb.time, |buf| {
        buf.put_i64(0);
        buf.put_i64(world.time);
        write_bool(buf, world.cycle);
    });
}

fn sound_position(ctx: &Ctx<'_>) -> [i32; 3] {
    let spawn = ctx.world().spawn;
    [spawn.x, spawn.y, spawn.z].map(|c| (c * 8.0) as i32)
}

fn named_sound(ctx: &mut Ctx<'_>, name: &str, channel: i32, seed: bool) {
    let pos = sound_position(ctx);
    ctx.send(ctx.v.cb.named_sound, |buf| {
        write_string(buf, name);
        varint(buf, channel);
        for c in pos {
            buf.put_i32(c);
        }
        buf.put_f32(100_000.0);
        buf.put_f32(1.0);
        if seed {
            buf.put_i64(0);
        }
    });
}

pub fn sound_1_15(ctx: &mut Ctx<'_>, name: &str, channel: i32) {
    named_sound(ctx, name, channel, false);
}

pub fn sound_1_19(ctx: &mut Ctx<'_>, name: &str, channel: i32) {
    named_sound(ctx, name, channel, true);
}

/// 1.19.3: inline sound event (id 0) with no fixed range.
pub fn sound_1_19_3(ctx: &mut Ctx<'_>, name: &str, channel: i32) {
    let pos = sound_position(ctx);
    ctx.send(ctx.v.cb.sound, |buf| {
        varint(buf, 0);
        write_string(buf, name);
        write_bool(buf, false);
        varint(buf, channel);
        for c in pos {
            buf.put_i32(c);
        }
        buf.put_f32(100_000.0);
        buf.put_f32(1.0);
        buf.put_i64(0);
    });
}

/// Stop vanilla music, then start the world's track unless `stop_only`.
pub fn music(ctx: &mut Ctx<'_>, stop_only: bool) {
    for track in VANILLA_MUSIC {
        ctx.send(ctx.v.cb.stop_sound, |buf| {
            buf.put_u8(STOP_SOUND_BY_NAME);
            write_string(buf, track);
        });
    }
    if stop_only {
        return;
    }
    let world = ctx.world();
    if !world.music.is_empty() {
        (ctx.v.sound)(ctx, &world.music, MUSIC_CHANNEL);
    }
}

pub fn reset_sound(ctx: &mut Ctx<'_>) {
    (ctx.v.sound)(ctx, RESET_SOUND, PLAYER_CHANNEL);
}

/// Replay the world's pre-baked packets under this version's ids.
pub fn replay_packets(ctx: &mut Ctx<'_>) {
    let world = ctx.world();
    for packet in &world.packets {
        match ctx.v.cb.by_name(&packet.name) {
            Some(id) => ctx.out.packet(raw_packet(id, &packet.payload)),
            None => debug!(
                world = %world.name,
                version = ctx.v.name,
                "no id for packet {}, skipped", packet.name
            ),
        }
    }
}

/// Bedrock-filled chunks around the origin, hiding the previous world
/// from clients that keep stale chunks.
pub fn empty_chunks(ctx: &mut Ctx<'_>) {
    let v = ctx.v;
    for x in -RESET_RADIUS..RESET_RADIUS {
        for z in -RESET_RADIUS..RESET_RADIUS {
            ctx.send(v.cb.chunk, |buf| (v.empty_chunk)(v, buf, x, z));
        }
    }
}

fn heightmaps(longs: usize) -> NbtCompound {
    let mut c = NbtCompound::new();
    c.insert("MOTION_BLOCKING".into(), NbtTag::LongArray(vec![0; longs]));
    c
}

/// 1.15: full chunk, no sections, 1024 int biomes.
pub fn chunk_1_15(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    buf.put_i32(x);
    buf.put_i32(z);
    write_bool(buf, true);
    varint(buf, 0);
    v.write_nbt(buf, heightmaps(36));
    for _ in 0..1024 {
        buf.put_i32(VOID_BIOME);
    }
    varint(buf, 0);
    varint(buf, 0);
}

/// 1.16: adds "ignore old data"; heightmap entries no longer span longs.
pub fn chunk_1_16(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    buf.put_i32(x);
    buf.put_i32(z);
    write_bool(buf, true);
    write_bool(buf, true);
    varint(buf, 0);
    v.write_nbt(buf, heightmaps(37));
    for _ in 0..1024 {
        buf.put_i32(VOID_BIOME);
    }
    varint(buf, 0);
    varint(buf, 0);
}

fn varint_biomes(buf: &mut BytesMut) {
    varint(buf, 1024);
    for _ in 0..1024 {
        varint(buf, VOID_BIOME);
    }
}

/// 1.16.2: length-prefixed varint biomes.
pub fn chunk_1_16_2(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    buf.put_i32(x);
    buf.put_i32(z);
    write_bool(buf, true);
    varint(buf, 0);
    v.write_nbt(buf, heightmaps(37));
    varint_biomes(buf);
    varint(buf, 0);
    varint(buf, 0);
}

/// 1.17: section mask became a long array.
pub fn chunk_1_17(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    buf.put_i32(x);
    buf.put_i32(z);
    varint(buf, 0);
    v.write_nbt(buf, heightmaps(37));
    varint_biomes(buf);
    varint(buf, 0);
    varint(buf, 0);
}

/// 24 single-valued sections: air blocks, biome 0.
fn empty_sections() -> [u8; 24 * 8] {
    // block count (short), then two containers of bits=0, value 0, no data
    [0u8; 24 * 8]
}

fn chunk_with_light(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32, trust_edges: bool) {
    buf.put_i32(x);
    buf.put_i32(z);
    v.write_nbt(buf, heightmaps(37));
    let sections = empty_sections();
    varint(buf, sections.len() as i32);
    buf.put_slice(&sections);
    varint(buf, 0);
    if trust_edges {
        write_bool(buf, true);
    }
    // sky, block, empty sky and empty block masks; both light arrays
    for _ in 0..6 {
        varint(buf, 0);
    }
}

/// 1.18 to 1.19.4: chunk and light in one packet.
pub fn chunk_1_18(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    chunk_with_light(v, buf, x, z, true);
}

/// 1.20: no trust-edges flag.
pub fn chunk_1_20(v: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    chunk_with_light(v, buf, x, z, false);
}

/// 1.21.5: heightmaps are a prefixed array instead of NBT, and
/// single-valued containers no longer write an empty data length.
pub fn chunk_1_21_5(_: &Adapter, buf: &mut BytesMut, x: i32, z: i32) {
    buf.put_i32(x);
    buf.put_i32(z);
    varint(buf, 0);
    // block count, then blocks and biomes as bits=0 value 0
    let sections = [0u8; 24 * 6];
    varint(buf, sections.len() as i32);
    buf.put_slice(&sections);
    varint(buf, 0);
    for _ in 0..6 {
        varint(buf, 0);
    }
}

#[cfg(test)]
mod tests {
    use bytes::Buf;
    use limbo_proto::codec::{read_string, ProtoDecode};
    use limbo_proto::VarInt;
    use limbo_world::{RawPacket, Weather};

    use super::*;
    use crate::versions::tests::{registry, sample_world, split_id, Harness};

    #[test]
    fn spawn_centers_from_1_19_4() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));

        let (_, mut old) = split_id(h.run(reg.select(760).unwrap(), spawn_1_17).remove(0));
        assert_eq!(old.get_f64(), 0.5);
        assert_eq!(old.remaining(), 8 + 8 + 4 + 4 + 1 + 1 + 1);

        let packets = h.run(reg.select(762).unwrap(), spawn_1_19_4);
        assert_eq!(packets.len(), 2);
        let (id, _) = split_id(packets[0].clone());
        assert_eq!(id, 0x50);
        let (_, mut centered) = split_id(packets[1].clone());
        assert_eq!(centered.get_f64(), 1.0);
    }

    #[test]
    fn spawn_1_21_2_layout() {
        let reg = registry();
        let v = reg.select(768).unwrap();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let packets = h.run(v, spawn_1_21_2);
        assert_eq!(packets.len(), 3);
        let (id, mut pos) = split_id(packets[1].clone());
        assert_eq!(id, v.cb.player_position);
        assert_eq!(VarInt::proto_decode(&mut pos).unwrap().0, 0);
        assert_eq!(pos.remaining(), 6 * 8 + 2 * 4 + 4);
        let (id, mut event) = split_id(packets[2].clone());
        assert_eq!(id, v.cb.game_event);
        assert_eq!(event.get_u8(), GAME_EVENT_LEVEL_CHUNKS);
    }

    #[test]
    fn spawn_1_21_9_layout() {
        let reg = registry();
        let v = reg.select(773).unwrap();
        let mut world = sample_world("minecraft:the_end");
        world.spawn.pitch = 15.0;
        let mut h = Harness::new(world);
        let packets = h.run(v, spawn_1_21_9);
        let ids: Vec<i32> = packets.iter().map(|p| split_id(p.clone()).0).collect();
        assert_eq!(
            ids,
            [
                v.cb.center_chunk,
                v.cb.chunk_radius,
                v.cb.spawn_position,
                v.cb.player_position,
                v.cb.game_event,
            ]
        );

        let (_, mut radius) = split_id(packets[1].clone());
        assert_eq!(VarInt::proto_decode(&mut radius).unwrap().0, VIEW_DISTANCE);

        let (_, mut spawn) = split_id(packets[2].clone());
        assert_eq!(read_string(&mut spawn).unwrap(), "minecraft:the_end");
        spawn.advance(8);
        assert_eq!(spawn.get_f32(), 180.0);
        assert_eq!(spawn.get_f32(), 15.0);
        assert!(spawn.is_empty());

        let (_, mut pos) = split_id(packets[3].clone());
        assert_eq!(VarInt::proto_decode(&mut pos).unwrap().0, 0);
        assert_eq!(pos.get_f64(), 1.0);
    }

    #[test]
    fn weather_sent_once_per_change() {
        let reg = registry();
        let v = reg.select(578).unwrap();
        let mut world = sample_world("minecraft:overworld");
        world.weather = Weather::Rain;
        let mut h = Harness::new(world);
        let first = h.run(v, weather);
        assert_eq!(first.len(), 1);
        let (_, mut body) = split_id(first[0].clone());
        assert_eq!(body.get_u8(), GAME_EVENT_BEGIN_RAIN);
        assert!(h.run(v, weather).is_empty());
    }

    #[test]
    fn frozen_time_is_negative() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let (_, mut body) = split_id(h.run(reg.select(578).unwrap(), time_1_15).remove(0));
        assert_eq!(body.get_i64(), 0);
        assert_eq!(body.get_i64(), -6000);

        let (_, mut body) = split_id(h.run(reg.select(768).unwrap(), time_1_21_2).remove(0));
        body.advance(8);
        assert_eq!(body.get_i64(), 6000);
        assert_eq!(body.get_u8(), 0);
    }

    #[test]
    fn sound_layouts() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));

        let (id, mut old) = split_id(h.run(reg.select(578).unwrap(), reset_sound).remove(0));
        assert_eq!(id, 0x1A);
        assert_eq!(read_string(&mut old).unwrap(), RESET_SOUND);
        assert_eq!(VarInt::proto_decode(&mut old).unwrap().0, PLAYER_CHANNEL);
        assert_eq!(old.get_i32(), 4);
        assert_eq!(old.get_i32(), 512);
        assert_eq!(old.remaining(), 4 + 8);

        let v = reg.select(761).unwrap();
        let (id, mut new) = split_id(h.run(v, reset_sound).remove(0));
        assert_eq!(id, v.cb.sound);
        assert_eq!(VarInt::proto_decode(&mut new).unwrap().0, 0);
        assert_eq!(read_string(&mut new).unwrap(), RESET_SOUND);
        assert_eq!(new.get_u8(), 0);
    }

    #[test]
    fn music_stops_vanilla_first() {
        let reg = registry();
        let v = reg.select(578).unwrap();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let packets = h.run(v, |ctx| music(ctx, false));
        assert_eq!(packets.len(), 3);
        let (id, mut stop) = split_id(packets[0].clone());
        assert_eq!(id, v.cb.stop_sound);
        assert_eq!(stop.get_u8(), STOP_SOUND_BY_NAME);
        assert_eq!(read_string(&mut stop).unwrap(), VANILLA_MUSIC[0]);
        let (_, mut track) = split_id(packets[2].clone());
        assert_eq!(read_string(&mut track).unwrap(), "minecraft:music.menu");

        assert_eq!(h.run(v, |ctx| music(ctx, true)).len(), 2);
    }

    #[test]
    fn replay_maps_names_to_ids() {
        let reg = registry();
        let mut world = sample_world("minecraft:overworld");
        world.packets = vec![
            RawPacket {
                order: 0,
                name: "chunk_data".into(),
                payload: bytes::Bytes::from_static(&[1, 2, 3]),
            },
            RawPacket {
                order: 1,
                name: "mystery".into(),
                payload: bytes::Bytes::new(),
            },
        ];
        let mut h = Harness::new(world);
        let packets = h.run(reg.select(769).unwrap(), replay_packets);
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0][..], &[0x28, 1, 2, 3]);
    }

    #[test]
    fn empty_chunks_cover_the_grid() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        for protocol in [578, 736, 751, 755, 757, 763, 769, 770, 773] {
            let v = reg.select(protocol).unwrap();
            let packets = h.run(v, empty_chunks);
            assert_eq!(packets.len(), (RESET_RADIUS * 2 * RESET_RADIUS * 2) as usize);
            let (id, mut first) = split_id(packets[0].clone());
            assert_eq!(id, v.cb.chunk);
            assert_eq!(first.get_i32(), -RESET_RADIUS);
            assert_eq!(first.get_i32(), -RESET_RADIUS);
        }
    }

    #[test]
    fn modern_chunk_carries_sections() {
        let reg = registry();
        let v = reg.select(763).unwrap();
        let mut buf = BytesMut::new();
        chunk_1_20(v, &mut buf, 0, 0);
        let with_edges = {
            let mut b = BytesMut::new();
            chunk_1_18(reg.select(757).unwrap(), &mut b, 0, 0);
            b
        };
        assert_eq!(with_edges.len(), buf.len() + 1);
        // trailing light masks
        assert_eq!(&buf[buf.len() - 6..], &[0; 6]);
    }

    #[test]
    fn chunk_1_21_5_has_no_nbt_heightmaps() {
        let reg = registry();
        let v = reg.select(770).unwrap();
        let mut buf = BytesMut::new();
        (v.empty_chunk)(v, &mut buf, 3, -2);
        let mut body = buf.freeze();
        assert_eq!(body.get_i32(), 3);
        assert_eq!(body.get_i32(), -2);
        assert_eq!(VarInt::proto_decode(&mut body).unwrap().0, 0);
        assert_eq!(VarInt::proto_decode(&mut body).unwrap().0, 24 * 6);
        body.advance(24 * 6);
        assert_eq!(&body[..], &[0; 7]);
    }
}
