//! Login success bodies and the configuration phase.

use bytes::BytesMut;
use limbo_nbt::NbtTag;
use limbo_proto::codec::{write_bool, write_string, ProtoEncode};
use limbo_proto::packets::{build_packet, raw_packet};
use limbo_world::Content;
use tracing::warn;

use super::{join, varint, Adapter};
use crate::connection::{Identity, Outbox};

/// 1.15: uuid as a hyphenated string.
pub fn success_1_15(buf: &mut BytesMut, player: &Identity) {
    write_string(buf, &player.uuid.to_string());
    write_string(buf, &player.name);
}

/// 1.16: binary uuid.
pub fn success_1_16(buf: &mut BytesMut, player: &Identity) {
    player.uuid.proto_encode(buf);
    write_string(buf, &player.name);
}

/// 1.19: empty property list.
pub fn success_1_19(buf: &mut BytesMut, player: &Identity) {
    success_1_16(buf, player);
    varint(buf, 0);
}

/// 1.20.5 and 1.21: strict error handling flag.
pub fn success_1_20_5(buf: &mut BytesMut, player: &Identity) {
    success_1_19(buf, player);
    write_bool(buf, true);
}

/// 1.20.2 and 1.20.3: the whole codec in one registry packet.
pub fn configure_1_20_2(v: &Adapter, content: &Content, out: &mut Outbox) {
    let Some(ids) = v.config else { return };
    let codec = join::codec(v, content);
    out.packet(build_packet(ids.registry, |buf| {
        limbo_nbt::write_nbt_nameless(buf, &NbtTag::Compound(codec));
    }));
    finish(v, content, out);
}

/// 1.20.5 and later: one packet per registry, every entry inline.
pub fn configure_1_20_5(v: &Adapter, content: &Content, out: &mut Outbox) {
    let Some(ids) = v.config else { return };
    let codec = join::codec(v, content);

    let mut registries: Vec<_> = codec.into_iter().collect();
    registries.sort_by(|a, b| a.0.cmp(&b.0));
    for (registry, tag) in registries {
        let Some(entries) = tag
            .as_compound()
            .and_then(|c| c.get("value"))
            .and_then(NbtTag::as_list)
        else {
            warn!(registry = %registry, family = v.family, "registry has no value list, skipped");
            continue;
        };
        out.packet(build_packet(ids.registry, |buf| {
            write_string(buf, &registry);
            varint(buf, entries.len() as i32);
            for entry in entries {
                let entry = entry.as_compound();
                let name = entry
                    .and_then(|e| e.get("name"))
                    .and_then(NbtTag::as_string)
                    .unwrap_or_default();
                write_string(buf, name);
                match entry.and_then(|e| e.get("element")) {
                    Some(element) => {
                        write_bool(buf, true);
                        limbo_nbt::write_nbt_nameless(buf, element);
                    }
                    None => write_bool(buf, false),
                }
            }
        }));
    }
    finish(v, content, out);
}

/// Tags, then finish-configuration.
fn finish(v: &Adapter, content: &Content, out: &mut Outbox) {
    let Some(ids) = v.config else { return };
    match v.tag_format.and_then(|f| content.tags.get(f)) {
        Some(tags) => out.packet(raw_packet(ids.tags, tags)),
        None => warn!(version = v.name, "no tags loaded for {:?}", v.tag_format),
    }
    out.packet(raw_packet(ids.finish, &[]));
}
