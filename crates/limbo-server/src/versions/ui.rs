//! Chat, command tree, tab list, inventory and proxy transfer packets.

use bytes::BufMut;
use limbo_proto::codec::{write_bool, write_string, write_utf, ProtoEncode};
use limbo_proto::{Component, Uuid};
use serde_json::json;

use super::{varint, Ctx};

pub const TRANSFER_CHANNEL: &str = "bungeecord:main";
const INVENTORY_SLOTS: usize = 46;
const CHAT_SYSTEM: u8 = 1;

/// Literal-node flags: literal type, executable.
const LITERAL_EXECUTABLE: u8 = 0x01 | 0x04;

pub fn tab_header() -> Component {
    Component::text("\n\u{e300}\n")
}

pub fn tab_footer() -> Component {
    Component(json!({ "translate": "" }))
}

pub fn chat_1_15(ctx: &mut Ctx<'_>, message: &Component) {
    let json = message.to_json();
    ctx.send(ctx.v.cb.chat, |buf| {
        write_string(buf, &json);
        buf.put_u8(CHAT_SYSTEM);
    });
}

/// 1.16: sender uuid.
pub fn chat_1_16(ctx: &mut Ctx<'_>, message: &Component) {
    let json = message.to_json();
    ctx.send(ctx.v.cb.chat, |buf| {
        write_string(buf, &json);
        buf.put_u8(CHAT_SYSTEM);
        Uuid(0).proto_encode(buf);
    });
}

/// 1.19: system chat packet with a varint type.
pub fn chat_1_19(ctx: &mut Ctx<'_>, message: &Component) {
    let json = message.to_json();
    ctx.send(ctx.v.cb.chat, |buf| {
        write_string(buf, &json);
        varint(buf, CHAT_SYSTEM as i32);
    });
}

/// 1.19.1 and later: overlay flag; the component follows the era's chat
/// format.
pub fn chat_1_19_1(ctx: &mut Ctx<'_>, message: &Component) {
    let v = ctx.v;
    ctx.send(v.cb.chat, |buf| {
        v.write_chat(buf, message);
        write_bool(buf, false);
    });
}

/// A root with one executable literal per command.
pub fn commands(ctx: &mut Ctx<'_>, names: &[&str]) {
    ctx.send(ctx.v.cb.commands, |buf| {
        varint(buf, names.len() as i32 + 1);
        buf.put_u8(0);
        varint(buf, names.len() as i32);
        for child in 1..=names.len() {
            varint(buf, child as i32);
        }
        for name in names {
            buf.put_u8(LITERAL_EXECUTABLE);
            varint(buf, 0);
            write_string(buf, name);
        }
        varint(buf, 0);
    });
}

fn header_footer(ctx: &mut Ctx<'_>) {
    let v = ctx.v;
    ctx.send(v.cb.tab_list, |buf| {
        v.write_chat(buf, &tab_header());
        v.write_chat(buf, &tab_footer());
    });
}

fn player_info_add(ctx: &mut Ctx<'_>, signature: bool) {
    let player = ctx.player;
    ctx.send(ctx.v.cb.player_info, |buf| {
        varint(buf, 0);
        varint(buf, 1);
        player.uuid.proto_encode(buf);
        write_string(buf, &player.name);
        varint(buf, 0);
        varint(buf, 1);
        varint(buf, 1);
        write_bool(buf, false);
        if signature {
            write_bool(buf, false);
        }
    });
}

pub fn tablist_1_15(ctx: &mut Ctx<'_>) {
    header_footer(ctx);
    player_info_add(ctx, false);
}

/// 1.19 and 1.19.1: chat signing key flag.
pub fn tablist_1_19(ctx: &mut Ctx<'_>) {
    header_footer(ctx);
    player_info_add(ctx, true);
}

/// 1.19.3: action bit set instead of a single action.
pub fn tablist_1_19_3(ctx: &mut Ctx<'_>) {
    header_footer(ctx);
    let player = ctx.player;
    ctx.send(ctx.v.cb.player_info, |buf| {
        // add, chat session, game mode, listed, latency, display name
        buf.put_u8(0b0011_1111);
        varint(buf, 1);
        player.uuid.proto_encode(buf);
        write_string(buf, &player.name);
        varint(buf, 0);
        write_bool(buf, false);
        varint(buf, 1);
        write_bool(buf, true);
        varint(buf, 1);
        write_bool(buf, false);
    });
}

/// An empty player inventory.
pub fn inventory_1_15(ctx: &mut Ctx<'_>) {
    ctx.send(ctx.v.cb.container_content, |buf| {
        buf.put_u8(0);
        buf.put_i16(INVENTORY_SLOTS as i16);
        buf.put_bytes(0, INVENTORY_SLOTS);
    });
}

/// 1.17.1: state id and carried item.
pub fn inventory_1_17_1(ctx: &mut Ctx<'_>) {
    ctx.send(ctx.v.cb.container_content, |buf| {
        buf.put_u8(0);
        varint(buf, 0);
        varint(buf, INVENTORY_SLOTS as i32);
        buf.put_bytes(0, INVENTORY_SLOTS);
        buf.put_u8(0);
    });
}

/// Ask the proxy to move the player to `server`.
pub fn transfer(ctx: &mut Ctx<'_>, server: &str) {
    ctx.send(ctx.v.cb.custom_payload, |buf| {
        write_string(buf, TRANSFER_CHANNEL);
        write_utf(buf, "Connect");
        write_utf(buf, server);
    });
}

pub fn keep_alive(ctx: &mut Ctx<'_>) {
    ctx.send(ctx.v.cb.keep_alive, |buf| buf.put_i64(0));
}

#[cfg(test)]
mod tests {
    use bytes::Buf;
    use limbo_proto::codec::{read_string, read_u16, ProtoDecode};
    use limbo_proto::VarInt;

    use super::*;
    use crate::versions::tests::{registry, sample_world, split_id, Harness};

    fn read_varint(buf: &mut bytes::Bytes) -> i32 {
        VarInt::proto_decode(buf).unwrap().0
    }

    #[test]
    fn chat_layouts() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let hello = Component::text("hi");

        let (_, mut body) = split_id(h.run(reg.select(578).unwrap(), |c| chat_1_15(c, &hello)).remove(0));
        assert_eq!(read_string(&mut body).unwrap(), r#"{"text":"hi"}"#);
        assert_eq!(body.get_u8(), 1);
        assert!(!body.has_remaining());

        let (_, body) = split_id(h.run(reg.select(736).unwrap(), |c| chat_1_16(c, &hello)).remove(0));
        assert_eq!(body.len(), 1 + 13 + 1 + 16);

        let (id, mut body) = split_id(h.run(reg.select(759).unwrap(), |c| chat_1_19(c, &hello)).remove(0));
        assert_eq!(id, 0x5F);
        read_string(&mut body).unwrap();
        assert_eq!(read_varint(&mut body), 1);

        // NBT text component from 1.20.3
        let v = reg.select(765).unwrap();
        let (_, body) = split_id(h.run(v, |c| (c.v.chat)(c, &hello)).remove(0));
        assert_eq!(body[0], 0x0A);
        assert_eq!(body[body.len() - 1], 0);
    }

    #[test]
    fn command_tree_shape() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let (_, mut body) = split_id(
            h.run(reg.select(769).unwrap(), |c| commands(c, &["spawn", "hub"]))
                .remove(0),
        );
        assert_eq!(read_varint(&mut body), 3);
        assert_eq!(body.get_u8(), 0);
        assert_eq!(read_varint(&mut body), 2);
        assert_eq!(read_varint(&mut body), 1);
        assert_eq!(read_varint(&mut body), 2);
        assert_eq!(body.get_u8(), LITERAL_EXECUTABLE);
        assert_eq!(read_varint(&mut body), 0);
        assert_eq!(read_string(&mut body).unwrap(), "spawn");
        body.advance(2);
        assert_eq!(read_string(&mut body).unwrap(), "hub");
        assert_eq!(read_varint(&mut body), 0);
        assert!(!body.has_remaining());
    }

    #[test]
    fn tablist_sends_header_and_player() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        for protocol in [578, 759, 761, 769] {
            let v = reg.select(protocol).unwrap();
            let packets = h.run(v, v.tablist);
            assert_eq!(packets.len(), 2);
            let (id, _) = split_id(packets[1].clone());
            assert_eq!(id, v.cb.player_info);
        }

        let (_, mut modern) = split_id(h.run(reg.select(761).unwrap(), tablist_1_19_3).remove(1));
        assert_eq!(modern.get_u8(), 63);
        assert_eq!(read_varint(&mut modern), 1);
        modern.advance(16);
        assert_eq!(read_string(&mut modern).unwrap(), "Steve");
    }

    #[test]
    fn inventory_sizes() {
        let reg = registry();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let (_, old) = split_id(h.run(reg.select(755).unwrap(), |c| (c.v.inventory)(c)).remove(0));
        assert_eq!(old.len(), 1 + 2 + 46);
        let (_, new) = split_id(h.run(reg.select(756).unwrap(), |c| (c.v.inventory)(c)).remove(0));
        assert_eq!(new.len(), 1 + 1 + 1 + 46 + 1);
    }

    #[test]
    fn transfer_payload() {
        let reg = registry();
        let v = reg.select(763).unwrap();
        let mut h = Harness::new(sample_world("minecraft:overworld"));
        let (id, mut body) = split_id(h.run(v, |c| transfer(c, "survival")).remove(0));
        assert_eq!(id, v.cb.custom_payload);
        assert_eq!(read_string(&mut body).unwrap(), TRANSFER_CHANNEL);
        assert_eq!(read_u16(&mut body).unwrap(), 7);
        body.advance(7);
        assert_eq!(read_u16(&mut body).unwrap(), 8);
        assert_eq!(&body[..], b"survival");
    }
}
