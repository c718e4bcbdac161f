//! The supported releases, lowest first. Each record only names what
//! changed since the one before it.

use limbo_proto::ChatFormat;

use super::ids::*;
use super::{
    entities, join, login, ui, world, HologramStyle, MapLayout, MetaTypes, ObjectLayout,
    RespawnDelays, VersionDef,
};

const META_1_15: MetaTypes = MetaTypes {
    byte: 0,
    varint: 1,
    chat: 4,
    opt_chat: 5,
    slot: 6,
    boolean: 7,
};

/// A long type was inserted at 2.
const META_1_19_3: MetaTypes = MetaTypes {
    byte: 0,
    varint: 1,
    chat: 5,
    opt_chat: 6,
    slot: 7,
    boolean: 8,
};

const fn text_display(entity: i32, text_index: u8) -> HologramStyle {
    HologramStyle::TextDisplay {
        entity,
        text_index,
        width_index: text_index + 1,
        billboard_index: text_index - 8,
        y_offset: -0.6,
    }
}

pub(super) fn all() -> Vec<VersionDef> {
    vec![
        VersionDef {
            protocol: 578,
            name: "1.15.2",
            family: Some("1.15"),
            map_format: Some(Some("1.12")),
            tag_format: Some(None),
            chat_format: Some(ChatFormat::Json),
            nameless_nbt: Some(false),
            cb: Some(CB_1_15),
            sb: Some(SB_1_15),
            config: Some(None),
            meta: Some(META_1_15),
            hologram: Some(HologramStyle::ArmorStand {
                entity: 1,
                living: true,
            }),
            object_layout: Some(ObjectLayout::Legacy),
            frame_entity: Some(36),
            frame_item_index: Some(7),
            map_item: Some(671),
            delays: Some(RespawnDelays {
                world: 1,
                sound: 2,
                music: 20,
            }),
            login_success: Some(login::success_1_15),
            configure: Some(None),
            dimension: Some(join::dimension_1_16_2),
            join: Some(join::join_1_15),
            respawn: Some(join::respawn_1_15),
            spawn: Some(world::spawn_1_15),
            empty_chunk: Some(world::chunk_1_15),
            time: Some(world::time_1_15),
            sound: Some(world::sound_1_15),
            chat: Some(ui::chat_1_15),
            tablist: Some(ui::tablist_1_15),
            inventory: Some(ui::inventory_1_15),
            map_layout: Some(MapLayout::Tracking),
            frame_slot: Some(entities::slot_nbt),
        },
        VersionDef {
            protocol: 736,
            name: "1.16",
            family: Some("1.16"),
            map_format: Some(Some("1.16")),
            cb: Some(CB_1_16),
            sb: Some(SB_1_16),
            frame_entity: Some(38),
            map_item: Some(733),
            login_success: Some(login::success_1_16),
            join: Some(join::join_1_16),
            respawn: Some(join::respawn_1_16),
            empty_chunk: Some(world::chunk_1_16),
            chat: Some(ui::chat_1_16),
            ..Default::default()
        },
        VersionDef {
            protocol: 751,
            name: "1.16.2",
            family: Some("1.16.2"),
            cb: Some(CB_1_16_2),
            join: Some(join::join_1_16_2),
            respawn: Some(join::respawn_1_16_2),
            empty_chunk: Some(world::chunk_1_16_2),
            ..Default::default()
        },
        VersionDef {
            protocol: 755,
            name: "1.17",
            family: Some("1.17"),
            cb: Some(CB_1_17),
            sb: Some(SB_1_17),
            frame_entity: Some(32),
            frame_item_index: Some(8),
            map_item: Some(847),
            dimension: Some(join::dimension_1_17),
            spawn: Some(world::spawn_1_17),
            empty_chunk: Some(world::chunk_1_17),
            map_layout: Some(MapLayout::OptionalIcons),
            ..Default::default()
        },
        VersionDef {
            protocol: 756,
            name: "1.17.1",
            inventory: Some(ui::inventory_1_17_1),
            ..Default::default()
        },
        VersionDef {
            protocol: 757,
            name: "1.18",
            family: Some("1.18"),
            tag_format: Some(Some("1.18")),
            cb: Some(CB_1_18),
            dimension: Some(join::dimension_1_18),
            join: Some(join::join_1_18),
            empty_chunk: Some(world::chunk_1_18),
            ..Default::default()
        },
        VersionDef {
            protocol: 758,
            name: "1.18.2",
            dimension: Some(join::dimension_1_18_2),
            ..Default::default()
        },
        VersionDef {
            protocol: 759,
            name: "1.19",
            family: Some("1.19"),
            tag_format: Some(Some("1.19")),
            cb: Some(CB_1_19),
            sb: Some(SB_1_19),
            hologram: Some(HologramStyle::ArmorStand {
                entity: 2,
                living: false,
            }),
            object_layout: Some(ObjectLayout::HeadYaw),
            frame_entity: Some(35),
            map_item: Some(886),
            login_success: Some(login::success_1_19),
            dimension: Some(join::dimension_1_19),
            join: Some(join::join_1_19),
            respawn: Some(join::respawn_1_19),
            sound: Some(world::sound_1_19),
            chat: Some(ui::chat_1_19),
            tablist: Some(ui::tablist_1_19),
            ..Default::default()
        },
        VersionDef {
            protocol: 760,
            name: "1.19.1",
            cb: Some(CB_1_19_1),
            sb: Some(SB_1_19_1),
            chat: Some(ui::chat_1_19_1),
            ..Default::default()
        },
        VersionDef {
            protocol: 761,
            name: "1.19.3",
            family: Some("1.19.3"),
            tag_format: Some(Some("1.19.3")),
            cb: Some(CB_1_19_3),
            sb: Some(SB_1_19_3),
            meta: Some(META_1_19_3),
            frame_entity: Some(36),
            map_item: Some(914),
            sound: Some(world::sound_1_19_3),
            tablist: Some(ui::tablist_1_19_3),
            ..Default::default()
        },
        VersionDef {
            protocol: 762,
            name: "1.19.4",
            family: Some("1.19.4"),
            tag_format: Some(Some("1.19.4")),
            cb: Some(CB_1_19_4),
            sb: Some(SB_1_19_4),
            hologram: Some(text_display(100, 22)),
            frame_entity: Some(43),
            map_item: Some(937),
            spawn: Some(world::spawn_1_19_4),
            ..Default::default()
        },
        VersionDef {
            protocol: 763,
            name: "1.20",
            family: Some("1.20"),
            tag_format: Some(Some("1.20")),
            map_item: Some(941),
            join: Some(join::join_1_20),
            respawn: Some(join::respawn_1_20),
            empty_chunk: Some(world::chunk_1_20),
            ..Default::default()
        },
        VersionDef {
            protocol: 764,
            name: "1.20.2",
            family: Some("1.20.2"),
            tag_format: Some(Some("1.20.2")),
            nameless_nbt: Some(true),
            cb: Some(CB_1_20_2),
            sb: Some(SB_1_20_2),
            config: Some(Some(CONFIG_1_20_2)),
            hologram: Some(text_display(100, 23)),
            configure: Some(Some(login::configure_1_20_2)),
            join: Some(join::join_1_20_2),
            respawn: Some(join::respawn_1_20_2),
            ..Default::default()
        },
        VersionDef {
            protocol: 765,
            name: "1.20.3",
            family: Some("1.20.3"),
            tag_format: Some(Some("1.20.3")),
            chat_format: Some(ChatFormat::Nbt),
            cb: Some(CB_1_20_3),
            sb: Some(SB_1_20_3),
            config: Some(Some(CONFIG_1_20_3)),
            hologram: Some(text_display(101, 23)),
            frame_entity: Some(44),
            map_item: Some(979),
            spawn: Some(world::spawn_1_20_3),
            ..Default::default()
        },
        VersionDef {
            protocol: 766,
            name: "1.20.5",
            family: Some("1.20.5"),
            tag_format: Some(Some("1.20.5")),
            cb: Some(CB_1_20_5),
            sb: Some(SB_1_20_5),
            config: Some(Some(CONFIG_1_20_5)),
            hologram: Some(text_display(105, 23)),
            frame_entity: Some(47),
            map_item: Some(982),
            login_success: Some(login::success_1_20_5),
            configure: Some(Some(login::configure_1_20_5)),
            join: Some(join::join_1_20_5),
            respawn: Some(join::respawn_1_20_5),
            frame_slot: Some(entities::slot_components_1_20_5),
            ..Default::default()
        },
        VersionDef {
            protocol: 767,
            name: "1.21",
            family: Some("1.21"),
            map_format: Some(Some("1.17")),
            tag_format: Some(Some("1.21")),
            ..Default::default()
        },
        VersionDef {
            protocol: 768,
            name: "1.21.2",
            family: Some("1.21.2"),
            tag_format: Some(Some("1.21.2")),
            cb: Some(CB_1_21_2),
            sb: Some(SB_1_21_2),
            hologram: Some(text_display(125, 23)),
            frame_entity: Some(58),
            map_item: Some(1022),
            login_success: Some(login::success_1_19),
            join: Some(join::join_1_21_2),
            respawn: Some(join::respawn_1_21_2),
            spawn: Some(world::spawn_1_21_2),
            time: Some(world::time_1_21_2),
            frame_slot: Some(entities::slot_components_1_21_2),
            ..Default::default()
        },
        VersionDef {
            protocol: 769,
            name: "1.21.4",
            family: Some("1.21.4"),
            tag_format: Some(Some("1.21.4")),
            hologram: Some(text_display(124, 23)),
            frame_entity: Some(57),
            map_item: Some(1031),
            ..Default::default()
        },
        VersionDef {
            protocol: 770,
            name: "1.21.5",
            family: Some("1.21.5"),
            tag_format: Some(Some("1.21.5")),
            chat_format: Some(ChatFormat::NbtSnakeEvents),
            cb: Some(CB_1_21_5),
            hologram: Some(text_display(125, 23)),
            map_item: Some(1042),
            empty_chunk: Some(world::chunk_1_21_5),
            frame_slot: Some(entities::slot_components_1_21_5),
            ..Default::default()
        },
        VersionDef {
            protocol: 771,
            name: "1.21.6",
            family: Some("1.21.6"),
            tag_format: Some(Some("1.21.6")),
            sb: Some(SB_1_21_6),
            hologram: Some(text_display(126, 23)),
            frame_entity: Some(58),
            frame_item_index: Some(9),
            map_item: Some(1059),
            ..Default::default()
        },
        VersionDef {
            protocol: 772,
            name: "1.21.7",
            family: Some("1.21.7"),
            tag_format: Some(Some("1.21.7")),
            ..Default::default()
        },
        VersionDef {
            protocol: 773,
            name: "1.21.9",
            family: Some("1.21.9"),
            tag_format: Some(Some("1.21.9")),
            cb: Some(CB_1_21_9),
            hologram: Some(text_display(128, 23)),
            object_layout: Some(ObjectLayout::PackedVelocity),
            frame_entity: Some(59),
            map_item: Some(1104),
            spawn: Some(world::spawn_1_21_9),
            ..Default::default()
        },
    ]
}
