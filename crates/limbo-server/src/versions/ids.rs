//! Play and configuration packet ids per protocol era.
//!
//! `-1` marks a packet the era does not have; [`Ctx::send`] skips those.
//!
//! [`Ctx::send`]: super::Ctx::send

/// Clientbound play packet ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clientbound {
    pub spawn_entity: i32,
    pub spawn_living: i32,
    pub chat: i32,
    pub commands: i32,
    pub container_content: i32,
    pub custom_payload: i32,
    pub named_sound: i32,
    pub game_event: i32,
    pub keep_alive: i32,
    pub chunk: i32,
    pub level_event: i32,
    pub light: i32,
    pub login: i32,
    pub map_data: i32,
    pub player_info: i32,
    pub player_position: i32,
    pub respawn: i32,
    pub center_chunk: i32,
    pub chunk_radius: i32,
    pub spawn_position: i32,
    pub entity_data: i32,
    pub time: i32,
    pub sound: i32,
    pub stop_sound: i32,
    pub tab_list: i32,
    pub tags: i32,
}

impl Clientbound {
    /// Resolve a pre-baked packet file name to this era's id. Several names
    /// are accepted for packets that were renamed between releases.
    pub fn by_name(&self, name: &str) -> Option<i32> {
        let id = match name {
            "chunk_data" | "level_chunk_with_light" | "map_chunk" => self.chunk,
            "update_light" | "light_update" => self.light,
            "update_view_position" | "set_chunk_cache_center" => self.center_chunk,
            "update_view_distance" | "set_chunk_cache_radius" => self.chunk_radius,
            "effect" | "level_event" | "world_event" => self.level_event,
            "entity_metadata" | "set_entity_data" => self.entity_data,
            "spawn_object" | "add_entity" | "spawn_entity" => self.spawn_entity,
            "spawn_mob" | "spawn_living_entity" => self.spawn_living,
            "map" | "map_item_data" => self.map_data,
            "spawn_position" | "set_default_spawn_position" => self.spawn_position,
            "time_update" | "set_time" => self.time,
            "change_game_state" | "game_event" => self.game_event,
            "plugin_message" | "custom_payload" => self.custom_payload,
            "player_list_item" | "player_info_update" | "player_info" => self.player_info,
            "player_list_header_footer" | "tab_list" => self.tab_list,
            "window_items" | "container_set_content" => self.container_content,
            "declare_commands" | "commands" => self.commands,
            "tags" | "update_tags" => self.tags,
            _ => return None,
        };
        (id >= 0).then_some(id)
    }
}

/// Serverbound play packet ids the server reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serverbound {
    pub chat_command: i32,
    pub chat: i32,
    pub custom_payload: i32,
    pub keep_alive: i32,
    pub position: i32,
    pub position_rotation: i32,
}

/// Configuration-state ids (1.20.2 and later).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigIds {
    pub finish: i32,
    pub keep_alive: i32,
    pub registry: i32,
    pub tags: i32,
    pub finish_ack: i32,
}

pub const CB_1_15: Clientbound = Clientbound {
    spawn_entity: 0x00,
    spawn_living: 0x03,
    chat: 0x0F,
    commands: 0x12,
    container_content: 0x15,
    custom_payload: 0x19,
    named_sound: 0x1A,
    game_event: 0x1F,
    keep_alive: 0x21,
    chunk: 0x22,
    level_event: 0x23,
    light: 0x25,
    login: 0x26,
    map_data: 0x27,
    player_info: 0x34,
    player_position: 0x36,
    respawn: 0x3B,
    center_chunk: 0x41,
    chunk_radius: 0x42,
    spawn_position: 0x4E,
    entity_data: 0x44,
    time: 0x4F,
    sound: -1,
    stop_sound: 0x53,
    tab_list: 0x54,
    tags: 0x5C,
};

pub const CB_1_16: Clientbound = Clientbound {
    spawn_entity: 0x00,
    spawn_living: 0x02,
    chat: 0x0E,
    commands: 0x11,
    container_content: 0x14,
    custom_payload: 0x18,
    named_sound: 0x19,
    game_event: 0x1E,
    keep_alive: 0x20,
    chunk: 0x21,
    level_event: 0x22,
    light: 0x24,
    login: 0x25,
    map_data: 0x26,
    player_info: 0x33,
    player_position: 0x35,
    respawn: 0x3A,
    center_chunk: 0x40,
    chunk_radius: 0x41,
    spawn_position: 0x42,
    entity_data: 0x44,
    time: 0x4E,
    sound: -1,
    stop_sound: 0x52,
    tab_list: 0x53,
    tags: 0x5B,
};

pub const CB_1_16_2: Clientbound = Clientbound {
    commands: 0x10,
    container_content: 0x13,
    custom_payload: 0x17,
    named_sound: 0x18,
    game_event: 0x1D,
    keep_alive: 0x1F,
    chunk: 0x20,
    level_event: 0x21,
    light: 0x23,
    login: 0x24,
    map_data: 0x25,
    player_info: 0x32,
    player_position: 0x34,
    respawn: 0x39,
    ..CB_1_16
};

pub const CB_1_17: Clientbound = Clientbound {
    spawn_entity: 0x00,
    spawn_living: 0x02,
    chat: 0x0F,
    commands: 0x12,
    container_content: 0x14,
    custom_payload: 0x18,
    named_sound: 0x19,
    game_event: 0x1E,
    keep_alive: 0x21,
    chunk: 0x22,
    level_event: 0x23,
    light: 0x25,
    login: 0x26,
    map_data: 0x27,
    player_info: 0x36,
    player_position: 0x38,
    respawn: 0x3D,
    center_chunk: 0x49,
    chunk_radius: 0x4A,
    spawn_position: 0x4B,
    entity_data: 0x4D,
    time: 0x58,
    sound: -1,
    stop_sound: 0x5D,
    tab_list: 0x5E,
    tags: 0x66,
};

pub const CB_1_18: Clientbound = Clientbound {
    time: 0x59,
    stop_sound: 0x5E,
    tab_list: 0x5F,
    tags: 0x67,
    ..CB_1_17
};

pub const CB_1_19: Clientbound = Clientbound {
    spawn_entity: 0x00,
    spawn_living: -1,
    chat: 0x5F,
    commands: 0x0F,
    container_content: 0x11,
    custom_payload: 0x15,
    named_sound: 0x16,
    game_event: 0x1B,
    keep_alive: 0x1E,
    chunk: 0x1F,
    level_event: 0x20,
    light: 0x22,
    login: 0x23,
    map_data: 0x24,
    player_info: 0x34,
    player_position: 0x36,
    respawn: 0x3B,
    center_chunk: 0x48,
    chunk_radius: 0x49,
    spawn_position: 0x4A,
    entity_data: 0x4D,
    time: 0x59,
    sound: -1,
    stop_sound: 0x5E,
    tab_list: 0x60,
    tags: 0x68,
};

pub const CB_1_19_1: Clientbound = Clientbound {
    chat: 0x62,
    custom_payload: 0x16,
    named_sound: 0x17,
    game_event: 0x1D,
    keep_alive: 0x20,
    chunk: 0x21,
    level_event: 0x22,
    light: 0x24,
    login: 0x25,
    map_data: 0x26,
    player_info: 0x37,
    player_position: 0x39,
    respawn: 0x3E,
    center_chunk: 0x4B,
    chunk_radius: 0x4C,
    spawn_position: 0x4D,
    entity_data: 0x50,
    time: 0x5C,
    stop_sound: 0x61,
    tab_list: 0x63,
    tags: 0x6B,
    ..CB_1_19
};

pub const CB_1_19_3: Clientbound = Clientbound {
    spawn_entity: 0x00,
    spawn_living: -1,
    chat: 0x60,
    commands: 0x0E,
    container_content: 0x10,
    custom_payload: 0x15,
    named_sound: -1,
    game_event: 0x1C,
    keep_alive: 0x1F,
    chunk: 0x20,
    level_event: 0x21,
    light: 0x23,
    login: 0x24,
    map_data: 0x25,
    player_info: 0x36,
    player_position: 0x38,
    respawn: 0x3D,
    center_chunk: 0x4A,
    chunk_radius: 0x4B,
    spawn_position: 0x4C,
    entity_data: 0x4E,
    time: 0x5A,
    sound: 0x5E,
    stop_sound: 0x5F,
    tab_list: 0x61,
    tags: 0x6A,
};

pub const CB_1_19_4: Clientbound = Clientbound {
    spawn_entity: 0x01,
    spawn_living: -1,
    chat: 0x64,
    commands: 0x10,
    container_content: 0x12,
    custom_payload: 0x17,
    named_sound: -1,
    game_event: 0x1F,
    keep_alive: 0x23,
    chunk: 0x24,
    level_event: 0x25,
    light: 0x27,
    login: 0x28,
    map_data: 0x29,
    player_info: 0x3A,
    player_position: 0x3C,
    respawn: 0x41,
    center_chunk: 0x4E,
    chunk_radius: 0x4F,
    spawn_position: 0x50,
    entity_data: 0x52,
    time: 0x5E,
    sound: 0x62,
    stop_sound: 0x63,
    tab_list: 0x65,
    tags: 0x6E,
};

pub const CB_1_20_2: Clientbound = Clientbound {
    chat: 0x67,
    commands: 0x11,
    container_content: 0x13,
    custom_payload: 0x18,
    game_event: 0x20,
    keep_alive: 0x24,
    chunk: 0x25,
    level_event: 0x26,
    light: 0x28,
    login: 0x29,
    map_data: 0x2A,
    player_info: 0x3C,
    player_position: 0x3E,
    respawn: 0x43,
    center_chunk: 0x50,
    chunk_radius: 0x51,
    spawn_position: 0x52,
    entity_data: 0x54,
    time: 0x60,
    sound: 0x64,
    stop_sound: 0x66,
    tab_list: 0x68,
    tags: 0x70,
    ..CB_1_19_4
};

pub const CB_1_20_3: Clientbound = Clientbound {
    chat: 0x69,
    respawn: 0x45,
    center_chunk: 0x52,
    chunk_radius: 0x53,
    spawn_position: 0x54,
    entity_data: 0x56,
    time: 0x62,
    sound: 0x66,
    stop_sound: 0x68,
    tab_list: 0x6A,
    tags: 0x74,
    ..CB_1_20_2
};

pub const CB_1_20_5: Clientbound = Clientbound {
    spawn_entity: 0x01,
    spawn_living: -1,
    chat: 0x6C,
    commands: 0x11,
    container_content: 0x13,
    custom_payload: 0x19,
    named_sound: -1,
    game_event: 0x22,
    keep_alive: 0x26,
    chunk: 0x27,
    level_event: 0x28,
    light: 0x2A,
    login: 0x2B,
    map_data: 0x2C,
    player_info: 0x3E,
    player_position: 0x40,
    respawn: 0x47,
    center_chunk: 0x54,
    chunk_radius: 0x55,
    spawn_position: 0x56,
    entity_data: 0x58,
    time: 0x64,
    sound: 0x68,
    stop_sound: 0x6A,
    tab_list: 0x6D,
    tags: 0x78,
};

pub const CB_1_21_2: Clientbound = Clientbound {
    chat: 0x73,
    game_event: 0x23,
    keep_alive: 0x27,
    chunk: 0x28,
    level_event: 0x29,
    light: 0x2B,
    login: 0x2C,
    map_data: 0x2D,
    player_info: 0x40,
    player_position: 0x42,
    respawn: 0x4C,
    center_chunk: 0x58,
    chunk_radius: 0x59,
    spawn_position: 0x5B,
    entity_data: 0x5D,
    time: 0x6B,
    sound: 0x6F,
    stop_sound: 0x71,
    tab_list: 0x74,
    tags: 0x7F,
    ..CB_1_20_5
};

// 1.21.5 dropped the experience orb spawn and added the test instance
// status packet; 1.21.6 and 1.21.7 keep these ids.
pub const CB_1_21_5: Clientbound = Clientbound {
    spawn_entity: 0x01,
    spawn_living: -1,
    chat: 0x72,
    commands: 0x10,
    container_content: 0x12,
    custom_payload: 0x18,
    named_sound: -1,
    game_event: 0x22,
    keep_alive: 0x26,
    chunk: 0x27,
    level_event: 0x28,
    light: 0x2A,
    login: 0x2B,
    map_data: 0x2C,
    player_info: 0x3F,
    player_position: 0x41,
    respawn: 0x4B,
    center_chunk: 0x57,
    chunk_radius: 0x58,
    spawn_position: 0x5A,
    entity_data: 0x5C,
    time: 0x6A,
    sound: 0x6E,
    stop_sound: 0x70,
    tab_list: 0x73,
    tags: 0x7F,
};

pub const CB_1_21_9: Clientbound = Clientbound {
    chat: 0x77,
    game_event: 0x26,
    keep_alive: 0x2B,
    chunk: 0x2C,
    level_event: 0x2D,
    light: 0x2F,
    login: 0x30,
    map_data: 0x31,
    player_info: 0x44,
    player_position: 0x46,
    respawn: 0x50,
    center_chunk: 0x5C,
    chunk_radius: 0x5D,
    spawn_position: 0x5F,
    entity_data: 0x61,
    time: 0x6F,
    sound: 0x73,
    stop_sound: 0x75,
    tab_list: 0x78,
    tags: 0x84,
    ..CB_1_21_5
};

pub const SB_1_15: Serverbound = Serverbound {
    chat_command: -1,
    chat: 0x03,
    custom_payload: 0x0B,
    keep_alive: 0x0F,
    position: 0x11,
    position_rotation: 0x12,
};

pub const SB_1_16: Serverbound = Serverbound {
    keep_alive: 0x10,
    position: 0x12,
    position_rotation: 0x13,
    ..SB_1_15
};

pub const SB_1_17: Serverbound = Serverbound {
    chat_command: -1,
    chat: 0x03,
    custom_payload: 0x0A,
    keep_alive: 0x0F,
    position: 0x11,
    position_rotation: 0x12,
};

pub const SB_1_19: Serverbound = Serverbound {
    chat_command: 0x03,
    chat: 0x04,
    custom_payload: 0x0C,
    keep_alive: 0x11,
    position: 0x13,
    position_rotation: 0x14,
};

pub const SB_1_19_1: Serverbound = Serverbound {
    chat_command: 0x04,
    chat: 0x05,
    custom_payload: 0x0D,
    keep_alive: 0x12,
    position: 0x14,
    position_rotation: 0x15,
};

pub const SB_1_19_3: Serverbound = Serverbound {
    custom_payload: 0x0C,
    keep_alive: 0x11,
    position: 0x13,
    position_rotation: 0x14,
    ..SB_1_19_1
};

pub const SB_1_19_4: Serverbound = SB_1_19_1;

pub const SB_1_20_2: Serverbound = Serverbound {
    custom_payload: 0x0F,
    keep_alive: 0x14,
    position: 0x16,
    position_rotation: 0x17,
    ..SB_1_19_1
};

pub const SB_1_20_3: Serverbound = Serverbound {
    custom_payload: 0x10,
    keep_alive: 0x15,
    position: 0x17,
    position_rotation: 0x18,
    ..SB_1_19_1
};

pub const SB_1_20_5: Serverbound = Serverbound {
    chat_command: 0x04,
    chat: 0x06,
    custom_payload: 0x12,
    keep_alive: 0x18,
    position: 0x1A,
    position_rotation: 0x1B,
};

pub const SB_1_21_2: Serverbound = Serverbound {
    chat_command: 0x05,
    chat: 0x07,
    custom_payload: 0x14,
    keep_alive: 0x1A,
    position: 0x1C,
    position_rotation: 0x1D,
};

pub const SB_1_21_6: Serverbound = Serverbound {
    chat_command: 0x06,
    chat: 0x08,
    custom_payload: 0x15,
    keep_alive: 0x1B,
    position: 0x1D,
    position_rotation: 0x1E,
};

pub const CONFIG_1_20_2: ConfigIds = ConfigIds {
    finish: 0x02,
    keep_alive: 0x03,
    registry: 0x05,
    tags: 0x08,
    finish_ack: 0x02,
};

pub const CONFIG_1_20_3: ConfigIds = ConfigIds {
    tags: 0x09,
    ..CONFIG_1_20_2
};

pub const CONFIG_1_20_5: ConfigIds = ConfigIds {
    finish: 0x03,
    keep_alive: 0x04,
    registry: 0x07,
    tags: 0x0D,
    finish_ack: 0x03,
};
