//! Offline-mode uuids: `nameUUIDFromBytes("OfflinePlayer:" + name)`.

/// Version 3 uuid derived from the player name.
pub fn offline_uuid(name: &str) -> [u8; 16] {
    let mut uuid = md5::compute(format!("OfflinePlayer:{name}").as_bytes()).0;
    uuid[6] &= 0x0f; // clear version
    uuid[6] |= 0x30; // set to version 3
    uuid[8] &= 0x3f; // clear variant
    uuid[8] |= 0x80; // set to IETF variant
    uuid
}
