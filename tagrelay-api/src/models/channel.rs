/// Prefix of the live state channel, one per device
pub const DEVICE_CHANNEL: &str = "device:";
/// Prefix of the timestamped sample channel written by the backfill pass
pub const INSERT_CHANNEL: &str = "insert:";

/// Live state key of a device, e.g. `device:aabbccddeeff`
pub fn device_key(normalized_id: &str) -> String {
    format!("{DEVICE_CHANNEL}{normalized_id}")
}

/// Historical sample key, e.g. `insert:1700000000000:aabbccddeeff`
pub fn insert_key(timestamp_millis: i64, normalized_id: &str) -> String {
    format!("{INSERT_CHANNEL}{timestamp_millis}:{normalized_id}")
}
