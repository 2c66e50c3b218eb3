//! Storage key encoding.
//!
//! Key format: `[entity name (UTF-8)][0x00][tag (1 byte)][payload]`.
//!
//! Integer payloads are big-endian with the sign bit flipped, so byte order
//! matches numeric order within an entity.

use crate::value::Key;

const SEPARATOR: u8 = 0x00;

const TAG_INT: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_UUID: u8 = 3;
const TAG_BYTES: u8 = 4;

/// Prefix shared by every stored row of `entity`.
pub fn entity_prefix(entity: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(entity.len() + 1);
    buf.extend_from_slice(entity.as_bytes());
    buf.push(SEPARATOR);
    buf
}

/// Encode the storage key of one row.
pub fn encode(entity: &str, key: &Key) -> Vec<u8> {
    let mut buf = entity_prefix(entity);
    match key {
        Key::Int(i) => {
            buf.push(TAG_INT);
            buf.extend_from_slice(&((*i as u64) ^ (1 << 63)).to_be_bytes());
        }
        Key::String(s) => {
            buf.push(TAG_STRING);
            buf.extend_from_slice(s.as_bytes());
        }
        Key::Uuid(u) => {
            buf.push(TAG_UUID);
            buf.extend_from_slice(u);
        }
        Key::Bytes(b) => {
            buf.push(TAG_BYTES);
            buf.extend_from_slice(b);
        }
    }
    buf
}

/// Decode a storage key into its entity name and primary key.
pub fn decode(bytes: &[u8]) -> Option<(String, Key)> {
    let split = bytes.iter().position(|b| *b == SEPARATOR)?;
    let entity = std::str::from_utf8(&bytes[..split]).ok()?.to_string();
    let (&tag, payload) = bytes[split + 1..].split_first()?;

    let key = match tag {
        TAG_INT => {
            let raw: [u8; 8] = payload.try_into().ok()?;
            Key::Int((u64::from_be_bytes(raw) ^ (1 << 63)) as i64)
        }
        TAG_STRING => Key::String(std::str::from_utf8(payload).ok()?.to_string()),
        TAG_UUID => Key::Uuid(payload.try_into().ok()?),
        TAG_BYTES => Key::Bytes(payload.to_vec()),
        _ => return None,
    };

    Some((entity, key))
}

/// Get current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
