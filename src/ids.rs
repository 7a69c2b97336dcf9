//! Identifier, timestamp and order-number generation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// New record identifier: a UUIDv7 (millisecond timestamp followed by random
/// bits) in simple hex form. Ids created later sort after earlier ones.
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Human-readable order number, e.g. `GA-20261019-7Q3K9Z`.
pub fn order_number(at: DateTime<Utc>) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let random = Uuid::new_v4();
    let suffix: String = random
        .as_bytes()
        .iter()
        .take(6)
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect();
    format!("GA-{}-{}", at.format("%Y%m%d"), suffix)
}
