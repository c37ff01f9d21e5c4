//! UUID value producer.

use rand::Rng;
use uuid::Uuid;

/// Random UUID v4 drawn from the provided stream.
pub fn uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    with_v4_bits(bytes)
}

/// The v4 UUID built from sixteen zero bytes, used for golden output.
pub fn zeroed_uuid() -> Uuid {
    with_v4_bits([0u8; 16])
}

fn with_v4_bits(mut bytes: [u8; 16]) -> Uuid {
    bytes[6] = (bytes[6] & 0x0f) | 0x40; // Version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // Variant RFC 4122
    Uuid::from_bytes(bytes)
}
