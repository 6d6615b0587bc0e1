//! I-Bus frame checksum: a running XOR over every byte of the frame except
//! the trailing checksum byte itself.
//!
//! ```text
//! 80 05 BF 18 00 00 | 22
//! 80 ^ 05 ^ BF ^ 18 ^ 00 ^ 00 = 22
//! ```

/// XOR-fold `bytes` into a single checksum byte.
#[inline]
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, byte| acc ^ byte)
}

/// Check a complete frame (checksum byte included) against its trailing byte.
///
/// Returns `false` for sequences too short to hold a checksum.
pub fn frame_checksum_matches(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&expected, body)) if !body.is_empty() => xor_checksum(body) == expected,
        _ => false,
    }
}
