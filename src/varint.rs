//! SQLite's big-endian variable-length integer.
//!
//! Up to eight bytes contribute their low 7 bits, with the high bit of each
//! byte signalling continuation. If a ninth byte is needed it contributes
//! all 8 bits, for a maximum of 64 significant bits.

use crate::error::{AntdbError, Result};

/// Decodes a varint from the front of `buf`.
///
/// Returns the decoded value and the number of bytes consumed (always in
/// `1..=9`). Errors if `buf` is empty.
pub fn read_varint(buf: &[u8]) -> Result<(i64, usize)> {
    if buf.is_empty() {
        return Err(AntdbError::storage("varint: empty buffer"));
    }

    let mut value: i64 = 0;

    for (i, &byte) in buf.iter().enumerate().take(9) {
        if i == 8 {
            // Ninth byte contributes all 8 bits.
            value = (value << 8) | byte as i64;
            return Ok((value, 9));
        }

        value = (value << 7) | (byte & 0x7f) as i64;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(AntdbError::storage("varint: buffer too short"))
}
