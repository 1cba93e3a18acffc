//! Varint and zigzag encoding.
//!
//! Variable length integers (_varints_) are LEB128: each byte carries seven
//! value bits, least significant group first, and the high bit is set on
//! every byte except the last. A `u64` takes between one and ten bytes.
//!
//! Signed fields declared `sint32`/`sint64` are zigzag-mapped first so that
//! small negative values stay short. Plain `int32`/`int64` fields are
//! sign-extended to 64 bits instead, so negative values always take ten bytes.
//!
//! See <https://protobuf.dev/programming-guides/encoding/#varints>.

use bytes::BufMut;
use thiserror::Error;

/// Maximum number of bytes for an encoded varint.
///
/// Nine full bytes hold 63 bits, and the tenth may only contribute the
/// single remaining bit.
pub const MAX_VARINT_LEN: usize = 10;

/// Reasons a byte sequence is not a complete varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarintError {
    /// The input ended before a byte without the continuation bit.
    #[error("input ended before varint terminated")]
    Truncated,

    /// The varint is longer than ten bytes or carries more than 64 bits.
    #[error("varint exceeds 64 bits")]
    Overflow,
}

/// Appends the minimal LEB128 encoding of `value` to `buf`.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    loop {
        if value < 0x80 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8(((value & 0x7f) | 0x80) as u8);
        value >>= 7;
    }
}

/// Returns the number of bytes [`encode_varint`] emits for `value`.
#[inline]
pub fn encoded_len_varint(value: u64) -> usize {
    // ceil(bit_length / 7), with zero taking one byte.
    ((((value | 1).leading_zeros() ^ 63) * 9 + 73) / 64) as usize
}

/// Decodes a varint from the start of `buf`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value = 0u64;

    for (index, byte) in buf.iter().copied().take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7f) << (index * 7);
        if byte < 0x80 {
            if index + 1 == MAX_VARINT_LEN && byte > 0x01 {
                return Err(VarintError::Overflow);
            }
            return Ok((value, index + 1));
        }
    }

    if buf.len() >= MAX_VARINT_LEN {
        Err(VarintError::Overflow)
    } else {
        Err(VarintError::Truncated)
    }
}

/// Maps a signed 32-bit value onto an unsigned one, interleaving signs.
#[inline]
pub fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`zigzag_encode32`].
#[inline]
pub fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Maps a signed 64-bit value onto an unsigned one, interleaving signs.
#[inline]
pub fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode64`].
#[inline]
pub fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}
