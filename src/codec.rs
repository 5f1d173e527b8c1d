//! Big-endian integer and hex conversions used on the wire.

use crate::error::CodecError;

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    bytes.try_into().map_err(|_| CodecError::InvalidWidth {
        expected: N,
        got: bytes.len(),
    })
}

pub fn i32_to_bytes(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

pub fn bytes_to_i32(bytes: &[u8]) -> Result<i32, CodecError> {
    fixed::<4>(bytes).map(i32::from_be_bytes)
}

pub fn u32_to_bytes(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

pub fn bytes_to_u32(bytes: &[u8]) -> Result<u32, CodecError> {
    fixed::<4>(bytes).map(u32::from_be_bytes)
}

pub fn i64_to_bytes(value: i64) -> [u8; 8] {
    value.to_be_bytes()
}

pub fn bytes_to_i64(bytes: &[u8]) -> Result<i64, CodecError> {
    fixed::<8>(bytes).map(i64::from_be_bytes)
}

pub fn u64_to_bytes(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

pub fn bytes_to_u64(bytes: &[u8]) -> Result<u64, CodecError> {
    fixed::<8>(bytes).map(u64::from_be_bytes)
}

/// Hex-encode bytes, lower-case unless `upper` is set.
pub fn to_hex(bytes: &[u8], upper: bool) -> String {
    if upper {
        hex::encode_upper(bytes)
    } else {
        hex::encode(bytes)
    }
}

/// Decode a hex string of either case. Odd lengths and non-hex digits fail.
pub fn from_hex(s: &str) -> Result<Vec<u8>, CodecError> {
    Ok(hex::decode(s)?)
}
