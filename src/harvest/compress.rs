//! Lossless xz compression for the player blob
//!
//! The blob is written once at ingest and read back by batch jobs.
//! The round trip is exact for any byte sequence, empty input
//! included.

use std::io::Read;

use xz2::read::{XzDecoder, XzEncoder};

use super::error::CompressError;

/// xz preset, the codec default.
const XZ_PRESET: u32 = 6;

/// Compress a byte sequence.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::new();
    XzEncoder::new(bytes, XZ_PRESET).read_to_end(&mut out)?;
    Ok(out)
}

/// Inverse of [`compress`]. Fails on input that is not an xz stream.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::new();
    XzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}
