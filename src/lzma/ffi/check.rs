//! Integrity checks (`lzma/check.h`).

#![allow(non_camel_case_types)]

use libc::{c_uint, size_t};

use super::base::{lzma_bool, lzma_stream};

/// Type of the integrity check stored in .xz streams.
pub type lzma_check = c_uint;

pub const LZMA_CHECK_NONE: lzma_check = 0;
pub const LZMA_CHECK_CRC32: lzma_check = 1;
pub const LZMA_CHECK_CRC64: lzma_check = 4;
pub const LZMA_CHECK_SHA256: lzma_check = 10;

/// Largest check ID the file format allows (IDs 0..=15 are reservable).
pub const LZMA_CHECK_ID_MAX: lzma_check = 15;
/// Largest possible check field size in bytes.
pub const LZMA_CHECK_SIZE_MAX: usize = 64;

extern "C" {
    pub fn lzma_check_is_supported(check: lzma_check) -> lzma_bool;
    /// Size of the stored check field, or `u32::MAX` for invalid IDs.
    pub fn lzma_check_size(check: lzma_check) -> u32;
    pub fn lzma_crc32(buf: *const u8, size: size_t, crc: u32) -> u32;
    pub fn lzma_crc64(buf: *const u8, size: size_t, crc: u64) -> u64;
    /// Check type of the stream being decoded; only meaningful after the
    /// decoder returned `LZMA_NO_CHECK`, `LZMA_UNSUPPORTED_CHECK` or
    /// `LZMA_GET_CHECK`.
    pub fn lzma_get_check(strm: *const lzma_stream) -> lzma_check;
}
