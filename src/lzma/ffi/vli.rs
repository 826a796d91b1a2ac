//! Variable-length integers (`lzma/vli.h`).

#![allow(non_camel_case_types)]

use libc::size_t;

use super::base::lzma_ret;

/// Unsigned integer encoded in 1 to 9 bytes, 7 payload bits per byte.
pub type lzma_vli = u64;

/// Largest encodable value.
pub const LZMA_VLI_MAX: lzma_vli = u64::MAX / 2;
/// Marker for an unknown value.
pub const LZMA_VLI_UNKNOWN: lzma_vli = u64::MAX;
/// Longest encoded form.
pub const LZMA_VLI_BYTES_MAX: usize = 9;

/// `true` for values an encoder will accept (`LZMA_VLI_UNKNOWN` included).
#[inline]
#[must_use]
pub const fn lzma_vli_is_valid(vli: lzma_vli) -> bool {
    vli <= LZMA_VLI_MAX || vli == LZMA_VLI_UNKNOWN
}

extern "C" {
    pub fn lzma_vli_encode(
        vli: lzma_vli,
        vli_pos: *mut size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_vli_decode(
        vli: *mut lzma_vli,
        vli_pos: *mut size_t,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
    ) -> lzma_ret;
    /// Encoded size of `vli` in bytes, or 0 if `vli` is not encodable.
    pub fn lzma_vli_size(vli: lzma_vli) -> u32;
}
