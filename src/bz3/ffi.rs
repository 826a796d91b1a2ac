//! Raw bindings to bzip3 (`libbz3.h`, bzip3 1.3+).

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, size_t};

pub const BZ3_OK: c_int = 0;
pub const BZ3_ERR_OUT_OF_BOUNDS: c_int = -1;
pub const BZ3_ERR_BWT: c_int = -2;
pub const BZ3_ERR_CRC: c_int = -3;
pub const BZ3_ERR_MALFORMED_HEADER: c_int = -4;
pub const BZ3_ERR_TRUNCATED_DATA: c_int = -5;
pub const BZ3_ERR_DATA_TOO_BIG: c_int = -6;
pub const BZ3_ERR_INIT: c_int = -7;
pub const BZ3_ERR_DATA_SIZE_TOO_SMALL: c_int = -8;

/// Smallest accepted block size (65 KiB).
pub const BZ3_MIN_BLOCK_SIZE: i32 = 65 * 1024;
/// Largest accepted block size (511 MiB).
pub const BZ3_MAX_BLOCK_SIZE: i32 = 511 * 1024 * 1024;

/// Opaque per-thread codec state.
#[repr(C)]
pub struct bz3_state {
    _private: [u8; 0],
}

extern "C" {
    pub fn bz3_version() -> *const c_char;

    // State lifecycle.
    pub fn bz3_new(block_size: i32) -> *mut bz3_state;
    pub fn bz3_free(state: *mut bz3_state);
    pub fn bz3_last_error(state: *mut bz3_state) -> i8;
    pub fn bz3_strerror(state: *mut bz3_state) -> *const c_char;

    // One-call frame codec.
    pub fn bz3_bound(input_size: size_t) -> size_t;
    pub fn bz3_compress(
        block_size: u32,
        r#in: *const u8,
        out: *mut u8,
        in_size: size_t,
        out_size: *mut size_t,
    ) -> c_int;
    pub fn bz3_decompress(
        r#in: *const u8,
        out: *mut u8,
        in_size: size_t,
        out_size: *mut size_t,
    ) -> c_int;

    // Block codec. The buffer is used in place and must hold at least
    // bz3_bound(size) bytes for encoding.
    pub fn bz3_encode_block(state: *mut bz3_state, buffer: *mut u8, size: i32) -> i32;
    pub fn bz3_decode_block(
        state: *mut bz3_state,
        buffer: *mut u8,
        buffer_size: size_t,
        compressed_size: i32,
        orig_size: i32,
    ) -> i32;
}
