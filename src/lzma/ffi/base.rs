//! Core liblzma data types (`lzma/base.h`).
//!
//! `lzma_ret` and `lzma_action` are bound as `c_uint` aliases plus
//! constants rather than Rust enums so that unknown future codes coming
//! back over the boundary stay representable.

#![allow(non_camel_case_types)]

use libc::{c_uint, c_void, size_t};

/// liblzma's boolean: any nonzero value is true.
pub type lzma_bool = u8;

/// Placeholder enum type for reserved struct members.
pub type lzma_reserved_enum = c_uint;

/// Return values used by most liblzma functions.
pub type lzma_ret = c_uint;

pub const LZMA_OK: lzma_ret = 0;
pub const LZMA_STREAM_END: lzma_ret = 1;
pub const LZMA_NO_CHECK: lzma_ret = 2;
pub const LZMA_UNSUPPORTED_CHECK: lzma_ret = 3;
pub const LZMA_GET_CHECK: lzma_ret = 4;
pub const LZMA_MEM_ERROR: lzma_ret = 5;
pub const LZMA_MEMLIMIT_ERROR: lzma_ret = 6;
pub const LZMA_FORMAT_ERROR: lzma_ret = 7;
pub const LZMA_OPTIONS_ERROR: lzma_ret = 8;
pub const LZMA_DATA_ERROR: lzma_ret = 9;
pub const LZMA_BUF_ERROR: lzma_ret = 10;
pub const LZMA_PROG_ERROR: lzma_ret = 11;
pub const LZMA_SEEK_NEEDED: lzma_ret = 12;

/// The `action` argument of [`lzma_code`].
pub type lzma_action = c_uint;

pub const LZMA_RUN: lzma_action = 0;
pub const LZMA_SYNC_FLUSH: lzma_action = 1;
pub const LZMA_FULL_FLUSH: lzma_action = 2;
pub const LZMA_FINISH: lzma_action = 3;
pub const LZMA_FULL_BARRIER: lzma_action = 4;

/// Custom memory allocation hooks.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_allocator {
    pub alloc: Option<unsafe extern "C" fn(*mut c_void, size_t, size_t) -> *mut c_void>,
    pub free: Option<unsafe extern "C" fn(*mut c_void, *mut c_void)>,
    pub opaque: *mut c_void,
}

/// Internal coder state; never dereferenced from the outside.
#[repr(C)]
pub struct lzma_internal {
    _private: [u8; 0],
}

/// Passes input and output buffers to the coders.
///
/// Field order and sizes match `lzma/base.h` exactly; the reserved tail
/// must stay zeroed by the application, which [`lzma_stream::zeroed`]
/// guarantees (the C idiom is `LZMA_STREAM_INIT`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_stream {
    pub next_in: *const u8,
    pub avail_in: size_t,
    pub total_in: u64,

    pub next_out: *mut u8,
    pub avail_out: size_t,
    pub total_out: u64,

    pub allocator: *const lzma_allocator,
    pub internal: *mut lzma_internal,

    pub reserved_ptr1: *mut c_void,
    pub reserved_ptr2: *mut c_void,
    pub reserved_ptr3: *mut c_void,
    pub reserved_ptr4: *mut c_void,
    pub seek_pos: u64,
    pub reserved_int2: u64,
    pub reserved_int3: size_t,
    pub reserved_int4: size_t,
    pub reserved_enum1: lzma_reserved_enum,
    pub reserved_enum2: lzma_reserved_enum,
}

impl lzma_stream {
    /// The Rust spelling of `LZMA_STREAM_INIT`.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            next_in: std::ptr::null(),
            avail_in: 0,
            total_in: 0,
            next_out: std::ptr::null_mut(),
            avail_out: 0,
            total_out: 0,
            allocator: std::ptr::null(),
            internal: std::ptr::null_mut(),
            reserved_ptr1: std::ptr::null_mut(),
            reserved_ptr2: std::ptr::null_mut(),
            reserved_ptr3: std::ptr::null_mut(),
            reserved_ptr4: std::ptr::null_mut(),
            seek_pos: 0,
            reserved_int2: 0,
            reserved_int3: 0,
            reserved_int4: 0,
            reserved_enum1: 0,
            reserved_enum2: 0,
        }
    }
}

extern "C" {
    pub fn lzma_code(strm: *mut lzma_stream, action: lzma_action) -> lzma_ret;
    pub fn lzma_end(strm: *mut lzma_stream);
    pub fn lzma_get_progress(strm: *mut lzma_stream, progress_in: *mut u64, progress_out: *mut u64);
    pub fn lzma_memusage(strm: *const lzma_stream) -> u64;
    pub fn lzma_memlimit_get(strm: *const lzma_stream) -> u64;
    pub fn lzma_memlimit_set(strm: *mut lzma_stream, memlimit: u64) -> lzma_ret;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    // Verified against lzma/base.h (5.4) on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn stream_layout() {
        assert_eq!(size_of::<lzma_stream>(), 136);
        assert_eq!(offset_of!(lzma_stream, next_in), 0);
        assert_eq!(offset_of!(lzma_stream, total_in), 16);
        assert_eq!(offset_of!(lzma_stream, allocator), 48);
        assert_eq!(offset_of!(lzma_stream, seek_pos), 96);
        assert_eq!(offset_of!(lzma_stream, reserved_enum1), 128);
    }

    #[test]
    fn return_codes() {
        assert_eq!(LZMA_OK, 0);
        assert_eq!(LZMA_STREAM_END, 1);
        assert_eq!(LZMA_PROG_ERROR, 11);
        assert_eq!(LZMA_SEEK_NEEDED, 12);
        assert_eq!(LZMA_FULL_BARRIER, 4);
    }
}
