//! Encoders and decoders for the .xz, .lzma, .lz and MicroLZMA containers
//! (`lzma/container.h`).

#![allow(non_camel_case_types)]

use libc::{c_void, size_t};

use super::base::{lzma_allocator, lzma_bool, lzma_reserved_enum, lzma_ret, lzma_stream};
use super::check::lzma_check;
use super::filter::lzma_filter;

/// Default preset, equivalent to `xz -6`.
pub const LZMA_PRESET_DEFAULT: u32 = 6;
/// Mask for the level part of a preset value.
pub const LZMA_PRESET_LEVEL_MASK: u32 = 0x1F;
/// Flag bit selecting the extreme variant of a level.
pub const LZMA_PRESET_EXTREME: u32 = 1 << 31;

// Flags accepted by the threaded encoder (lzma_mt.flags); none defined yet.

/// Multithreaded coder options.
///
/// Zero-initialize via [`lzma_mt::zeroed`] and set `threads` plus either
/// `preset` or `filters` before use; `filters` non-null takes precedence.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_mt {
    pub flags: u32,
    pub threads: u32,
    pub block_size: u64,
    pub timeout: u32,
    pub preset: u32,
    pub filters: *const lzma_filter,
    pub check: lzma_check,
    pub reserved_enum1: lzma_reserved_enum,
    pub reserved_enum2: lzma_reserved_enum,
    pub reserved_enum3: lzma_reserved_enum,
    pub reserved_int1: u32,
    pub reserved_int2: u32,
    pub reserved_int3: u32,
    pub reserved_int4: u32,
    pub memlimit_threading: u64,
    pub memlimit_stop: u64,
    pub reserved_int7: u64,
    pub reserved_int8: u64,
    pub reserved_ptr1: *mut c_void,
    pub reserved_ptr2: *mut c_void,
    pub reserved_ptr3: *mut c_void,
    pub reserved_ptr4: *mut c_void,
}

impl lzma_mt {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            flags: 0,
            threads: 0,
            block_size: 0,
            timeout: 0,
            preset: 0,
            filters: std::ptr::null(),
            check: 0,
            reserved_enum1: 0,
            reserved_enum2: 0,
            reserved_enum3: 0,
            reserved_int1: 0,
            reserved_int2: 0,
            reserved_int3: 0,
            reserved_int4: 0,
            memlimit_threading: 0,
            memlimit_stop: 0,
            reserved_int7: 0,
            reserved_int8: 0,
            reserved_ptr1: std::ptr::null_mut(),
            reserved_ptr2: std::ptr::null_mut(),
            reserved_ptr3: std::ptr::null_mut(),
            reserved_ptr4: std::ptr::null_mut(),
        }
    }
}

// Decoder flag bits.
pub const LZMA_TELL_NO_CHECK: u32 = 0x01;
pub const LZMA_TELL_UNSUPPORTED_CHECK: u32 = 0x02;
pub const LZMA_TELL_ANY_CHECK: u32 = 0x04;
pub const LZMA_IGNORE_CHECK: u32 = 0x10;
pub const LZMA_CONCATENATED: u32 = 0x08;
pub const LZMA_FAIL_FAST: u32 = 0x20;

extern "C" {
    pub fn lzma_easy_encoder_memusage(preset: u32) -> u64;
    pub fn lzma_easy_decoder_memusage(preset: u32) -> u64;
    pub fn lzma_easy_encoder(strm: *mut lzma_stream, preset: u32, check: lzma_check) -> lzma_ret;
    pub fn lzma_easy_buffer_encode(
        preset: u32,
        check: lzma_check,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;

    pub fn lzma_stream_encoder(
        strm: *mut lzma_stream,
        filters: *const lzma_filter,
        check: lzma_check,
    ) -> lzma_ret;
    pub fn lzma_stream_encoder_mt_memusage(options: *const lzma_mt) -> u64;
    pub fn lzma_stream_encoder_mt(strm: *mut lzma_stream, options: *const lzma_mt) -> lzma_ret;

    pub fn lzma_alone_encoder(
        strm: *mut lzma_stream,
        options: *const super::options::lzma_options_lzma,
    ) -> lzma_ret;

    pub fn lzma_microlzma_encoder(
        strm: *mut lzma_stream,
        options: *const super::options::lzma_options_lzma,
    ) -> lzma_ret;
    pub fn lzma_microlzma_decoder(
        strm: *mut lzma_stream,
        comp_size: u64,
        uncomp_size: u64,
        uncomp_size_is_exact: lzma_bool,
        dict_size: u32,
    ) -> lzma_ret;

    pub fn lzma_stream_buffer_bound(uncompressed_size: size_t) -> size_t;
    pub fn lzma_stream_buffer_encode(
        filters: *mut lzma_filter,
        check: lzma_check,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_stream_buffer_decode(
        memlimit: *mut u64,
        flags: u32,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;

    pub fn lzma_stream_decoder(strm: *mut lzma_stream, memlimit: u64, flags: u32) -> lzma_ret;
    pub fn lzma_stream_decoder_mt(strm: *mut lzma_stream, options: *const lzma_mt) -> lzma_ret;
    pub fn lzma_auto_decoder(strm: *mut lzma_stream, memlimit: u64, flags: u32) -> lzma_ret;
    pub fn lzma_alone_decoder(strm: *mut lzma_stream, memlimit: u64) -> lzma_ret;
    pub fn lzma_lzip_decoder(strm: *mut lzma_stream, memlimit: u64, flags: u32) -> lzma_ret;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    // Verified against lzma/container.h (5.4) on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn mt_options_layout() {
        assert_eq!(size_of::<lzma_mt>(), 128);
        assert_eq!(offset_of!(lzma_mt, filters), 24);
        assert_eq!(offset_of!(lzma_mt, memlimit_threading), 64);
        assert_eq!(offset_of!(lzma_mt, memlimit_stop), 72);
    }

    #[test]
    fn preset_memusage_grows_with_level() {
        // SAFETY: pure queries.
        unsafe {
            let low = lzma_easy_encoder_memusage(0);
            let high = lzma_easy_encoder_memusage(9);
            assert!(low < high);
            assert_eq!(lzma_easy_encoder_memusage(99), u64::MAX);
        }
    }
}
