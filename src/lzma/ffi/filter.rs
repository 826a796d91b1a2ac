//! Filter chains, raw coders and filter property codecs
//! (`lzma/filter.h`, `lzma/bcj.h`, `lzma/delta.h`).

#![allow(non_camel_case_types)]

use libc::{c_char, c_uint, c_void, size_t};

use super::base::{lzma_allocator, lzma_bool, lzma_reserved_enum, lzma_ret, lzma_stream};
use super::vli::lzma_vli;

/// One element of a filter chain.
///
/// Chains are passed as arrays terminated by an element whose `id` is
/// `LZMA_VLI_UNKNOWN`. `options` points to the filter-specific options
/// struct, or is null for filters without options.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_filter {
    pub id: lzma_vli,
    pub options: *mut c_void,
}

/// Maximum number of filters in a chain, terminator excluded.
pub const LZMA_FILTERS_MAX: usize = 4;

// Branch/call/jump conversion filters.
pub const LZMA_FILTER_X86: lzma_vli = 0x04;
pub const LZMA_FILTER_POWERPC: lzma_vli = 0x05;
pub const LZMA_FILTER_IA64: lzma_vli = 0x06;
pub const LZMA_FILTER_ARM: lzma_vli = 0x07;
pub const LZMA_FILTER_ARMTHUMB: lzma_vli = 0x08;
pub const LZMA_FILTER_SPARC: lzma_vli = 0x09;
pub const LZMA_FILTER_ARM64: lzma_vli = 0x0A;

pub const LZMA_FILTER_DELTA: lzma_vli = 0x03;
pub const LZMA_FILTER_LZMA1: lzma_vli = 0x4000_0000_0000_0001;
pub const LZMA_FILTER_LZMA1EXT: lzma_vli = 0x4000_0000_0000_0002;
pub const LZMA_FILTER_LZMA2: lzma_vli = 0x21;

/// Options for the BCJ filters.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct lzma_options_bcj {
    pub start_offset: u32,
}

pub type lzma_delta_type = c_uint;
pub const LZMA_DELTA_TYPE_BYTE: lzma_delta_type = 0;

pub const LZMA_DELTA_DIST_MIN: u32 = 1;
pub const LZMA_DELTA_DIST_MAX: u32 = 256;

/// Options for the Delta filter.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_options_delta {
    pub r#type: lzma_delta_type,
    pub dist: u32,
    pub reserved_int1: u32,
    pub reserved_int2: u32,
    pub reserved_int3: u32,
    pub reserved_int4: u32,
    pub reserved_enum1: lzma_reserved_enum,
    pub reserved_enum2: lzma_reserved_enum,
    pub reserved_enum3: lzma_reserved_enum,
    pub reserved_enum4: lzma_reserved_enum,
}

impl lzma_options_delta {
    #[must_use]
    pub const fn byte_delta(dist: u32) -> Self {
        Self {
            r#type: LZMA_DELTA_TYPE_BYTE,
            dist,
            reserved_int1: 0,
            reserved_int2: 0,
            reserved_int3: 0,
            reserved_int4: 0,
            reserved_enum1: 0,
            reserved_enum2: 0,
            reserved_enum3: 0,
            reserved_enum4: 0,
        }
    }
}

// Flags for the lzma_str_* functions.
pub const LZMA_STR_ALL_FILTERS: u32 = 0x01;
pub const LZMA_STR_NO_VALIDATION: u32 = 0x02;
pub const LZMA_STR_ENCODER: u32 = 0x10;
pub const LZMA_STR_DECODER: u32 = 0x20;
pub const LZMA_STR_GETOPT_LONG: u32 = 0x40;
pub const LZMA_STR_NO_SPACES: u32 = 0x80;

extern "C" {
    pub fn lzma_filter_encoder_is_supported(id: lzma_vli) -> lzma_bool;
    pub fn lzma_filter_decoder_is_supported(id: lzma_vli) -> lzma_bool;

    pub fn lzma_filters_copy(
        src: *const lzma_filter,
        dest: *mut lzma_filter,
        allocator: *const lzma_allocator,
    ) -> lzma_ret;
    pub fn lzma_filters_free(filters: *mut lzma_filter, allocator: *const lzma_allocator);

    pub fn lzma_raw_encoder_memusage(filters: *const lzma_filter) -> u64;
    pub fn lzma_raw_decoder_memusage(filters: *const lzma_filter) -> u64;
    pub fn lzma_raw_encoder(strm: *mut lzma_stream, filters: *const lzma_filter) -> lzma_ret;
    pub fn lzma_raw_decoder(strm: *mut lzma_stream, filters: *const lzma_filter) -> lzma_ret;
    pub fn lzma_filters_update(strm: *mut lzma_stream, filters: *const lzma_filter) -> lzma_ret;

    pub fn lzma_raw_buffer_encode(
        filters: *const lzma_filter,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_raw_buffer_decode(
        filters: *const lzma_filter,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;

    pub fn lzma_properties_size(size: *mut u32, filter: *const lzma_filter) -> lzma_ret;
    pub fn lzma_properties_encode(filter: *const lzma_filter, props: *mut u8) -> lzma_ret;
    pub fn lzma_properties_decode(
        filter: *mut lzma_filter,
        allocator: *const lzma_allocator,
        props: *const u8,
        props_size: size_t,
    ) -> lzma_ret;

    pub fn lzma_filter_flags_size(size: *mut u32, filter: *const lzma_filter) -> lzma_ret;
    pub fn lzma_filter_flags_encode(
        filter: *const lzma_filter,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_filter_flags_decode(
        filter: *mut lzma_filter,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
    ) -> lzma_ret;

    pub fn lzma_str_to_filters(
        str: *const c_char,
        error_pos: *mut libc::c_int,
        filters: *mut lzma_filter,
        flags: u32,
        allocator: *const lzma_allocator,
    ) -> *const c_char;
    pub fn lzma_str_from_filters(
        str: *mut *mut c_char,
        filters: *const lzma_filter,
        flags: u32,
        allocator: *const lzma_allocator,
    ) -> lzma_ret;
    pub fn lzma_str_list_filters(
        str: *mut *mut c_char,
        filter_id: lzma_vli,
        flags: u32,
        allocator: *const lzma_allocator,
    ) -> lzma_ret;
}

#[cfg(test)]
mod tests {
    use super::super::vli::LZMA_VLI_UNKNOWN;
    use super::*;
    use std::mem::size_of;

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn filter_layout() {
        assert_eq!(size_of::<lzma_filter>(), 16);
    }

    #[test]
    fn lzma2_codecs_supported() {
        // SAFETY: pure queries.
        unsafe {
            assert_eq!(lzma_filter_encoder_is_supported(LZMA_FILTER_LZMA2), 1);
            assert_eq!(lzma_filter_decoder_is_supported(LZMA_FILTER_LZMA2), 1);
            assert_eq!(lzma_filter_decoder_is_supported(0x7FFF), 0);
        }
    }

    #[test]
    fn parse_filter_string() {
        let mut chain = [lzma_filter {
            id: LZMA_VLI_UNKNOWN,
            options: std::ptr::null_mut(),
        }; LZMA_FILTERS_MAX + 1];
        let mut error_pos = -1;
        // SAFETY: chain holds LZMA_FILTERS_MAX + 1 slots and the string is
        // NUL-terminated; parsed options are freed below.
        unsafe {
            let err = lzma_str_to_filters(
                c"lzma2:preset=6".as_ptr(),
                &mut error_pos,
                chain.as_mut_ptr(),
                0,
                std::ptr::null(),
            );
            assert!(err.is_null());
            assert_eq!(chain[0].id, LZMA_FILTER_LZMA2);
            assert_eq!(chain[1].id, LZMA_VLI_UNKNOWN);
            lzma_filters_free(chain.as_mut_ptr(), std::ptr::null());
        }
    }
}
