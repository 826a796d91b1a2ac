//! .xz block header codec and block coders (`lzma/block.h`).

#![allow(non_camel_case_types)]

use libc::size_t;

use super::base::{lzma_allocator, lzma_bool, lzma_reserved_enum, lzma_ret, lzma_stream};
use super::check::{lzma_check, LZMA_CHECK_SIZE_MAX};
use super::filter::lzma_filter;
use super::vli::lzma_vli;

pub const LZMA_BLOCK_HEADER_SIZE_MIN: u32 = 8;
pub const LZMA_BLOCK_HEADER_SIZE_MAX: u32 = 1024;

/// Decodes the first byte of a block header into the total header size,
/// the C macro `lzma_block_header_size_decode`.
#[inline]
#[must_use]
pub const fn lzma_block_header_size_decode(first_byte: u8) -> u32 {
    (first_byte as u32 + 1) * 4
}

/// Options and metadata for one .xz block.
///
/// `filters` must point to storage for `LZMA_FILTERS_MAX + 1` entries when
/// used with `lzma_block_header_decode`. `raw_check` receives the unvalidated
/// check field after a block decoder finishes.
#[repr(C)]
pub struct lzma_block {
    pub version: u32,
    pub header_size: u32,
    pub check: lzma_check,
    pub compressed_size: lzma_vli,
    pub uncompressed_size: lzma_vli,
    pub filters: *mut lzma_filter,
    pub raw_check: [u8; LZMA_CHECK_SIZE_MAX],

    pub reserved_ptr1: *mut libc::c_void,
    pub reserved_ptr2: *mut libc::c_void,
    pub reserved_ptr3: *mut libc::c_void,
    pub reserved_int1: u32,
    pub reserved_int2: u32,
    pub reserved_int3: lzma_vli,
    pub reserved_int4: lzma_vli,
    pub reserved_int5: lzma_vli,
    pub reserved_int6: lzma_vli,
    pub reserved_int7: lzma_vli,
    pub reserved_int8: lzma_vli,
    pub reserved_enum1: lzma_reserved_enum,
    pub reserved_enum2: lzma_reserved_enum,
    pub reserved_enum3: lzma_reserved_enum,
    pub reserved_enum4: lzma_reserved_enum,

    /// Decoder-only: skip check verification when set.
    pub ignore_check: lzma_bool,
    pub reserved_bool2: lzma_bool,
    pub reserved_bool3: lzma_bool,
    pub reserved_bool4: lzma_bool,
    pub reserved_bool5: lzma_bool,
    pub reserved_bool6: lzma_bool,
    pub reserved_bool7: lzma_bool,
    pub reserved_bool8: lzma_bool,
}

impl lzma_block {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            version: 0,
            header_size: 0,
            check: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            filters: std::ptr::null_mut(),
            raw_check: [0; LZMA_CHECK_SIZE_MAX],
            reserved_ptr1: std::ptr::null_mut(),
            reserved_ptr2: std::ptr::null_mut(),
            reserved_ptr3: std::ptr::null_mut(),
            reserved_int1: 0,
            reserved_int2: 0,
            reserved_int3: 0,
            reserved_int4: 0,
            reserved_int5: 0,
            reserved_int6: 0,
            reserved_int7: 0,
            reserved_int8: 0,
            reserved_enum1: 0,
            reserved_enum2: 0,
            reserved_enum3: 0,
            reserved_enum4: 0,
            ignore_check: 0,
            reserved_bool2: 0,
            reserved_bool3: 0,
            reserved_bool4: 0,
            reserved_bool5: 0,
            reserved_bool6: 0,
            reserved_bool7: 0,
            reserved_bool8: 0,
        }
    }
}

extern "C" {
    pub fn lzma_block_header_size(block: *mut lzma_block) -> lzma_ret;
    pub fn lzma_block_header_encode(block: *const lzma_block, out: *mut u8) -> lzma_ret;
    pub fn lzma_block_header_decode(
        block: *mut lzma_block,
        allocator: *const lzma_allocator,
        r#in: *const u8,
    ) -> lzma_ret;
    pub fn lzma_block_compressed_size(block: *mut lzma_block, unpadded_size: lzma_vli) -> lzma_ret;
    pub fn lzma_block_unpadded_size(block: *const lzma_block) -> lzma_vli;
    pub fn lzma_block_total_size(block: *const lzma_block) -> lzma_vli;

    pub fn lzma_block_encoder(strm: *mut lzma_stream, block: *mut lzma_block) -> lzma_ret;
    pub fn lzma_block_decoder(strm: *mut lzma_stream, block: *mut lzma_block) -> lzma_ret;

    pub fn lzma_block_buffer_bound(uncompressed_size: size_t) -> size_t;
    pub fn lzma_block_buffer_encode(
        block: *mut lzma_block,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_block_uncomp_encode(
        block: *mut lzma_block,
        r#in: *const u8,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_block_buffer_decode(
        block: *mut lzma_block,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
}

#[cfg(test)]
mod tests {
    use super::super::base::LZMA_OK;
    use super::super::check::LZMA_CHECK_CRC32;
    use super::super::filter::{LZMA_FILTERS_MAX, LZMA_FILTER_LZMA2};
    use super::super::options::{lzma_lzma_preset, lzma_options_lzma};
    use super::super::vli::LZMA_VLI_UNKNOWN;
    use super::*;

    // Verified against lzma/block.h (5.4) on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn block_layout() {
        use std::mem::{offset_of, size_of};
        assert_eq!(size_of::<lzma_block>(), 208);
        assert_eq!(offset_of!(lzma_block, filters), 32);
        assert_eq!(offset_of!(lzma_block, raw_check), 40);
        assert_eq!(offset_of!(lzma_block, ignore_check), 200);
    }

    #[test]
    fn header_size_macro() {
        assert_eq!(lzma_block_header_size_decode(0x01), 8);
        assert_eq!(lzma_block_header_size_decode(0xFF), 1024);
    }

    #[test]
    fn header_encode_decode_roundtrip() {
        let mut opts = lzma_options_lzma::zeroed();
        // SAFETY: opts is a valid options struct; preset 6 is always supported.
        unsafe {
            assert_eq!(lzma_lzma_preset(&mut opts, 6), 0);
        }
        let mut chain = [
            lzma_filter {
                id: LZMA_FILTER_LZMA2,
                options: std::ptr::addr_of_mut!(opts).cast(),
            },
            lzma_filter {
                id: LZMA_VLI_UNKNOWN,
                options: std::ptr::null_mut(),
            },
        ];

        let mut block = lzma_block::zeroed();
        block.check = LZMA_CHECK_CRC32;
        block.filters = chain.as_mut_ptr();
        block.compressed_size = LZMA_VLI_UNKNOWN;
        block.uncompressed_size = LZMA_VLI_UNKNOWN;

        // SAFETY: block points at initialized storage with a terminated chain.
        unsafe {
            assert_eq!(lzma_block_header_size(&mut block), LZMA_OK);
        }
        assert!(block.header_size >= LZMA_BLOCK_HEADER_SIZE_MIN);
        assert_eq!(block.header_size % 4, 0);

        let mut encoded = vec![0u8; block.header_size as usize];
        // SAFETY: encoded holds exactly header_size bytes.
        unsafe {
            assert_eq!(lzma_block_header_encode(&block, encoded.as_mut_ptr()), LZMA_OK);
        }
        assert_eq!(lzma_block_header_size_decode(encoded[0]), block.header_size);

        let mut scratch = [lzma_filter {
            id: LZMA_VLI_UNKNOWN,
            options: std::ptr::null_mut(),
        }; LZMA_FILTERS_MAX + 1];
        let mut decoded = lzma_block::zeroed();
        decoded.version = 1;
        decoded.check = LZMA_CHECK_CRC32;
        decoded.header_size = block.header_size;
        decoded.filters = scratch.as_mut_ptr();
        // SAFETY: scratch has room for LZMA_FILTERS_MAX + 1 entries and the
        // default allocator frees the decoded filter options below.
        unsafe {
            assert_eq!(
                lzma_block_header_decode(&mut decoded, std::ptr::null(), encoded.as_ptr()),
                LZMA_OK
            );
        }
        assert_eq!(scratch[0].id, LZMA_FILTER_LZMA2);
        assert_eq!(scratch[1].id, LZMA_VLI_UNKNOWN);
        // SAFETY: frees the options allocated by the header decoder.
        unsafe {
            super::super::filter::lzma_filters_free(scratch.as_mut_ptr(), std::ptr::null());
        }
    }
}
