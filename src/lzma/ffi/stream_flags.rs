//! .xz stream header and footer codecs (`lzma/stream_flags.h`).

#![allow(non_camel_case_types)]

use super::base::{lzma_bool, lzma_reserved_enum, lzma_ret};
use super::check::lzma_check;
use super::vli::lzma_vli;

/// Size of both the stream header and the stream footer.
pub const LZMA_STREAM_HEADER_SIZE: usize = 12;

pub const LZMA_BACKWARD_SIZE_MIN: lzma_vli = 4;
pub const LZMA_BACKWARD_SIZE_MAX: lzma_vli = 1 << 34;

/// Decoded stream header or footer options.
///
/// `version` must be 0 for now; `backward_size` is meaningful only in
/// footers (`LZMA_VLI_UNKNOWN` after header decoding).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_stream_flags {
    pub version: u32,
    pub backward_size: lzma_vli,
    pub check: lzma_check,
    pub reserved_enum1: lzma_reserved_enum,
    pub reserved_enum2: lzma_reserved_enum,
    pub reserved_enum3: lzma_reserved_enum,
    pub reserved_enum4: lzma_reserved_enum,
    pub reserved_bool1: lzma_bool,
    pub reserved_bool2: lzma_bool,
    pub reserved_bool3: lzma_bool,
    pub reserved_bool4: lzma_bool,
    pub reserved_bool5: lzma_bool,
    pub reserved_bool6: lzma_bool,
    pub reserved_bool7: lzma_bool,
    pub reserved_bool8: lzma_bool,
    pub reserved_int1: u32,
    pub reserved_int2: u32,
}

impl lzma_stream_flags {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            version: 0,
            backward_size: 0,
            check: 0,
            reserved_enum1: 0,
            reserved_enum2: 0,
            reserved_enum3: 0,
            reserved_enum4: 0,
            reserved_bool1: 0,
            reserved_bool2: 0,
            reserved_bool3: 0,
            reserved_bool4: 0,
            reserved_bool5: 0,
            reserved_bool6: 0,
            reserved_bool7: 0,
            reserved_bool8: 0,
            reserved_int1: 0,
            reserved_int2: 0,
        }
    }
}

extern "C" {
    pub fn lzma_stream_header_encode(options: *const lzma_stream_flags, out: *mut u8) -> lzma_ret;
    pub fn lzma_stream_footer_encode(options: *const lzma_stream_flags, out: *mut u8) -> lzma_ret;
    pub fn lzma_stream_header_decode(options: *mut lzma_stream_flags, r#in: *const u8) -> lzma_ret;
    pub fn lzma_stream_footer_decode(options: *mut lzma_stream_flags, r#in: *const u8) -> lzma_ret;
    /// Compares two decoded flag sets; `backward_size` is compared only if
    /// known in both.
    pub fn lzma_stream_flags_compare(
        a: *const lzma_stream_flags,
        b: *const lzma_stream_flags,
    ) -> lzma_ret;
}

#[cfg(test)]
mod tests {
    use super::super::base::LZMA_OK;
    use super::super::check::LZMA_CHECK_CRC64;
    use super::super::vli::LZMA_VLI_UNKNOWN;
    use super::*;
    use std::mem::{offset_of, size_of};

    // Verified against lzma/stream_flags.h (5.4) on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn flags_layout() {
        assert_eq!(size_of::<lzma_stream_flags>(), 56);
        assert_eq!(offset_of!(lzma_stream_flags, backward_size), 8);
        assert_eq!(offset_of!(lzma_stream_flags, check), 16);
    }

    #[test]
    fn header_and_footer_roundtrip() {
        let mut flags = lzma_stream_flags::zeroed();
        flags.backward_size = 64;
        flags.check = LZMA_CHECK_CRC64;

        let mut header = [0u8; LZMA_STREAM_HEADER_SIZE];
        let mut footer = [0u8; LZMA_STREAM_HEADER_SIZE];
        // SAFETY: both buffers are exactly LZMA_STREAM_HEADER_SIZE bytes.
        unsafe {
            assert_eq!(lzma_stream_header_encode(&flags, header.as_mut_ptr()), LZMA_OK);
            assert_eq!(lzma_stream_footer_encode(&flags, footer.as_mut_ptr()), LZMA_OK);
        }
        assert_eq!(&header[..6], b"\xFD7zXZ\x00");

        let mut from_header = lzma_stream_flags::zeroed();
        let mut from_footer = lzma_stream_flags::zeroed();
        // SAFETY: decode reads LZMA_STREAM_HEADER_SIZE bytes from each buffer.
        unsafe {
            assert_eq!(lzma_stream_header_decode(&mut from_header, header.as_ptr()), LZMA_OK);
            assert_eq!(lzma_stream_footer_decode(&mut from_footer, footer.as_ptr()), LZMA_OK);
            assert_eq!(lzma_stream_flags_compare(&from_header, &from_footer), LZMA_OK);
        }
        assert_eq!(from_header.check, LZMA_CHECK_CRC64);
        assert_eq!(from_header.backward_size, LZMA_VLI_UNKNOWN);
        assert_eq!(from_footer.backward_size, 64);
    }
}
