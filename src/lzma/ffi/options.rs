//! LZMA1/LZMA2 options (`lzma/lzma12.h`).

#![allow(non_camel_case_types)]

use libc::{c_uint, c_void};

use super::base::{lzma_bool, lzma_reserved_enum};

/// Compression mode.
pub type lzma_mode = c_uint;

pub const LZMA_MODE_FAST: lzma_mode = 1;
pub const LZMA_MODE_NORMAL: lzma_mode = 2;

/// Match finder selection.
pub type lzma_match_finder = c_uint;

pub const LZMA_MF_HC3: lzma_match_finder = 0x03;
pub const LZMA_MF_HC4: lzma_match_finder = 0x04;
pub const LZMA_MF_BT2: lzma_match_finder = 0x12;
pub const LZMA_MF_BT3: lzma_match_finder = 0x13;
pub const LZMA_MF_BT4: lzma_match_finder = 0x14;

pub const LZMA_DICT_SIZE_MIN: u32 = 4096;
pub const LZMA_DICT_SIZE_DEFAULT: u32 = 1 << 23;

pub const LZMA_LCLP_MIN: u32 = 0;
pub const LZMA_LCLP_MAX: u32 = 4;
pub const LZMA_LC_DEFAULT: u32 = 3;
pub const LZMA_LP_DEFAULT: u32 = 0;
pub const LZMA_PB_MIN: u32 = 0;
pub const LZMA_PB_MAX: u32 = 4;
pub const LZMA_PB_DEFAULT: u32 = 2;

/// `ext_flags` bit for `LZMA_FILTER_LZMA1EXT`: accept an end-of-payload
/// marker even when the uncompressed size is known.
pub const LZMA_LZMA1EXT_ALLOW_EOPM: u32 = 0x01;

/// Options for LZMA1 and LZMA2 filters.
///
/// Initialize with [`super::lzma_lzma_preset`] and tweak fields afterwards;
/// hand-built structs must zero the reserved tail.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lzma_options_lzma {
    pub dict_size: u32,
    pub preset_dict: *const u8,
    pub preset_dict_size: u32,
    pub lc: u32,
    pub lp: u32,
    pub pb: u32,
    pub mode: lzma_mode,
    pub nice_len: u32,
    pub mf: lzma_match_finder,
    pub depth: u32,
    pub ext_flags: u32,
    pub ext_size_low: u32,
    pub ext_size_high: u32,
    pub reserved_int4: u32,
    pub reserved_int5: u32,
    pub reserved_int6: u32,
    pub reserved_int7: u32,
    pub reserved_int8: u32,
    pub reserved_enum1: lzma_reserved_enum,
    pub reserved_enum2: lzma_reserved_enum,
    pub reserved_enum3: lzma_reserved_enum,
    pub reserved_enum4: lzma_reserved_enum,
    pub reserved_ptr1: *mut c_void,
    pub reserved_ptr2: *mut c_void,
}

impl lzma_options_lzma {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            dict_size: 0,
            preset_dict: std::ptr::null(),
            preset_dict_size: 0,
            lc: 0,
            lp: 0,
            pb: 0,
            mode: 0,
            nice_len: 0,
            mf: 0,
            depth: 0,
            ext_flags: 0,
            ext_size_low: 0,
            ext_size_high: 0,
            reserved_int4: 0,
            reserved_int5: 0,
            reserved_int6: 0,
            reserved_int7: 0,
            reserved_int8: 0,
            reserved_enum1: 0,
            reserved_enum2: 0,
            reserved_enum3: 0,
            reserved_enum4: 0,
            reserved_ptr1: std::ptr::null_mut(),
            reserved_ptr2: std::ptr::null_mut(),
        }
    }
}

extern "C" {
    pub fn lzma_mf_is_supported(mf: lzma_match_finder) -> lzma_bool;
    pub fn lzma_mode_is_supported(mode: lzma_mode) -> lzma_bool;
    /// Fills `options` from a preset number. Returns true on ERROR, which
    /// is the C convention this function keeps.
    pub fn lzma_lzma_preset(options: *mut lzma_options_lzma, preset: u32) -> lzma_bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    // Verified against lzma/lzma12.h (5.4) on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn options_layout() {
        assert_eq!(size_of::<lzma_options_lzma>(), 112);
        assert_eq!(offset_of!(lzma_options_lzma, preset_dict), 8);
        assert_eq!(offset_of!(lzma_options_lzma, ext_flags), 48);
        assert_eq!(offset_of!(lzma_options_lzma, reserved_ptr2), 104);
    }

    #[test]
    fn match_finders_supported() {
        // SAFETY: pure queries.
        unsafe {
            assert_eq!(lzma_mf_is_supported(LZMA_MF_BT4), 1);
            assert_eq!(lzma_mf_is_supported(0xFF), 0);
            assert_eq!(lzma_mode_is_supported(LZMA_MODE_NORMAL), 1);
        }
    }
}
