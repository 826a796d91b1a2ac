//! Version information (`lzma/version.h`).

#![allow(non_camel_case_types)]

use libc::c_char;

extern "C" {
    /// Runtime version as `major * 10000000 + minor * 10000 + patch * 10`
    /// plus the stability digit (0 alpha, 1 beta, 2 stable).
    pub fn lzma_version_number() -> u32;
    /// Runtime version as a static string, e.g. `"5.4.1"`.
    pub fn lzma_version_string() -> *const c_char;
}
