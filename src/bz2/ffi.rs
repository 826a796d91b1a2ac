//! Raw bindings to libbz2 (`bzlib.h`, bzip2 1.0.x).
//!
//! Declarations mirror the header one-to-one: same names, same argument
//! order, same types. The `FILE*`-oriented high-level calls are included
//! because libbz2 exposes them unconditionally on non-Windows builds.

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_uint, c_void, FILE};

pub const BZ_RUN: c_int = 0;
pub const BZ_FLUSH: c_int = 1;
pub const BZ_FINISH: c_int = 2;

pub const BZ_OK: c_int = 0;
pub const BZ_RUN_OK: c_int = 1;
pub const BZ_FLUSH_OK: c_int = 2;
pub const BZ_FINISH_OK: c_int = 3;
pub const BZ_STREAM_END: c_int = 4;
pub const BZ_SEQUENCE_ERROR: c_int = -1;
pub const BZ_PARAM_ERROR: c_int = -2;
pub const BZ_MEM_ERROR: c_int = -3;
pub const BZ_DATA_ERROR: c_int = -4;
pub const BZ_DATA_ERROR_MAGIC: c_int = -5;
pub const BZ_IO_ERROR: c_int = -6;
pub const BZ_UNEXPECTED_EOF: c_int = -7;
pub const BZ_OUTBUFF_FULL: c_int = -8;
pub const BZ_CONFIG_ERROR: c_int = -9;

pub const BZ_MAX_UNUSED: c_int = 5000;

/// Streaming state shared by the compressor and decompressor.
///
/// libbz2 counts totals in two 32-bit halves instead of one 64-bit field.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct bz_stream {
    pub next_in: *mut c_char,
    pub avail_in: c_uint,
    pub total_in_lo32: c_uint,
    pub total_in_hi32: c_uint,

    pub next_out: *mut c_char,
    pub avail_out: c_uint,
    pub total_out_lo32: c_uint,
    pub total_out_hi32: c_uint,

    pub state: *mut c_void,

    pub bzalloc: Option<unsafe extern "C" fn(*mut c_void, c_int, c_int) -> *mut c_void>,
    pub bzfree: Option<unsafe extern "C" fn(*mut c_void, *mut c_void)>,
    pub opaque: *mut c_void,
}

impl bz_stream {
    /// A zeroed stream, ready for `BZ2_bzCompressInit` or
    /// `BZ2_bzDecompressInit`. Null allocator fields select malloc/free.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            next_in: std::ptr::null_mut(),
            avail_in: 0,
            total_in_lo32: 0,
            total_in_hi32: 0,
            next_out: std::ptr::null_mut(),
            avail_out: 0,
            total_out_lo32: 0,
            total_out_hi32: 0,
            state: std::ptr::null_mut(),
            bzalloc: None,
            bzfree: None,
            opaque: std::ptr::null_mut(),
        }
    }
}

/// Opaque handle returned by the high-level `BZ2_bzReadOpen` family.
#[repr(C)]
pub struct BZFILE {
    _private: [u8; 0],
}

extern "C" {
    // Core streaming interface.
    pub fn BZ2_bzCompressInit(
        strm: *mut bz_stream,
        blockSize100k: c_int,
        verbosity: c_int,
        workFactor: c_int,
    ) -> c_int;
    pub fn BZ2_bzCompress(strm: *mut bz_stream, action: c_int) -> c_int;
    pub fn BZ2_bzCompressEnd(strm: *mut bz_stream) -> c_int;
    pub fn BZ2_bzDecompressInit(strm: *mut bz_stream, verbosity: c_int, small: c_int) -> c_int;
    pub fn BZ2_bzDecompress(strm: *mut bz_stream) -> c_int;
    pub fn BZ2_bzDecompressEnd(strm: *mut bz_stream) -> c_int;

    // High-level FILE* interface.
    pub fn BZ2_bzReadOpen(
        bzerror: *mut c_int,
        f: *mut FILE,
        verbosity: c_int,
        small: c_int,
        unused: *mut c_void,
        nUnused: c_int,
    ) -> *mut BZFILE;
    pub fn BZ2_bzReadClose(bzerror: *mut c_int, b: *mut BZFILE);
    pub fn BZ2_bzReadGetUnused(
        bzerror: *mut c_int,
        b: *mut BZFILE,
        unused: *mut *mut c_void,
        nUnused: *mut c_int,
    );
    pub fn BZ2_bzRead(bzerror: *mut c_int, b: *mut BZFILE, buf: *mut c_void, len: c_int) -> c_int;
    pub fn BZ2_bzWriteOpen(
        bzerror: *mut c_int,
        f: *mut FILE,
        blockSize100k: c_int,
        verbosity: c_int,
        workFactor: c_int,
    ) -> *mut BZFILE;
    pub fn BZ2_bzWrite(bzerror: *mut c_int, b: *mut BZFILE, buf: *mut c_void, len: c_int);
    pub fn BZ2_bzWriteClose(
        bzerror: *mut c_int,
        b: *mut BZFILE,
        abandon: c_int,
        nbytes_in: *mut c_uint,
        nbytes_out: *mut c_uint,
    );
    pub fn BZ2_bzWriteClose64(
        bzerror: *mut c_int,
        b: *mut BZFILE,
        abandon: c_int,
        nbytes_in_lo32: *mut c_uint,
        nbytes_in_hi32: *mut c_uint,
        nbytes_out_lo32: *mut c_uint,
        nbytes_out_hi32: *mut c_uint,
    );

    // One-call buffer interface.
    pub fn BZ2_bzBuffToBuffCompress(
        dest: *mut c_char,
        destLen: *mut c_uint,
        source: *mut c_char,
        sourceLen: c_uint,
        blockSize100k: c_int,
        verbosity: c_int,
        workFactor: c_int,
    ) -> c_int;
    pub fn BZ2_bzBuffToBuffDecompress(
        dest: *mut c_char,
        destLen: *mut c_uint,
        source: *mut c_char,
        sourceLen: c_uint,
        small: c_int,
        verbosity: c_int,
    ) -> c_int;

    pub fn BZ2_bzlibVersion() -> *const c_char;

    // zlib-style convenience layer.
    pub fn BZ2_bzopen(path: *const c_char, mode: *const c_char) -> *mut BZFILE;
    pub fn BZ2_bzdopen(fd: c_int, mode: *const c_char) -> *mut BZFILE;
    pub fn BZ2_bzread(b: *mut BZFILE, buf: *mut c_void, len: c_int) -> c_int;
    pub fn BZ2_bzwrite(b: *mut BZFILE, buf: *mut c_void, len: c_int) -> c_int;
    pub fn BZ2_bzflush(b: *mut BZFILE) -> c_int;
    pub fn BZ2_bzclose(b: *mut BZFILE);
    pub fn BZ2_bzerror(b: *mut BZFILE, errnum: *mut c_int) -> *const c_char;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    // Verified against bzlib.h on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn bz_stream_layout() {
        assert_eq!(size_of::<bz_stream>(), 80);
        assert_eq!(offset_of!(bz_stream, next_in), 0);
        assert_eq!(offset_of!(bz_stream, avail_in), 8);
        assert_eq!(offset_of!(bz_stream, next_out), 24);
        assert_eq!(offset_of!(bz_stream, state), 48);
        assert_eq!(offset_of!(bz_stream, opaque), 72);
    }

    #[test]
    fn status_codes() {
        assert_eq!(BZ_OK, 0);
        assert_eq!(BZ_STREAM_END, 4);
        assert_eq!(BZ_SEQUENCE_ERROR, -1);
        assert_eq!(BZ_CONFIG_ERROR, -9);
        assert_eq!(BZ_MAX_UNUSED, 5000);
    }
}
