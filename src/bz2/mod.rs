//! libbz2 bindings: streaming codec plus one-call buffer helpers.
//!
//! The [`ffi`] submodule is the verbatim C surface. This module adds the
//! thin safe layer: [`Compress`] and [`Decompress`] own a `bz_stream` and
//! release it on drop, and [`compress_buffer`] / [`decompress_buffer`] wrap
//! the one-call `BZ2_bzBuffToBuff*` entry points.
//!
//! The `FILE*`-oriented read/write helpers stay raw-only; they are bound in
//! [`ffi`] but a safe wrapper around C stdio handles is out of scope here.

pub mod ffi;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uint};

use thiserror::Error;

use crate::error::{Error, Result};

/// Error half of the libbz2 status codes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Bz2Error {
    #[error("calls out of sequence (BZ_SEQUENCE_ERROR)")]
    Sequence,
    #[error("invalid parameter (BZ_PARAM_ERROR)")]
    Param,
    #[error("out of memory (BZ_MEM_ERROR)")]
    Mem,
    #[error("compressed data is corrupt (BZ_DATA_ERROR)")]
    Data,
    #[error("compressed data lacks the bzip2 magic (BZ_DATA_ERROR_MAGIC)")]
    DataMagic,
    #[error("I/O error (BZ_IO_ERROR)")]
    Io,
    #[error("compressed data ends unexpectedly (BZ_UNEXPECTED_EOF)")]
    UnexpectedEof,
    #[error("output buffer is full (BZ_OUTBUFF_FULL)")]
    OutbuffFull,
    #[error("library built with invalid configuration (BZ_CONFIG_ERROR)")]
    Config,
    #[error("unrecognized libbz2 status code {0}")]
    Unknown(i32),
}

/// Success half of the libbz2 status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `BZ_OK`
    Ok,
    /// `BZ_RUN_OK`
    RunOk,
    /// `BZ_FLUSH_OK`
    FlushOk,
    /// `BZ_FINISH_OK`
    FinishOk,
    /// `BZ_STREAM_END`
    StreamEnd,
}

/// Action argument for [`Compress::compress`], mirroring `BZ_RUN`,
/// `BZ_FLUSH` and `BZ_FINISH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    Flush,
    Finish,
}

impl Action {
    #[inline]
    const fn as_raw(self) -> c_int {
        match self {
            Self::Run => ffi::BZ_RUN,
            Self::Flush => ffi::BZ_FLUSH,
            Self::Finish => ffi::BZ_FINISH,
        }
    }
}

/// Maps a raw libbz2 return code onto the success/error split.
fn check(code: c_int) -> Result<Status> {
    let err = match code {
        ffi::BZ_OK => return Ok(Status::Ok),
        ffi::BZ_RUN_OK => return Ok(Status::RunOk),
        ffi::BZ_FLUSH_OK => return Ok(Status::FlushOk),
        ffi::BZ_FINISH_OK => return Ok(Status::FinishOk),
        ffi::BZ_STREAM_END => return Ok(Status::StreamEnd),
        ffi::BZ_SEQUENCE_ERROR => Bz2Error::Sequence,
        ffi::BZ_PARAM_ERROR => Bz2Error::Param,
        ffi::BZ_MEM_ERROR => Bz2Error::Mem,
        ffi::BZ_DATA_ERROR => Bz2Error::Data,
        ffi::BZ_DATA_ERROR_MAGIC => Bz2Error::DataMagic,
        ffi::BZ_IO_ERROR => Bz2Error::Io,
        ffi::BZ_UNEXPECTED_EOF => Bz2Error::UnexpectedEof,
        ffi::BZ_OUTBUFF_FULL => Bz2Error::OutbuffFull,
        ffi::BZ_CONFIG_ERROR => Bz2Error::Config,
        other => Bz2Error::Unknown(other),
    };
    Err(Error::Bz2(err))
}

/// Runtime version string of the linked libbz2.
pub fn version() -> &'static str {
    // SAFETY: BZ2_bzlibVersion returns a pointer to a static NUL-terminated
    // string inside the library.
    unsafe { CStr::from_ptr(ffi::BZ2_bzlibVersion()) }
        .to_str()
        .unwrap_or("unknown")
}

/// Progress of one streaming step: bytes consumed from the input slice and
/// bytes written to the output slice, plus the native status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub status: Status,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// Wires one `(input, output)` slice pair into a `bz_stream` and runs `f`.
///
/// Input slices are handed to libbz2 through a `*mut c_char` because that is
/// how the header spells it; the library never writes through `next_in`.
fn run_step<F>(strm: &mut ffi::bz_stream, input: &[u8], output: &mut [u8], f: F) -> Result<Progress>
where
    F: FnOnce(&mut ffi::bz_stream) -> c_int,
{
    strm.next_in = input.as_ptr() as *mut c_char;
    strm.avail_in = c_uint::try_from(input.len()).map_err(|_| Error::Bz2(Bz2Error::Param))?;
    strm.next_out = output.as_mut_ptr().cast::<c_char>();
    strm.avail_out = c_uint::try_from(output.len()).map_err(|_| Error::Bz2(Bz2Error::Param))?;

    let code = f(strm);

    let bytes_in = input.len() - strm.avail_in as usize;
    let bytes_out = output.len() - strm.avail_out as usize;
    strm.next_in = std::ptr::null_mut();
    strm.next_out = std::ptr::null_mut();

    check(code).map(|status| Progress {
        status,
        bytes_in,
        bytes_out,
    })
}

/// Streaming bzip2 compressor owning an initialized `bz_stream`.
///
/// The stream lives in a `Box` because libbz2 stores the stream address in
/// its internal state at init time and rejects calls made through a moved
/// stream.
pub struct Compress {
    strm: Box<ffi::bz_stream>,
}

impl Compress {
    /// Initializes a compressor.
    ///
    /// `block_size_100k` selects the block size in units of 100 kB (1..=9),
    /// `work_factor` tunes the fallback sorting algorithm (0..=250, 0 means
    /// the library default of 30).
    pub fn new(block_size_100k: u32, work_factor: u32) -> Result<Self> {
        let mut strm = Box::new(ffi::bz_stream::zeroed());
        // SAFETY: strm is a valid zeroed bz_stream with default allocators.
        let code = unsafe {
            ffi::BZ2_bzCompressInit(
                &mut *strm,
                block_size_100k as c_int,
                0,
                work_factor as c_int,
            )
        };
        check(code)?;
        log::debug!("bz2 compressor initialized, block size {block_size_100k}00k");
        Ok(Self { strm })
    }

    /// Runs one compression step over the given slices.
    ///
    /// With [`Action::Finish`], keep calling until the returned status is
    /// [`Status::StreamEnd`].
    pub fn compress(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<Progress> {
        run_step(&mut self.strm, input, output, |strm| {
            // SAFETY: strm was initialized by BZ2_bzCompressInit and its
            // buffer pointers cover live slices for the whole call.
            unsafe { ffi::BZ2_bzCompress(strm, action.as_raw()) }
        })
    }

    /// Total bytes consumed since init, joined from the 32-bit halves.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        u64::from(self.strm.total_in_hi32) << 32 | u64::from(self.strm.total_in_lo32)
    }

    /// Total bytes produced since init, joined from the 32-bit halves.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        u64::from(self.strm.total_out_hi32) << 32 | u64::from(self.strm.total_out_lo32)
    }
}

impl Drop for Compress {
    fn drop(&mut self) {
        // SAFETY: the stream was initialized in new() and is ended once.
        unsafe {
            ffi::BZ2_bzCompressEnd(&mut *self.strm);
        }
    }
}

/// Streaming bzip2 decompressor owning an initialized `bz_stream`.
pub struct Decompress {
    strm: Box<ffi::bz_stream>,
}

impl Decompress {
    /// Initializes a decompressor. `small` selects the reduced-memory
    /// (and slower) decoding variant.
    pub fn new(small: bool) -> Result<Self> {
        let mut strm = Box::new(ffi::bz_stream::zeroed());
        // SAFETY: strm is a valid zeroed bz_stream with default allocators.
        let code = unsafe { ffi::BZ2_bzDecompressInit(&mut *strm, 0, c_int::from(small)) };
        check(code)?;
        Ok(Self { strm })
    }

    /// Runs one decompression step over the given slices. Returns
    /// [`Status::StreamEnd`] once the logical stream is complete.
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        run_step(&mut self.strm, input, output, |strm| {
            // SAFETY: strm was initialized by BZ2_bzDecompressInit and its
            // buffer pointers cover live slices for the whole call.
            unsafe { ffi::BZ2_bzDecompress(strm) }
        })
    }

    /// Total bytes consumed since init, joined from the 32-bit halves.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        u64::from(self.strm.total_in_hi32) << 32 | u64::from(self.strm.total_in_lo32)
    }

    /// Total bytes produced since init, joined from the 32-bit halves.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        u64::from(self.strm.total_out_hi32) << 32 | u64::from(self.strm.total_out_lo32)
    }
}

impl Drop for Decompress {
    fn drop(&mut self) {
        // SAFETY: the stream was initialized in new() and is ended once.
        unsafe {
            ffi::BZ2_bzDecompressEnd(&mut *self.strm);
        }
    }
}

/// One-call compression into a caller-provided buffer.
///
/// Returns the number of bytes written. The worst case output size for `n`
/// input bytes is `n + n / 100 + 600` per the libbz2 documentation.
pub fn compress_buffer(
    input: &[u8],
    output: &mut [u8],
    block_size_100k: u32,
    work_factor: u32,
) -> Result<usize> {
    let mut dest_len = c_uint::try_from(output.len()).map_err(|_| Error::Bz2(Bz2Error::Param))?;
    // SAFETY: both pointers cover live slices, dest_len matches the output
    // capacity, and libbz2 does not write through the source pointer.
    let code = unsafe {
        ffi::BZ2_bzBuffToBuffCompress(
            output.as_mut_ptr().cast::<c_char>(),
            &mut dest_len,
            input.as_ptr() as *mut c_char,
            c_uint::try_from(input.len()).map_err(|_| Error::Bz2(Bz2Error::Param))?,
            block_size_100k as c_int,
            0,
            work_factor as c_int,
        )
    };
    check(code)?;
    Ok(dest_len as usize)
}

/// One-call decompression into a caller-provided buffer.
///
/// Returns the number of bytes written. Fails with
/// [`Bz2Error::OutbuffFull`] when `output` is too small.
pub fn decompress_buffer(input: &[u8], output: &mut [u8], small: bool) -> Result<usize> {
    let mut dest_len = c_uint::try_from(output.len()).map_err(|_| Error::Bz2(Bz2Error::Param))?;
    // SAFETY: both pointers cover live slices, dest_len matches the output
    // capacity, and libbz2 does not write through the source pointer.
    let code = unsafe {
        ffi::BZ2_bzBuffToBuffDecompress(
            output.as_mut_ptr().cast::<c_char>(),
            &mut dest_len,
            input.as_ptr() as *mut c_char,
            c_uint::try_from(input.len()).map_err(|_| Error::Bz2(Bz2Error::Param))?,
            c_int::from(small),
            0,
        )
    };
    check(code)?;
    Ok(dest_len as usize)
}

/// Worst-case compressed size for `len` input bytes.
#[inline]
#[must_use]
pub const fn compress_bound(len: usize) -> usize {
    len + len / 100 + 600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_1_0_series() {
        assert!(version().starts_with("1.0"));
    }

    #[test]
    fn buffer_roundtrip() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(50);
        let mut compressed = vec![0u8; compress_bound(input.len())];
        let n = compress_buffer(&input, &mut compressed, 9, 0).unwrap();
        assert!(n > 0 && n < input.len());

        let mut out = vec![0u8; input.len()];
        let m = decompress_buffer(&compressed[..n], &mut out, false).unwrap();
        assert_eq!(&out[..m], &input[..]);
    }

    #[test]
    fn buffer_decompress_rejects_garbage() {
        let mut out = vec![0u8; 64];
        let err = decompress_buffer(b"definitely not bzip2", &mut out, false).unwrap_err();
        assert_eq!(err, Error::Bz2(Bz2Error::DataMagic));
    }

    #[test]
    fn streaming_roundtrip() {
        let input = b"streaming data ".repeat(1000);
        let mut compressor = Compress::new(1, 0).unwrap();
        let mut compressed = vec![0u8; compress_bound(input.len())];

        let p = compressor
            .compress(&input, &mut compressed, Action::Run)
            .unwrap();
        assert_eq!(p.bytes_in, input.len());
        let mut written = p.bytes_out;
        loop {
            let p = compressor
                .compress(&[], &mut compressed[written..], Action::Finish)
                .unwrap();
            written += p.bytes_out;
            if p.status == Status::StreamEnd {
                break;
            }
        }
        assert_eq!(compressor.total_in(), input.len() as u64);
        assert_eq!(compressor.total_out(), written as u64);

        let mut decompressor = Decompress::new(false).unwrap();
        let mut out = vec![0u8; input.len()];
        let p = decompressor
            .decompress(&compressed[..written], &mut out)
            .unwrap();
        assert_eq!(p.status, Status::StreamEnd);
        assert_eq!(&out[..p.bytes_out], &input[..]);
    }

    #[test]
    fn init_rejects_bad_block_size() {
        assert!(Compress::new(0, 0).is_err());
        assert!(Compress::new(10, 0).is_err());
    }
}
