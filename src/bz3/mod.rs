//! bzip3 bindings: one-call frame codec and the in-place block codec.
//!
//! The one-call [`compress_buffer`] / [`decompress_buffer`] pair handles
//! framed data (with the `BZ3v1` header). [`Bz3State`] wraps the lower-level
//! block codec that transforms a single block in place, for callers that
//! frame data themselves.

pub mod ffi;

use std::ffi::CStr;

use thiserror::Error;

use crate::error::{Error, Result};

/// Error half of the bzip3 status codes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Bz3Error {
    #[error("block size out of range (BZ3_ERR_OUT_OF_BOUNDS)")]
    OutOfBounds,
    #[error("Burrows-Wheeler transform failed (BZ3_ERR_BWT)")]
    Bwt,
    #[error("CRC mismatch (BZ3_ERR_CRC)")]
    Crc,
    #[error("malformed header (BZ3_ERR_MALFORMED_HEADER)")]
    MalformedHeader,
    #[error("truncated data (BZ3_ERR_TRUNCATED_DATA)")]
    TruncatedData,
    #[error("data exceeds the block size (BZ3_ERR_DATA_TOO_BIG)")]
    DataTooBig,
    #[error("state initialization failed (BZ3_ERR_INIT)")]
    Init,
    #[error("destination capacity too small (BZ3_ERR_DATA_SIZE_TOO_SMALL)")]
    DataSizeTooSmall,
    #[error("unrecognized bzip3 status code {0}")]
    Unknown(i32),
}

fn check(code: i32) -> Result<()> {
    let err = match code {
        ffi::BZ3_OK => return Ok(()),
        ffi::BZ3_ERR_OUT_OF_BOUNDS => Bz3Error::OutOfBounds,
        ffi::BZ3_ERR_BWT => Bz3Error::Bwt,
        ffi::BZ3_ERR_CRC => Bz3Error::Crc,
        ffi::BZ3_ERR_MALFORMED_HEADER => Bz3Error::MalformedHeader,
        ffi::BZ3_ERR_TRUNCATED_DATA => Bz3Error::TruncatedData,
        ffi::BZ3_ERR_DATA_TOO_BIG => Bz3Error::DataTooBig,
        ffi::BZ3_ERR_INIT => Bz3Error::Init,
        ffi::BZ3_ERR_DATA_SIZE_TOO_SMALL => Bz3Error::DataSizeTooSmall,
        other => Bz3Error::Unknown(other),
    };
    Err(Error::Bz3(err))
}

/// Runtime version string of the linked bzip3.
pub fn version() -> &'static str {
    // SAFETY: bz3_version returns a pointer to a static NUL-terminated
    // string inside the library.
    unsafe { CStr::from_ptr(ffi::bz3_version()) }
        .to_str()
        .unwrap_or("unknown")
}

/// Worst-case output size for `len` input bytes.
#[must_use]
pub fn bound(len: usize) -> usize {
    // SAFETY: pure arithmetic, no pointers involved.
    unsafe { ffi::bz3_bound(len) }
}

/// One-call framed compression. Returns the number of bytes written.
///
/// `output` must hold at least [`bound`]`(input.len())` bytes.
pub fn compress_buffer(input: &[u8], output: &mut [u8], block_size: u32) -> Result<usize> {
    let mut out_size = output.len();
    // SAFETY: both pointers cover live slices and out_size carries the
    // output capacity in and the written length out.
    let code = unsafe {
        ffi::bz3_compress(
            block_size,
            input.as_ptr(),
            output.as_mut_ptr(),
            input.len(),
            &mut out_size,
        )
    };
    check(code)?;
    Ok(out_size)
}

/// One-call framed decompression. Returns the number of bytes written.
pub fn decompress_buffer(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let mut out_size = output.len();
    // SAFETY: both pointers cover live slices and out_size carries the
    // output capacity in and the written length out.
    let code = unsafe {
        ffi::bz3_decompress(input.as_ptr(), output.as_mut_ptr(), input.len(), &mut out_size)
    };
    check(code)?;
    Ok(out_size)
}

/// Owned bzip3 codec state for the in-place block interface.
pub struct Bz3State {
    raw: *mut ffi::bz3_state,
}

// The state has no thread affinity; bzip3 documents one state per thread.
unsafe impl Send for Bz3State {}

impl Bz3State {
    /// Allocates a state for blocks up to `block_size` bytes
    /// (65 KiB ..= 511 MiB).
    pub fn new(block_size: i32) -> Result<Self> {
        // SAFETY: bz3_new validates the block size and returns null on
        // failure.
        let raw = unsafe { ffi::bz3_new(block_size) };
        if raw.is_null() {
            return Err(Error::Bz3(Bz3Error::Init));
        }
        Ok(Self { raw })
    }

    /// Last error recorded on this state, if any.
    fn last_error(&self) -> Error {
        // SAFETY: raw is a live state owned by self.
        let code = unsafe { ffi::bz3_last_error(self.raw) };
        match check(i32::from(code)) {
            Ok(()) => Error::Bz3(Bz3Error::Unknown(0)),
            Err(e) => e,
        }
    }

    /// Native error message for the last failure on this state.
    pub fn strerror(&self) -> String {
        // SAFETY: bz3_strerror returns a static NUL-terminated string.
        unsafe { CStr::from_ptr(ffi::bz3_strerror(self.raw)) }
            .to_string_lossy()
            .into_owned()
    }

    /// Compresses `buffer[..size]` in place. The buffer must hold at least
    /// [`bound`]`(size)` bytes. Returns the compressed length.
    pub fn encode_block(&mut self, buffer: &mut [u8], size: usize) -> Result<usize> {
        debug_assert!(buffer.len() >= bound(size));
        // SAFETY: buffer covers a live slice of at least bound(size) bytes,
        // which is the in-place working space the block encoder requires.
        let n = unsafe {
            ffi::bz3_encode_block(self.raw, buffer.as_mut_ptr(), i32::try_from(size).map_err(|_| Error::Bz3(Bz3Error::DataTooBig))?)
        };
        if n == -1 {
            return Err(self.last_error());
        }
        Ok(n as usize)
    }

    /// Decompresses a block in place. `compressed_size` is the encoded
    /// length at the start of `buffer` and `orig_size` the expected decoded
    /// length. Returns the decoded length.
    pub fn decode_block(
        &mut self,
        buffer: &mut [u8],
        compressed_size: usize,
        orig_size: usize,
    ) -> Result<usize> {
        // SAFETY: buffer covers a live slice; its full capacity is passed
        // so the decoder can bounds-check its in-place writes.
        let n = unsafe {
            ffi::bz3_decode_block(
                self.raw,
                buffer.as_mut_ptr(),
                buffer.len(),
                i32::try_from(compressed_size).map_err(|_| Error::Bz3(Bz3Error::DataTooBig))?,
                i32::try_from(orig_size).map_err(|_| Error::Bz3(Bz3Error::DataTooBig))?,
            )
        };
        if n == -1 {
            return Err(self.last_error());
        }
        Ok(n as usize)
    }
}

impl Drop for Bz3State {
    fn drop(&mut self) {
        // SAFETY: raw was allocated by bz3_new and is freed once.
        unsafe {
            ffi::bz3_free(self.raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: u32 = 1024 * 1024;

    #[test]
    fn version_is_nonempty() {
        assert!(!version().is_empty());
    }

    #[test]
    fn one_call_roundtrip() {
        let input = b"Hello, bzip3 compression!".repeat(200);
        let mut compressed = vec![0u8; bound(input.len())];
        let n = compress_buffer(&input, &mut compressed, BLOCK).unwrap();

        let mut out = vec![0u8; input.len()];
        let m = decompress_buffer(&compressed[..n], &mut out).unwrap();
        assert_eq!(&out[..m], &input[..]);
    }

    #[test]
    fn block_roundtrip() {
        let input = b"block codec data ".repeat(500);
        let mut state = Bz3State::new(ffi::BZ3_MIN_BLOCK_SIZE).unwrap();

        let mut buffer = vec![0u8; bound(input.len())];
        buffer[..input.len()].copy_from_slice(&input);
        let encoded = state.encode_block(&mut buffer, input.len()).unwrap();

        let decoded = state
            .decode_block(&mut buffer, encoded, input.len())
            .unwrap();
        assert_eq!(&buffer[..decoded], &input[..]);
    }

    #[test]
    fn state_rejects_tiny_block_size() {
        assert!(Bz3State::new(1).is_err());
    }
}
