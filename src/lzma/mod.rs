//! liblzma (.xz) bindings.
//!
//! The raw surface lives in [`ffi`], split by upstream header. This module
//! adds the thin safe layer around the streaming coders, and [`index`]
//! wraps the index builder, codec and iterator.
//!
//! ## Safe layer at a glance
//!
//! | Type / fn | Wraps |
//! |-----------|-------|
//! | [`Stream`] | `lzma_stream` lifecycle plus all coder initializers |
//! | [`Filters`] | `lzma_filter` chain construction |
//! | [`easy_buffer_encode`] | one-call .xz encoding |
//! | [`stream_buffer_decode`] | one-call .xz decoding with a memory limit |
//! | [`index::Index`] | `lzma_index` ownership and iteration |
//!
//! Complex option structs (`lzma_options_lzma`, `lzma_mt`) are used in
//! their raw form; [`preset_options`] fills the former from a preset
//! number, which is how nearly all callers start.

pub mod ffi;
pub mod index;

use std::ffi::CStr;
use std::marker::PhantomData;

use libc::size_t;
use thiserror::Error;

use crate::error::{Error, Result};

/// Error half of the `lzma_ret` codes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LzmaError {
    #[error("cannot allocate memory (LZMA_MEM_ERROR)")]
    Mem,
    #[error("memory usage limit was reached (LZMA_MEMLIMIT_ERROR)")]
    MemLimit,
    #[error("file format not recognized (LZMA_FORMAT_ERROR)")]
    Format,
    #[error("invalid or unsupported options (LZMA_OPTIONS_ERROR)")]
    Options,
    #[error("data is corrupt (LZMA_DATA_ERROR)")]
    Data,
    #[error("no progress is possible (LZMA_BUF_ERROR)")]
    Buf,
    #[error("programming error (LZMA_PROG_ERROR)")]
    Prog,
    #[error("unrecognized lzma_ret code {0}")]
    Unknown(u32),
}

/// Success half of the `lzma_ret` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `LZMA_OK`
    Ok,
    /// `LZMA_STREAM_END`
    StreamEnd,
    /// `LZMA_NO_CHECK`
    NoCheck,
    /// `LZMA_UNSUPPORTED_CHECK`
    UnsupportedCheck,
    /// `LZMA_GET_CHECK`
    GetCheck,
    /// `LZMA_SEEK_NEEDED`: reposition input to `Stream::seek_pos` and
    /// continue.
    SeekNeeded,
}

/// Action argument of [`Stream::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    SyncFlush,
    FullFlush,
    Finish,
    FullBarrier,
}

impl Action {
    #[inline]
    const fn as_raw(self) -> ffi::lzma_action {
        match self {
            Self::Run => ffi::LZMA_RUN,
            Self::SyncFlush => ffi::LZMA_SYNC_FLUSH,
            Self::FullFlush => ffi::LZMA_FULL_FLUSH,
            Self::Finish => ffi::LZMA_FINISH,
            Self::FullBarrier => ffi::LZMA_FULL_BARRIER,
        }
    }
}

/// Integrity check selection for encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    None,
    Crc32,
    Crc64,
    Sha256,
}

impl Check {
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> ffi::lzma_check {
        match self {
            Self::None => ffi::LZMA_CHECK_NONE,
            Self::Crc32 => ffi::LZMA_CHECK_CRC32,
            Self::Crc64 => ffi::LZMA_CHECK_CRC64,
            Self::Sha256 => ffi::LZMA_CHECK_SHA256,
        }
    }

    /// Whether the linked library can verify this check type.
    #[must_use]
    pub fn is_supported(self) -> bool {
        // SAFETY: pure query.
        unsafe { ffi::lzma_check_is_supported(self.as_raw()) != 0 }
    }

    /// Stored size of the check field in bytes.
    #[must_use]
    pub fn size(self) -> u32 {
        // SAFETY: pure query.
        unsafe { ffi::lzma_check_size(self.as_raw()) }
    }
}

/// Maps a raw `lzma_ret` onto the success/error split.
pub(crate) fn check_ret(code: ffi::lzma_ret) -> Result<Status> {
    let err = match code {
        ffi::LZMA_OK => return Ok(Status::Ok),
        ffi::LZMA_STREAM_END => return Ok(Status::StreamEnd),
        ffi::LZMA_NO_CHECK => return Ok(Status::NoCheck),
        ffi::LZMA_UNSUPPORTED_CHECK => return Ok(Status::UnsupportedCheck),
        ffi::LZMA_GET_CHECK => return Ok(Status::GetCheck),
        ffi::LZMA_SEEK_NEEDED => return Ok(Status::SeekNeeded),
        ffi::LZMA_MEM_ERROR => LzmaError::Mem,
        ffi::LZMA_MEMLIMIT_ERROR => LzmaError::MemLimit,
        ffi::LZMA_FORMAT_ERROR => LzmaError::Format,
        ffi::LZMA_OPTIONS_ERROR => LzmaError::Options,
        ffi::LZMA_DATA_ERROR => LzmaError::Data,
        ffi::LZMA_BUF_ERROR => LzmaError::Buf,
        ffi::LZMA_PROG_ERROR => LzmaError::Prog,
        other => LzmaError::Unknown(other),
    };
    Err(Error::Lzma(err))
}

/// Runtime version string of the linked liblzma, e.g. `"5.4.1"`.
pub fn version() -> &'static str {
    // SAFETY: lzma_version_string returns a static NUL-terminated string.
    unsafe { CStr::from_ptr(ffi::lzma_version_string()) }
        .to_str()
        .unwrap_or("unknown")
}

/// Runtime version as `major * 10000000 + minor * 10000 + patch * 10 + s`.
pub fn version_number() -> u32 {
    // SAFETY: pure query.
    unsafe { ffi::lzma_version_number() }
}

/// CRC32 over `buf`, chained from `crc` (0 to start).
#[must_use]
pub fn crc32(crc: u32, buf: &[u8]) -> u32 {
    // SAFETY: buf covers a live slice.
    unsafe { ffi::lzma_crc32(buf.as_ptr(), buf.len(), crc) }
}

/// CRC64 over `buf`, chained from `crc` (0 to start).
#[must_use]
pub fn crc64(crc: u64, buf: &[u8]) -> u64 {
    // SAFETY: buf covers a live slice.
    unsafe { ffi::lzma_crc64(buf.as_ptr(), buf.len(), crc) }
}

/// Usable physical memory in bytes, or `None` if unknown.
#[must_use]
pub fn physmem() -> Option<u64> {
    // SAFETY: pure query.
    match unsafe { ffi::lzma_physmem() } {
        0 => None,
        n => Some(n),
    }
}

/// Number of CPU threads, or `None` if unknown.
#[must_use]
pub fn cputhreads() -> Option<u32> {
    // SAFETY: pure query.
    match unsafe { ffi::lzma_cputhreads() } {
        0 => None,
        n => Some(n),
    }
}

/// Fills an options struct from a preset number
/// (0..=9, optionally ORed with [`ffi::LZMA_PRESET_EXTREME`]).
pub fn preset_options(preset: u32) -> Result<ffi::lzma_options_lzma> {
    let mut opts = ffi::lzma_options_lzma::zeroed();
    // SAFETY: opts is a valid zeroed options struct; the C convention
    // returns true on error.
    if unsafe { ffi::lzma_lzma_preset(&mut opts, preset) } != 0 {
        return Err(Error::Lzma(LzmaError::Options));
    }
    Ok(opts)
}

/// Encoder memory usage of a preset, or `None` if the preset is invalid.
#[must_use]
pub fn easy_encoder_memusage(preset: u32) -> Option<u64> {
    // SAFETY: pure query.
    match unsafe { ffi::lzma_easy_encoder_memusage(preset) } {
        u64::MAX => None,
        n => Some(n),
    }
}

/// Single-shot VLI encoding. Returns the number of bytes written.
pub fn vli_encode(vli: u64, out: &mut [u8]) -> Result<usize> {
    let mut out_pos: size_t = 0;
    // SAFETY: out covers a live slice; null vli_pos selects single-call
    // mode.
    let code = unsafe {
        ffi::lzma_vli_encode(vli, std::ptr::null_mut(), out.as_mut_ptr(), &mut out_pos, out.len())
    };
    match check_ret(code)? {
        Status::StreamEnd => Ok(out_pos),
        _ => Err(Error::Lzma(LzmaError::Prog)),
    }
}

/// Single-shot VLI decoding. Returns the value and the bytes consumed.
pub fn vli_decode(input: &[u8]) -> Result<(u64, usize)> {
    let mut vli: u64 = 0;
    let mut in_pos: size_t = 0;
    // SAFETY: input covers a live slice; null vli_pos selects single-call
    // mode.
    let code = unsafe {
        ffi::lzma_vli_decode(
            &mut vli,
            std::ptr::null_mut(),
            input.as_ptr(),
            &mut in_pos,
            input.len(),
        )
    };
    match check_ret(code)? {
        Status::StreamEnd => Ok((vli, in_pos)),
        _ => Err(Error::Lzma(LzmaError::Data)),
    }
}

/// Encoded size of a VLI in bytes.
pub fn vli_size(vli: u64) -> Result<usize> {
    // SAFETY: pure query; 0 signals an unencodable value.
    match unsafe { ffi::lzma_vli_size(vli) } {
        0 => Err(Error::Lzma(LzmaError::Prog)),
        n => Ok(n as usize),
    }
}

/// Multi-call VLI encoder for writing a value across output buffer
/// boundaries.
///
/// Keeps the byte position the C API tracks through `vli_pos`, so the
/// value can be resumed call by call.
pub struct VliEncoder {
    vli: u64,
    pos: size_t,
}

impl VliEncoder {
    #[must_use]
    pub fn new(vli: u64) -> Self {
        Self { vli, pos: 0 }
    }

    /// Writes as many bytes as fit into `out`. Returns the bytes written
    /// and whether the value is complete.
    pub fn encode(&mut self, out: &mut [u8]) -> Result<(usize, bool)> {
        let mut out_pos: size_t = 0;
        // SAFETY: out covers a live slice; a non-null vli_pos selects
        // multi-call mode and carries the resume position.
        let code = unsafe {
            ffi::lzma_vli_encode(
                self.vli,
                &mut self.pos,
                out.as_mut_ptr(),
                &mut out_pos,
                out.len(),
            )
        };
        let status = check_ret(code)?;
        Ok((out_pos, status == Status::StreamEnd))
    }
}

/// Multi-call VLI decoder, the counterpart of [`VliEncoder`].
pub struct VliDecoder {
    vli: u64,
    pos: size_t,
}

impl VliDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self { vli: 0, pos: 0 }
    }

    /// Consumes bytes from `input`. Returns the bytes consumed and the
    /// value once its last byte has been seen.
    pub fn decode(&mut self, input: &[u8]) -> Result<(usize, Option<u64>)> {
        let mut in_pos: size_t = 0;
        // SAFETY: input covers a live slice; a non-null vli_pos selects
        // multi-call mode, and vli accumulates across calls.
        let code = unsafe {
            ffi::lzma_vli_decode(
                &mut self.vli,
                &mut self.pos,
                input.as_ptr(),
                &mut in_pos,
                input.len(),
            )
        };
        let status = check_ret(code)?;
        Ok((in_pos, (status == Status::StreamEnd).then_some(self.vli)))
    }
}

/// A filter chain under construction.
///
/// Holds the fixed `LZMA_FILTERS_MAX + 1` element array the C API expects,
/// terminator included. Option structs are borrowed, not copied, so the
/// chain cannot outlive them.
pub struct Filters<'a> {
    inner: [ffi::lzma_filter; ffi::LZMA_FILTERS_MAX + 1],
    len: usize,
    _opts: PhantomData<&'a ()>,
}

impl<'a> Filters<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: [ffi::lzma_filter {
                id: ffi::LZMA_VLI_UNKNOWN,
                options: std::ptr::null_mut(),
            }; ffi::LZMA_FILTERS_MAX + 1],
            len: 0,
            _opts: PhantomData,
        }
    }

    fn push(&mut self, id: u64, options: *mut libc::c_void) -> Result<&mut Self> {
        if self.len >= ffi::LZMA_FILTERS_MAX {
            return Err(Error::Lzma(LzmaError::Options));
        }
        self.inner[self.len] = ffi::lzma_filter { id, options };
        self.len += 1;
        Ok(self)
    }

    /// Appends an LZMA2 filter; must be the last filter in a chain.
    pub fn lzma2(&mut self, opts: &'a ffi::lzma_options_lzma) -> Result<&mut Self> {
        self.push(ffi::LZMA_FILTER_LZMA2, (opts as *const ffi::lzma_options_lzma).cast_mut().cast())
    }

    /// Appends an LZMA1 filter (for the legacy .lzma container).
    pub fn lzma1(&mut self, opts: &'a ffi::lzma_options_lzma) -> Result<&mut Self> {
        self.push(ffi::LZMA_FILTER_LZMA1, (opts as *const ffi::lzma_options_lzma).cast_mut().cast())
    }

    /// Appends a byte-wise Delta filter.
    pub fn delta(&mut self, opts: &'a ffi::lzma_options_delta) -> Result<&mut Self> {
        self.push(ffi::LZMA_FILTER_DELTA, (opts as *const ffi::lzma_options_delta).cast_mut().cast())
    }

    /// Appends a BCJ filter by ID (`ffi::LZMA_FILTER_X86`, ...). Pass
    /// `None` for the default zero start offset.
    pub fn bcj(&mut self, id: u64, opts: Option<&'a ffi::lzma_options_bcj>) -> Result<&mut Self> {
        let ptr = opts.map_or(std::ptr::null_mut(), |o| {
            (o as *const ffi::lzma_options_bcj).cast_mut().cast()
        });
        self.push(id, ptr)
    }

    /// Terminated array for the C API.
    #[must_use]
    pub fn as_ptr(&self) -> *const ffi::lzma_filter {
        self.inner.as_ptr()
    }

    /// Encoder memory usage of this chain, or `None` if unsupported.
    #[must_use]
    pub fn raw_encoder_memusage(&self) -> Option<u64> {
        // SAFETY: inner is a terminated filter array.
        match unsafe { ffi::lzma_raw_encoder_memusage(self.as_ptr()) } {
            u64::MAX => None,
            n => Some(n),
        }
    }
}

impl Default for Filters<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of one coding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub status: Status,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// An initialized coder owning a `lzma_stream`.
///
/// Construct with one of the initializers, feed data through [`code`], and
/// let `Drop` run `lzma_end`. A `Stream` can be reinitialized by calling
/// another initializer on it, which is the C idiom for coder reuse.
///
/// [`code`]: Self::code
pub struct Stream {
    strm: Box<ffi::lzma_stream>,
}

impl Stream {
    pub(crate) fn init<F>(f: F) -> Result<Self>
    where
        F: FnOnce(*mut ffi::lzma_stream) -> ffi::lzma_ret,
    {
        let mut strm = Box::new(ffi::lzma_stream::zeroed());
        check_ret(f(&mut *strm))?;
        Ok(Self { strm })
    }

    /// .xz encoder from a preset (the `xz -[0-9]` levels).
    pub fn easy_encoder(preset: u32, check: Check) -> Result<Self> {
        // SAFETY: strm is zeroed per LZMA_STREAM_INIT.
        Self::init(|strm| unsafe { ffi::lzma_easy_encoder(strm, preset, check.as_raw()) })
    }

    /// .xz encoder from an explicit filter chain.
    pub fn stream_encoder(filters: &Filters<'_>, check: Check) -> Result<Self> {
        // SAFETY: strm is zeroed; filters is a terminated array that only
        // needs to live for this call (options are copied by liblzma).
        Self::init(|strm| unsafe { ffi::lzma_stream_encoder(strm, filters.as_ptr(), check.as_raw()) })
    }

    /// Multithreaded .xz encoder.
    pub fn stream_encoder_mt(options: &ffi::lzma_mt) -> Result<Self> {
        // SAFETY: strm is zeroed; options outlives the call.
        Self::init(|strm| unsafe { ffi::lzma_stream_encoder_mt(strm, options) })
    }

    /// Raw encoder without any container framing.
    pub fn raw_encoder(filters: &Filters<'_>) -> Result<Self> {
        // SAFETY: strm is zeroed; filters is a terminated array.
        Self::init(|strm| unsafe { ffi::lzma_raw_encoder(strm, filters.as_ptr()) })
    }

    /// Legacy .lzma (LZMA_Alone) encoder.
    pub fn alone_encoder(options: &ffi::lzma_options_lzma) -> Result<Self> {
        // SAFETY: strm is zeroed; options outlives the call.
        Self::init(|strm| unsafe { ffi::lzma_alone_encoder(strm, options) })
    }

    /// MicroLZMA encoder (headerless LZMA1, used by erofs).
    pub fn microlzma_encoder(options: &ffi::lzma_options_lzma) -> Result<Self> {
        // SAFETY: strm is zeroed; options outlives the call.
        Self::init(|strm| unsafe { ffi::lzma_microlzma_encoder(strm, options) })
    }

    /// .xz decoder. `flags` is a combination of the `ffi::LZMA_TELL_*`,
    /// `ffi::LZMA_CONCATENATED` and related bits.
    pub fn stream_decoder(memlimit: u64, flags: u32) -> Result<Self> {
        // SAFETY: strm is zeroed.
        Self::init(|strm| unsafe { ffi::lzma_stream_decoder(strm, memlimit, flags) })
    }

    /// Multithreaded .xz decoder.
    pub fn stream_decoder_mt(options: &ffi::lzma_mt) -> Result<Self> {
        // SAFETY: strm is zeroed; options outlives the call.
        Self::init(|strm| unsafe { ffi::lzma_stream_decoder_mt(strm, options) })
    }

    /// Decoder that auto-detects .xz versus legacy .lzma input.
    pub fn auto_decoder(memlimit: u64, flags: u32) -> Result<Self> {
        // SAFETY: strm is zeroed.
        Self::init(|strm| unsafe { ffi::lzma_auto_decoder(strm, memlimit, flags) })
    }

    /// Legacy .lzma (LZMA_Alone) decoder.
    pub fn alone_decoder(memlimit: u64) -> Result<Self> {
        // SAFETY: strm is zeroed.
        Self::init(|strm| unsafe { ffi::lzma_alone_decoder(strm, memlimit) })
    }

    /// .lz (lzip) decoder.
    pub fn lzip_decoder(memlimit: u64, flags: u32) -> Result<Self> {
        // SAFETY: strm is zeroed.
        Self::init(|strm| unsafe { ffi::lzma_lzip_decoder(strm, memlimit, flags) })
    }

    /// Raw decoder without any container framing.
    pub fn raw_decoder(filters: &Filters<'_>) -> Result<Self> {
        // SAFETY: strm is zeroed; filters is a terminated array.
        Self::init(|strm| unsafe { ffi::lzma_raw_decoder(strm, filters.as_ptr()) })
    }

    /// MicroLZMA decoder.
    pub fn microlzma_decoder(
        comp_size: u64,
        uncomp_size: u64,
        uncomp_size_is_exact: bool,
        dict_size: u32,
    ) -> Result<Self> {
        // SAFETY: strm is zeroed.
        Self::init(|strm| unsafe {
            ffi::lzma_microlzma_decoder(
                strm,
                comp_size,
                uncomp_size,
                u8::from(uncomp_size_is_exact),
                dict_size,
            )
        })
    }

    /// Runs one coding step over the given slices.
    pub fn code(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<Progress> {
        self.strm.next_in = input.as_ptr();
        self.strm.avail_in = input.len();
        self.strm.next_out = output.as_mut_ptr();
        self.strm.avail_out = output.len();

        // SAFETY: the stream was initialized by one of the constructors
        // and the buffer pointers cover live slices for the whole call.
        let code = unsafe { ffi::lzma_code(&mut *self.strm, action.as_raw()) };

        let bytes_in = input.len() - self.strm.avail_in;
        let bytes_out = output.len() - self.strm.avail_out;
        self.strm.next_in = std::ptr::null();
        self.strm.next_out = std::ptr::null_mut();

        check_ret(code).map(|status| Progress {
            status,
            bytes_in,
            bytes_out,
        })
    }

    /// Replaces the filter chain of a running encoder; applies at the next
    /// flush or block boundary.
    pub fn filters_update(&mut self, filters: &Filters<'_>) -> Result<()> {
        // SAFETY: the stream is initialized and filters is a terminated
        // array.
        check_ret(unsafe { ffi::lzma_filters_update(&mut *self.strm, filters.as_ptr()) })?;
        Ok(())
    }

    /// Total bytes consumed since init.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        self.strm.total_in
    }

    /// Total bytes produced since init.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        self.strm.total_out
    }

    /// Input position requested by a coder that returned
    /// [`Status::SeekNeeded`].
    #[must_use]
    pub fn seek_pos(&self) -> u64 {
        self.strm.seek_pos
    }

    /// Coder progress for threaded coders (falls back to the totals).
    #[must_use]
    pub fn progress(&mut self) -> (u64, u64) {
        let mut progress_in = 0;
        let mut progress_out = 0;
        // SAFETY: the stream is initialized.
        unsafe {
            ffi::lzma_get_progress(&mut *self.strm, &mut progress_in, &mut progress_out);
        }
        (progress_in, progress_out)
    }

    /// Memory usage of the current coder in bytes.
    #[must_use]
    pub fn memusage(&self) -> u64 {
        // SAFETY: the stream is initialized.
        unsafe { ffi::lzma_memusage(&*self.strm) }
    }

    /// Current memory usage limit, or `None` if the coder has no limit.
    #[must_use]
    pub fn memlimit(&self) -> Option<u64> {
        // SAFETY: the stream is initialized.
        match unsafe { ffi::lzma_memlimit_get(&*self.strm) } {
            0 => None,
            n => Some(n),
        }
    }

    /// Raises or lowers the memory usage limit.
    ///
    /// After a coder stopped with [`LzmaError::MemLimit`], raising the
    /// limit past [`memusage`] lets `code` continue where it stopped.
    ///
    /// [`memusage`]: Self::memusage
    pub fn set_memlimit(&mut self, memlimit: u64) -> Result<()> {
        // SAFETY: the stream is initialized.
        check_ret(unsafe { ffi::lzma_memlimit_set(&mut *self.strm, memlimit) })?;
        log::debug!("memlimit raised to {memlimit}");
        Ok(())
    }

    /// Check type of the stream being decoded; meaningful after the
    /// decoder returned [`Status::NoCheck`], [`Status::UnsupportedCheck`]
    /// or [`Status::GetCheck`].
    #[must_use]
    pub fn get_check(&self) -> ffi::lzma_check {
        // SAFETY: the stream is initialized.
        unsafe { ffi::lzma_get_check(&*self.strm) }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        // SAFETY: lzma_end accepts both initialized and already-ended
        // streams.
        unsafe {
            ffi::lzma_end(&mut *self.strm);
        }
    }
}

/// One-call .xz encoding. Returns the number of bytes written.
///
/// `output` needs [`stream_buffer_bound`]`(input.len())` bytes in the worst
/// case.
pub fn easy_buffer_encode(
    preset: u32,
    check: Check,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    let mut out_pos: size_t = 0;
    // SAFETY: both pointers cover live slices and out_pos stays within the
    // output capacity.
    let code = unsafe {
        ffi::lzma_easy_buffer_encode(
            preset,
            check.as_raw(),
            std::ptr::null(),
            input.as_ptr(),
            input.len(),
            output.as_mut_ptr(),
            &mut out_pos,
            output.len(),
        )
    };
    check_ret(code)?;
    Ok(out_pos)
}

/// Worst-case .xz output size for `len` input bytes.
#[must_use]
pub fn stream_buffer_bound(len: usize) -> usize {
    // SAFETY: pure arithmetic.
    unsafe { ffi::lzma_stream_buffer_bound(len) }
}

/// One-call .xz decoding.
///
/// `memlimit` is raised to the required amount when the call fails with
/// [`LzmaError::MemLimit`], mirroring the C contract. Returns
/// `(bytes_consumed, bytes_written)`.
pub fn stream_buffer_decode(
    memlimit: &mut u64,
    flags: u32,
    input: &[u8],
    output: &mut [u8],
) -> Result<(usize, usize)> {
    let mut in_pos: size_t = 0;
    let mut out_pos: size_t = 0;
    // SAFETY: all pointers cover live slices or stack slots.
    let code = unsafe {
        ffi::lzma_stream_buffer_decode(
            memlimit,
            flags,
            std::ptr::null(),
            input.as_ptr(),
            &mut in_pos,
            input.len(),
            output.as_mut_ptr(),
            &mut out_pos,
            output.len(),
        )
    };
    check_ret(code)?;
    Ok((in_pos, out_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        b"xz sample payload ".repeat(400)
    }

    #[test]
    fn version_matches_number() {
        let n = version_number();
        let s = version();
        let major = n / 10_000_000;
        assert!(s.starts_with(&format!("{major}.")));
    }

    #[test]
    fn crc_known_values() {
        // Standard CRC-32 and CRC-64/XZ test vectors for "123456789".
        assert_eq!(crc32(0, b"123456789"), 0xCBF4_3926);
        assert_eq!(crc64(0, b"123456789"), 0x995D_C9BB_DF19_39FA);
    }

    #[test]
    fn vli_roundtrip() {
        let mut buf = [0u8; ffi::LZMA_VLI_BYTES_MAX];
        for value in [0u64, 127, 128, 300_000, ffi::LZMA_VLI_MAX] {
            let n = vli_encode(value, &mut buf).unwrap();
            assert_eq!(n, vli_size(value).unwrap());
            let (decoded, used) = vli_decode(&buf[..n]).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(used, n);
        }
    }

    #[test]
    fn vli_multi_call_roundtrip() {
        for value in [0u64, 127, 128, 300_000, ffi::LZMA_VLI_MAX] {
            let mut single = [0u8; ffi::LZMA_VLI_BYTES_MAX];
            let n = vli_encode(value, &mut single).unwrap();

            // One output byte at a time until the encoder reports the
            // value complete.
            let mut encoder = VliEncoder::new(value);
            let mut encoded = Vec::new();
            loop {
                let mut byte = [0u8; 1];
                let (written, done) = encoder.encode(&mut byte).unwrap();
                assert_eq!(written, 1);
                encoded.push(byte[0]);
                if done {
                    break;
                }
            }
            assert_eq!(&encoded[..], &single[..n]);

            // And back, one input byte at a time.
            let mut decoder = VliDecoder::new();
            let mut decoded = None;
            for (i, &byte) in encoded.iter().enumerate() {
                let (used, got) = decoder.decode(&[byte]).unwrap();
                assert_eq!(used, 1);
                if got.is_some() {
                    assert_eq!(i, encoded.len() - 1);
                    decoded = got;
                }
            }
            assert_eq!(decoded, Some(value));
        }
    }

    #[test]
    fn vli_rejects_out_of_range() {
        assert!(vli_size(ffi::LZMA_VLI_UNKNOWN).is_err());
    }

    #[test]
    fn easy_buffer_roundtrip() {
        let input = sample();
        let mut compressed = vec![0u8; stream_buffer_bound(input.len())];
        let n = easy_buffer_encode(6, Check::Crc64, &input, &mut compressed).unwrap();
        assert!(n > 0 && n < input.len());

        let mut out = vec![0u8; input.len()];
        let mut memlimit = u64::MAX;
        let (used, written) =
            stream_buffer_decode(&mut memlimit, 0, &compressed[..n], &mut out).unwrap();
        assert_eq!(used, n);
        assert_eq!(&out[..written], &input[..]);
    }

    #[test]
    fn buffer_decode_reports_memlimit() {
        let input = sample();
        let mut compressed = vec![0u8; stream_buffer_bound(input.len())];
        let n = easy_buffer_encode(6, Check::Crc32, &input, &mut compressed).unwrap();

        let mut out = vec![0u8; input.len()];
        let mut memlimit = 1024;
        let err = stream_buffer_decode(&mut memlimit, 0, &compressed[..n], &mut out).unwrap_err();
        assert_eq!(err, crate::Error::Lzma(LzmaError::MemLimit));
        // The C contract raises memlimit to the amount that would have
        // been needed.
        assert!(memlimit > 1024);
    }

    #[test]
    fn streaming_roundtrip_with_finish_loop() {
        let input = sample();
        let mut encoder = Stream::easy_encoder(1, Check::Crc32).unwrap();
        let mut compressed = vec![0u8; stream_buffer_bound(input.len())];

        let p = encoder.code(&input, &mut compressed, Action::Run).unwrap();
        assert_eq!(p.bytes_in, input.len());
        let mut written = p.bytes_out;
        loop {
            let p = encoder
                .code(&[], &mut compressed[written..], Action::Finish)
                .unwrap();
            written += p.bytes_out;
            if p.status == Status::StreamEnd {
                break;
            }
        }
        assert_eq!(encoder.total_in(), input.len() as u64);
        assert_eq!(encoder.total_out(), written as u64);

        let mut decoder = Stream::stream_decoder(u64::MAX, 0).unwrap();
        let mut out = vec![0u8; input.len()];
        let p = decoder
            .code(&compressed[..written], &mut out, Action::Finish)
            .unwrap();
        assert_eq!(p.status, Status::StreamEnd);
        assert_eq!(&out[..p.bytes_out], &input[..]);
    }

    #[test]
    fn decoder_memlimit_retry() {
        let _ = env_logger::builder().is_test(true).try_init();
        let input = sample();
        let mut compressed = vec![0u8; stream_buffer_bound(input.len())];
        let n = easy_buffer_encode(6, Check::Crc32, &input, &mut compressed).unwrap();

        let mut decoder = Stream::stream_decoder(1024, 0).unwrap();
        let mut out = vec![0u8; input.len()];
        let err = decoder
            .code(&compressed[..n], &mut out, Action::Finish)
            .unwrap_err();
        assert_eq!(err, crate::Error::Lzma(LzmaError::MemLimit));

        // Raising the limit lets the decoder continue where it stopped.
        // Input already consumed before the error stays consumed.
        let consumed = decoder.total_in() as usize;
        decoder.set_memlimit(u64::MAX).unwrap();
        let p = decoder
            .code(&compressed[consumed..n], &mut out, Action::Finish)
            .unwrap();
        assert_eq!(p.status, Status::StreamEnd);
        assert_eq!(&out[..p.bytes_out], &input[..]);
    }

    #[test]
    fn explicit_filter_chain_roundtrip() {
        let opts = preset_options(3).unwrap();
        let delta = ffi::lzma_options_delta::byte_delta(4);
        let mut filters = Filters::new();
        filters.delta(&delta).unwrap().lzma2(&opts).unwrap();

        let input: Vec<u8> = (0u32..4096).flat_map(u32::to_le_bytes).collect();
        let mut encoder = Stream::stream_encoder(&filters, Check::Crc64).unwrap();
        let mut compressed = vec![0u8; stream_buffer_bound(input.len())];
        let p = encoder
            .code(&input, &mut compressed, Action::Finish)
            .unwrap();
        assert_eq!(p.status, Status::StreamEnd);

        let mut decoder = Stream::stream_decoder(u64::MAX, 0).unwrap();
        let mut out = vec![0u8; input.len()];
        let q = decoder
            .code(&compressed[..p.bytes_out], &mut out, Action::Finish)
            .unwrap();
        assert_eq!(q.status, Status::StreamEnd);
        assert_eq!(&out[..q.bytes_out], &input[..]);
    }

    #[test]
    fn filters_reject_overflow() {
        let opts = preset_options(1).unwrap();
        let mut filters = Filters::new();
        for _ in 0..ffi::LZMA_FILTERS_MAX {
            filters.lzma2(&opts).unwrap();
        }
        assert!(filters.lzma2(&opts).is_err());
    }

    #[test]
    fn alone_roundtrip() {
        let input = sample();
        let opts = preset_options(2).unwrap();
        let mut encoder = Stream::alone_encoder(&opts).unwrap();
        let mut compressed = vec![0u8; stream_buffer_bound(input.len())];
        let p = encoder
            .code(&input, &mut compressed, Action::Finish)
            .unwrap();
        assert_eq!(p.status, Status::StreamEnd);

        // auto_decoder must recognize the legacy container.
        let mut decoder = Stream::auto_decoder(u64::MAX, 0).unwrap();
        let mut out = vec![0u8; input.len()];
        let q = decoder
            .code(&compressed[..p.bytes_out], &mut out, Action::Finish)
            .unwrap();
        assert_eq!(q.status, Status::StreamEnd);
        assert_eq!(&out[..q.bytes_out], &input[..]);
    }

    #[test]
    fn preset_options_rejects_bad_level() {
        assert!(preset_options(42).is_err());
        let opts = preset_options(6).unwrap();
        assert_eq!(opts.dict_size, ffi::LZMA_DICT_SIZE_DEFAULT);
        assert_eq!(opts.lc, ffi::LZMA_LC_DEFAULT);
        assert_eq!(opts.pb, ffi::LZMA_PB_DEFAULT);
    }

    #[test]
    fn check_support_queries() {
        assert!(Check::None.is_supported());
        assert!(Check::Crc32.is_supported());
        assert_eq!(Check::None.size(), 0);
        assert_eq!(Check::Crc32.size(), 4);
        assert_eq!(Check::Crc64.size(), 8);
        assert_eq!(Check::Sha256.size(), 32);
    }
}
