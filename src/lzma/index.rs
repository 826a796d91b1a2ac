//! Safe wrappers around `lzma_index`: building, encoding, decoding and
//! iterating the block catalog of .xz streams.
//!
//! [`Index`] owns the native tree. [`IndexIter`] borrows it, so the
//! borrow checker enforces what the C docs only state in prose: an
//! iterator must not outlive or observe a modified index.

use std::marker::PhantomData;
use std::ptr::NonNull;

use libc::size_t;

use super::ffi;
use super::{check_ret, LzmaError, Progress, Status, Stream};
use crate::error::{Error, Result};

/// Owned block catalog for one or more .xz streams.
pub struct Index {
    raw: NonNull<ffi::lzma_index>,
}

// lzma_index has no thread affinity once built.
unsafe impl Send for Index {}

impl Index {
    /// Creates an empty index.
    pub fn new() -> Result<Self> {
        // SAFETY: null allocator selects malloc/free; null return means
        // allocation failure.
        let raw = unsafe { ffi::lzma_index_init(std::ptr::null()) };
        NonNull::new(raw)
            .map(|raw| Self { raw })
            .ok_or(Error::Lzma(LzmaError::Mem))
    }

    pub(crate) fn from_raw(raw: NonNull<ffi::lzma_index>) -> Self {
        Self { raw }
    }

    /// Memory needed for an index with the given stream and block counts.
    #[must_use]
    pub fn memusage(streams: u64, blocks: u64) -> u64 {
        // SAFETY: pure arithmetic.
        unsafe { ffi::lzma_index_memusage(streams, blocks) }
    }

    /// Memory currently used by this index.
    #[must_use]
    pub fn memused(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_memused(self.raw.as_ptr()) }
    }

    /// Appends one block record to the last stream of the index.
    pub fn append(&mut self, unpadded_size: u64, uncompressed_size: u64) -> Result<()> {
        // SAFETY: raw is a live index owned by self.
        check_ret(unsafe {
            ffi::lzma_index_append(
                self.raw.as_ptr(),
                std::ptr::null(),
                unpadded_size,
                uncompressed_size,
            )
        })?;
        Ok(())
    }

    /// Sets the stream flags of the last stream (needed before encoding).
    pub fn set_stream_flags(&mut self, flags: &ffi::lzma_stream_flags) -> Result<()> {
        // SAFETY: raw is live; flags is copied by liblzma.
        check_ret(unsafe { ffi::lzma_index_stream_flags(self.raw.as_ptr(), flags) })?;
        Ok(())
    }

    /// Sets the padding after the last stream; must be a multiple of four.
    pub fn set_stream_padding(&mut self, padding: u64) -> Result<()> {
        // SAFETY: raw is a live index owned by self.
        check_ret(unsafe { ffi::lzma_index_stream_padding(self.raw.as_ptr(), padding) })?;
        Ok(())
    }

    /// Bitmask of the check types seen in the stream flags (bit N set for
    /// check ID N).
    #[must_use]
    pub fn checks(&self) -> u32 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_checks(self.raw.as_ptr()) }
    }

    #[must_use]
    pub fn stream_count(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_stream_count(self.raw.as_ptr()) }
    }

    #[must_use]
    pub fn block_count(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_block_count(self.raw.as_ptr()) }
    }

    /// Encoded size of the index field itself.
    #[must_use]
    pub fn index_size(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_size(self.raw.as_ptr()) }
    }

    /// Size of the last stream including header, footer and index.
    #[must_use]
    pub fn stream_size(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_stream_size(self.raw.as_ptr()) }
    }

    /// Total size of the blocks across all streams.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_total_size(self.raw.as_ptr()) }
    }

    /// Size of the whole file the index describes, padding included.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_file_size(self.raw.as_ptr()) }
    }

    /// Uncompressed size of the whole file.
    #[must_use]
    pub fn uncompressed_size(&self) -> u64 {
        // SAFETY: raw is a live index.
        unsafe { ffi::lzma_index_uncompressed_size(self.raw.as_ptr()) }
    }

    /// Concatenates `src` after this index, as when reading concatenated
    /// .xz files. `src` is consumed whether or not the call succeeds.
    pub fn cat(&mut self, src: Self) -> Result<()> {
        let src_raw = src.raw.as_ptr();
        // On success liblzma frees src itself, so src's Drop must not run.
        std::mem::forget(src);
        // SAFETY: both pointers are live indexes; src ownership moves into
        // the call.
        let code = unsafe { ffi::lzma_index_cat(self.raw.as_ptr(), src_raw, std::ptr::null()) };
        match check_ret(code) {
            Ok(_) => Ok(()),
            Err(e) => {
                // On failure the C API leaves src alive; reclaim it so the
                // memory is still released.
                // SAFETY: src_raw was not freed when the call failed.
                unsafe { ffi::lzma_index_end(src_raw, std::ptr::null()) };
                Err(e)
            }
        }
    }

    /// Deep copy.
    pub fn try_clone(&self) -> Result<Self> {
        // SAFETY: raw is a live index; null return means allocation
        // failure.
        let dup = unsafe { ffi::lzma_index_dup(self.raw.as_ptr(), std::ptr::null()) };
        NonNull::new(dup)
            .map(|raw| Self { raw })
            .ok_or(Error::Lzma(LzmaError::Mem))
    }

    /// Iterator over the streams and blocks of this index.
    #[must_use]
    pub fn iter(&self) -> IndexIter<'_> {
        let mut iter = std::mem::MaybeUninit::<ffi::lzma_index_iter>::uninit();
        // SAFETY: lzma_index_iter_init fully initializes iter and only
        // borrows the index, which the 'a lifetime keeps alive.
        let iter = unsafe {
            ffi::lzma_index_iter_init(iter.as_mut_ptr(), self.raw.as_ptr());
            iter.assume_init()
        };
        IndexIter {
            iter,
            _index: PhantomData,
        }
    }

    /// Encodes the index field into a freshly allocated buffer.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.index_size() as usize];
        let mut out_pos: size_t = 0;
        // SAFETY: out has exactly the encoded size the index reports.
        check_ret(unsafe {
            ffi::lzma_index_buffer_encode(
                self.raw.as_ptr(),
                out.as_mut_ptr(),
                &mut out_pos,
                out.len(),
            )
        })?;
        out.truncate(out_pos);
        Ok(out)
    }

    /// Decodes an index field. Returns the index and the bytes consumed.
    ///
    /// `memlimit` is raised to the required amount when decoding fails
    /// with [`LzmaError::MemLimit`].
    pub fn decode(input: &[u8], memlimit: &mut u64) -> Result<(Self, usize)> {
        let mut raw: *mut ffi::lzma_index = std::ptr::null_mut();
        let mut in_pos: size_t = 0;
        // SAFETY: all pointers cover live slices or stack slots; on
        // success raw points to a freshly allocated index we now own.
        let code = unsafe {
            ffi::lzma_index_buffer_decode(
                &mut raw,
                memlimit,
                std::ptr::null(),
                input.as_ptr(),
                &mut in_pos,
                input.len(),
            )
        };
        check_ret(code)?;
        let raw = NonNull::new(raw).ok_or(Error::Lzma(LzmaError::Prog))?;
        Ok((Self { raw }, in_pos))
    }

    /// Streaming encoder producing the index field.
    pub fn encoder(&self) -> Result<IndexEncoder<'_>> {
        // SAFETY: strm is zeroed; the coder keeps the index pointer and
        // reads through it on every step, which the 'a lifetime covers.
        let stream =
            Stream::init(|strm| unsafe { ffi::lzma_index_encoder(strm, self.raw.as_ptr()) })?;
        Ok(IndexEncoder {
            stream,
            _index: PhantomData,
        })
    }
}

impl Drop for Index {
    fn drop(&mut self) {
        // SAFETY: raw was allocated by liblzma and is freed once.
        unsafe {
            ffi::lzma_index_end(self.raw.as_ptr(), std::ptr::null());
        }
    }
}

/// What [`IndexIter::next`] stops at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterMode {
    Any,
    Stream,
    Block,
    NonemptyBlock,
}

impl IterMode {
    const fn as_raw(self) -> ffi::lzma_index_iter_mode {
        match self {
            Self::Any => ffi::LZMA_INDEX_ITER_ANY,
            Self::Stream => ffi::LZMA_INDEX_ITER_STREAM,
            Self::Block => ffi::LZMA_INDEX_ITER_BLOCK,
            Self::NonemptyBlock => ffi::LZMA_INDEX_ITER_NONEMPTY_BLOCK,
        }
    }
}

/// Stream-level fields of an iterator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRecord {
    pub number: u64,
    pub block_count: u64,
    pub compressed_offset: u64,
    pub uncompressed_offset: u64,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub padding: u64,
}

/// Block-level fields of an iterator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    pub number_in_file: u64,
    pub compressed_file_offset: u64,
    pub uncompressed_file_offset: u64,
    pub number_in_stream: u64,
    pub compressed_stream_offset: u64,
    pub uncompressed_stream_offset: u64,
    pub uncompressed_size: u64,
    pub unpadded_size: u64,
    pub total_size: u64,
}

/// One iterator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub stream: StreamRecord,
    pub block: BlockRecord,
}

/// Cursor over an [`Index`].
///
/// Not a `std::iter::Iterator` because each step takes a mode, matching
/// the C API.
pub struct IndexIter<'a> {
    iter: ffi::lzma_index_iter,
    _index: PhantomData<&'a Index>,
}

impl IndexIter<'_> {
    fn record(&self) -> Record {
        let s = &self.iter.stream;
        let b = &self.iter.block;
        Record {
            stream: StreamRecord {
                number: s.number,
                block_count: s.block_count,
                compressed_offset: s.compressed_offset,
                uncompressed_offset: s.uncompressed_offset,
                compressed_size: s.compressed_size,
                uncompressed_size: s.uncompressed_size,
                padding: s.padding,
            },
            block: BlockRecord {
                number_in_file: b.number_in_file,
                compressed_file_offset: b.compressed_file_offset,
                uncompressed_file_offset: b.uncompressed_file_offset,
                number_in_stream: b.number_in_stream,
                compressed_stream_offset: b.compressed_stream_offset,
                uncompressed_stream_offset: b.uncompressed_stream_offset,
                uncompressed_size: b.uncompressed_size,
                unpadded_size: b.unpadded_size,
                total_size: b.total_size,
            },
        }
    }

    /// Advances to the next element of the given kind.
    pub fn next(&mut self, mode: IterMode) -> Option<Record> {
        // SAFETY: iter was initialized against an index the lifetime
        // keeps alive and unmodified.
        let done = unsafe { ffi::lzma_index_iter_next(&mut self.iter, mode.as_raw()) };
        (done == 0).then(|| self.record())
    }

    /// Moves back to the position [`Index::iter`] returned.
    pub fn rewind(&mut self) {
        // SAFETY: iter is initialized.
        unsafe { ffi::lzma_index_iter_rewind(&mut self.iter) }
    }

    /// Positions on the block containing the given uncompressed offset.
    /// Returns `None` when the offset is past the end of the file.
    pub fn locate(&mut self, target: u64) -> Option<Record> {
        // SAFETY: iter is initialized.
        let missed = unsafe { ffi::lzma_index_iter_locate(&mut self.iter, target) };
        (missed == 0).then(|| self.record())
    }
}

/// Streaming encoder for the index field of an [`Index`].
///
/// Borrows the index; the coder holds the index pointer and reads it on
/// every step, so the index must not be dropped or modified while the
/// encoder lives.
pub struct IndexEncoder<'a> {
    stream: Stream,
    _index: PhantomData<&'a Index>,
}

impl IndexEncoder<'_> {
    /// Writes encoded index bytes into `out`. [`Status::StreamEnd`] means
    /// the whole field has been produced.
    pub fn code(&mut self, out: &mut [u8]) -> Result<Progress> {
        self.stream.code(&[], out, super::Action::Run)
    }
}

/// Streaming decoder for an index field, the counterpart of
/// [`Index::encoder`].
pub struct IndexDecoder {
    stream: Stream,
    // Box keeps the slot address stable; liblzma stores the pointer at
    // init time and writes the finished index through it.
    slot: Box<*mut ffi::lzma_index>,
}

impl IndexDecoder {
    pub fn new(memlimit: u64) -> Result<Self> {
        let mut slot = Box::new(std::ptr::null_mut());
        let slot_ptr: *mut *mut ffi::lzma_index = &mut *slot;
        let stream =
            // SAFETY: strm is zeroed; slot_ptr stays valid because the Box
            // lives (and keeps its address) as long as the stream does.
            Stream::init(|strm| unsafe { ffi::lzma_index_decoder(strm, slot_ptr, memlimit) })?;
        Ok(Self { stream, slot })
    }

    /// Feeds encoded index bytes. [`Status::StreamEnd`] means the index is
    /// complete and [`finish`](Self::finish) will yield it.
    pub fn code(&mut self, input: &[u8]) -> Result<Progress> {
        self.stream.code(input, &mut [], super::Action::Run)
    }

    /// Takes the decoded index after [`Status::StreamEnd`].
    pub fn finish(mut self) -> Result<Index> {
        let raw = std::mem::replace(&mut *self.slot, std::ptr::null_mut());
        NonNull::new(raw)
            .map(Index::from_raw)
            .ok_or(Error::Lzma(LzmaError::Prog))
    }
}

impl Drop for IndexDecoder {
    fn drop(&mut self) {
        let raw = std::mem::replace(&mut *self.slot, std::ptr::null_mut());
        if !raw.is_null() {
            // SAFETY: the slot only holds a finished index this decoder
            // owns; finish() nulls it, so this frees at most once.
            unsafe { ffi::lzma_index_end(raw, std::ptr::null()) };
        }
    }
}

/// Decoder for the index and footer of a complete .xz file.
///
/// Drive it with [`code`](Self::code); on [`Status::SeekNeeded`] reposition
/// the input to [`seek_pos`](Self::seek_pos) and continue. After
/// [`Status::StreamEnd`], [`finish`](Self::finish) yields the combined
/// index of all streams in the file.
pub struct FileInfoDecoder {
    stream: Stream,
    slot: Box<*mut ffi::lzma_index>,
}

impl FileInfoDecoder {
    pub fn new(memlimit: u64, file_size: u64) -> Result<Self> {
        let mut slot = Box::new(std::ptr::null_mut());
        let slot_ptr: *mut *mut ffi::lzma_index = &mut *slot;
        let stream = Stream::init(|strm| {
            // SAFETY: strm is zeroed; slot_ptr stays valid because the Box
            // lives (and keeps its address) as long as the stream does.
            unsafe { ffi::lzma_file_info_decoder(strm, slot_ptr, memlimit, file_size) }
        })?;
        Ok(Self { stream, slot })
    }

    /// Feeds file bytes starting at the current input position.
    pub fn code(&mut self, input: &[u8]) -> Result<Progress> {
        self.stream.code(input, &mut [], super::Action::Run)
    }

    /// Absolute file offset to continue from after
    /// [`Status::SeekNeeded`].
    #[must_use]
    pub fn seek_pos(&self) -> u64 {
        self.stream.seek_pos()
    }

    /// Takes the decoded index after [`Status::StreamEnd`].
    pub fn finish(mut self) -> Result<Index> {
        let raw = std::mem::replace(&mut *self.slot, std::ptr::null_mut());
        NonNull::new(raw)
            .map(Index::from_raw)
            .ok_or(Error::Lzma(LzmaError::Prog))
    }
}

impl Drop for FileInfoDecoder {
    fn drop(&mut self) {
        let raw = std::mem::replace(&mut *self.slot, std::ptr::null_mut());
        if !raw.is_null() {
            // SAFETY: same ownership rule as IndexDecoder: a non-null slot
            // is a finished index nobody took.
            unsafe { ffi::lzma_index_end(raw, std::ptr::null()) };
        }
    }
}

/// Incremental validator matching decoded block sizes against the index
/// field at the end of a stream.
pub struct IndexHash {
    raw: NonNull<ffi::lzma_index_hash>,
}

unsafe impl Send for IndexHash {}

impl IndexHash {
    pub fn new() -> Result<Self> {
        // SAFETY: null hash allocates a fresh one; null return means
        // allocation failure.
        let raw = unsafe { ffi::lzma_index_hash_init(std::ptr::null_mut(), std::ptr::null()) };
        NonNull::new(raw)
            .map(|raw| Self { raw })
            .ok_or(Error::Lzma(LzmaError::Mem))
    }

    /// Resets the hash for a new stream.
    pub fn reset(&mut self) {
        // SAFETY: passing a live hash reuses its allocation; the return
        // value is then the same pointer.
        unsafe {
            ffi::lzma_index_hash_init(self.raw.as_ptr(), std::ptr::null());
        }
    }

    /// Records one decoded block.
    pub fn append(&mut self, unpadded_size: u64, uncompressed_size: u64) -> Result<()> {
        // SAFETY: raw is a live hash owned by self.
        check_ret(unsafe {
            ffi::lzma_index_hash_append(self.raw.as_ptr(), unpadded_size, uncompressed_size)
        })?;
        Ok(())
    }

    /// Feeds encoded index bytes and compares them against the recorded
    /// blocks. Returns the bytes consumed and whether the index is
    /// complete; a mismatch surfaces as [`LzmaError::Data`].
    pub fn decode(&mut self, input: &[u8]) -> Result<(usize, bool)> {
        let mut in_pos: size_t = 0;
        // SAFETY: input covers a live slice.
        let code = unsafe {
            ffi::lzma_index_hash_decode(self.raw.as_ptr(), input.as_ptr(), &mut in_pos, input.len())
        };
        let status = check_ret(code)?;
        Ok((in_pos, status == Status::StreamEnd))
    }

    /// Encoded size of the index field being validated.
    #[must_use]
    pub fn size(&self) -> u64 {
        // SAFETY: raw is a live hash.
        unsafe { ffi::lzma_index_hash_size(self.raw.as_ptr()) }
    }
}

impl Drop for IndexHash {
    fn drop(&mut self) {
        // SAFETY: raw was allocated by lzma_index_hash_init and is freed
        // once.
        unsafe {
            ffi::lzma_index_hash_end(self.raw.as_ptr(), std::ptr::null());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lzma::Check;

    // (unpadded_size, uncompressed_size) pairs; unpadded sizes must be at
    // least the minimum block size of 5 bytes.
    const BLOCKS: &[(u64, u64)] = &[(101, 400), (257, 1024), (64, 90)];

    fn build_index() -> Index {
        let mut index = Index::new().unwrap();
        for &(unpadded, uncompressed) in BLOCKS {
            index.append(unpadded, uncompressed).unwrap();
        }
        index
    }

    fn stream_flags(index: &Index, check: Check) -> ffi::lzma_stream_flags {
        let mut flags = ffi::lzma_stream_flags::zeroed();
        flags.check = check.as_raw();
        flags.backward_size = index.index_size();
        flags
    }

    #[test]
    fn counts_and_sizes() {
        let index = build_index();
        assert_eq!(index.stream_count(), 1);
        assert_eq!(index.block_count(), BLOCKS.len() as u64);
        assert_eq!(
            index.uncompressed_size(),
            BLOCKS.iter().map(|&(_, u)| u).sum::<u64>()
        );
        // Unpadded sizes are rounded up to multiples of four in the
        // file-level totals.
        assert_eq!(
            index.total_size(),
            BLOCKS.iter().map(|&(p, _)| (p + 3) & !3).sum::<u64>()
        );
        // Index field sizes are always multiples of four.
        assert_eq!(index.index_size() % 4, 0);
        assert!(index.memused() > 0);
    }

    #[test]
    fn iterate_blocks_in_order() {
        let index = build_index();
        let mut iter = index.iter();
        let mut seen = Vec::new();
        while let Some(rec) = iter.next(IterMode::Block) {
            seen.push((rec.block.unpadded_size, rec.block.uncompressed_size));
        }
        assert_eq!(seen, BLOCKS.to_vec());

        iter.rewind();
        let first = iter.next(IterMode::Block).unwrap();
        assert_eq!(first.block.number_in_file, 1);
        assert_eq!(first.block.uncompressed_file_offset, 0);
    }

    #[test]
    fn iterate_streams() {
        let index = build_index();
        let mut iter = index.iter();
        let stream = iter.next(IterMode::Stream).unwrap();
        assert_eq!(stream.stream.number, 1);
        assert_eq!(stream.stream.block_count, BLOCKS.len() as u64);
        assert!(iter.next(IterMode::Stream).is_none());
    }

    #[test]
    fn locate_finds_containing_block() {
        let index = build_index();
        let mut iter = index.iter();

        // Offset 0 is in the first block, offset 400 in the second.
        let rec = iter.locate(0).unwrap();
        assert_eq!(rec.block.number_in_file, 1);
        let rec = iter.locate(400).unwrap();
        assert_eq!(rec.block.number_in_file, 2);
        let rec = iter.locate(399).unwrap();
        assert_eq!(rec.block.number_in_file, 1);

        // Past the end of the file.
        assert!(iter.locate(10_000).is_none());
    }

    #[test]
    fn buffer_roundtrip() {
        let mut index = build_index();
        let flags = stream_flags(&index, Check::Crc64);
        index.set_stream_flags(&flags).unwrap();
        let encoded = index.to_vec().unwrap();
        assert_eq!(encoded.len() as u64, index.index_size());
        // The index indicator byte.
        assert_eq!(encoded[0], 0x00);

        let mut memlimit = u64::MAX;
        let (decoded, used) = Index::decode(&encoded, &mut memlimit).unwrap();
        assert_eq!(used, encoded.len());
        assert_eq!(decoded.block_count(), index.block_count());
        assert_eq!(decoded.uncompressed_size(), index.uncompressed_size());
    }

    #[test]
    fn streaming_codec_roundtrip() {
        let index = build_index();
        let encoded = index.to_vec().unwrap();

        let mut encoder = index.encoder().unwrap();
        let mut out = vec![0u8; encoded.len()];
        let p = encoder.code(&mut out).unwrap();
        assert_eq!(p.status, Status::StreamEnd);
        assert_eq!(&out[..p.bytes_out], &encoded[..]);

        let mut decoder = IndexDecoder::new(u64::MAX).unwrap();
        let p = decoder.code(&encoded).unwrap();
        assert_eq!(p.status, Status::StreamEnd);
        let decoded = decoder.finish().unwrap();
        assert_eq!(decoded.block_count(), index.block_count());
    }

    #[test]
    fn encoder_produces_output_in_chunks() {
        let index = build_index();
        let encoded = index.to_vec().unwrap();

        // The encoder keeps reading the index across steps, so the whole
        // chunked run happens under the borrow.
        let mut encoder = index.encoder().unwrap();
        let mut out = Vec::new();
        let mut chunk = [0u8; 7];
        loop {
            let p = encoder.code(&mut chunk).unwrap();
            out.extend_from_slice(&chunk[..p.bytes_out]);
            if p.status == Status::StreamEnd {
                break;
            }
        }
        assert_eq!(out, encoded);
    }

    #[test]
    fn decoder_dropped_after_stream_end() {
        let index = build_index();
        let encoded = index.to_vec().unwrap();

        // Reaching StreamEnd hands the finished index to the slot; dropping
        // without finish() must release it.
        let mut decoder = IndexDecoder::new(u64::MAX).unwrap();
        let p = decoder.code(&encoded).unwrap();
        assert_eq!(p.status, Status::StreamEnd);
        drop(decoder);
    }

    #[test]
    fn cat_concatenates_streams() {
        let mut first = build_index();
        let flags = stream_flags(&first, Check::Crc32);
        first.set_stream_flags(&flags).unwrap();
        let mut second = build_index();
        let flags = stream_flags(&second, Check::Crc32);
        second.set_stream_flags(&flags).unwrap();

        first.cat(second).unwrap();
        assert_eq!(first.stream_count(), 2);
        assert_eq!(first.block_count(), 2 * BLOCKS.len() as u64);

        // Blocks keep per-stream and per-file numbering.
        let mut iter = first.iter();
        let mut last = None;
        while let Some(rec) = iter.next(IterMode::Block) {
            last = Some(rec);
        }
        let last = last.unwrap();
        assert_eq!(last.block.number_in_file, 2 * BLOCKS.len() as u64);
        assert_eq!(last.block.number_in_stream, BLOCKS.len() as u64);
    }

    #[test]
    fn try_clone_is_deep() {
        let mut index = build_index();
        let copy = index.try_clone().unwrap();
        index.append(512, 2048).unwrap();
        assert_eq!(copy.block_count(), BLOCKS.len() as u64);
        assert_eq!(index.block_count(), BLOCKS.len() as u64 + 1);
    }

    #[test]
    fn index_hash_accepts_matching_index() {
        let index = build_index();
        let encoded = index.to_vec().unwrap();

        let mut hash = IndexHash::new().unwrap();
        for &(unpadded, uncompressed) in BLOCKS {
            hash.append(unpadded, uncompressed).unwrap();
        }
        assert_eq!(hash.size(), index.index_size());
        let (used, done) = hash.decode(&encoded).unwrap();
        assert_eq!(used, encoded.len());
        assert!(done);
    }

    #[test]
    fn index_hash_rejects_mismatch() {
        let index = build_index();
        let encoded = index.to_vec().unwrap();

        let mut hash = IndexHash::new().unwrap();
        for &(unpadded, _) in BLOCKS {
            // Wrong uncompressed sizes.
            hash.append(unpadded, 7).unwrap();
        }
        let err = hash.decode(&encoded).unwrap_err();
        assert_eq!(err, Error::Lzma(LzmaError::Data));
    }
}
