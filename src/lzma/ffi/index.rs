//! .xz index handling (`lzma/index.h`).

#![allow(non_camel_case_types)]

use libc::{c_uint, c_void, size_t};

use super::base::{lzma_allocator, lzma_bool, lzma_ret, lzma_stream};
use super::stream_flags::lzma_stream_flags;
use super::vli::lzma_vli;

/// Opaque index: a catalog of the blocks in one or more .xz streams.
#[repr(C)]
pub struct lzma_index {
    _private: [u8; 0],
}

/// Stream-level fields of an iterator position.
#[repr(C)]
pub struct lzma_index_iter_stream {
    pub flags: *const lzma_stream_flags,
    pub reserved_ptr1: *const c_void,
    pub reserved_ptr2: *const c_void,
    pub reserved_ptr3: *const c_void,
    pub number: lzma_vli,
    pub block_count: lzma_vli,
    pub compressed_offset: lzma_vli,
    pub uncompressed_offset: lzma_vli,
    pub compressed_size: lzma_vli,
    pub uncompressed_size: lzma_vli,
    pub padding: lzma_vli,
    pub reserved_vli1: lzma_vli,
    pub reserved_vli2: lzma_vli,
    pub reserved_vli3: lzma_vli,
    pub reserved_vli4: lzma_vli,
}

/// Block-level fields of an iterator position.
#[repr(C)]
pub struct lzma_index_iter_block {
    pub number_in_file: lzma_vli,
    pub compressed_file_offset: lzma_vli,
    pub uncompressed_file_offset: lzma_vli,
    pub number_in_stream: lzma_vli,
    pub compressed_stream_offset: lzma_vli,
    pub uncompressed_stream_offset: lzma_vli,
    pub uncompressed_size: lzma_vli,
    pub unpadded_size: lzma_vli,
    pub total_size: lzma_vli,
    pub reserved_vli1: lzma_vli,
    pub reserved_vli2: lzma_vli,
    pub reserved_vli3: lzma_vli,
    pub reserved_vli4: lzma_vli,
    pub reserved_ptr1: *const c_void,
    pub reserved_ptr2: *const c_void,
    pub reserved_ptr3: *const c_void,
    pub reserved_ptr4: *const c_void,
}

/// Private iterator bookkeeping; matches the C union element for element.
#[repr(C)]
pub union lzma_index_iter_internal {
    pub p: *const c_void,
    pub s: size_t,
    pub v: lzma_vli,
}

/// Iterator over streams and blocks of an index.
///
/// Initialized with [`lzma_index_iter_init`]; it borrows the index and must
/// be reinitialized (not just rewound) if the index is modified.
#[repr(C)]
pub struct lzma_index_iter {
    pub stream: lzma_index_iter_stream,
    pub block: lzma_index_iter_block,
    pub internal: [lzma_index_iter_internal; 6],
}

/// Selects what [`lzma_index_iter_next`] stops at.
pub type lzma_index_iter_mode = c_uint;

pub const LZMA_INDEX_ITER_ANY: lzma_index_iter_mode = 0;
pub const LZMA_INDEX_ITER_STREAM: lzma_index_iter_mode = 1;
pub const LZMA_INDEX_ITER_BLOCK: lzma_index_iter_mode = 2;
pub const LZMA_INDEX_ITER_NONEMPTY_BLOCK: lzma_index_iter_mode = 3;

extern "C" {
    pub fn lzma_index_memusage(streams: lzma_vli, blocks: lzma_vli) -> u64;
    pub fn lzma_index_memused(i: *const lzma_index) -> u64;
    pub fn lzma_index_init(allocator: *const lzma_allocator) -> *mut lzma_index;
    pub fn lzma_index_end(i: *mut lzma_index, allocator: *const lzma_allocator);
    pub fn lzma_index_append(
        i: *mut lzma_index,
        allocator: *const lzma_allocator,
        unpadded_size: lzma_vli,
        uncompressed_size: lzma_vli,
    ) -> lzma_ret;
    pub fn lzma_index_stream_flags(
        i: *mut lzma_index,
        stream_flags: *const lzma_stream_flags,
    ) -> lzma_ret;
    pub fn lzma_index_checks(i: *const lzma_index) -> u32;
    pub fn lzma_index_stream_padding(i: *mut lzma_index, stream_padding: lzma_vli) -> lzma_ret;
    pub fn lzma_index_stream_count(i: *const lzma_index) -> lzma_vli;
    pub fn lzma_index_block_count(i: *const lzma_index) -> lzma_vli;
    pub fn lzma_index_size(i: *const lzma_index) -> lzma_vli;
    pub fn lzma_index_stream_size(i: *const lzma_index) -> lzma_vli;
    pub fn lzma_index_total_size(i: *const lzma_index) -> lzma_vli;
    pub fn lzma_index_file_size(i: *const lzma_index) -> lzma_vli;
    pub fn lzma_index_uncompressed_size(i: *const lzma_index) -> lzma_vli;

    pub fn lzma_index_iter_init(iter: *mut lzma_index_iter, i: *const lzma_index);
    pub fn lzma_index_iter_rewind(iter: *mut lzma_index_iter);
    /// Returns true (nonzero) when there is no next element.
    pub fn lzma_index_iter_next(
        iter: *mut lzma_index_iter,
        mode: lzma_index_iter_mode,
    ) -> lzma_bool;
    /// Positions the iterator on the block containing the given
    /// uncompressed offset; true means the target is out of range.
    pub fn lzma_index_iter_locate(iter: *mut lzma_index_iter, target: lzma_vli) -> lzma_bool;

    /// Concatenates `src` onto `dest`; `src` is freed on success.
    pub fn lzma_index_cat(
        dest: *mut lzma_index,
        src: *mut lzma_index,
        allocator: *const lzma_allocator,
    ) -> lzma_ret;
    pub fn lzma_index_dup(i: *const lzma_index, allocator: *const lzma_allocator)
        -> *mut lzma_index;

    pub fn lzma_index_encoder(strm: *mut lzma_stream, i: *const lzma_index) -> lzma_ret;
    pub fn lzma_index_decoder(strm: *mut lzma_stream, i: *mut *mut lzma_index, memlimit: u64)
        -> lzma_ret;
    pub fn lzma_index_buffer_encode(
        i: *const lzma_index,
        out: *mut u8,
        out_pos: *mut size_t,
        out_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_index_buffer_decode(
        i: *mut *mut lzma_index,
        memlimit: *mut u64,
        allocator: *const lzma_allocator,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
    ) -> lzma_ret;

    /// Decodes the index field and the stream footer of a whole .xz file,
    /// driving seeks via `LZMA_SEEK_NEEDED` and `lzma_stream.seek_pos`.
    pub fn lzma_file_info_decoder(
        strm: *mut lzma_stream,
        dest_index: *mut *mut lzma_index,
        memlimit: u64,
        file_size: u64,
    ) -> lzma_ret;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    // Verified against lzma/index.h (5.4) on x86_64.
    #[test]
    #[cfg(target_pointer_width = "64")]
    fn iter_layout() {
        assert_eq!(size_of::<lzma_index_iter>(), 304);
        assert_eq!(offset_of!(lzma_index_iter, block), 120);
        assert_eq!(offset_of!(lzma_index_iter, internal), 256);
        assert_eq!(offset_of!(lzma_index_iter, stream), 0);
        assert_eq!(offset_of!(lzma_index_iter_stream, number), 32);
    }
}
