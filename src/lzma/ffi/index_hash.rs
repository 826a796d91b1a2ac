//! Index validation while decoding (`lzma/index_hash.h`).

#![allow(non_camel_case_types)]

use libc::size_t;

use super::base::{lzma_allocator, lzma_ret};
use super::vli::lzma_vli;

/// Opaque accumulator that matches decoded block sizes against the index
/// field at the end of a stream.
#[repr(C)]
pub struct lzma_index_hash {
    _private: [u8; 0],
}

extern "C" {
    /// Allocates a new hash, or resets `index_hash` if non-null.
    pub fn lzma_index_hash_init(
        index_hash: *mut lzma_index_hash,
        allocator: *const lzma_allocator,
    ) -> *mut lzma_index_hash;
    pub fn lzma_index_hash_end(
        index_hash: *mut lzma_index_hash,
        allocator: *const lzma_allocator,
    );
    pub fn lzma_index_hash_append(
        index_hash: *mut lzma_index_hash,
        unpadded_size: lzma_vli,
        uncompressed_size: lzma_vli,
    ) -> lzma_ret;
    pub fn lzma_index_hash_decode(
        index_hash: *mut lzma_index_hash,
        r#in: *const u8,
        in_pos: *mut size_t,
        in_size: size_t,
    ) -> lzma_ret;
    pub fn lzma_index_hash_size(index_hash: *const lzma_index_hash) -> lzma_vli;
}
