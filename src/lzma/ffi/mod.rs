//! Raw bindings to liblzma (xz 5.4.x), split by upstream header.
//!
//! | Module | Header | Covers |
//! |--------|--------|--------|
//! | [`base`] | `lzma/base.h` | `lzma_stream`, `lzma_code`, return codes |
//! | [`version`] | `lzma/version.h` | runtime version queries |
//! | [`vli`] | `lzma/vli.h` | variable-length integers |
//! | [`check`] | `lzma/check.h` | integrity checks, CRC32/CRC64 |
//! | [`filter`] | `lzma/filter.h` + bcj/delta | filter chains, raw coders |
//! | [`options`] | `lzma/lzma12.h` | LZMA1/LZMA2 options and presets |
//! | [`container`] | `lzma/container.h` | .xz/.lzma/.lz/MicroLZMA coders |
//! | [`stream_flags`] | `lzma/stream_flags.h` | stream header/footer codec |
//! | [`block`] | `lzma/block.h` | block header codec, block coders |
//! | [`index`] | `lzma/index.h` | index building, codec, iteration |
//! | [`index_hash`] | `lzma/index_hash.h` | index validation while decoding |
//! | [`hardware`] | `lzma/hardware.h` | memory and CPU queries |
//!
//! Everything is re-exported flat, matching how `lzma.h` includes the
//! sub-headers.

pub mod base;
pub mod block;
pub mod check;
pub mod container;
pub mod filter;
pub mod hardware;
pub mod index;
pub mod index_hash;
pub mod options;
pub mod stream_flags;
pub mod version;
pub mod vli;

pub use base::*;
pub use block::*;
pub use check::*;
pub use container::*;
pub use filter::*;
pub use hardware::*;
pub use index::*;
pub use index_hash::*;
pub use options::*;
pub use stream_flags::*;
pub use version::*;
pub use vli::*;
