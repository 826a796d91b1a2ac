//! Raw FFI bindings and thin safe wrappers for a set of C libraries:
//! liblzma (.xz), libbz2, bzip3, libltdl and Lua 5.4.
//!
//! Each library lives in its own feature-gated module with the same
//! two-layer shape: an `ffi` submodule that mirrors the C header
//! one-to-one (names, types, argument order), and a safe layer on top
//! that owns handle lifecycles and maps status codes onto [`Result`].
//!
//! ## Features
//! - `lzma` *(default)* - liblzma: streams, blocks, filter chains, index
//! - `bzip2` *(default)* - libbz2: streaming and one-call codecs
//! - `bzip3` - bzip3: frame and block codecs
//! - `ltdl` - libltdl: portable dynamic module loading
//! - `lua` - Lua 5.4: full embedding C API
//!
//! The non-default features need their native library installed; see
//! the `NATIVE_SYS_*` environment variables in the build script for
//! pointing the linker at custom locations.

pub mod error;

#[cfg(feature = "bzip2")]
pub mod bz2;

#[cfg(feature = "bzip3")]
pub mod bz3;

#[cfg(feature = "ltdl")]
pub mod ltdl;

#[cfg(feature = "lua")]
pub mod lua;

#[cfg(feature = "lzma")]
pub mod lzma;

pub use error::{Error, Result};
