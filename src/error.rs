//! Error types shared by the safe wrapper layers.
//!
//! Every status code in this crate is copied verbatim from the wrapped
//! library's public header; nothing here invents an error taxonomy. The raw
//! `ffi` modules return the native codes untouched. The safe layers split
//! each native code set into a success enum (returned in `Ok`) and an error
//! enum (returned in `Err`), and this module folds the per-library error
//! enums into one crate-wide [`Error`].
//!
//! ## Error Categories
//!
//! | Variant | Source | Native code carrier |
//! |---------|--------|---------------------|
//! | [`Error::Lzma`] | liblzma | [`LzmaError`](crate::lzma::LzmaError) |
//! | [`Error::Bz2`] | libbz2 | [`Bz2Error`](crate::bz2::Bz2Error) |
//! | [`Error::Bz3`] | bzip3 | [`Bz3Error`](crate::bz3::Bz3Error) |
//! | [`Error::Ltdl`] | libltdl | `lt_dlerror()` message string |
//! | [`Error::Lua`] | Lua 5.4 | thread status + stack message |

use thiserror::Error;

/// Crate-wide error type.
///
/// Each variant wraps the error half of one native library's status codes.
/// The numeric values survive the mapping, so callers that need the exact
/// native code can recover it from the wrapped enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An error status returned by a liblzma call.
    #[cfg(feature = "lzma")]
    #[error("liblzma: {0}")]
    Lzma(#[from] crate::lzma::LzmaError),

    /// An error status returned by a libbz2 call.
    #[cfg(feature = "bzip2")]
    #[error("libbz2: {0}")]
    Bz2(#[from] crate::bz2::Bz2Error),

    /// An error status returned by a bzip3 call.
    #[cfg(feature = "bzip3")]
    #[error("bzip3: {0}")]
    Bz3(#[from] crate::bz3::Bz3Error),

    /// An error reported by libltdl.
    ///
    /// libltdl reports failures through the `lt_dlerror()` side channel
    /// rather than a return code, so the native message is carried as-is.
    #[cfg(feature = "ltdl")]
    #[error("libltdl: {0}")]
    Ltdl(String),

    /// A non-`LUA_OK` status from a Lua call, with the error value the
    /// engine left on the stack (when it was a string).
    #[cfg(feature = "lua")]
    #[error("lua: status {status}: {message}")]
    Lua {
        /// Thread status code (`LUA_ERRRUN`, `LUA_ERRSYNTAX`, ...).
        status: libc::c_int,
        /// Error message popped from the Lua stack, or a placeholder.
        message: String,
    },

    /// A string passed across the boundary contained an interior NUL byte.
    #[error("string contains an interior NUL byte")]
    InteriorNul,
}

impl From<std::ffi::NulError> for Error {
    fn from(_: std::ffi::NulError) -> Self {
        Self::InteriorNul
    }
}

/// Convenience alias used throughout the safe layers.
pub type Result<T> = std::result::Result<T, Error>;
