//! libltdl bindings: portable dynamic module loading.
//!
//! The raw surface is in [`ffi`]. The safe layer ties the library's usage
//! rules to the borrow checker: [`Loader`] holds the `lt_dlinit` reference
//! and every [`Module`] borrows it, so no handle can outlive the final
//! `lt_dlexit`. Preloaded symbol tables, interface validators and custom
//! loader vtables stay raw-only; they involve static tables and callback
//! registration that belong at the application's C boundary.

pub mod ffi;

use std::ffi::{CStr, CString};
use std::marker::PhantomData;

use libc::{c_char, c_int, c_void};

use crate::error::{Error, Result};

/// Consumes the pending `lt_dlerror()` message.
fn last_error() -> Error {
    // SAFETY: lt_dlerror returns null or a NUL-terminated static string.
    let msg = unsafe {
        let ptr = ffi::lt_dlerror();
        if ptr.is_null() {
            String::from("unknown error")
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    };
    Error::Ltdl(msg)
}

fn check(code: c_int) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(last_error())
    }
}

/// Holds one `lt_dlinit` reference.
///
/// libltdl reference-counts initialization, so nested guards are fine;
/// the matching `lt_dlexit` runs on drop.
pub struct Loader {
    // lt_dlerror is per-process, not per-thread safe; keep the guard off
    // other threads.
    _not_sync: PhantomData<*const ()>,
}

impl Loader {
    pub fn init() -> Result<Self> {
        // SAFETY: no arguments; nonzero means failure.
        check(unsafe { ffi::lt_dlinit() })?;
        log::debug!("ltdl initialized");
        Ok(Self {
            _not_sync: PhantomData,
        })
    }

    /// Appends a directory to the module search path.
    pub fn add_search_dir(&self, dir: &str) -> Result<()> {
        let dir = CString::new(dir)?;
        // SAFETY: dir is a valid NUL-terminated string; libltdl copies it.
        check(unsafe { ffi::lt_dladdsearchdir(dir.as_ptr()) })
    }

    /// Inserts a directory before the first occurrence of `before` in the
    /// current search path, or appends when `before` is `None`.
    pub fn insert_search_dir(&self, before: Option<&str>, dir: &str) -> Result<()> {
        let dir = CString::new(dir)?;
        let Some(before) = before else {
            // SAFETY: null `before` appends, same as lt_dladdsearchdir.
            return check(unsafe { ffi::lt_dlinsertsearchdir(std::ptr::null(), dir.as_ptr()) });
        };

        // The C API wants a pointer into the live search path buffer, so
        // the offset is found on the raw bytes; a lossy copy would shift
        // it past any non-UTF-8 component.
        // SAFETY: lt_dlgetsearchpath returns null or the live
        // NUL-terminated search path, valid until the next ltdl call,
        // which is the insert itself.
        unsafe {
            let base = ffi::lt_dlgetsearchpath();
            if base.is_null() {
                return Err(Error::Ltdl(String::from("search path is empty")));
            }
            let bytes = CStr::from_ptr(base).to_bytes();
            let offset = if before.is_empty() {
                0
            } else {
                bytes
                    .windows(before.len())
                    .position(|w| w == before.as_bytes())
                    .ok_or_else(|| Error::Ltdl(format!("`{before}` is not in the search path")))?
            };
            check(ffi::lt_dlinsertsearchdir(base.add(offset), dir.as_ptr()))
        }
    }

    /// Replaces the whole search path (colon-separated).
    pub fn set_search_path(&self, path: &str) -> Result<()> {
        let path = CString::new(path)?;
        // SAFETY: path is a valid NUL-terminated string; libltdl copies it.
        check(unsafe { ffi::lt_dlsetsearchpath(path.as_ptr()) })
    }

    /// Current search path, or `None` when unset.
    #[must_use]
    pub fn search_path(&self) -> Option<String> {
        // SAFETY: returns null or a NUL-terminated string owned by ltdl.
        unsafe {
            let ptr = ffi::lt_dlgetsearchpath();
            if ptr.is_null() {
                None
            } else {
                Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
            }
        }
    }

    /// Calls `f` for every file in the given search path (or the default
    /// path when `None`). Return `true` from `f` to stop early; the
    /// return value says whether iteration was stopped.
    pub fn for_each_file<F>(&self, search_path: Option<&str>, mut f: F) -> Result<bool>
    where
        F: FnMut(&str) -> bool,
    {
        unsafe extern "C" fn trampoline<F>(filename: *const c_char, data: *mut c_void) -> c_int
        where
            F: FnMut(&str) -> bool,
        {
            // SAFETY: data is the &mut F passed below, alive for the whole
            // lt_dlforeachfile call.
            let f = unsafe { &mut *data.cast::<F>() };
            let name = unsafe { CStr::from_ptr(filename) }.to_string_lossy();
            c_int::from(f(&name))
        }

        let search_path = search_path.map(CString::new).transpose()?;
        let path_ptr = search_path.as_ref().map_or(std::ptr::null(), |p| p.as_ptr());
        // SAFETY: trampoline matches the callback ABI and data points at f.
        // The return value is the last value f returned, not an error code.
        let stopped = unsafe {
            ffi::lt_dlforeachfile(path_ptr, trampoline::<F>, (&mut f as *mut F).cast())
        };
        Ok(stopped != 0)
    }

    fn open_raw(&self, handle: ffi::lt_dlhandle) -> Result<Module<'_>> {
        if handle.is_null() {
            return Err(last_error());
        }
        log::trace!("module opened: {handle:p}");
        Ok(Module {
            handle,
            _loader: PhantomData,
        })
    }

    /// Opens a module by exact filename (or an already-loaded one by
    /// module name).
    pub fn open(&self, filename: &str) -> Result<Module<'_>> {
        let filename = CString::new(filename)?;
        // SAFETY: filename is a valid NUL-terminated string.
        self.open_raw(unsafe { ffi::lt_dlopen(filename.as_ptr()) })
    }

    /// Opens a module, trying the platform shared-library suffixes and
    /// `.la` files.
    pub fn open_ext(&self, filename: &str) -> Result<Module<'_>> {
        let filename = CString::new(filename)?;
        // SAFETY: filename is a valid NUL-terminated string.
        self.open_raw(unsafe { ffi::lt_dlopenext(filename.as_ptr()) })
    }

    /// Opens a module with an advise set.
    pub fn open_advise(&self, filename: &str, advise: &Advise) -> Result<Module<'_>> {
        let filename = CString::new(filename)?;
        // SAFETY: filename is valid and advise.raw is a live advise set.
        self.open_raw(unsafe { ffi::lt_dlopenadvise(filename.as_ptr(), advise.raw) })
    }

    /// Handle for the main program itself.
    pub fn open_self(&self) -> Result<Module<'_>> {
        // SAFETY: null filename selects the main program.
        self.open_raw(unsafe { ffi::lt_dlopen(std::ptr::null()) })
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        // SAFETY: pairs the lt_dlinit from init(); shutdown errors have
        // nowhere to go.
        unsafe {
            ffi::lt_dlexit();
        }
    }
}

/// Hints for [`Loader::open_advise`].
pub struct Advise {
    raw: ffi::lt_dladvise,
}

impl Advise {
    pub fn new() -> Result<Self> {
        let mut raw: ffi::lt_dladvise = std::ptr::null_mut();
        // SAFETY: raw is a valid out-slot.
        check(unsafe { ffi::lt_dladvise_init(&mut raw) })?;
        Ok(Self { raw })
    }

    /// Try the platform extensions and `.la` files.
    pub fn ext(&mut self) -> Result<&mut Self> {
        // SAFETY: raw is a live advise set.
        check(unsafe { ffi::lt_dladvise_ext(&mut self.raw) })?;
        Ok(self)
    }

    /// Make the module resident (never unloaded).
    pub fn resident(&mut self) -> Result<&mut Self> {
        // SAFETY: raw is a live advise set.
        check(unsafe { ffi::lt_dladvise_resident(&mut self.raw) })?;
        Ok(self)
    }

    /// Keep the module's symbols out of the global namespace.
    pub fn local(&mut self) -> Result<&mut Self> {
        // SAFETY: raw is a live advise set.
        check(unsafe { ffi::lt_dladvise_local(&mut self.raw) })?;
        Ok(self)
    }

    /// Export the module's symbols globally.
    pub fn global(&mut self) -> Result<&mut Self> {
        // SAFETY: raw is a live advise set.
        check(unsafe { ffi::lt_dladvise_global(&mut self.raw) })?;
        Ok(self)
    }

    /// Only accept preloaded modules.
    pub fn preload(&mut self) -> Result<&mut Self> {
        // SAFETY: raw is a live advise set.
        check(unsafe { ffi::lt_dladvise_preload(&mut self.raw) })?;
        Ok(self)
    }
}

impl Drop for Advise {
    fn drop(&mut self) {
        // SAFETY: raw was created by lt_dladvise_init and is destroyed
        // once.
        unsafe {
            ffi::lt_dladvise_destroy(&mut self.raw);
        }
    }
}

/// Owned copy of the `lt_dlinfo` bookkeeping for a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub filename: Option<String>,
    pub name: Option<String>,
    pub ref_count: i32,
    pub is_resident: bool,
    pub is_symglobal: bool,
    pub is_symlocal: bool,
}

/// An open module. Closed on drop unless resident.
pub struct Module<'l> {
    handle: ffi::lt_dlhandle,
    _loader: PhantomData<&'l Loader>,
}

impl Module<'_> {
    /// Looks up a symbol address.
    ///
    /// The pointer borrows the module; casting it to a function or data
    /// reference and using it past `self`'s lifetime is on the caller.
    pub fn sym(&self, name: &str) -> Result<*mut c_void> {
        let name = CString::new(name)?;
        // SAFETY: handle is live and name is NUL-terminated.
        let addr = unsafe { ffi::lt_dlsym(self.handle, name.as_ptr()) };
        if addr.is_null() {
            // A symbol may legitimately resolve to address zero, but
            // lt_dlsym cannot distinguish that from failure either.
            return Err(last_error());
        }
        Ok(addr)
    }

    /// Snapshot of the handle bookkeeping.
    pub fn info(&self) -> Result<ModuleInfo> {
        // SAFETY: handle is live; the returned struct is owned by ltdl and
        // copied out before any other ltdl call.
        unsafe {
            let info = ffi::lt_dlgetinfo(self.handle);
            if info.is_null() {
                return Err(last_error());
            }
            let info = &*info;
            let to_string = |ptr: *mut c_char| {
                if ptr.is_null() {
                    None
                } else {
                    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
                }
            };
            Ok(ModuleInfo {
                filename: to_string(info.filename),
                name: to_string(info.name),
                ref_count: info.ref_count,
                is_resident: info.is_resident(),
                is_symglobal: info.is_symglobal(),
                is_symlocal: info.is_symlocal(),
            })
        }
    }

    /// Pins the module in memory for the rest of the process lifetime.
    pub fn make_resident(&mut self) -> Result<()> {
        // SAFETY: handle is live.
        check(unsafe { ffi::lt_dlmakeresident(self.handle) })
    }

    #[must_use]
    pub fn is_resident(&self) -> bool {
        // SAFETY: handle is live.
        unsafe { ffi::lt_dlisresident(self.handle) == 1 }
    }

    /// Closes the module, surfacing the error `Drop` would swallow.
    pub fn close(self) -> Result<()> {
        let handle = self.handle;
        std::mem::forget(self);
        // SAFETY: handle is live and closed exactly once.
        check(unsafe { ffi::lt_dlclose(handle) })
    }
}

impl Drop for Module<'_> {
    fn drop(&mut self) {
        log::trace!("module closed: {:p}", self.handle);
        // Resident handles refuse to close; nothing to do about it here.
        // SAFETY: handle is live and closed exactly once.
        unsafe {
            ffi::lt_dlclose(self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_init_guards() {
        let _ = env_logger::builder().is_test(true).try_init();
        let outer = Loader::init().unwrap();
        {
            let inner = Loader::init().unwrap();
            inner.add_search_dir("/tmp").unwrap();
        }
        // The outer reference keeps ltdl alive after the inner exit.
        assert!(outer.search_path().is_some());
    }

    #[test]
    fn search_path_roundtrip() {
        let loader = Loader::init().unwrap();
        loader.set_search_path("/usr/lib:/opt/lib").unwrap();
        assert_eq!(loader.search_path().as_deref(), Some("/usr/lib:/opt/lib"));

        loader.add_search_dir("/var/lib").unwrap();
        let path = loader.search_path().unwrap();
        assert!(path.ends_with("/var/lib"));

        loader
            .insert_search_dir(Some("/opt/lib"), "/usr/local/lib")
            .unwrap();
        let path = loader.search_path().unwrap();
        let opt = path.find("/opt/lib").unwrap();
        let local = path.find("/usr/local/lib").unwrap();
        assert!(local < opt);

        // Non-UTF-8 bytes ahead of the anchor must not shift the
        // insertion point.
        let raw = CString::new(&b"/op\xFFaque:/second"[..]).unwrap();
        // SAFETY: raw is a valid NUL-terminated string; libltdl copies it.
        check(unsafe { ffi::lt_dlsetsearchpath(raw.as_ptr()) }).unwrap();
        loader.insert_search_dir(Some("/second"), "/first").unwrap();
        // SAFETY: non-null right after a successful set; copied before any
        // other ltdl call.
        let bytes = unsafe { CStr::from_ptr(ffi::lt_dlgetsearchpath()).to_bytes().to_vec() };
        let pos = |needle: &[u8]| bytes.windows(needle.len()).position(|w| w == needle);
        assert!(bytes.starts_with(b"/op\xFFaque"));
        assert!(pos(b"/first").unwrap() < pos(b"/second").unwrap());
    }

    #[test]
    fn open_missing_module_reports_error() {
        let loader = Loader::init().unwrap();
        let err = loader.open("no-such-module-anywhere.so").unwrap_err();
        match err {
            Error::Ltdl(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn open_self_and_inspect() {
        let loader = Loader::init().unwrap();
        let this = loader.open_self().unwrap();
        let info = this.info().unwrap();
        assert!(info.ref_count >= 1);
    }

    #[test]
    fn advise_accepts_all_hints() {
        let _loader = Loader::init().unwrap();
        let mut advise = Advise::new().unwrap();
        advise.ext().unwrap().global().unwrap().resident().unwrap();
    }

    #[test]
    fn interior_nul_is_rejected() {
        let loader = Loader::init().unwrap();
        assert!(matches!(
            loader.open("bad\0name"),
            Err(Error::InteriorNul)
        ));
    }
}
