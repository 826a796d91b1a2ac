//! Raw bindings to libltdl (`ltdl.h`, libtool 2.4.x).
//!
//! libltdl signals failure through return codes (nonzero) or null
//! handles, with the message available from `lt_dlerror()` until the next
//! call on the same thread.

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_uint, c_void};

/// Opaque module handle.
#[repr(C)]
pub struct lt__handle {
    _private: [u8; 0],
}
pub type lt_dlhandle = *mut lt__handle;

/// Opaque advise set built with the `lt_dladvise_*` calls.
#[repr(C)]
pub struct lt__advise {
    _private: [u8; 0],
}
pub type lt_dladvise = *mut lt__advise;

/// Loader-defined module cookie and user data.
pub type lt_module = *mut c_void;
pub type lt_user_data = *mut c_void;

/// Opaque position in the loader list.
pub type lt_dlloader = *mut c_void;

/// Opaque key identifying a registered interface validator.
pub type lt_dlinterface_id = *mut c_void;

/// Validator callback for [`lt_dlinterface_register`]; nonzero return
/// filters the handle out of iteration.
pub type lt_dlhandle_interface =
    unsafe extern "C" fn(handle: lt_dlhandle, id_string: *const c_char) -> c_int;

/// Callback for [`lt_dlpreload_open`].
pub type lt_dlpreload_callback_func = unsafe extern "C" fn(handle: lt_dlhandle) -> c_int;

/// One entry of a preloaded symbol table.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lt_dlsymlist {
    pub name: *const c_char,
    pub address: *mut c_void,
}

/// Module bookkeeping returned by [`lt_dlgetinfo`].
///
/// The three `is_*` flags are single-bit C bitfields packed into one
/// `unsigned int`, least significant bit first.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lt_dlinfo {
    pub filename: *mut c_char,
    pub name: *mut c_char,
    pub ref_count: c_int,
    pub bits: c_uint,
}

impl lt_dlinfo {
    #[inline]
    #[must_use]
    pub const fn is_resident(&self) -> bool {
        self.bits & 0x1 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_symglobal(&self) -> bool {
        self.bits & 0x2 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_symlocal(&self) -> bool {
        self.bits & 0x4 != 0
    }
}

/// Where a user loader is placed relative to the built-in ones.
pub type lt_dlloader_priority = c_uint;

pub const LT_DLLOADER_PREPEND: lt_dlloader_priority = 0;
pub const LT_DLLOADER_APPEND: lt_dlloader_priority = 1;

/// Vtable describing a custom module loader.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct lt_dlvtable {
    pub name: *const c_char,
    pub sym_prefix: *const c_char,
    pub module_open: Option<
        unsafe extern "C" fn(
            data: lt_user_data,
            filename: *const c_char,
            advise: lt_dladvise,
        ) -> lt_module,
    >,
    pub module_close: Option<unsafe extern "C" fn(data: lt_user_data, module: lt_module) -> c_int>,
    pub find_sym: Option<
        unsafe extern "C" fn(
            data: lt_user_data,
            module: lt_module,
            name: *const c_char,
        ) -> *mut c_void,
    >,
    pub dlloader_init: Option<unsafe extern "C" fn(data: lt_user_data) -> c_int>,
    pub dlloader_exit: Option<unsafe extern "C" fn(data: lt_user_data) -> c_int>,
    pub dlloader_data: lt_user_data,
    pub priority: lt_dlloader_priority,
}

extern "C" {
    pub fn lt_dlinit() -> c_int;
    pub fn lt_dlexit() -> c_int;

    // Search path management.
    pub fn lt_dladdsearchdir(search_dir: *const c_char) -> c_int;
    pub fn lt_dlinsertsearchdir(before: *const c_char, search_dir: *const c_char) -> c_int;
    pub fn lt_dlsetsearchpath(search_path: *const c_char) -> c_int;
    pub fn lt_dlgetsearchpath() -> *const c_char;
    pub fn lt_dlforeachfile(
        search_path: *const c_char,
        func: unsafe extern "C" fn(filename: *const c_char, data: *mut c_void) -> c_int,
        data: *mut c_void,
    ) -> c_int;

    // Open advice.
    pub fn lt_dladvise_init(advise: *mut lt_dladvise) -> c_int;
    pub fn lt_dladvise_destroy(advise: *mut lt_dladvise) -> c_int;
    pub fn lt_dladvise_ext(advise: *mut lt_dladvise) -> c_int;
    pub fn lt_dladvise_resident(advise: *mut lt_dladvise) -> c_int;
    pub fn lt_dladvise_local(advise: *mut lt_dladvise) -> c_int;
    pub fn lt_dladvise_global(advise: *mut lt_dladvise) -> c_int;
    pub fn lt_dladvise_preload(advise: *mut lt_dladvise) -> c_int;

    // Module lifecycle.
    pub fn lt_dlopen(filename: *const c_char) -> lt_dlhandle;
    pub fn lt_dlopenext(filename: *const c_char) -> lt_dlhandle;
    pub fn lt_dlopenadvise(filename: *const c_char, advise: lt_dladvise) -> lt_dlhandle;
    pub fn lt_dlsym(handle: lt_dlhandle, name: *const c_char) -> *mut c_void;
    pub fn lt_dlerror() -> *const c_char;
    pub fn lt_dlclose(handle: lt_dlhandle) -> c_int;
    pub fn lt_dlmakeresident(handle: lt_dlhandle) -> c_int;
    pub fn lt_dlisresident(handle: lt_dlhandle) -> c_int;

    // Preloaded modules.
    pub fn lt_dlpreload(preloaded: *const lt_dlsymlist) -> c_int;
    pub fn lt_dlpreload_default(preloaded: *const lt_dlsymlist) -> c_int;
    pub fn lt_dlpreload_open(
        originator: *const c_char,
        func: lt_dlpreload_callback_func,
    ) -> c_int;

    // Interface validators and per-handle caller data.
    pub fn lt_dlinterface_register(
        id_string: *const c_char,
        iface: Option<lt_dlhandle_interface>,
    ) -> lt_dlinterface_id;
    pub fn lt_dlinterface_free(key: lt_dlinterface_id);
    pub fn lt_dlcaller_set_data(
        key: lt_dlinterface_id,
        handle: lt_dlhandle,
        data: *mut c_void,
    ) -> *mut c_void;
    pub fn lt_dlcaller_get_data(key: lt_dlinterface_id, handle: lt_dlhandle) -> *mut c_void;

    // Handle introspection and iteration.
    pub fn lt_dlgetinfo(handle: lt_dlhandle) -> *const lt_dlinfo;
    pub fn lt_dlhandle_iterate(iface: lt_dlinterface_id, place: lt_dlhandle) -> lt_dlhandle;
    pub fn lt_dlhandle_fetch(iface: lt_dlinterface_id, module_name: *const c_char) -> lt_dlhandle;
    pub fn lt_dlhandle_map(
        iface: lt_dlinterface_id,
        func: unsafe extern "C" fn(handle: lt_dlhandle, data: *mut c_void) -> c_int,
        data: *mut c_void,
    ) -> c_int;

    // User-defined loaders.
    pub fn lt_dlloader_add(vtable: *const lt_dlvtable) -> c_int;
    pub fn lt_dlloader_next(loader: lt_dlloader) -> lt_dlloader;
    pub fn lt_dlloader_remove(name: *const c_char) -> *mut lt_dlvtable;
    pub fn lt_dlloader_find(name: *const c_char) -> *const lt_dlvtable;
    pub fn lt_dlloader_get(loader: lt_dlloader) -> *const lt_dlvtable;
}
