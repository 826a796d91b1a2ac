//! Lua 5.4 embedding bindings.
//!
//! [`ffi`] is the whole C API, macro layer included. The safe layer here
//! is deliberately thin: [`State`] owns an interpreter and exposes the
//! operations where ownership and error handling benefit from Rust
//! (lifecycle, chunk loading, protected calls, common stack traffic), and
//! [`State::as_ptr`] hands the raw state to anything not wrapped.
//!
//! Two pieces of C-side variadic machinery get typed front ends:
//! [`FmtArg`] drives `lua_pushfstring` one directive at a time, and
//! [`Continuation`] packages the `lua_KFunction` + `lua_KContext` pair the
//! K-suffixed calls take.

pub mod ffi;

use std::ffi::{CStr, CString};

use libc::{c_char, c_int, c_void};

use crate::error::{Error, Result};

/// The Lua value types, mirroring the `LUA_T*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    None,
    Nil,
    Boolean,
    LightUserdata,
    Number,
    String,
    Table,
    Function,
    Userdata,
    Thread,
}

impl Type {
    #[must_use]
    const fn from_raw(tp: c_int) -> Self {
        match tp {
            ffi::LUA_TNIL => Self::Nil,
            ffi::LUA_TBOOLEAN => Self::Boolean,
            ffi::LUA_TLIGHTUSERDATA => Self::LightUserdata,
            ffi::LUA_TNUMBER => Self::Number,
            ffi::LUA_TSTRING => Self::String,
            ffi::LUA_TTABLE => Self::Table,
            ffi::LUA_TFUNCTION => Self::Function,
            ffi::LUA_TUSERDATA => Self::Userdata,
            ffi::LUA_TTHREAD => Self::Thread,
            _ => Self::None,
        }
    }
}

/// One piece of a `lua_pushfstring` format.
///
/// Rust cannot call a C variadic with a runtime-sized argument list, so
/// [`State::push_fstring`] issues one directive per piece and joins them
/// with `lua_concat`. The directives match the subset `lua_pushfstring`
/// documents.
#[derive(Debug, Clone, Copy)]
pub enum FmtArg<'a> {
    /// Literal text, pushed verbatim.
    Lit(&'a str),
    /// `%s`
    Str(&'a str),
    /// `%I` (`lua_Integer`)
    Int(i64),
    /// `%f` (`lua_Number`)
    Num(f64),
    /// `%p`
    Ptr(*const c_void),
    /// `%c`
    Char(u8),
}

/// Continuation for the K-suffixed calls (`lua_pcallk`, `lua_callk`,
/// `lua_yieldk`).
///
/// The function runs when a call that yielded across this boundary is
/// resumed, receiving `ctx` back.
#[derive(Clone, Copy)]
pub struct Continuation {
    pub func: ffi::lua_KFunction,
    pub ctx: ffi::lua_KContext,
}

impl Continuation {
    const fn unpack(k: Option<Self>) -> (ffi::lua_KContext, Option<ffi::lua_KFunction>) {
        match k {
            Some(c) => (c.ctx, Some(c.func)),
            None => (0, None),
        }
    }
}

/// An owned Lua interpreter state.
///
/// Closed with `lua_close` on drop. The raw pointer is available through
/// [`as_ptr`](Self::as_ptr) for the parts of the C API the safe layer does
/// not cover; anything done through it must leave the stack balanced.
pub struct State {
    raw: *mut ffi::lua_State,
}

impl State {
    /// Creates a state with the default allocator and no libraries open.
    pub fn new() -> Result<Self> {
        // SAFETY: no preconditions; null means allocation failure.
        let raw = unsafe { ffi::luaL_newstate() };
        if raw.is_null() {
            return Err(Error::Lua {
                status: ffi::LUA_ERRMEM,
                message: String::from("cannot create state"),
            });
        }
        Ok(Self { raw })
    }

    /// Opens all standard libraries.
    pub fn open_libs(&mut self) {
        // SAFETY: raw is a live state.
        unsafe { ffi::luaL_openlibs(self.raw) }
    }

    /// Raw state pointer for unwrapped C API calls.
    #[must_use]
    pub fn as_ptr(&self) -> *mut ffi::lua_State {
        self.raw
    }

    /// Interpreter version, e.g. `504.0`.
    #[must_use]
    pub fn version(&self) -> f64 {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_version(self.raw) }
    }

    /// Pops the error value a failed call left on the stack.
    fn pop_error(&mut self, status: c_int) -> Error {
        // SAFETY: a non-OK status leaves the error value on top; tolstring
        // copies it out before the pop invalidates the pointer.
        let message = unsafe {
            let ptr = ffi::lua_tostring(self.raw, -1);
            let message = if ptr.is_null() {
                String::from("(error value is not a string)")
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            };
            ffi::lua_pop(self.raw, 1);
            message
        };
        Error::Lua { status, message }
    }

    fn check(&mut self, status: c_int) -> Result<()> {
        if status == ffi::LUA_OK {
            Ok(())
        } else {
            Err(self.pop_error(status))
        }
    }

    /// Loads a chunk without running it; the compiled function ends up on
    /// the stack top.
    pub fn load_buffer(&mut self, chunk: &[u8], name: &str) -> Result<()> {
        let name = CString::new(name)?;
        // SAFETY: chunk covers a live slice, name is NUL-terminated, null
        // mode accepts both text and binary chunks.
        let status = unsafe {
            ffi::luaL_loadbufferx(
                self.raw,
                chunk.as_ptr().cast::<c_char>(),
                chunk.len(),
                name.as_ptr(),
                std::ptr::null(),
            )
        };
        self.check(status)
    }

    /// Calls the function at the top with `nargs` arguments below it,
    /// protected.
    pub fn pcall(&mut self, nargs: c_int, nresults: c_int) -> Result<()> {
        self.pcall_k(nargs, nresults, 0, None)
    }

    /// Protected call with an error handler index and an optional
    /// continuation.
    pub fn pcall_k(
        &mut self,
        nargs: c_int,
        nresults: c_int,
        errfunc: c_int,
        k: Option<Continuation>,
    ) -> Result<()> {
        let (ctx, func) = Continuation::unpack(k);
        // SAFETY: raw is live; the caller arranged the function and
        // arguments on the stack, which is the same contract as in C.
        let status = unsafe { ffi::lua_pcallk(self.raw, nargs, nresults, errfunc, ctx, func) };
        self.check(status)
    }

    /// Loads and runs a string of Lua code.
    pub fn do_string(&mut self, code: &str) -> Result<()> {
        self.load_buffer(code.as_bytes(), code)?;
        self.pcall(0, ffi::LUA_MULTRET)
    }

    // ------------------------------------------------------------------
    // Stack traffic.
    // ------------------------------------------------------------------

    /// Index of the top element (0 for an empty stack).
    #[must_use]
    pub fn top(&self) -> c_int {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_gettop(self.raw) }
    }

    /// Pops `n` values.
    pub fn pop(&mut self, n: c_int) {
        // SAFETY: raw is live; lua_settop accepts any n up to the top.
        unsafe { ffi::lua_pop(self.raw, n) }
    }

    /// Type of the value at `idx`.
    #[must_use]
    pub fn value_type(&self, idx: c_int) -> Type {
        // SAFETY: lua_type accepts acceptable indices and returns
        // LUA_TNONE beyond the top.
        Type::from_raw(unsafe { ffi::lua_type(self.raw, idx) })
    }

    pub fn push_nil(&mut self) {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_pushnil(self.raw) }
    }

    pub fn push_boolean(&mut self, b: bool) {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_pushboolean(self.raw, c_int::from(b)) }
    }

    pub fn push_integer(&mut self, n: i64) {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_pushinteger(self.raw, n) }
    }

    pub fn push_number(&mut self, n: f64) {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_pushnumber(self.raw, n) }
    }

    /// Pushes a string; embedded NULs are fine, Lua strings carry length.
    pub fn push_string(&mut self, s: &[u8]) {
        // SAFETY: s covers a live slice; Lua copies it immediately.
        unsafe {
            ffi::lua_pushlstring(self.raw, s.as_ptr().cast::<c_char>(), s.len());
        }
    }

    /// Registers a C function as a global.
    pub fn register(&mut self, name: &str, f: ffi::lua_CFunction) -> Result<()> {
        let name = CString::new(name)?;
        // SAFETY: raw is live and name is NUL-terminated.
        unsafe { ffi::lua_register(self.raw, name.as_ptr(), f) };
        Ok(())
    }

    /// Integer value at `idx`, if the value converts.
    #[must_use]
    pub fn to_integer(&self, idx: c_int) -> Option<i64> {
        let mut isnum: c_int = 0;
        // SAFETY: raw is live; isnum reports convertibility.
        let n = unsafe { ffi::lua_tointegerx(self.raw, idx, &mut isnum) };
        (isnum != 0).then_some(n)
    }

    /// Number value at `idx`, if the value converts.
    #[must_use]
    pub fn to_number(&self, idx: c_int) -> Option<f64> {
        let mut isnum: c_int = 0;
        // SAFETY: raw is live; isnum reports convertibility.
        let n = unsafe { ffi::lua_tonumberx(self.raw, idx, &mut isnum) };
        (isnum != 0).then_some(n)
    }

    /// Boolean interpretation of the value at `idx`.
    #[must_use]
    pub fn to_boolean(&self, idx: c_int) -> bool {
        // SAFETY: raw is a live state.
        unsafe { ffi::lua_toboolean(self.raw, idx) != 0 }
    }

    /// Copies out the string at `idx`.
    ///
    /// Unlike `lua_tolstring` this never converts numbers in place, so it
    /// cannot confuse `lua_next` traversals.
    #[must_use]
    pub fn to_str(&self, idx: c_int) -> Option<Vec<u8>> {
        if self.value_type(idx) != Type::String {
            return None;
        }
        let mut len: libc::size_t = 0;
        // SAFETY: the value is a string, so the pointer is valid for len
        // bytes until the value is popped; it is copied before that.
        unsafe {
            let ptr = ffi::lua_tolstring(self.raw, idx, &mut len);
            Some(std::slice::from_raw_parts(ptr.cast::<u8>(), len).to_vec())
        }
    }

    // ------------------------------------------------------------------
    // Globals and the registry.
    // ------------------------------------------------------------------

    /// Pushes the global `name`; returns its type.
    pub fn get_global(&mut self, name: &str) -> Result<Type> {
        let name = CString::new(name)?;
        // SAFETY: raw is live and name is NUL-terminated.
        Ok(Type::from_raw(unsafe {
            ffi::lua_getglobal(self.raw, name.as_ptr())
        }))
    }

    /// Pops the top value into the global `name`.
    pub fn set_global(&mut self, name: &str) -> Result<()> {
        let name = CString::new(name)?;
        // SAFETY: raw is live with at least one stack value.
        unsafe { ffi::lua_setglobal(self.raw, name.as_ptr()) };
        Ok(())
    }

    /// Pops the top value and stores it in the registry, returning the
    /// reference id.
    pub fn reference(&mut self) -> c_int {
        // SAFETY: raw is live with at least one stack value.
        unsafe { ffi::luaL_ref(self.raw, ffi::LUA_REGISTRYINDEX) }
    }

    /// Pushes the value stored under `r` in the registry; returns its
    /// type.
    pub fn push_reference(&mut self, r: c_int) -> Type {
        // SAFETY: raw is a live state.
        Type::from_raw(unsafe { ffi::lua_rawgeti(self.raw, ffi::LUA_REGISTRYINDEX, i64::from(r)) })
    }

    /// Releases a registry reference.
    pub fn unreference(&mut self, r: c_int) {
        // SAFETY: raw is a live state.
        unsafe { ffi::luaL_unref(self.raw, ffi::LUA_REGISTRYINDEX, r) }
    }

    // ------------------------------------------------------------------
    // Formatted strings.
    // ------------------------------------------------------------------

    /// Builds a string on the stack from typed pieces via
    /// `lua_pushfstring`, one directive per call, joined with
    /// `lua_concat`.
    pub fn push_fstring(&mut self, pieces: &[FmtArg<'_>]) -> Result<()> {
        if pieces.is_empty() {
            self.push_string(b"");
            return Ok(());
        }
        for piece in pieces {
            match *piece {
                FmtArg::Lit(s) => self.push_string(s.as_bytes()),
                FmtArg::Str(s) => {
                    let s = CString::new(s)?;
                    // SAFETY: the fixed format consumes exactly the one
                    // vararg passed.
                    unsafe {
                        ffi::lua_pushfstring(self.raw, c"%s".as_ptr(), s.as_ptr());
                    }
                }
                FmtArg::Int(i) => {
                    // SAFETY: %I consumes one lua_Integer vararg.
                    unsafe {
                        ffi::lua_pushfstring(self.raw, c"%I".as_ptr(), i);
                    }
                }
                FmtArg::Num(n) => {
                    // SAFETY: %f consumes one lua_Number vararg.
                    unsafe {
                        ffi::lua_pushfstring(self.raw, c"%f".as_ptr(), n);
                    }
                }
                FmtArg::Ptr(p) => {
                    // SAFETY: %p consumes one pointer vararg.
                    unsafe {
                        ffi::lua_pushfstring(self.raw, c"%p".as_ptr(), p);
                    }
                }
                FmtArg::Char(c) => {
                    // SAFETY: %c consumes one int vararg.
                    unsafe {
                        ffi::lua_pushfstring(self.raw, c"%c".as_ptr(), c_int::from(c));
                    }
                }
            }
        }
        // SAFETY: exactly pieces.len() strings were pushed above.
        unsafe { ffi::lua_concat(self.raw, pieces.len() as c_int) };
        Ok(())
    }

    // ------------------------------------------------------------------
    // Garbage collector.
    // ------------------------------------------------------------------

    /// Runs a full collection cycle.
    pub fn gc_collect(&mut self) {
        // SAFETY: LUA_GCCOLLECT takes no extra arguments.
        unsafe {
            ffi::lua_gc(self.raw, ffi::LUA_GCCOLLECT);
        }
    }

    /// Memory in use, in bytes.
    #[must_use]
    pub fn gc_count(&mut self) -> usize {
        // SAFETY: these commands take no extra arguments.
        unsafe {
            let kb = ffi::lua_gc(self.raw, ffi::LUA_GCCOUNT);
            let bytes = ffi::lua_gc(self.raw, ffi::LUA_GCCOUNTB);
            (kb as usize) * 1024 + bytes as usize
        }
    }

    /// Whether the collector is running.
    #[must_use]
    pub fn gc_is_running(&mut self) -> bool {
        // SAFETY: LUA_GCISRUNNING takes no extra arguments.
        unsafe { ffi::lua_gc(self.raw, ffi::LUA_GCISRUNNING) != 0 }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        // SAFETY: raw came from luaL_newstate and is closed once.
        unsafe {
            ffi::lua_close(self.raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State {
        let mut state = State::new().unwrap();
        state.open_libs();
        state
    }

    #[test]
    fn version_is_5_4() {
        let state = State::new().unwrap();
        assert!((state.version() - 504.0).abs() < f64::EPSILON);
    }

    #[test]
    fn eval_and_read_global() {
        let mut state = state();
        state.do_string("answer = 6 * 7").unwrap();
        assert_eq!(state.get_global("answer").unwrap(), Type::Number);
        assert_eq!(state.to_integer(-1), Some(42));
        state.pop(1);
        assert_eq!(state.top(), 0);
    }

    #[test]
    fn runtime_error_carries_message() {
        let mut state = state();
        let err = state.do_string("error('boom')").unwrap_err();
        match err {
            Error::Lua { status, message } => {
                assert_eq!(status, ffi::LUA_ERRRUN);
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The error value was popped.
        assert_eq!(state.top(), 0);
    }

    #[test]
    fn syntax_error_status() {
        let mut state = state();
        let err = state.load_buffer(b"this is not lua", "chunk").unwrap_err();
        match err {
            Error::Lua { status, .. } => assert_eq!(status, ffi::LUA_ERRSYNTAX),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn call_lua_function_from_rust() {
        let mut state = state();
        state
            .do_string("function add(a, b) return a + b end")
            .unwrap();
        state.get_global("add").unwrap();
        state.push_integer(30);
        state.push_integer(12);
        state.pcall(2, 1).unwrap();
        assert_eq!(state.to_integer(-1), Some(42));
        state.pop(1);
    }

    #[test]
    fn register_rust_function() {
        unsafe extern "C" fn double(L: *mut ffi::lua_State) -> libc::c_int {
            // SAFETY: called by Lua with a valid state.
            unsafe {
                let n = ffi::luaL_checkinteger(L, 1);
                ffi::lua_pushinteger(L, n * 2);
            }
            1
        }

        let mut state = state();
        state.register("double", double).unwrap();
        state.do_string("result = double(21)").unwrap();
        state.get_global("result").unwrap();
        assert_eq!(state.to_integer(-1), Some(42));
        state.pop(1);
    }

    #[test]
    fn push_fstring_mixes_directives() {
        let mut state = state();
        state
            .push_fstring(&[
                FmtArg::Lit("id="),
                FmtArg::Int(42),
                FmtArg::Lit(" name="),
                FmtArg::Str("widget"),
                FmtArg::Char(b'!'),
            ])
            .unwrap();
        assert_eq!(state.to_str(-1).as_deref(), Some(b"id=42 name=widget!".as_slice()));
        state.pop(1);
    }

    #[test]
    fn strings_with_embedded_nul() {
        let mut state = state();
        state.push_string(b"a\0b");
        assert_eq!(state.to_str(-1).as_deref(), Some(b"a\0b".as_slice()));
        state.pop(1);
    }

    #[test]
    fn registry_references() {
        let mut state = state();
        state.push_string(b"kept alive");
        let r = state.reference();
        state.gc_collect();
        assert_eq!(state.push_reference(r), Type::String);
        assert_eq!(state.to_str(-1).as_deref(), Some(b"kept alive".as_slice()));
        state.pop(1);
        state.unreference(r);
    }

    #[test]
    fn to_str_does_not_convert_numbers() {
        let mut state = state();
        state.push_integer(7);
        assert_eq!(state.to_str(-1), None);
        assert_eq!(state.value_type(-1), Type::Number);
        state.pop(1);
    }

    #[test]
    fn gc_reports_usage() {
        let mut state = state();
        assert!(state.gc_is_running());
        state.do_string("t = {}; for i = 1, 1000 do t[i] = i end").unwrap();
        assert!(state.gc_count() > 0);
    }
}
