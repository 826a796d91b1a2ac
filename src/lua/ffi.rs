//! Raw bindings to the Lua 5.4 C API (`lua.h`, `lauxlib.h`, `lualib.h`).
//!
//! The C macro layer (`lua_pop`, `lua_pcall`, `lua_tostring`, ...) is
//! reproduced as `#[inline]` unsafe functions at the bottom so callers get
//! the same vocabulary the C headers give them.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use libc::{c_char, c_int, c_uchar, c_void, size_t, FILE};

pub const LUA_VERSION_MAJOR: &str = "5";
pub const LUA_VERSION_MINOR: &str = "4";
pub const LUA_VERSION_NUM: c_int = 504;

/// Option for multiple returns in `lua_call`-family functions.
pub const LUA_MULTRET: c_int = -1;

// Stack positions below this are pseudo-indices.
pub const LUAI_MAXSTACK: c_int = 1_000_000;
pub const LUA_REGISTRYINDEX: c_int = -LUAI_MAXSTACK - 1000;

#[inline]
#[must_use]
pub const fn lua_upvalueindex(i: c_int) -> c_int {
    LUA_REGISTRYINDEX - i
}

// Thread status.
pub const LUA_OK: c_int = 0;
pub const LUA_YIELD: c_int = 1;
pub const LUA_ERRRUN: c_int = 2;
pub const LUA_ERRSYNTAX: c_int = 3;
pub const LUA_ERRMEM: c_int = 4;
pub const LUA_ERRERR: c_int = 5;

// Basic types.
pub const LUA_TNONE: c_int = -1;
pub const LUA_TNIL: c_int = 0;
pub const LUA_TBOOLEAN: c_int = 1;
pub const LUA_TLIGHTUSERDATA: c_int = 2;
pub const LUA_TNUMBER: c_int = 3;
pub const LUA_TSTRING: c_int = 4;
pub const LUA_TTABLE: c_int = 5;
pub const LUA_TFUNCTION: c_int = 6;
pub const LUA_TUSERDATA: c_int = 7;
pub const LUA_TTHREAD: c_int = 8;
pub const LUA_NUMTYPES: c_int = 9;

/// Minimum free stack slots available to a C function.
pub const LUA_MINSTACK: c_int = 20;

// Predefined registry keys.
pub const LUA_RIDX_MAINTHREAD: i64 = 1;
pub const LUA_RIDX_GLOBALS: i64 = 2;
pub const LUA_RIDX_LAST: i64 = LUA_RIDX_GLOBALS;

pub type lua_Number = f64;
pub type lua_Integer = i64;
pub type lua_Unsigned = u64;
pub type lua_KContext = isize;

/// Opaque interpreter state.
#[repr(C)]
pub struct lua_State {
    _private: [u8; 0],
}

pub type lua_CFunction = unsafe extern "C" fn(L: *mut lua_State) -> c_int;
pub type lua_KFunction =
    unsafe extern "C" fn(L: *mut lua_State, status: c_int, ctx: lua_KContext) -> c_int;
pub type lua_Reader = unsafe extern "C" fn(
    L: *mut lua_State,
    ud: *mut c_void,
    sz: *mut size_t,
) -> *const c_char;
pub type lua_Writer = unsafe extern "C" fn(
    L: *mut lua_State,
    p: *const c_void,
    sz: size_t,
    ud: *mut c_void,
) -> c_int;
pub type lua_Alloc = unsafe extern "C" fn(
    ud: *mut c_void,
    ptr: *mut c_void,
    osize: size_t,
    nsize: size_t,
) -> *mut c_void;
pub type lua_WarnFunction =
    unsafe extern "C" fn(ud: *mut c_void, msg: *const c_char, tocont: c_int);

// Arithmetic and bitwise operators for lua_arith.
pub const LUA_OPADD: c_int = 0;
pub const LUA_OPSUB: c_int = 1;
pub const LUA_OPMUL: c_int = 2;
pub const LUA_OPMOD: c_int = 3;
pub const LUA_OPPOW: c_int = 4;
pub const LUA_OPDIV: c_int = 5;
pub const LUA_OPIDIV: c_int = 6;
pub const LUA_OPBAND: c_int = 7;
pub const LUA_OPBOR: c_int = 8;
pub const LUA_OPBXOR: c_int = 9;
pub const LUA_OPSHL: c_int = 10;
pub const LUA_OPSHR: c_int = 11;
pub const LUA_OPUNM: c_int = 12;
pub const LUA_OPBNOT: c_int = 13;

// Comparison operators for lua_compare.
pub const LUA_OPEQ: c_int = 0;
pub const LUA_OPLT: c_int = 1;
pub const LUA_OPLE: c_int = 2;

// Garbage collector commands for lua_gc.
pub const LUA_GCSTOP: c_int = 0;
pub const LUA_GCRESTART: c_int = 1;
pub const LUA_GCCOLLECT: c_int = 2;
pub const LUA_GCCOUNT: c_int = 3;
pub const LUA_GCCOUNTB: c_int = 4;
pub const LUA_GCSTEP: c_int = 5;
pub const LUA_GCSETPAUSE: c_int = 6;
pub const LUA_GCSETSTEPMUL: c_int = 7;
pub const LUA_GCISRUNNING: c_int = 9;
pub const LUA_GCGEN: c_int = 10;
pub const LUA_GCINC: c_int = 11;

// Debug hook events.
pub const LUA_HOOKCALL: c_int = 0;
pub const LUA_HOOKRET: c_int = 1;
pub const LUA_HOOKLINE: c_int = 2;
pub const LUA_HOOKCOUNT: c_int = 3;
pub const LUA_HOOKTAILCALL: c_int = 4;

pub const LUA_MASKCALL: c_int = 1 << LUA_HOOKCALL;
pub const LUA_MASKRET: c_int = 1 << LUA_HOOKRET;
pub const LUA_MASKLINE: c_int = 1 << LUA_HOOKLINE;
pub const LUA_MASKCOUNT: c_int = 1 << LUA_HOOKCOUNT;

/// Size of `lua_Debug::short_src`.
pub const LUA_IDSIZE: usize = 60;

/// Activation record passed to debug functions and hooks.
#[repr(C)]
pub struct lua_Debug {
    pub event: c_int,
    pub name: *const c_char,
    pub namewhat: *const c_char,
    pub what: *const c_char,
    pub source: *const c_char,
    pub srclen: size_t,
    pub currentline: c_int,
    pub linedefined: c_int,
    pub lastlinedefined: c_int,
    pub nups: c_uchar,
    pub nparams: c_uchar,
    pub isvararg: c_char,
    pub istailcall: c_char,
    pub ftransfer: u16,
    pub ntransfer: u16,
    pub short_src: [c_char; LUA_IDSIZE],
    // private part
    i_ci: *mut c_void,
}

impl lua_Debug {
    /// A zeroed record for passing to `lua_getstack`.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            event: 0,
            name: std::ptr::null(),
            namewhat: std::ptr::null(),
            what: std::ptr::null(),
            source: std::ptr::null(),
            srclen: 0,
            currentline: 0,
            linedefined: 0,
            lastlinedefined: 0,
            nups: 0,
            nparams: 0,
            isvararg: 0,
            istailcall: 0,
            ftransfer: 0,
            ntransfer: 0,
            short_src: [0; LUA_IDSIZE],
            i_ci: std::ptr::null_mut(),
        }
    }
}

pub type lua_Hook = unsafe extern "C" fn(L: *mut lua_State, ar: *mut lua_Debug);

extern "C" {
    // State manipulation.
    pub fn lua_newstate(f: lua_Alloc, ud: *mut c_void) -> *mut lua_State;
    pub fn lua_close(L: *mut lua_State);
    pub fn lua_newthread(L: *mut lua_State) -> *mut lua_State;
    pub fn lua_closethread(L: *mut lua_State, from: *mut lua_State) -> c_int;
    pub fn lua_resetthread(L: *mut lua_State) -> c_int;
    pub fn lua_atpanic(L: *mut lua_State, panicf: lua_CFunction) -> Option<lua_CFunction>;
    pub fn lua_version(L: *mut lua_State) -> lua_Number;

    // Basic stack manipulation.
    pub fn lua_absindex(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_gettop(L: *mut lua_State) -> c_int;
    pub fn lua_settop(L: *mut lua_State, idx: c_int);
    pub fn lua_pushvalue(L: *mut lua_State, idx: c_int);
    pub fn lua_rotate(L: *mut lua_State, idx: c_int, n: c_int);
    pub fn lua_copy(L: *mut lua_State, fromidx: c_int, toidx: c_int);
    pub fn lua_checkstack(L: *mut lua_State, n: c_int) -> c_int;
    pub fn lua_xmove(from: *mut lua_State, to: *mut lua_State, n: c_int);

    // Access functions (stack -> C).
    pub fn lua_isnumber(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_isstring(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_iscfunction(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_isinteger(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_isuserdata(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_type(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_typename(L: *mut lua_State, tp: c_int) -> *const c_char;
    pub fn lua_tonumberx(L: *mut lua_State, idx: c_int, isnum: *mut c_int) -> lua_Number;
    pub fn lua_tointegerx(L: *mut lua_State, idx: c_int, isnum: *mut c_int) -> lua_Integer;
    pub fn lua_toboolean(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_tolstring(L: *mut lua_State, idx: c_int, len: *mut size_t) -> *const c_char;
    pub fn lua_rawlen(L: *mut lua_State, idx: c_int) -> lua_Unsigned;
    pub fn lua_tocfunction(L: *mut lua_State, idx: c_int) -> Option<lua_CFunction>;
    pub fn lua_touserdata(L: *mut lua_State, idx: c_int) -> *mut c_void;
    pub fn lua_tothread(L: *mut lua_State, idx: c_int) -> *mut lua_State;
    pub fn lua_topointer(L: *mut lua_State, idx: c_int) -> *const c_void;

    // Comparison and arithmetic.
    pub fn lua_arith(L: *mut lua_State, op: c_int);
    pub fn lua_rawequal(L: *mut lua_State, idx1: c_int, idx2: c_int) -> c_int;
    pub fn lua_compare(L: *mut lua_State, idx1: c_int, idx2: c_int, op: c_int) -> c_int;

    // Push functions (C -> stack).
    pub fn lua_pushnil(L: *mut lua_State);
    pub fn lua_pushnumber(L: *mut lua_State, n: lua_Number);
    pub fn lua_pushinteger(L: *mut lua_State, n: lua_Integer);
    pub fn lua_pushlstring(L: *mut lua_State, s: *const c_char, len: size_t) -> *const c_char;
    pub fn lua_pushstring(L: *mut lua_State, s: *const c_char) -> *const c_char;
    pub fn lua_pushfstring(L: *mut lua_State, fmt: *const c_char, ...) -> *const c_char;
    pub fn lua_pushcclosure(L: *mut lua_State, r#fn: lua_CFunction, n: c_int);
    pub fn lua_pushboolean(L: *mut lua_State, b: c_int);
    pub fn lua_pushlightuserdata(L: *mut lua_State, p: *mut c_void);
    pub fn lua_pushthread(L: *mut lua_State) -> c_int;

    // Get functions (Lua -> stack); all return the type pushed.
    pub fn lua_getglobal(L: *mut lua_State, name: *const c_char) -> c_int;
    pub fn lua_gettable(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_getfield(L: *mut lua_State, idx: c_int, k: *const c_char) -> c_int;
    pub fn lua_geti(L: *mut lua_State, idx: c_int, n: lua_Integer) -> c_int;
    pub fn lua_rawget(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_rawgeti(L: *mut lua_State, idx: c_int, n: lua_Integer) -> c_int;
    pub fn lua_rawgetp(L: *mut lua_State, idx: c_int, p: *const c_void) -> c_int;
    pub fn lua_createtable(L: *mut lua_State, narr: c_int, nrec: c_int);
    pub fn lua_newuserdatauv(L: *mut lua_State, sz: size_t, nuvalue: c_int) -> *mut c_void;
    pub fn lua_getmetatable(L: *mut lua_State, objindex: c_int) -> c_int;
    pub fn lua_getiuservalue(L: *mut lua_State, idx: c_int, n: c_int) -> c_int;

    // Set functions (stack -> Lua).
    pub fn lua_setglobal(L: *mut lua_State, name: *const c_char);
    pub fn lua_settable(L: *mut lua_State, idx: c_int);
    pub fn lua_setfield(L: *mut lua_State, idx: c_int, k: *const c_char);
    pub fn lua_seti(L: *mut lua_State, idx: c_int, n: lua_Integer);
    pub fn lua_rawset(L: *mut lua_State, idx: c_int);
    pub fn lua_rawseti(L: *mut lua_State, idx: c_int, n: lua_Integer);
    pub fn lua_rawsetp(L: *mut lua_State, idx: c_int, p: *const c_void);
    pub fn lua_setmetatable(L: *mut lua_State, objindex: c_int) -> c_int;
    pub fn lua_setiuservalue(L: *mut lua_State, idx: c_int, n: c_int) -> c_int;

    // Load and call.
    pub fn lua_callk(
        L: *mut lua_State,
        nargs: c_int,
        nresults: c_int,
        ctx: lua_KContext,
        k: Option<lua_KFunction>,
    );
    pub fn lua_pcallk(
        L: *mut lua_State,
        nargs: c_int,
        nresults: c_int,
        errfunc: c_int,
        ctx: lua_KContext,
        k: Option<lua_KFunction>,
    ) -> c_int;
    pub fn lua_load(
        L: *mut lua_State,
        reader: lua_Reader,
        dt: *mut c_void,
        chunkname: *const c_char,
        mode: *const c_char,
    ) -> c_int;
    pub fn lua_dump(
        L: *mut lua_State,
        writer: lua_Writer,
        data: *mut c_void,
        strip: c_int,
    ) -> c_int;

    // Coroutines.
    pub fn lua_yieldk(
        L: *mut lua_State,
        nresults: c_int,
        ctx: lua_KContext,
        k: Option<lua_KFunction>,
    ) -> c_int;
    pub fn lua_resume(
        L: *mut lua_State,
        from: *mut lua_State,
        narg: c_int,
        nres: *mut c_int,
    ) -> c_int;
    pub fn lua_status(L: *mut lua_State) -> c_int;
    pub fn lua_isyieldable(L: *mut lua_State) -> c_int;

    // Warnings.
    pub fn lua_setwarnf(L: *mut lua_State, f: Option<lua_WarnFunction>, ud: *mut c_void);
    pub fn lua_warning(L: *mut lua_State, msg: *const c_char, tocont: c_int);

    // Garbage collector; extra arguments depend on the command.
    pub fn lua_gc(L: *mut lua_State, what: c_int, ...) -> c_int;

    // Miscellaneous.
    pub fn lua_error(L: *mut lua_State) -> c_int;
    pub fn lua_next(L: *mut lua_State, idx: c_int) -> c_int;
    pub fn lua_concat(L: *mut lua_State, n: c_int);
    pub fn lua_len(L: *mut lua_State, idx: c_int);
    pub fn lua_stringtonumber(L: *mut lua_State, s: *const c_char) -> size_t;
    pub fn lua_getallocf(L: *mut lua_State, ud: *mut *mut c_void) -> lua_Alloc;
    pub fn lua_setallocf(L: *mut lua_State, f: lua_Alloc, ud: *mut c_void);
    pub fn lua_toclose(L: *mut lua_State, idx: c_int);
    pub fn lua_closeslot(L: *mut lua_State, idx: c_int);

    // Debug interface.
    pub fn lua_getstack(L: *mut lua_State, level: c_int, ar: *mut lua_Debug) -> c_int;
    pub fn lua_getinfo(L: *mut lua_State, what: *const c_char, ar: *mut lua_Debug) -> c_int;
    pub fn lua_getlocal(L: *mut lua_State, ar: *const lua_Debug, n: c_int) -> *const c_char;
    pub fn lua_setlocal(L: *mut lua_State, ar: *const lua_Debug, n: c_int) -> *const c_char;
    pub fn lua_getupvalue(L: *mut lua_State, funcindex: c_int, n: c_int) -> *const c_char;
    pub fn lua_setupvalue(L: *mut lua_State, funcindex: c_int, n: c_int) -> *const c_char;
    pub fn lua_upvalueid(L: *mut lua_State, fidx: c_int, n: c_int) -> *mut c_void;
    pub fn lua_upvaluejoin(L: *mut lua_State, fidx1: c_int, n1: c_int, fidx2: c_int, n2: c_int);
    pub fn lua_sethook(L: *mut lua_State, func: Option<lua_Hook>, mask: c_int, count: c_int);
    pub fn lua_gethook(L: *mut lua_State) -> Option<lua_Hook>;
    pub fn lua_gethookmask(L: *mut lua_State) -> c_int;
    pub fn lua_gethookcount(L: *mut lua_State) -> c_int;
    pub fn lua_setcstacklimit(L: *mut lua_State, limit: libc::c_uint) -> c_int;
}

// ---------------------------------------------------------------------
// lauxlib.h
// ---------------------------------------------------------------------

/// Global table name.
pub const LUA_GNAME: &str = "_G";

/// Key in the registry for the table of loaded modules.
pub const LUA_LOADED_TABLE: &str = "_LOADED";
/// Key in the registry for the table of preloaded loaders.
pub const LUA_PRELOAD_TABLE: &str = "_PRELOAD";

/// Metatable name for file handles created by the io library.
pub const LUA_FILEHANDLE: &str = "FILE*";

/// Extra status code of `luaL_loadfilex` for file-level errors.
pub const LUA_ERRFILE: c_int = LUA_ERRERR + 1;

pub const LUA_NOREF: c_int = -2;
pub const LUA_REFNIL: c_int = -1;

/// Argument of `luaL_checkversion_` encoding the numeric type sizes.
pub const LUAL_NUMSIZES: size_t =
    std::mem::size_of::<lua_Integer>() * 16 + std::mem::size_of::<lua_Number>();

/// Function registration entry for `luaL_setfuncs`; a null `name` ends the
/// array, a null `func` registers a placeholder.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct luaL_Reg {
    pub name: *const c_char,
    pub func: Option<lua_CFunction>,
}

/// Initial buffer space of a `luaL_Buffer`.
pub const LUAL_BUFFERSIZE: usize = 16 * std::mem::size_of::<*mut c_void>()
    * std::mem::size_of::<lua_Number>();

/// Forces the same alignment the C union gets from its scalar members.
#[repr(C)]
pub union luaL_Buffer_init {
    pub n: lua_Number,
    pub u: f64,
    pub s: *mut c_void,
    pub i: lua_Integer,
    pub l: libc::c_long,
    pub b: [c_char; LUAL_BUFFERSIZE],
}

/// String buffer driven by the `luaL_add*` functions.
#[repr(C)]
pub struct luaL_Buffer {
    pub b: *mut c_char,
    pub size: size_t,
    pub n: size_t,
    pub L: *mut lua_State,
    pub init: luaL_Buffer_init,
}

/// Userdata payload for io-library-compatible streams.
#[repr(C)]
pub struct luaL_Stream {
    pub f: *mut FILE,
    pub closef: Option<lua_CFunction>,
}

extern "C" {
    pub fn luaL_checkversion_(L: *mut lua_State, ver: lua_Number, sz: size_t);
    pub fn luaL_getmetafield(L: *mut lua_State, obj: c_int, e: *const c_char) -> c_int;
    pub fn luaL_callmeta(L: *mut lua_State, obj: c_int, e: *const c_char) -> c_int;
    pub fn luaL_tolstring(L: *mut lua_State, idx: c_int, len: *mut size_t) -> *const c_char;
    pub fn luaL_argerror(L: *mut lua_State, arg: c_int, extramsg: *const c_char) -> c_int;
    pub fn luaL_typeerror(L: *mut lua_State, arg: c_int, tname: *const c_char) -> c_int;
    pub fn luaL_checklstring(L: *mut lua_State, arg: c_int, l: *mut size_t) -> *const c_char;
    pub fn luaL_optlstring(
        L: *mut lua_State,
        arg: c_int,
        def: *const c_char,
        l: *mut size_t,
    ) -> *const c_char;
    pub fn luaL_checknumber(L: *mut lua_State, arg: c_int) -> lua_Number;
    pub fn luaL_optnumber(L: *mut lua_State, arg: c_int, def: lua_Number) -> lua_Number;
    pub fn luaL_checkinteger(L: *mut lua_State, arg: c_int) -> lua_Integer;
    pub fn luaL_optinteger(L: *mut lua_State, arg: c_int, def: lua_Integer) -> lua_Integer;
    pub fn luaL_checkstack(L: *mut lua_State, sz: c_int, msg: *const c_char);
    pub fn luaL_checktype(L: *mut lua_State, arg: c_int, t: c_int);
    pub fn luaL_checkany(L: *mut lua_State, arg: c_int);
    pub fn luaL_newmetatable(L: *mut lua_State, tname: *const c_char) -> c_int;
    pub fn luaL_setmetatable(L: *mut lua_State, tname: *const c_char);
    pub fn luaL_testudata(L: *mut lua_State, ud: c_int, tname: *const c_char) -> *mut c_void;
    pub fn luaL_checkudata(L: *mut lua_State, ud: c_int, tname: *const c_char) -> *mut c_void;
    pub fn luaL_where(L: *mut lua_State, lvl: c_int);
    pub fn luaL_error(L: *mut lua_State, fmt: *const c_char, ...) -> c_int;
    pub fn luaL_checkoption(
        L: *mut lua_State,
        arg: c_int,
        def: *const c_char,
        lst: *const *const c_char,
    ) -> c_int;
    pub fn luaL_fileresult(L: *mut lua_State, stat: c_int, fname: *const c_char) -> c_int;
    pub fn luaL_execresult(L: *mut lua_State, stat: c_int) -> c_int;

    // Reference system in the registry (or any table).
    pub fn luaL_ref(L: *mut lua_State, t: c_int) -> c_int;
    pub fn luaL_unref(L: *mut lua_State, t: c_int, r#ref: c_int);

    pub fn luaL_loadfilex(L: *mut lua_State, filename: *const c_char, mode: *const c_char)
        -> c_int;
    pub fn luaL_loadbufferx(
        L: *mut lua_State,
        buff: *const c_char,
        sz: size_t,
        name: *const c_char,
        mode: *const c_char,
    ) -> c_int;
    pub fn luaL_loadstring(L: *mut lua_State, s: *const c_char) -> c_int;

    pub fn luaL_newstate() -> *mut lua_State;
    pub fn luaL_len(L: *mut lua_State, idx: c_int) -> lua_Integer;
    pub fn luaL_addgsub(
        b: *mut luaL_Buffer,
        s: *const c_char,
        p: *const c_char,
        r: *const c_char,
    );
    pub fn luaL_gsub(
        L: *mut lua_State,
        s: *const c_char,
        p: *const c_char,
        r: *const c_char,
    ) -> *const c_char;
    pub fn luaL_setfuncs(L: *mut lua_State, l: *const luaL_Reg, nup: c_int);
    pub fn luaL_getsubtable(L: *mut lua_State, idx: c_int, fname: *const c_char) -> c_int;
    pub fn luaL_traceback(
        L: *mut lua_State,
        L1: *mut lua_State,
        msg: *const c_char,
        level: c_int,
    );
    pub fn luaL_requiref(
        L: *mut lua_State,
        modname: *const c_char,
        openf: lua_CFunction,
        glb: c_int,
    );

    // String buffers.
    pub fn luaL_buffinit(L: *mut lua_State, B: *mut luaL_Buffer);
    pub fn luaL_prepbuffsize(B: *mut luaL_Buffer, sz: size_t) -> *mut c_char;
    pub fn luaL_addlstring(B: *mut luaL_Buffer, s: *const c_char, l: size_t);
    pub fn luaL_addstring(B: *mut luaL_Buffer, s: *const c_char);
    pub fn luaL_addvalue(B: *mut luaL_Buffer);
    pub fn luaL_pushresult(B: *mut luaL_Buffer);
    pub fn luaL_pushresultsize(B: *mut luaL_Buffer, sz: size_t);
    pub fn luaL_buffinitsize(L: *mut lua_State, B: *mut luaL_Buffer, sz: size_t) -> *mut c_char;
}

// ---------------------------------------------------------------------
// lualib.h
// ---------------------------------------------------------------------

pub const LUA_COLIBNAME: &str = "coroutine";
pub const LUA_TABLIBNAME: &str = "table";
pub const LUA_IOLIBNAME: &str = "io";
pub const LUA_OSLIBNAME: &str = "os";
pub const LUA_STRLIBNAME: &str = "string";
pub const LUA_UTF8LIBNAME: &str = "utf8";
pub const LUA_MATHLIBNAME: &str = "math";
pub const LUA_DBLIBNAME: &str = "debug";
pub const LUA_LOADLIBNAME: &str = "package";

extern "C" {
    pub fn luaopen_base(L: *mut lua_State) -> c_int;
    pub fn luaopen_coroutine(L: *mut lua_State) -> c_int;
    pub fn luaopen_table(L: *mut lua_State) -> c_int;
    pub fn luaopen_io(L: *mut lua_State) -> c_int;
    pub fn luaopen_os(L: *mut lua_State) -> c_int;
    pub fn luaopen_string(L: *mut lua_State) -> c_int;
    pub fn luaopen_utf8(L: *mut lua_State) -> c_int;
    pub fn luaopen_math(L: *mut lua_State) -> c_int;
    pub fn luaopen_debug(L: *mut lua_State) -> c_int;
    pub fn luaopen_package(L: *mut lua_State) -> c_int;
    pub fn luaL_openlibs(L: *mut lua_State);
}

// ---------------------------------------------------------------------
// The C macro layer, spelled as inline functions.
// ---------------------------------------------------------------------

/// `lua_call` macro.
///
/// # Safety
/// Same contract as `lua_callk` with no continuation.
#[inline]
pub unsafe fn lua_call(L: *mut lua_State, nargs: c_int, nresults: c_int) {
    unsafe { lua_callk(L, nargs, nresults, 0, None) }
}

/// `lua_pcall` macro.
///
/// # Safety
/// Same contract as `lua_pcallk` with no continuation.
#[inline]
pub unsafe fn lua_pcall(L: *mut lua_State, nargs: c_int, nresults: c_int, errfunc: c_int) -> c_int {
    unsafe { lua_pcallk(L, nargs, nresults, errfunc, 0, None) }
}

/// `lua_yield` macro.
///
/// # Safety
/// Same contract as `lua_yieldk` with no continuation.
#[inline]
pub unsafe fn lua_yield(L: *mut lua_State, nresults: c_int) -> c_int {
    unsafe { lua_yieldk(L, nresults, 0, None) }
}

/// `lua_tonumber` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_tonumber(L: *mut lua_State, idx: c_int) -> lua_Number {
    unsafe { lua_tonumberx(L, idx, std::ptr::null_mut()) }
}

/// `lua_tointeger` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_tointeger(L: *mut lua_State, idx: c_int) -> lua_Integer {
    unsafe { lua_tointegerx(L, idx, std::ptr::null_mut()) }
}

/// `lua_pop` macro.
///
/// # Safety
/// `L` must be a valid state with at least `n` stack entries.
#[inline]
pub unsafe fn lua_pop(L: *mut lua_State, n: c_int) {
    unsafe { lua_settop(L, -n - 1) }
}

/// `lua_newtable` macro.
///
/// # Safety
/// `L` must be a valid state with stack space for one value.
#[inline]
pub unsafe fn lua_newtable(L: *mut lua_State) {
    unsafe { lua_createtable(L, 0, 0) }
}

/// `lua_register` macro.
///
/// # Safety
/// `L` must be valid and `name` NUL-terminated.
#[inline]
pub unsafe fn lua_register(L: *mut lua_State, name: *const c_char, f: lua_CFunction) {
    unsafe {
        lua_pushcfunction(L, f);
        lua_setglobal(L, name);
    }
}

/// `lua_pushcfunction` macro.
///
/// # Safety
/// `L` must be a valid state with stack space for one value.
#[inline]
pub unsafe fn lua_pushcfunction(L: *mut lua_State, f: lua_CFunction) {
    unsafe { lua_pushcclosure(L, f, 0) }
}

/// `lua_isfunction` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_isfunction(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TFUNCTION }
}

/// `lua_istable` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_istable(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TTABLE }
}

/// `lua_islightuserdata` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_islightuserdata(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TLIGHTUSERDATA }
}

/// `lua_isnil` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_isnil(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TNIL }
}

/// `lua_isboolean` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_isboolean(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TBOOLEAN }
}

/// `lua_isthread` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_isthread(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TTHREAD }
}

/// `lua_isnone` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_isnone(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) == LUA_TNONE }
}

/// `lua_isnoneornil` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_isnoneornil(L: *mut lua_State, idx: c_int) -> bool {
    unsafe { lua_type(L, idx) <= 0 }
}

/// `lua_pushglobaltable` macro.
///
/// # Safety
/// `L` must be a valid state with stack space for one value.
#[inline]
pub unsafe fn lua_pushglobaltable(L: *mut lua_State) {
    unsafe {
        lua_rawgeti(L, LUA_REGISTRYINDEX, LUA_RIDX_GLOBALS);
    }
}

/// `lua_tostring` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn lua_tostring(L: *mut lua_State, idx: c_int) -> *const c_char {
    unsafe { lua_tolstring(L, idx, std::ptr::null_mut()) }
}

/// `lua_insert` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` a valid non-pseudo index.
#[inline]
pub unsafe fn lua_insert(L: *mut lua_State, idx: c_int) {
    unsafe { lua_rotate(L, idx, 1) }
}

/// `lua_remove` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` a valid non-pseudo index.
#[inline]
pub unsafe fn lua_remove(L: *mut lua_State, idx: c_int) {
    unsafe {
        lua_rotate(L, idx, -1);
        lua_pop(L, 1);
    }
}

/// `lua_replace` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` a valid index.
#[inline]
pub unsafe fn lua_replace(L: *mut lua_State, idx: c_int) {
    unsafe {
        lua_copy(L, -1, idx);
        lua_pop(L, 1);
    }
}

/// `luaL_checkversion` macro.
///
/// # Safety
/// `L` must be a valid state.
#[inline]
pub unsafe fn luaL_checkversion(L: *mut lua_State) {
    unsafe { luaL_checkversion_(L, lua_Number::from(LUA_VERSION_NUM), LUAL_NUMSIZES) }
}

/// `luaL_checkstring` macro.
///
/// # Safety
/// `L` must be a valid state inside a C function call.
#[inline]
pub unsafe fn luaL_checkstring(L: *mut lua_State, arg: c_int) -> *const c_char {
    unsafe { luaL_checklstring(L, arg, std::ptr::null_mut()) }
}

/// `luaL_optstring` macro.
///
/// # Safety
/// `L` must be a valid state inside a C function call.
#[inline]
pub unsafe fn luaL_optstring(L: *mut lua_State, arg: c_int, def: *const c_char) -> *const c_char {
    unsafe { luaL_optlstring(L, arg, def, std::ptr::null_mut()) }
}

/// `luaL_typename` macro.
///
/// # Safety
/// `L` must be a valid state and `idx` an acceptable index.
#[inline]
pub unsafe fn luaL_typename(L: *mut lua_State, idx: c_int) -> *const c_char {
    unsafe { lua_typename(L, lua_type(L, idx)) }
}

/// `luaL_getmetatable` macro.
///
/// # Safety
/// `L` must be valid and `tname` NUL-terminated.
#[inline]
pub unsafe fn luaL_getmetatable(L: *mut lua_State, tname: *const c_char) -> c_int {
    unsafe { lua_getfield(L, LUA_REGISTRYINDEX, tname) }
}

/// `luaL_loadbuffer` macro.
///
/// # Safety
/// Same contract as `luaL_loadbufferx` with a null mode.
#[inline]
pub unsafe fn luaL_loadbuffer(
    L: *mut lua_State,
    buff: *const c_char,
    sz: size_t,
    name: *const c_char,
) -> c_int {
    unsafe { luaL_loadbufferx(L, buff, sz, name, std::ptr::null()) }
}

/// `luaL_loadfile` macro.
///
/// # Safety
/// Same contract as `luaL_loadfilex` with a null mode.
#[inline]
pub unsafe fn luaL_loadfile(L: *mut lua_State, filename: *const c_char) -> c_int {
    unsafe { luaL_loadfilex(L, filename, std::ptr::null()) }
}

/// `luaL_dostring` macro; returns true on error like the C original.
///
/// # Safety
/// `L` must be valid and `s` NUL-terminated.
#[inline]
pub unsafe fn luaL_dostring(L: *mut lua_State, s: *const c_char) -> bool {
    unsafe { luaL_loadstring(L, s) != LUA_OK || lua_pcall(L, 0, LUA_MULTRET, 0) != LUA_OK }
}

/// `luaL_dofile` macro; returns true on error like the C original.
///
/// # Safety
/// `L` must be valid and `filename` NUL-terminated.
#[inline]
pub unsafe fn luaL_dofile(L: *mut lua_State, filename: *const c_char) -> bool {
    unsafe { luaL_loadfile(L, filename) != LUA_OK || lua_pcall(L, 0, LUA_MULTRET, 0) != LUA_OK }
}

/// `luaL_newlibtable` macro.
///
/// # Safety
/// `L` must be a valid state; `l` must be a terminated registration array.
#[inline]
pub unsafe fn luaL_newlibtable(L: *mut lua_State, l: &[luaL_Reg]) {
    // The terminator entry does not count.
    unsafe { lua_createtable(L, 0, l.len() as c_int - 1) }
}

/// `luaL_newlib` macro.
///
/// # Safety
/// `L` must be a valid state; `l` must be a terminated registration array.
#[inline]
pub unsafe fn luaL_newlib(L: *mut lua_State, l: &[luaL_Reg]) {
    unsafe {
        luaL_checkversion(L);
        luaL_newlibtable(L, l);
        luaL_setfuncs(L, l.as_ptr(), 0);
    }
}

/// `luaL_addchar` macro.
///
/// # Safety
/// `B` must be an initialized buffer.
#[inline]
pub unsafe fn luaL_addchar(B: *mut luaL_Buffer, c: c_char) {
    unsafe {
        if (*B).n >= (*B).size {
            luaL_prepbuffsize(B, 1);
        }
        *(*B).b.add((*B).n) = c;
        (*B).n += 1;
    }
}

/// `luaL_addsize` macro.
///
/// # Safety
/// `B` must be an initialized buffer with `s` bytes just written into the
/// prepared area.
#[inline]
pub unsafe fn luaL_addsize(B: *mut luaL_Buffer, s: size_t) {
    unsafe { (*B).n += s }
}

/// `luaL_buffsub` macro.
///
/// # Safety
/// `B` must be an initialized buffer holding at least `s` bytes.
#[inline]
pub unsafe fn luaL_buffsub(B: *mut luaL_Buffer, s: size_t) {
    unsafe { (*B).n -= s }
}

/// `luaL_prepbuffer` macro.
///
/// # Safety
/// `B` must be an initialized buffer.
#[inline]
pub unsafe fn luaL_prepbuffer(B: *mut luaL_Buffer) -> *mut c_char {
    unsafe { luaL_prepbuffsize(B, LUAL_BUFFERSIZE) }
}

/// `luaL_pushfail` macro.
///
/// # Safety
/// `L` must be a valid state with stack space for one value.
#[inline]
pub unsafe fn luaL_pushfail(L: *mut lua_State) {
    unsafe { lua_pushnil(L) }
}
