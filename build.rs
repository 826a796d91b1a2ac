use std::env;

/// Native libraries wired to cargo features.
///
/// Each entry is (cargo feature env suffix, env-var stem, link name).
/// `NATIVE_SYS_<STEM>_LIB_DIR` adds a search path and
/// `NATIVE_SYS_<STEM>_STATIC` switches the link kind to static.
const LIBS: &[(&str, &str, &str)] = &[
    ("LZMA", "LZMA", "lzma"),
    ("BZIP2", "BZ2", "bz2"),
    ("BZIP3", "BZIP3", "bzip3"),
    ("LTDL", "LTDL", "ltdl"),
    ("LUA", "LUA", "lua5.4"),
];

fn main() {
    for &(feature, stem, link_name) in LIBS {
        let dir_var = format!("NATIVE_SYS_{stem}_LIB_DIR");
        let static_var = format!("NATIVE_SYS_{stem}_STATIC");
        println!("cargo:rerun-if-env-changed={dir_var}");
        println!("cargo:rerun-if-env-changed={static_var}");

        if env::var_os(format!("CARGO_FEATURE_{feature}")).is_none() {
            continue;
        }

        if let Ok(dir) = env::var(&dir_var) {
            println!("cargo:rustc-link-search=native={dir}");
        }

        // Lua is commonly installed with a versioned name; allow overriding.
        let name_var = format!("NATIVE_SYS_{stem}_LIB_NAME");
        println!("cargo:rerun-if-env-changed={name_var}");
        let name = env::var(&name_var).unwrap_or_else(|_| link_name.to_string());

        let kind = if env::var_os(&static_var).is_some() {
            "static"
        } else {
            "dylib"
        };
        println!("cargo:rustc-link-lib={kind}={name}");
    }
}
