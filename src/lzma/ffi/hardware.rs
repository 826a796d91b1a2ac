//! Hardware queries (`lzma/hardware.h`).

extern "C" {
    /// Usable physical memory in bytes, or 0 if unknown.
    pub fn lzma_physmem() -> u64;
    /// Number of CPU threads or cores, or 0 if unknown.
    pub fn lzma_cputhreads() -> u32;
}
