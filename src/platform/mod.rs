// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The rest of the codebase talks to the OS through `store::ResourceStore`;
// this module provides the one real implementation.  No `unsafe` lives here;
// all Win32 FFI is confined to the `win32` sub-module and never leaks outward.

#[cfg(windows)]
pub mod win32;
