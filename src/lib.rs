//! Toggles the terminal host used by a Git for Windows launcher between
//! MinTTY and ConHost by rewriting the launcher's embedded string-table
//! resources in place.
//!
//! The launcher keeps both candidate launch command lines in string table 1
//! and the name of the active host in string table 2; `patcher` documents the
//! exact layout.  Two front ends share this crate: the `git-bash-switch`
//! binary and the `edit_git_bash` DLL export consumed by the installer.

// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI and
// the exported installer entry point).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

pub mod error;
pub mod host;
pub mod patcher;
pub mod platform;
pub mod store;
pub mod table;

pub use error::{PatchError, Result};
pub use host::TerminalHost;
#[cfg(windows)]
pub use platform::win32::resources::PeFile;
