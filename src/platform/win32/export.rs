// ── Installer entry point ─────────────────────────────────────────────────────
//
// The installer drives the patcher through a single exported function rather
// than spawning the binary.  The DLL it loads must match the installer's own
// architecture, which means an i686 build; see the README.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use widestring::U16CStr;

use super::resources::PeFile;
use crate::patcher;

/// Replace the launcher's command line (string table 1, slot 0; all other
/// slots erased).  C signature:
///
/// ```c
/// int __stdcall edit_git_bash(LPCWSTR git_bash_path, LPCWSTR new_command_line);
/// ```
///
/// Returns 0 on success, 1 = allocation failure, 2 = open failure,
/// 3 = update failure, 4 = commit failure.
///
/// # Safety
///
/// Both pointers must be non-null, valid, null-terminated UTF-16 strings.
/// Null pointers are caught and reported as an open failure; anything else
/// about an invalid pointer is on the caller.
#[no_mangle]
pub unsafe extern "system" fn edit_git_bash(
    git_bash_path: *const u16,
    new_command_line: *const u16,
) -> i32 {
    if git_bash_path.is_null() || new_command_line.is_null() {
        // No target to open.
        return 2;
    }

    // SAFETY: non-null per the check above; null-terminated per the contract.
    let path = U16CStr::from_ptr_str(git_bash_path);
    let command_line = U16CStr::from_ptr_str(new_command_line);

    let mut file = PeFile::new(path.to_os_string());
    match patcher::write_command_line(&mut file, command_line.as_ustr()) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("edit_git_bash: {e}");
            #[cfg(debug_assertions)]
            super::report::failure_dialog(&e);
            e.result_code()
        }
    }
}
