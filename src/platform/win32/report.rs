// ── Failure reporting ─────────────────────────────────────────────────────────
//
// Debug builds surface patcher failures as a modal dialog so that a failure
// inside the installer, where stderr goes nowhere, is still visible.  The
// message text comes from the system's error-message table, with a raw
// numeric fallback when the code has no description.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        System::Diagnostics::Debug::{
            FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
        },
        UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK},
    },
};

use crate::error::PatchError;

const DIALOG_TITLE: &str = "git-bash-switch";

/// Show a modal error dialog describing `err`.
///
/// Intended for debug builds; callers gate on `cfg(debug_assertions)`.
pub fn failure_dialog(err: &PatchError) {
    let body = match err.win32_code() {
        Some(code) => match system_message(code) {
            Some(message) => format!("{err}\n\n{message}"),
            None => format!("{err}\n\nCode {code:#010x}"),
        },
        None => err.to_string(),
    };
    message_box(DIALOG_TITLE, &body);
}

/// Look up the system's message text for a Win32 error code.
/// Returns `None` when the code has no description.
fn system_message(code: u32) -> Option<String> {
    let mut buf = [0u16; 512];
    // SAFETY: `buf` outlives the call and `nsize` is its exact length;
    // FROM_SYSTEM | IGNORE_INSERTS reads only the system message table.
    // Language 0 (neutral) lets the system pick the best match.
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            0,
            PWSTR(buf.as_mut_ptr()),
            buf.len() as u32,
            None,
        )
    } as usize;
    if len == 0 {
        return None;
    }
    // System messages end with "\r\n"; trim it for dialog use.
    Some(String::from_utf16_lossy(&buf[..len]).trim_end().to_owned())
}

/// Show a modal message box with no owner window.
fn message_box(title: &str, message: &str) {
    let msg_wide: Vec<u16> = message.encode_utf16().chain(std::iter::once(0)).collect();
    let title_wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}
