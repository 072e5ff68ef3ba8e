// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in the patcher return `error::Result<T>`.  No panics
// in production paths; failures surface as result codes (see
// `PatchError::result_code`) and, in debug builds, as dialogs raised by
// `platform::win32::report`.

/// Every error the patcher can produce.
#[derive(Debug)]
pub enum PatchError {
    /// A working buffer could not be allocated or sized.
    ///
    /// The only reachable case is a command line longer than a string-table
    /// length cell can record (65 535 UTF-16 code units); genuine
    /// out-of-memory aborts the process before an error can be returned.
    Allocation,

    /// The target executable could not be opened, either for reading its
    /// resources or for starting an update transaction.
    Open {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// The current terminal host could not be read from the target.
    Read {
        function: &'static str,
        code: u32,
    },

    /// The active-host marker holds text that names neither terminal host.
    UnknownHost(String),

    /// The swapped command-line table could not be constructed.
    Swap(crate::table::TableError),

    /// A whole-table resource write was rejected.
    Update {
        /// String table id (1 = command lines, 2 = active-host marker).
        table: u16,
        code: u32,
    },

    /// The update transaction could not be finalised.
    Commit { code: u32 },
}

impl PatchError {
    /// The small integer result code reported to installers and shells:
    /// 0 = success, 1 = allocation, 2 = open/read, 3 = update, 4 = commit.
    pub fn result_code(&self) -> i32 {
        match self {
            Self::Allocation => 1,
            Self::Open { .. } | Self::Read { .. } | Self::UnknownHost(_) => 2,
            Self::Swap(_) | Self::Update { .. } => 3,
            Self::Commit { .. } => 4,
        }
    }

    /// The raw Win32 error code behind this failure, if there is one.
    /// Used by the debug failure dialog to look up the system message text.
    pub fn win32_code(&self) -> Option<u32> {
        match self {
            Self::Open { code, .. }
            | Self::Read { code, .. }
            | Self::Update { code, .. }
            | Self::Commit { code } => Some(*code),
            Self::Allocation | Self::UnknownHost(_) | Self::Swap(_) => None,
        }
    }
}

impl std::fmt::Display for PatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation => write!(f, "could not allocate the resource buffer"),
            Self::Open { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
            Self::Read { function, code } => write!(
                f,
                "could not read the current terminal host: {function} failed (error {code:#010x})"
            ),
            Self::UnknownHost(marker) => write!(
                f,
                "the active-host marker names neither MinTTY nor ConHost: {marker:?}"
            ),
            Self::Swap(e) => write!(f, "could not build the swapped command table: {e}"),
            Self::Update { table, code } => {
                write!(f, "updating string table {table} failed (error {code:#010x})")
            }
            Self::Commit { code } => {
                write!(f, "committing the resource update failed (error {code:#010x})")
            }
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Swap(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PatchError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableError;

    #[test]
    fn result_codes_match_the_installer_contract() {
        assert_eq!(PatchError::Allocation.result_code(), 1);
        assert_eq!(
            PatchError::Open { function: "BeginUpdateResourceW", code: 5 }.result_code(),
            2
        );
        assert_eq!(
            PatchError::Read { function: "FindResourceW", code: 1813 }.result_code(),
            2
        );
        assert_eq!(PatchError::UnknownHost("wezterm".into()).result_code(), 2);
        assert_eq!(PatchError::Swap(TableError::TextTooLong(70_000)).result_code(), 3);
        assert_eq!(PatchError::Update { table: 2, code: 87 }.result_code(), 3);
        assert_eq!(PatchError::Commit { code: 112 }.result_code(), 4);
    }

    #[test]
    fn win32_code_is_only_reported_for_api_failures() {
        assert_eq!(
            PatchError::Update { table: 1, code: 0x57 }.win32_code(),
            Some(0x57)
        );
        assert_eq!(PatchError::Allocation.win32_code(), None);
        assert_eq!(PatchError::UnknownHost(String::new()).win32_code(), None);
    }

    #[test]
    fn display_includes_the_failing_function_and_code() {
        let e = PatchError::Open { function: "LoadLibraryExW", code: 0x20 };
        let text = e.to_string();
        assert!(text.contains("LoadLibraryExW"));
        assert!(text.contains("0x00000020"));
    }
}
