// ── Resource access for on-disk executables ───────────────────────────────────
//
// `PeFile` implements `store::ResourceStore` on top of the Win32 resource
// APIs.  The two scopes map onto two kernel objects:
//
//   Reader  → `LoadedModule`     LoadLibraryExW(…AS_DATAFILE…) / FreeLibrary
//   Update  → `UpdateTransaction`  BeginUpdateResourceW / EndUpdateResourceW
//
// The module handle must be released before an update transaction may be
// opened on the same file; the `&mut self` acquisition methods make holding
// both a borrow error.  This is inside `platform::win32`, so `unsafe` is
// permitted per crate policy.

#![allow(unsafe_code)]

use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use widestring::U16CString;
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{
            GetLastError, ERROR_INVALID_DATA, ERROR_INVALID_NAME, ERROR_RESOURCE_LANG_NOT_FOUND,
            ERROR_RESOURCE_NAME_NOT_FOUND, ERROR_RESOURCE_TYPE_NOT_FOUND, HANDLE, HMODULE,
        },
        System::LibraryLoader::{
            BeginUpdateResourceW, EndUpdateResourceW, FindResourceW, FreeLibrary, LoadLibraryExW,
            LoadResource, LockResource, SizeofResource, UpdateResourceW, LOAD_LIBRARY_AS_DATAFILE,
            LOAD_LIBRARY_AS_IMAGE_RESOURCE,
        },
    },
};

use crate::{
    error::{PatchError, Result},
    store::{ResourceReader, ResourceStore, ResourceUpdate},
    table::StringTable,
};

// ── Resource identity ─────────────────────────────────────────────────────────

/// `RT_STRING`: the resource type of string tables.
const RT_STRING_ID: u16 = 6;

/// `MAKELANGID(LANG_ENGLISH, SUBLANG_ENGLISH_US)`: the language every observed
/// launcher tags its string tables with.
const LANG_EN_US: u16 = 0x0409;

/// `MAKEINTRESOURCEW`: integer resource ids travel through the name pointer.
fn make_int_resource(id: u16) -> PCWSTR {
    PCWSTR(id as usize as *const u16)
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current thread's last-error code.
///
/// Call immediately after a Win32 function that signals failure —
/// `GetLastError` reads thread-local state that can be overwritten by any
/// subsequent API call.
fn last_error_code() -> u32 {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    unsafe { GetLastError() }.0
}

/// Unwrap a windows-crate error to the bare Win32 code.  Win32 failures
/// surface as `0x8007xxxx` HRESULTs; classification and message lookup both
/// want the low word.
fn win32_code(e: &windows::core::Error) -> u32 {
    let hresult = e.code().0 as u32;
    if (hresult & 0xFFFF_0000) == 0x8007_0000 {
        hresult & 0xFFFF
    } else {
        hresult
    }
}

/// `FindResourceW` failure codes that mean "no such table", which the data
/// model defines as an empty table rather than an error.
fn table_absent(code: u32) -> bool {
    code == ERROR_RESOURCE_TYPE_NOT_FOUND.0
        || code == ERROR_RESOURCE_NAME_NOT_FOUND.0
        || code == ERROR_RESOURCE_LANG_NOT_FOUND.0
}

/// Convert a path to the null-terminated UTF-16 form the Win32 `W` APIs take.
fn wide_path(path: &Path) -> Result<U16CString> {
    U16CString::from_os_str(path.as_os_str()).map_err(|_| PatchError::Open {
        function: "U16CString::from_os_str",
        code: ERROR_INVALID_NAME.0,
    })
}

// ── PeFile ────────────────────────────────────────────────────────────────────

/// An on-disk executable whose string-table resources can be read and
/// replaced.  The file is only touched while a `LoadedModule` or an
/// `UpdateTransaction` is alive.
pub struct PeFile {
    path: PathBuf,
}

impl PeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceStore for PeFile {
    type Reader<'a> = LoadedModule<'a>
    where
        Self: 'a;
    type Update<'a> = UpdateTransaction<'a>
    where
        Self: 'a;

    fn open_read(&mut self) -> Result<LoadedModule<'_>> {
        let wide = wide_path(&self.path)?;
        // SAFETY: `wide` is a valid null-terminated UTF-16 string that outlives
        // the call.  AS_DATAFILE | AS_IMAGE_RESOURCE maps the file for resource
        // access only; no code from the target ever runs in this process.
        let module = unsafe {
            LoadLibraryExW(
                PCWSTR(wide.as_ptr()),
                HANDLE::default(),
                LOAD_LIBRARY_AS_DATAFILE | LOAD_LIBRARY_AS_IMAGE_RESOURCE,
            )
        }
        .map_err(|e| PatchError::Open {
            function: "LoadLibraryExW",
            code: win32_code(&e),
        })?;

        log::debug!("loaded {} for resource inspection", self.path.display());
        Ok(LoadedModule { module, _store: PhantomData })
    }

    fn begin_update(&mut self) -> Result<UpdateTransaction<'_>> {
        let wide = wide_path(&self.path)?;
        // SAFETY: `wide` is a valid null-terminated UTF-16 string that outlives
        // the call.  `false` keeps the target's existing resources; only the
        // tables submitted through `put_table` are replaced.
        let handle = unsafe { BeginUpdateResourceW(PCWSTR(wide.as_ptr()), false) }.map_err(|e| {
            PatchError::Open {
                function: "BeginUpdateResourceW",
                code: win32_code(&e),
            }
        })?;

        log::debug!("resource update transaction open on {}", self.path.display());
        Ok(UpdateTransaction { handle, committed: false, _store: PhantomData })
    }
}

// ── Read scope ────────────────────────────────────────────────────────────────

/// RAII handle to the target mapped as a data file.
/// `FreeLibrary` is called on `Drop`, before any write transaction can start.
pub struct LoadedModule<'a> {
    module: HMODULE,
    _store: PhantomData<&'a PeFile>,
}

impl ResourceReader for LoadedModule<'_> {
    fn table(&self, table: u16) -> Result<Option<StringTable>> {
        // SAFETY: `module` is a live handle owned by self; both ids are
        // MAKEINTRESOURCE integers and are never dereferenced.
        let info = unsafe {
            FindResourceW(
                self.module,
                make_int_resource(table),
                make_int_resource(RT_STRING_ID),
            )
        };
        if info.is_invalid() {
            let code = last_error_code();
            return if table_absent(code) {
                Ok(None)
            } else {
                Err(PatchError::Read { function: "FindResourceW", code })
            };
        }

        // SAFETY: `info` was just returned for `module`; LoadResource on a
        // datafile module yields a pointer into the mapping, valid until
        // FreeLibrary.
        let data = unsafe { LoadResource(self.module, info) }.map_err(|e| PatchError::Read {
            function: "LoadResource",
            code: win32_code(&e),
        })?;

        // SAFETY: same handles as above; SizeofResource reads directory
        // metadata only.
        let size = unsafe { SizeofResource(self.module, info) } as usize;
        if size == 0 {
            return Err(PatchError::Read {
                function: "SizeofResource",
                code: last_error_code(),
            });
        }

        // SAFETY: `data` is a valid resource handle for `module`.
        let ptr = unsafe { LockResource(data) } as *const u8;
        if ptr.is_null() {
            return Err(PatchError::Read {
                function: "LockResource",
                code: last_error_code(),
            });
        }

        // SAFETY: LockResource returned `size` readable bytes, valid while
        // `module` stays loaded, which `self` guarantees for this scope.
        let bytes = unsafe { std::slice::from_raw_parts(ptr, size) };
        if bytes.len() % 2 != 0 {
            return Err(PatchError::Read {
                function: "SizeofResource",
                code: ERROR_INVALID_DATA.0,
            });
        }

        // Copy out of the mapping; resource data is little-endian UTF-16 and
        // not guaranteed aligned for a &[u16] view.
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        match StringTable::decode(&units) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                log::warn!("string table {table} is malformed: {e}");
                Err(PatchError::Read {
                    function: "StringTable::decode",
                    code: ERROR_INVALID_DATA.0,
                })
            }
        }
    }
}

impl Drop for LoadedModule<'_> {
    fn drop(&mut self) {
        // SAFETY: `module` was returned by a successful LoadLibraryExW and has
        // not been freed; failure here leaves nothing actionable, so the
        // result is intentionally ignored.
        unsafe {
            let _ = FreeLibrary(self.module);
        }
    }
}

// ── Write scope ───────────────────────────────────────────────────────────────

/// RAII handle to an open resource-update transaction.
///
/// All `put_table` calls stage whole-table replacements; nothing reaches the
/// file until `commit`.  Dropping an uncommitted transaction discards every
/// staged change via the platform's discard flag.
pub struct UpdateTransaction<'a> {
    handle: HANDLE,
    committed: bool,
    _store: PhantomData<&'a PeFile>,
}

impl ResourceUpdate for UpdateTransaction<'_> {
    fn put_table(&mut self, table: u16, data: &StringTable) -> Result<()> {
        let buf = data.encode();
        let bytes = buf.len() * std::mem::size_of::<u16>();
        // SAFETY: `handle` is an open update transaction; `buf` outlives the
        // call and `bytes` is its exact size; the type and name arguments are
        // MAKEINTRESOURCE integers, never dereferenced.
        unsafe {
            UpdateResourceW(
                self.handle,
                make_int_resource(RT_STRING_ID),
                make_int_resource(table),
                LANG_EN_US,
                Some(buf.as_ptr().cast()),
                bytes as u32,
            )
        }
        .map_err(|e| PatchError::Update { table, code: win32_code(&e) })
    }

    fn commit(mut self) -> Result<()> {
        // The handle is consumed whether or not finalisation succeeds; Drop
        // must not discard it a second time.
        self.committed = true;
        // SAFETY: `handle` is an open update transaction owned by self;
        // `false` means commit, not discard.
        unsafe { EndUpdateResourceW(self.handle, false) }
            .map_err(|e| PatchError::Commit { code: win32_code(&e) })
    }
}

impl Drop for UpdateTransaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // SAFETY: `handle` is an open update transaction that was neither
        // committed nor discarded; `true` discards all staged updates.
        unsafe {
            let _ = EndUpdateResourceW(self.handle, true);
        }
    }
}
