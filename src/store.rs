// ── Resource storage seam ─────────────────────────────────────────────────────
//
// The patcher never touches the Win32 resource API directly; it drives one of
// these traits.  Two acquisition scopes exist and they must not overlap: a
// loaded-module handle for reading and an update transaction for writing may
// not be open on the same file at the same time.  Both scopes borrow the
// store mutably, so holding a `Reader` while calling `begin_update` is a
// compile error rather than a documented caveat.

use crate::{error::Result, table::StringTable};

/// A container of string-table resources, addressed by table id.
pub trait ResourceStore {
    type Reader<'a>: ResourceReader
    where
        Self: 'a;
    type Update<'a>: ResourceUpdate
    where
        Self: 'a;

    /// Acquire read access to the current resources.
    /// Released when the returned reader is dropped.
    fn open_read(&mut self) -> Result<Self::Reader<'_>>;

    /// Begin an update transaction.  Staged replacements become visible only
    /// after `commit`; dropping the transaction discards them all.
    fn begin_update(&mut self) -> Result<Self::Update<'_>>;
}

/// Read scope over a store's current resources.
pub trait ResourceReader {
    /// The whole string table `table`, or `None` if the executable carries
    /// no table with that id.
    fn table(&self, table: u16) -> Result<Option<StringTable>>;
}

/// Write scope: an all-or-nothing sequence of whole-table replacements.
pub trait ResourceUpdate {
    /// Stage `data` as the entire new content of string table `table`.
    /// Partial-slot updates do not exist at this level.
    fn put_table(&mut self, table: u16, data: &StringTable) -> Result<()>;

    /// Write every staged replacement back to the store.
    fn commit(self) -> Result<()>;
}

// ── In-memory store (test double) ─────────────────────────────────────────────


// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::{memory::MemoryStore, ResourceReader, ResourceStore, ResourceUpdate};
    use crate::table::StringTable;
    use widestring::U16String;

    fn table_with(slot: usize, text: &str) -> StringTable {
        let mut t = StringTable::new();
        t.set(slot, &U16String::from_str(text)).unwrap();
        t
    }

    #[test]
    fn reader_sees_the_current_tables() {
        let mut store = MemoryStore::new();
        store.set_table(1, table_with(0, "cmd"));
        let reader = store.open_read().unwrap();
        let read = reader.table(1).unwrap().unwrap();
        assert_eq!(read.slot(0).to_string_lossy(), "cmd");
        assert!(reader.table(2).unwrap().is_none());
    }

    #[test]
    fn staged_tables_are_invisible_until_commit() {
        let mut store = MemoryStore::new();
        {
            let mut update = store.begin_update().unwrap();
            update.put_table(1, &table_with(0, "new")).unwrap();
            // Not committed; goes out of scope here.
        }
        assert!(store.table(1).is_none(), "dropped transaction must discard");

        let mut update = store.begin_update().unwrap();
        update.put_table(1, &table_with(0, "new")).unwrap();
        update.commit().unwrap();
        assert_eq!(store.table(1).unwrap().slot(0).to_string_lossy(), "new");
    }

    #[test]
    fn commit_applies_all_staged_tables_together() {
        let mut store = MemoryStore::new();
        let mut update = store.begin_update().unwrap();
        update.put_table(1, &table_with(0, "a")).unwrap();
        update.put_table(2, &table_with(1, "b")).unwrap();
        update.commit().unwrap();
        assert!(store.table(1).is_some());
        assert!(store.table(2).is_some());
        assert_eq!(store.updates_begun, 1);
    }
}
