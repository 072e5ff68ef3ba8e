// ── Resource patcher ──────────────────────────────────────────────────────────
//
// The launcher's resource contract, fixed by every prior edit:
//   string table 1, slot 0: command line of the *active* terminal host
//   string table 1, slot 1: command line of the inactive host
//   string table 2, slot 1: name of the active host ("MinTTY" / "ConHost");
//                           slot 0 unused, table absent until the first edit
//
// Toggling swaps the two command lines and rewrites the marker.  Both tables
// are staged inside one transaction and committed together: a failure at any
// point discards the whole transaction, so the executable never ends up with
// the command lines swapped but the marker stale.

use widestring::{U16Str, U16String};

use crate::{
    error::{PatchError, Result},
    host::TerminalHost,
    store::{ResourceReader, ResourceStore, ResourceUpdate},
    table::StringTable,
};

/// String table holding the two candidate launch command lines.
pub const COMMAND_TABLE: u16 = 1;
/// String table holding the active-host marker.
pub const HOST_TABLE: u16 = 2;

/// Slot of the active host's command line in `COMMAND_TABLE`.
pub const ACTIVE_SLOT: usize = 0;
/// Slot of the inactive host's command line in `COMMAND_TABLE`.
pub const INACTIVE_SLOT: usize = 1;
/// Slot of the marker text in `HOST_TABLE`.
pub const MARKER_SLOT: usize = 1;

/// Replace the launcher's command line.
///
/// Builds a table whose slot 0 holds `command_line` and whose remaining 15
/// slots are empty, then submits it as the entire content of string table 1.
/// Destructive by contract: whatever else table 1 held is erased.
pub fn write_command_line<S: ResourceStore>(store: &mut S, command_line: &U16Str) -> Result<()> {
    let mut table = StringTable::new();
    table
        .set(ACTIVE_SLOT, command_line)
        .map_err(|e| {
            log::debug!("command line rejected: {e}");
            PatchError::Allocation
        })?;

    log::debug!(
        "writing command table ({} code units in slot {ACTIVE_SLOT})",
        command_line.len()
    );
    let mut update = store.begin_update()?;
    update.put_table(COMMAND_TABLE, &table)?;
    update.commit()
}

/// Make `requested` the launcher's active terminal host.
///
/// Requesting the host that is already active is a no-op; otherwise the two
/// command lines swap slots and the marker records the new host.
pub fn set_active_terminal_host<S: ResourceStore>(
    store: &mut S,
    requested: TerminalHost,
) -> Result<()> {
    // Read scope: determine the current host and capture both command lines,
    // then release the handle before any write transaction begins.
    let (current, commands) = {
        let reader = store.open_read()?;
        let current = read_active_host(&reader)?;
        if current == requested {
            log::info!("{current} is already the active terminal host");
            return Ok(());
        }
        (current, reader.table(COMMAND_TABLE)?)
    };

    let commands = commands.unwrap_or_else(|| {
        log::warn!("string table {COMMAND_TABLE} is absent; treating both command slots as empty");
        StringTable::new()
    });
    if commands.slot(ACTIVE_SLOT).is_empty() {
        log::warn!("slot {ACTIVE_SLOT} of string table {COMMAND_TABLE} is empty; the active-command layout may not hold");
    }

    let mut swapped = StringTable::new();
    swapped
        .set(ACTIVE_SLOT, commands.slot(INACTIVE_SLOT))
        .map_err(PatchError::Swap)?;
    swapped
        .set(INACTIVE_SLOT, commands.slot(ACTIVE_SLOT))
        .map_err(PatchError::Swap)?;

    let mut marker = StringTable::new();
    marker
        .set(MARKER_SLOT, &U16String::from_str(requested.name()))
        .map_err(PatchError::Swap)?;

    log::info!("switching terminal host: {current} -> {requested}");

    // Write scope: both tables staged, one commit.  A rejected update drops
    // the transaction here and nothing reaches the file.
    let mut update = store.begin_update()?;
    update.put_table(COMMAND_TABLE, &swapped)?;
    update.put_table(HOST_TABLE, &marker)?;
    update.commit()
}

/// Apply the determination rule to string table 2.
fn read_active_host<R: ResourceReader>(reader: &R) -> Result<TerminalHost> {
    let table = reader.table(HOST_TABLE)?;
    let marker = table.as_ref().map(|t| t.slot(MARKER_SLOT));
    TerminalHost::from_marker(marker).ok_or_else(|| {
        // The marker slot holds text, but not the name of a host.
        let text = marker.map(|m| m.to_string_lossy()).unwrap_or_default();
        PatchError::UnknownHost(text)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::memory::MemoryStore, table::SLOT_COUNT};

    fn wide(s: &str) -> U16String {
        U16String::from_str(s)
    }

    /// A store shaped like a real launcher: `cmd0`/`cmd1` in table 1 and,
    /// optionally, a marker naming the active host in table 2.
    fn launcher(cmd0: &str, cmd1: &str, marker: Option<&str>) -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut commands = StringTable::new();
        commands.set(ACTIVE_SLOT, &wide(cmd0)).unwrap();
        commands.set(INACTIVE_SLOT, &wide(cmd1)).unwrap();
        store.set_table(COMMAND_TABLE, commands);
        if let Some(text) = marker {
            let mut host = StringTable::new();
            host.set(MARKER_SLOT, &wide(text)).unwrap();
            store.set_table(HOST_TABLE, host);
        }
        store
    }

    fn slot_text(store: &MemoryStore, table: u16, slot: usize) -> String {
        store.table(table).unwrap().slot(slot).to_string_lossy()
    }

    // ── write_command_line ────────────────────────────────────────────────────

    #[test]
    fn write_command_line_fills_slot_zero_and_erases_the_rest() {
        let mut store = MemoryStore::new();
        let mut old = StringTable::new();
        old.set(5, &wide("leftover")).unwrap();
        store.set_table(COMMAND_TABLE, old);

        write_command_line(&mut store, &wide("sh.exe --login -i")).unwrap();

        let table = store.table(COMMAND_TABLE).unwrap();
        assert_eq!(table.slot(ACTIVE_SLOT).to_string_lossy(), "sh.exe --login -i");
        for slot in 1..SLOT_COUNT {
            assert!(table.slot(slot).is_empty(), "slot {slot} must be erased");
        }
    }

    #[test]
    fn write_command_line_reports_oversized_text_as_allocation() {
        let mut store = MemoryStore::new();
        let oversized = U16String::from_vec(vec![0x61u16; usize::from(u16::MAX) + 1]);
        let err = write_command_line(&mut store, &oversized).unwrap_err();
        assert_eq!(err.result_code(), 1);
        assert!(store.table(COMMAND_TABLE).is_none());
    }

    // ── Determination rule ────────────────────────────────────────────────────

    /// A virgin executable (no table 2) is MinTTY no matter what table 1 holds,
    /// so requesting MinTTY must not touch the file at all.
    #[test]
    fn fresh_target_defaults_to_mintty() {
        let mut store = launcher("mintty.exe", "conhost cmd", None);
        let before = store.snapshot();

        set_active_terminal_host(&mut store, TerminalHost::MinTty).unwrap();

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.updates_begun, 0, "no transaction may be opened");
    }

    #[test]
    fn idempotent_request_leaves_resources_byte_identical() {
        let mut store = launcher("conhost cmd", "mintty cmd", Some("ConHost"));
        let before = store.snapshot();

        set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap();

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.updates_begun, 0);
    }

    #[test]
    fn marker_comparison_is_case_insensitive() {
        // Marker spelled oddly by an earlier tool; still recognised, still a no-op.
        let mut store = launcher("a", "b", Some("CONHOST"));
        set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap();
        assert_eq!(store.updates_begun, 0);
    }

    // ── Toggling ──────────────────────────────────────────────────────────────

    #[test]
    fn toggle_swaps_command_slots_and_records_the_marker() {
        let mut store = launcher("cmdA", "cmdB", None);

        set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap();

        assert_eq!(slot_text(&store, COMMAND_TABLE, ACTIVE_SLOT), "cmdB");
        assert_eq!(slot_text(&store, COMMAND_TABLE, INACTIVE_SLOT), "cmdA");
        assert_eq!(slot_text(&store, HOST_TABLE, MARKER_SLOT), "ConHost");
        // Slots 2..15 of both tables stay empty, slot 0 of the marker table too.
        let commands = store.table(COMMAND_TABLE).unwrap();
        let host = store.table(HOST_TABLE).unwrap();
        for slot in 2..SLOT_COUNT {
            assert!(commands.slot(slot).is_empty());
            assert!(host.slot(slot).is_empty());
        }
        assert!(host.slot(0).is_empty());
        assert_eq!(store.updates_begun, 1);
    }

    #[test]
    fn round_trip_restores_the_original_tables() {
        let mut store = launcher("mintty cmd", "conhost cmd", Some("MinTTY"));
        let before = store.snapshot();

        set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap();
        assert_ne!(store.snapshot(), before);
        set_active_terminal_host(&mut store, TerminalHost::MinTty).unwrap();

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn unknown_marker_text_is_a_read_failure() {
        let mut store = launcher("a", "b", Some("wezterm"));
        let err = set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap_err();
        assert!(matches!(err, PatchError::UnknownHost(ref text) if text == "wezterm"));
        assert_eq!(store.updates_begun, 0);
    }

    // ── Failure propagation ───────────────────────────────────────────────────

    #[test]
    fn begin_failure_surfaces_as_open_and_changes_nothing() {
        let mut store = launcher("a", "b", None);
        store.fail_begin = true;
        let before = store.snapshot();

        let err = set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap_err();
        assert!(matches!(err, PatchError::Open { .. }));
        assert_eq!(store.snapshot(), before);
    }

    /// The marker write is rejected after the command table was staged; the
    /// whole transaction must be discarded, never half-committed.
    #[test]
    fn marker_update_failure_discards_the_command_swap() {
        let mut store = launcher("cmdA", "cmdB", None);
        store.fail_update = Some(HOST_TABLE);
        let before = store.snapshot();

        let err = set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap_err();
        assert!(matches!(err, PatchError::Update { table: HOST_TABLE, .. }));
        assert_eq!(store.snapshot(), before, "table 1 must not be committed alone");
    }

    #[test]
    fn commit_failure_leaves_the_target_untouched() {
        let mut store = launcher("cmdA", "cmdB", None);
        store.fail_commit = true;
        let before = store.snapshot();

        let err = set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap_err();
        assert!(matches!(err, PatchError::Commit { .. }));
        assert_eq!(store.snapshot(), before);
    }

    // ── End to end ────────────────────────────────────────────────────────────

    /// Fresh target, `"cmdA"`/`"cmdB"`, request ConHost, check every table.
    #[test]
    fn end_to_end_scenario() {
        let mut store = launcher("cmdA", "cmdB", None);

        set_active_terminal_host(&mut store, TerminalHost::ConHost).unwrap();

        let commands = store.table(COMMAND_TABLE).unwrap();
        assert_eq!(commands.slot(0).to_string_lossy(), "cmdB");
        assert_eq!(commands.slot(1).to_string_lossy(), "cmdA");
        // Buffer sizing: both command lines plus one length cell per slot.
        assert_eq!(commands.encode().len(), 4 + 4 + SLOT_COUNT);
        assert_eq!(slot_text(&store, HOST_TABLE, MARKER_SLOT), "ConHost");

        // And back again.
        set_active_terminal_host(&mut store, TerminalHost::MinTty).unwrap();
        assert_eq!(slot_text(&store, COMMAND_TABLE, 0), "cmdA");
        assert_eq!(slot_text(&store, COMMAND_TABLE, 1), "cmdB");
        assert_eq!(slot_text(&store, HOST_TABLE, MARKER_SLOT), "MinTTY");
    }
}
