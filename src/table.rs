// ── String-table codec ────────────────────────────────────────────────────────
//
// A PE string table is a group of exactly 16 string slots stored as
// length-prefixed UTF-16: one 16-bit length cell per slot, followed by that
// many code units of text, no terminator.  An empty slot is a lone zero cell.
// The platform replaces string tables only in their entirety, so any change
// to one slot means re-encoding all 16.

use widestring::{U16Str, U16String};

/// Number of string slots in every string table.
pub const SLOT_COUNT: usize = 16;

/// Errors produced while building or parsing a string-table buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Slot index outside `0..16`.
    SlotOutOfRange(usize),
    /// Text longer than a 16-bit length cell can record.
    TextTooLong(usize),
    /// The wire buffer ended inside a slot.
    Truncated,
    /// Non-zero data after the sixteenth slot.
    TrailingData,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotOutOfRange(slot) => {
                write!(f, "slot {slot} is out of range (tables hold {SLOT_COUNT} slots)")
            }
            Self::TextTooLong(len) => write!(
                f,
                "{len} code units do not fit a 16-bit length cell (max {})",
                u16::MAX
            ),
            Self::Truncated => write!(f, "string-table buffer ends inside a slot"),
            Self::TrailingData => write!(f, "string-table buffer has data after the last slot"),
        }
    }
}

impl std::error::Error for TableError {}

/// An in-memory string table: 16 owned UTF-16 strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    slots: [U16String; SLOT_COUNT],
}

impl StringTable {
    /// A table with all 16 slots empty.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| U16String::new()),
        }
    }

    /// The text in `slot`.  Empty slots read as the empty string.
    ///
    /// Panics if `slot` is 16 or more; callers index with the fixed layout
    /// constants in `patcher`.
    pub fn slot(&self, slot: usize) -> &U16Str {
        &self.slots[slot]
    }

    /// Replace the text in `slot`.
    pub fn set(&mut self, slot: usize, text: &U16Str) -> std::result::Result<(), TableError> {
        if slot >= SLOT_COUNT {
            return Err(TableError::SlotOutOfRange(slot));
        }
        if text.len() > usize::from(u16::MAX) {
            return Err(TableError::TextTooLong(text.len()));
        }
        self.slots[slot] = text.to_ustring();
        Ok(())
    }

    /// Size of the encoded table in `u16` units: one length cell per slot
    /// plus the text itself.
    pub fn encoded_len(&self) -> usize {
        self.slots.iter().map(|s| s.len()).sum::<usize>() + SLOT_COUNT
    }

    /// Encode into the wire form described in the module header.
    /// The returned buffer holds exactly `encoded_len()` units.
    pub fn encode(&self) -> Vec<u16> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        for slot in &self.slots {
            // Lengths were bounds-checked in `set`; the cast is lossless.
            buf.push(slot.len() as u16);
            buf.extend_from_slice(slot.as_slice());
        }
        buf
    }

    /// Parse a wire buffer back into a table.
    ///
    /// Trailing zero cells are tolerated (resource compilers pad table data
    /// to 32-bit boundaries); anything else after slot 15 is an error.
    pub fn decode(data: &[u16]) -> std::result::Result<Self, TableError> {
        let mut table = Self::new();
        let mut pos = 0usize;
        for slot in table.slots.iter_mut() {
            let len = usize::from(*data.get(pos).ok_or(TableError::Truncated)?);
            pos += 1;
            let text = data.get(pos..pos + len).ok_or(TableError::Truncated)?;
            pos += len;
            *slot = U16String::from_vec(text.to_vec());
        }
        if data[pos..].iter().any(|&unit| unit != 0) {
            return Err(TableError::TrailingData);
        }
        Ok(table)
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
