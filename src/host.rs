// ── Terminal host enumeration ─────────────────────────────────────────────────
//
// The launcher runs its interactive session under exactly one of two hosts:
// MinTTY (the bundled terminal emulator) or ConHost (the native Windows
// console).  All comparisons are case-insensitive; the canonical spelling is
// what gets written back into the executable.

use std::str::FromStr;

use widestring::U16Str;

/// The program hosting the launcher's interactive terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalHost {
    MinTty,
    ConHost,
}

impl TerminalHost {
    /// Canonical name, as stored in the active-host marker slot.
    pub fn name(self) -> &'static str {
        match self {
            Self::MinTty => "MinTTY",
            Self::ConHost => "ConHost",
        }
    }

    /// The opposite host.  The toggle has exactly these two states and one
    /// symmetric transition between them.
    pub fn other(self) -> Self {
        match self {
            Self::MinTty => Self::ConHost,
            Self::ConHost => Self::MinTty,
        }
    }

    /// Determine the active host from the marker slot of string table 2.
    ///
    /// An absent table or an empty slot means the executable has never been
    /// edited, which is implicitly MinTTY.  Text that names neither host is
    /// undeterminable and returns `None`.
    pub fn from_marker(marker: Option<&U16Str>) -> Option<Self> {
        match marker {
            None => Some(Self::MinTty),
            Some(text) if text.is_empty() => Some(Self::MinTty),
            Some(text) => text.to_string_lossy().parse().ok(),
        }
    }
}

impl std::fmt::Display for TerminalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names neither terminal host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHostError(pub String);

impl std::fmt::Display for UnknownHostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown terminal host {:?}: expected 'MinTTY' or 'ConHost'",
            self.0
        )
    }
}

impl std::error::Error for UnknownHostError {}

impl FromStr for TerminalHost {
    type Err = UnknownHostError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("MinTTY") {
            Ok(Self::MinTty)
        } else if s.eq_ignore_ascii_case("ConHost") {
            Ok(Self::ConHost)
        } else {
            Err(UnknownHostError(s.to_owned()))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use widestring::U16String;

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("MinTTY".parse(), Ok(TerminalHost::MinTty));
        assert_eq!("mintty".parse(), Ok(TerminalHost::MinTty));
        assert_eq!("MINTTY".parse(), Ok(TerminalHost::MinTty));
        assert_eq!("ConHost".parse(), Ok(TerminalHost::ConHost));
        assert_eq!("conhost".parse(), Ok(TerminalHost::ConHost));
    }

    #[test]
    fn unrecognised_names_are_rejected() {
        let err = "wezterm".parse::<TerminalHost>().unwrap_err();
        assert_eq!(err, UnknownHostError("wezterm".to_owned()));
        assert!(err.to_string().contains("wezterm"));
    }

    /// A never-edited executable has no marker; the host defaults to MinTTY.
    #[test]
    fn absent_marker_means_mintty() {
        assert_eq!(TerminalHost::from_marker(None), Some(TerminalHost::MinTty));
    }

    #[test]
    fn empty_marker_means_mintty() {
        let empty = U16String::new();
        assert_eq!(
            TerminalHost::from_marker(Some(&empty)),
            Some(TerminalHost::MinTty)
        );
    }

    #[test]
    fn marker_text_is_matched_case_insensitively() {
        let marker = U16String::from_str("CONHOST");
        assert_eq!(
            TerminalHost::from_marker(Some(&marker)),
            Some(TerminalHost::ConHost)
        );
    }

    #[test]
    fn garbage_marker_is_undeterminable() {
        let marker = U16String::from_str("cmd.exe");
        assert_eq!(TerminalHost::from_marker(Some(&marker)), None);
    }

    #[test]
    fn other_toggles_between_the_two_states() {
        assert_eq!(TerminalHost::MinTty.other(), TerminalHost::ConHost);
        assert_eq!(TerminalHost::ConHost.other(), TerminalHost::MinTty);
        assert_eq!(TerminalHost::MinTty.other().other(), TerminalHost::MinTty);
    }

    #[test]
    fn display_uses_the_canonical_spelling() {
        assert_eq!(TerminalHost::MinTty.to_string(), "MinTTY");
        assert_eq!(TerminalHost::ConHost.to_string(), "ConHost");
    }
}
