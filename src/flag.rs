//! IMAP message flags
//!
//! Standard system flags have dedicated variants; arbitrary keyword
//! flags use the `Keyword` variant.

use async_imap::types::Flag as WireFlag;
use std::fmt;

/// An IMAP message flag as reported by FETCH.
///
/// # Examples
///
/// ```
/// use imap_mailbox::Flag;
///
/// assert_eq!(Flag::parse("\\seen"), Flag::Seen);
/// assert_eq!(Flag::parse("$Important").as_imap_str(), "$Important");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read (`\Seen`).
    Seen,
    /// Message has been answered (`\Answered`).
    Answered,
    /// Message is flagged for attention (`\Flagged`).
    Flagged,
    /// Message is marked for deletion (`\Deleted`), removed on expunge.
    Deleted,
    /// Message is a draft (`\Draft`).
    Draft,
    /// Message arrived since the last session (`\Recent`).
    Recent,
    /// A user-defined keyword flag (no `\` prefix).
    Keyword(String),
}

impl Flag {
    /// Parse a flag from its wire form. System flag names are matched
    /// case-insensitively; anything else becomes a keyword.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let Some(system) = s.strip_prefix('\\') else {
            return Self::Keyword(s.to_string());
        };
        match system.to_ascii_lowercase().as_str() {
            "seen" => Self::Seen,
            "answered" => Self::Answered,
            "flagged" => Self::Flagged,
            "deleted" => Self::Deleted,
            "draft" => Self::Draft,
            "recent" => Self::Recent,
            _ => Self::Keyword(s.to_string()),
        }
    }

    /// Convert a flag from an async-imap FETCH response. `\*` (may
    /// create) only appears in PERMANENTFLAGS and has no message-level
    /// meaning.
    #[must_use]
    pub fn from_wire(flag: &WireFlag<'_>) -> Option<Self> {
        match flag {
            WireFlag::Seen => Some(Self::Seen),
            WireFlag::Answered => Some(Self::Answered),
            WireFlag::Flagged => Some(Self::Flagged),
            WireFlag::Deleted => Some(Self::Deleted),
            WireFlag::Draft => Some(Self::Draft),
            WireFlag::Recent => Some(Self::Recent),
            WireFlag::Custom(kw) => Some(Self::parse(kw)),
            _ => None,
        }
    }

    /// The IMAP wire representation of this flag.
    #[must_use]
    pub fn as_imap_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Keyword(kw) => kw,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_imap_str())
    }
}
