//! Mailbox descriptors
//!
//! A descriptor is what LIST tells us about a mailbox: its full wire
//! name, the hierarchy delimiter and the `\Noinferiors`, `\Noselect`,
//! `\Marked` and `\Unmarked` attributes packed into a bitmask.

use enumflags2::{BitFlags, bitflags};
use std::fmt;

/// A LIST attribute this crate gives meaning to.
///
/// Declaration order is the order in which attributes are reported.
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// No child mailboxes can exist below this one.
    NoInferiors,
    /// The mailbox is a namespace node and cannot be selected.
    NoSelect,
    /// The server marked the mailbox as interesting.
    Marked,
    /// The mailbox has no new messages since the last select.
    Unmarked,
}

impl Attribute {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoInferiors => "noinferiors",
            Self::NoSelect => "noselect",
            Self::Marked => "marked",
            Self::Unmarked => "unmarked",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one mailbox as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxDescriptor {
    path: String,
    delimiter: Option<String>,
    attributes: BitFlags<Attribute>,
}

impl MailboxDescriptor {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        delimiter: Option<String>,
        attributes: BitFlags<Attribute>,
    ) -> Self {
        Self {
            path: path.into(),
            delimiter: delimiter.filter(|d| !d.is_empty()),
            attributes,
        }
    }

    /// The full wire-format name, used verbatim in SELECT, STATUS and
    /// APPEND.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    #[must_use]
    pub const fn attribute_mask(&self) -> BitFlags<Attribute> {
        self.attributes
    }

    /// Set attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> Vec<Attribute> {
        self.attributes.iter().collect()
    }

    #[must_use]
    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.attributes.contains(attribute)
    }

    /// The last hierarchy component of the path, still in modified
    /// UTF-7.
    ///
    /// A leading `{server}` reference prefix is dropped first. Without
    /// a delimiter (or when the path holds none) the whole remaining
    /// path is the name.
    #[must_use]
    pub fn name(&self) -> &str {
        let local = strip_server_prefix(&self.path);
        match self.delimiter.as_deref() {
            Some(delim) => local.rsplit(delim).next().unwrap_or(local),
            None => local,
        }
    }

    /// [`Self::name`] decoded from modified UTF-7 (RFC 3501 5.1.3).
    #[must_use]
    pub fn decoded_name(&self) -> String {
        utf7_imap::decode_utf7_imap(self.name().to_string())
    }
}

/// `{imap.example.org:993/imap/ssl}INBOX` -> `INBOX`
fn strip_server_prefix(path: &str) -> &str {
    if path.starts_with('{') {
        path.find('}').map_or(path, |end| &path[end + 1..])
    } else {
        path
    }
}
