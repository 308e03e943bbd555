//! Mailbox STATUS data

use serde::Serialize;

/// Status items reported by the server for one mailbox.
///
/// Absent items are `None`; a mailbox that cannot be selected reports
/// an empty status (every item `None`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MailboxStatus {
    pub messages: Option<u32>,
    pub recent: Option<u32>,
    pub unseen: Option<u32>,
    pub uid_next: Option<u32>,
    pub uid_validity: Option<u32>,
}

impl MailboxStatus {
    /// STATUS data items requested from the server.
    pub const ITEMS: &'static str = "(MESSAGES RECENT UIDNEXT UIDVALIDITY UNSEEN)";

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_none()
            && self.recent.is_none()
            && self.unseen.is_none()
            && self.uid_next.is_none()
            && self.uid_validity.is_none()
    }

    /// The reported items as `(name, value)` pairs, in STATUS order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, u32)> {
        [
            ("messages", self.messages),
            ("recent", self.recent),
            ("unseen", self.unseen),
            ("uidnext", self.uid_next),
            ("uidvalidity", self.uid_validity),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}
