//! Raw protocol operations
//!
//! [`Transport`] is the narrow set of IMAP commands a mailbox needs.
//! It knows nothing about which mailbox "should" be selected; that
//! bookkeeping lives in [`crate::Connection`]. [`crate::ImapTransport`]
//! implements it over async-imap.

use crate::descriptor::MailboxDescriptor;
use crate::error::Result;
use crate::message::FetchedMessage;
use crate::search::SortKey;
use crate::status::MailboxStatus;
use std::future::Future;

/// IMAP unique identifier of a message within one mailbox.
pub type Uid = u32;

/// Outcome of a SELECT.
///
/// A server can complete SELECT and still report a problem through an
/// untagged `NO`/`BAD` in the same exchange; `warning` carries the last
/// such text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reopen {
    pub opened: bool,
    pub warning: Option<String>,
}

impl Reopen {
    #[must_use]
    pub const fn opened() -> Self {
        Self {
            opened: true,
            warning: None,
        }
    }

    #[must_use]
    pub const fn refused() -> Self {
        Self {
            opened: false,
            warning: None,
        }
    }

    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Whether the mailbox can be trusted as the selected context.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.opened && self.warning.is_none()
    }
}

/// The raw protocol handle one [`crate::Connection`] drives.
///
/// Every method is one command round-trip. Server-level rejections that
/// callers must be able to distinguish are part of the return value
/// (`Reopen::opened`, `append` returning `false`); `Err` is reserved for
/// transport failures and rejections of commands that cannot partially
/// succeed.
pub trait Transport: Send {
    /// Round-trip that proves the session is alive (NOOP).
    fn check(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// SELECT `path`.
    fn select(&mut self, path: &str) -> impl Future<Output = Result<Reopen>> + Send;

    /// Number of messages in the selected mailbox.
    fn message_count(&mut self) -> impl Future<Output = Result<u32>> + Send;

    /// STATUS of `path`; `None` when the server returned no data.
    fn status(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<Option<MailboxStatus>>> + Send;

    /// UID SEARCH in the selected mailbox. No match is an empty list.
    fn uid_search(&mut self, query: &str) -> impl Future<Output = Result<Vec<Uid>>> + Send;

    /// UID SORT in the selected mailbox, in server order.
    fn uid_sort(
        &mut self,
        key: SortKey,
        reverse: bool,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Uid>>> + Send;

    /// UID FETCH of one message's flags, size and full body.
    fn uid_fetch(
        &mut self,
        uid: Uid,
    ) -> impl Future<Output = Result<Option<FetchedMessage>>> + Send;

    /// EXPUNGE the selected mailbox; returns the number of removed
    /// messages.
    fn expunge(&mut self) -> impl Future<Output = Result<u32>> + Send;

    /// APPEND `raw` to `path`; `false` when the server rejected it.
    fn append(&mut self, path: &str, raw: &[u8]) -> impl Future<Output = Result<bool>> + Send;

    fn create(&mut self, path: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete(&mut self, path: &str) -> impl Future<Output = Result<()>> + Send;

    /// LIST every mailbox.
    fn list(&mut self) -> impl Future<Output = Result<Vec<MailboxDescriptor>>> + Send;

    fn logout(&mut self) -> impl Future<Output = Result<()>> + Send;
}
