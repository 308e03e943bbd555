//! IMAP mailbox ("folder") handles
//!
//! A [`Mailbox`] pairs a [`MailboxDescriptor`] with a clone of the
//! shared [`Connection`]. Every operation that needs a mailbox context
//! first makes sure the connection is selected onto this mailbox,
//! re-selecting when another mailbox (or nothing) is selected, and only
//! then issues its own command. Both steps run under one lock on the
//! connection.

use crate::connection::{Connection, Link};
use crate::descriptor::{Attribute, MailboxDescriptor};
use crate::error::{Error, Result};
use crate::message::{FetchedMessage, LoadMode, Message, MessageIterator};
use crate::search::{SearchExpression, SortKey};
use crate::status::MailboxStatus;
use crate::transport::{Transport, Uid};
use std::fmt;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

/// An IMAP mailbox on a shared [`Connection`].
pub struct Mailbox<T> {
    descriptor: MailboxDescriptor,
    connection: Connection<T>,
}

impl<T> Mailbox<T> {
    pub(crate) const fn new(descriptor: MailboxDescriptor, connection: Connection<T>) -> Self {
        Self {
            descriptor,
            connection,
        }
    }

    /// Full wire-format name.
    #[must_use]
    pub fn path(&self) -> &str {
        self.descriptor.path()
    }

    /// Last hierarchy component of the path, still in modified UTF-7.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// [`Self::name`] as readable text.
    #[must_use]
    pub fn decoded_name(&self) -> String {
        self.descriptor.decoded_name()
    }

    #[must_use]
    pub fn delimiter(&self) -> Option<&str> {
        self.descriptor.delimiter()
    }

    #[must_use]
    pub const fn descriptor(&self) -> &MailboxDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    /// LIST attributes, always in the order noinferiors, noselect,
    /// marked, unmarked.
    #[must_use]
    pub fn attributes(&self) -> Vec<Attribute> {
        self.descriptor.attributes()
    }

    #[must_use]
    pub fn attribute_names(&self) -> Vec<&'static str> {
        self.attributes().into_iter().map(Attribute::as_str).collect()
    }

    #[must_use]
    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.descriptor.has_attribute(attribute)
    }
}

impl<T: Transport> Mailbox<T> {
    /// Number of messages in the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected or the count
    /// cannot be read.
    pub async fn count(&self) -> Result<u32> {
        let mut link = self.selected().await?;
        link.transport().message_count().await
    }

    /// Server-reported status items.
    ///
    /// `\Noselect` mailboxes cannot be selected, so they report an empty
    /// status without touching the connection.
    ///
    /// # Errors
    ///
    /// Returns a selection error, or [`Error::Status`] if the server
    /// returned no status for the selected mailbox.
    pub async fn status(&self) -> Result<MailboxStatus> {
        if self.has_attribute(Attribute::NoSelect) {
            debug!("Not querying status of unselectable mailbox {}", self.path());
            return Ok(MailboxStatus::default());
        }

        let mut link = self.selected().await?;
        match link.transport().status(self.path()).await {
            Ok(Some(status)) => Ok(status),
            Ok(None) => Err(Error::Status(self.path().to_string())),
            Err(e) => {
                warn!("STATUS of {} failed: {}", self.path(), e);
                Err(Error::Status(self.path().to_string()))
            }
        }
    }

    /// Messages matching `search` (everything when `None`), in ascending
    /// UID order.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected or the search
    /// fails. No match is an empty iterator, not an error.
    pub async fn messages(&self, search: Option<&SearchExpression>) -> Result<MessageIterator<'_, T>> {
        let query = SearchExpression::query(search);
        let uids = {
            let mut link = self.selected().await?;
            link.transport().uid_search(&query).await?
        };
        debug!("Found {} messages matching '{}' in {}", uids.len(), query, self.path());
        Ok(MessageIterator::new(self, uids))
    }

    /// UIDs of messages matching `search`, ordered by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected or the sort
    /// fails. No match is an empty list.
    pub async fn message_numbers(
        &self,
        search: Option<&SearchExpression>,
        key: SortKey,
        reverse: bool,
    ) -> Result<Vec<Uid>> {
        let query = SearchExpression::query(search);
        let mut link = self.selected().await?;
        link.transport().uid_sort(key, reverse, &query).await
    }

    /// The message with UID `uid`. With [`LoadMode::Eager`] its data is
    /// fetched before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected, or (eager
    /// only) if the message cannot be fetched.
    pub async fn message(&self, uid: Uid, mode: LoadMode) -> Result<Message<'_, T>> {
        let mut link = self.selected().await?;
        let data = match mode {
            LoadMode::Eager => Some(self.fetch_selected(&mut link, uid).await?),
            LoadMode::Lazy => None,
        };
        Ok(Message::new(self, uid, data))
    }

    /// Every message in the mailbox; same as `messages(None)`.
    ///
    /// # Errors
    ///
    /// See [`Self::messages`].
    pub async fn iter(&self) -> Result<MessageIterator<'_, T>> {
        self.messages(None).await
    }

    /// Permanently remove every message flagged `\Deleted`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected or EXPUNGE
    /// fails.
    pub async fn expunge(&self) -> Result<&Self> {
        let removed = {
            let mut link = self.selected().await?;
            link.transport().expunge().await?
        };
        info!("Expunged {} messages from {}", removed, self.path());
        Ok(self)
    }

    /// Append a raw RFC 822 message. Returns whether the server accepted
    /// it; the message is not validated locally.
    ///
    /// # Errors
    ///
    /// Returns an error only if the mailbox cannot be selected or the
    /// connection fails; a server rejection is `Ok(false)`.
    pub async fn add_message(&self, raw: &[u8]) -> Result<bool> {
        let mut link = self.selected().await?;
        let accepted = link.transport().append(self.path(), raw).await?;
        if !accepted {
            warn!("Server rejected message appended to {}", self.path());
        }
        Ok(accepted)
    }

    /// Delete the mailbox on the server. The handle is consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELETE command fails.
    pub async fn delete(self) -> Result<()> {
        self.connection.delete_mailbox(&self).await
    }

    pub(crate) async fn fetch(&self, uid: Uid) -> Result<FetchedMessage> {
        let mut link = self.selected().await?;
        self.fetch_selected(&mut link, uid).await
    }

    async fn fetch_selected(&self, link: &mut Link<T>, uid: Uid) -> Result<FetchedMessage> {
        link.transport()
            .uid_fetch(uid)
            .await?
            .ok_or_else(|| Error::Imap(format!("No message with UID {uid} in {}", self.path())))
    }

    /// Lock the connection with this mailbox selected.
    async fn selected(&self) -> Result<MutexGuard<'_, Link<T>>> {
        let mut link = self.connection.lock().await;
        self.ensure_selected(&mut link).await?;
        Ok(link)
    }

    async fn ensure_selected(&self, link: &mut Link<T>) -> Result<()> {
        let path = self.path();
        match link.current_selection().await {
            Ok(Some(current)) if current == path => return Ok(()),
            Ok(current) => debug!("Selecting {} (connection is in {:?})", path, current),
            Err(e) => debug!("Selection check failed ({}), reopening {}", e, path),
        }

        let reopen = link.reselect(path).await?;
        if !reopen.opened {
            warn!("Server refused to open {}", path);
            return Err(Error::MailboxOpen(path.to_string()));
        }
        // Some servers answer OK and report the failure out of band
        // (e.g. Gmail's `[NONEXISTENT]` for namespace nodes).
        if let Some(warning) = reopen.warning {
            warn!("Opening {} reported: {}", path, warning);
            return Err(Error::Warning {
                mailbox: path.to_string(),
                warning,
            });
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
