//! Messages and message iteration
//!
//! A [`Message`] is a UID bound to the mailbox it came from. Its data
//! is fetched either when the message is constructed
//! ([`LoadMode::Eager`]) or on the first call to
//! [`Message::ensure_loaded`] ([`LoadMode::Lazy`]). Loading goes through
//! the mailbox, so the connection is switched back to the right mailbox
//! first when needed.

use crate::error::{Error, Result};
use crate::flag::Flag;
use crate::mailbox::Mailbox;
use crate::transport::{Transport, Uid};
use email_parser::{Email, parse_email};
use std::fmt;

/// When a message's data is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Fetch while constructing the message.
    #[default]
    Eager,
    /// Fetch on first access.
    Lazy,
}

/// Data returned by `UID FETCH (UID FLAGS RFC822.SIZE BODY.PEEK[])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    pub uid: Uid,
    pub flags: Vec<Flag>,
    pub size: Option<u32>,
    pub body: Vec<u8>,
}

/// One message in a [`Mailbox`].
pub struct Message<'m, T> {
    mailbox: &'m Mailbox<T>,
    uid: Uid,
    data: Option<FetchedMessage>,
}

impl<T> fmt::Debug for Message<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("mailbox", &self.mailbox.path())
            .field("uid", &self.uid)
            .field("loaded", &self.data.is_some())
            .finish()
    }
}

impl<'m, T: Transport> Message<'m, T> {
    pub(crate) const fn new(mailbox: &'m Mailbox<T>, uid: Uid, data: Option<FetchedMessage>) -> Self {
        Self { mailbox, uid, data }
    }

    #[must_use]
    pub const fn uid(&self) -> Uid {
        self.uid
    }

    #[must_use]
    pub const fn mailbox(&self) -> &'m Mailbox<T> {
        self.mailbox
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// The fetched data, if already loaded.
    #[must_use]
    pub const fn loaded(&self) -> Option<&FetchedMessage> {
        self.data.as_ref()
    }

    /// Fetch the message unless it is already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected, the FETCH
    /// fails, or the server no longer has the UID.
    pub async fn ensure_loaded(&mut self) -> Result<&FetchedMessage> {
        let data = match self.data.take() {
            Some(data) => data,
            None => self.mailbox.fetch(self.uid).await?,
        };
        Ok(self.data.insert(data))
    }

    /// The complete RFC 822 message.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_loaded`].
    pub async fn raw(&mut self) -> Result<&[u8]> {
        Ok(&self.ensure_loaded().await?.body)
    }

    /// # Errors
    ///
    /// See [`Self::ensure_loaded`].
    pub async fn flags(&mut self) -> Result<&[Flag]> {
        Ok(&self.ensure_loaded().await?.flags)
    }

    /// Parse the message body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the body is not a parseable message,
    /// or any error from [`Self::ensure_loaded`].
    pub async fn email(&mut self) -> Result<Email> {
        let uid = self.uid;
        let data = self.ensure_loaded().await?;
        parse_email(uid, &data.body).map_err(|e| Error::Parse(e.to_string()))
    }
}

/// Walks a list of UIDs produced by one search, yielding lazy
/// [`Message`]s in the order the server returned them.
///
/// The UID list is a snapshot: messages expunged by another client
/// after the search are not detected and fail when loaded. Run the
/// search again for a fresh list.
pub struct MessageIterator<'m, T> {
    mailbox: &'m Mailbox<T>,
    uids: std::vec::IntoIter<Uid>,
}

impl<'m, T> MessageIterator<'m, T> {
    pub(crate) fn new(mailbox: &'m Mailbox<T>, uids: Vec<Uid>) -> Self {
        Self {
            mailbox,
            uids: uids.into_iter(),
        }
    }

    /// UIDs not yet yielded.
    #[must_use]
    pub fn uids(&self) -> &[Uid] {
        self.uids.as_slice()
    }
}

impl<'m, T: Transport> Iterator for MessageIterator<'m, T> {
    type Item = Message<'m, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.uids
            .next()
            .map(|uid| Message::new(self.mailbox, uid, None))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.uids.size_hint()
    }
}

impl<T: Transport> DoubleEndedIterator for MessageIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.uids
            .next_back()
            .map(|uid| Message::new(self.mailbox, uid, None))
    }
}

impl<T: Transport> ExactSizeIterator for MessageIterator<'_, T> {}

impl<T> fmt::Debug for MessageIterator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageIterator")
            .field("mailbox", &self.mailbox.path())
            .field("remaining", &self.uids.as_slice())
            .finish()
    }
}
