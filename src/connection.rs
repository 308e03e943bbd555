//! Shared IMAP connection
//!
//! One [`Connection`] owns one session. Cloning it hands out another
//! reference to the same session, so every [`Mailbox`] built from it
//! contends for the single "currently selected mailbox" slot that IMAP
//! allows per connection. That slot is tracked here and nowhere else.

use crate::descriptor::MailboxDescriptor;
use crate::error::{Error, Result};
use crate::mailbox::Mailbox;
use crate::transport::{Reopen, Transport};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// A cloneable handle to one IMAP session.
pub struct Connection<T> {
    link: Arc<Mutex<Link<T>>>,
}

impl<T> Clone for Connection<T> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

/// The session plus the connection-wide selection state, only reachable
/// through the connection's lock.
pub(crate) struct Link<T> {
    transport: T,
    selected: Option<String>,
}

impl<T: Transport> Link<T> {
    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(crate) fn set_selected(&mut self, path: Option<String>) {
        self.selected = path;
    }

    pub(crate) const fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The mailbox the session is in, after proving the session alive.
    pub(crate) async fn current_selection(&mut self) -> Result<Option<String>> {
        self.transport.check().await?;
        Ok(self.selected.clone())
    }

    /// SELECT `path`. The selection is only recorded when the server
    /// opened the mailbox without complaint; any other outcome leaves
    /// nothing selected so the next operation selects again.
    pub(crate) async fn reselect(&mut self, path: &str) -> Result<Reopen> {
        self.set_selected(None);
        let reopen = self.transport.select(path).await?;
        if reopen.is_clean() {
            self.set_selected(Some(path.to_string()));
        }
        Ok(reopen)
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an established (authenticated) session.
    pub fn new(transport: T) -> Self {
        Self {
            link: Arc::new(Mutex::new(Link {
                transport,
                selected: None,
            })),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Link<T>> {
        self.link.lock().await
    }

    /// The path of the mailbox currently selected on the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is no longer alive.
    pub async fn current_selection(&self) -> Result<Option<String>> {
        self.lock().await.current_selection().await
    }

    /// List every mailbox on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the LIST command fails.
    pub async fn mailboxes(&self) -> Result<Vec<Mailbox<T>>> {
        let descriptors = self.lock().await.transport().list().await?;
        debug!("Listed {} mailboxes", descriptors.len());
        Ok(descriptors
            .into_iter()
            .map(|d| Mailbox::new(d, self.clone()))
            .collect())
    }

    /// Look up one mailbox by its wire-format path. `INBOX` matches
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMailbox`] if the server does not list
    /// the path, or an error if the LIST command fails.
    pub async fn mailbox(&self, path: &str) -> Result<Mailbox<T>> {
        self.find(path)
            .await?
            .map(|d| Mailbox::new(d, self.clone()))
            .ok_or_else(|| Error::UnknownMailbox(path.to_string()))
    }

    /// # Errors
    ///
    /// Returns an error if the LIST command fails.
    pub async fn has_mailbox(&self, path: &str) -> Result<bool> {
        Ok(self.find(path).await?.is_some())
    }

    /// Create a mailbox and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns an error if CREATE fails or the new mailbox is not
    /// listed afterwards.
    pub async fn create_mailbox(&self, path: &str) -> Result<Mailbox<T>> {
        self.lock()
            .await
            .transport()
            .create(path)
            .await
            .map_err(|e| Error::Imap(format!("Failed to create {path}: {e}")))?;
        info!("Created mailbox {}", path);
        self.mailbox(path).await
    }

    /// Delete the mailbox on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELETE command fails.
    pub async fn delete_mailbox(&self, mailbox: &Mailbox<T>) -> Result<()> {
        let path = mailbox.path();
        let mut link = self.lock().await;
        link.transport()
            .delete(path)
            .await
            .map_err(|e| Error::Imap(format!("Failed to delete {path}: {e}")))?;
        if link.selected() == Some(path) {
            link.set_selected(None);
        }
        info!("Deleted mailbox {}", path);
        Ok(())
    }

    /// Log out and drop the session.
    ///
    /// Other clones of this connection keep the session object alive but
    /// every further command on it fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the LOGOUT command fails.
    pub async fn logout(self) -> Result<()> {
        let mut link = self.lock().await;
        link.set_selected(None);
        link.transport().logout().await
    }

    async fn find(&self, path: &str) -> Result<Option<MailboxDescriptor>> {
        let descriptors = self.lock().await.transport().list().await?;
        Ok(descriptors.into_iter().find(|d| same_path(d.path(), path)))
    }
}

fn same_path(listed: &str, wanted: &str) -> bool {
    if listed.eq_ignore_ascii_case("inbox") {
        wanted.eq_ignore_ascii_case("inbox")
    } else {
        listed == wanted
    }
}
