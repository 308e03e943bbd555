//! IMAP mailbox handles over one shared connection
//!
//! A [`Connection`] wraps a single authenticated IMAP session. Any
//! number of [`Mailbox`] handles can be taken from it; each operation
//! on a handle first makes sure the session has that mailbox selected,
//! issuing a SELECT only when another handle moved the session
//! elsewhere. Server warnings raised while selecting surface as
//! [`Error::Warning`] instead of being silently dropped.
//!
//! Message bodies parse into [`Email`] structs from the
//! [`email_parser`] crate.
//!
//! ```no_run
//! use imap_mailbox::{Condition, Connection, ImapConfig, SearchExpression};
//!
//! # async fn run() -> imap_mailbox::Result<()> {
//! let connection = Connection::connect(&ImapConfig::from_env()?).await?;
//! let inbox = connection.mailbox("INBOX").await?;
//! let unseen = SearchExpression::new().and(Condition::Unseen);
//! for mut message in inbox.messages(Some(&unseen)).await? {
//!     let email = message.email().await?;
//!     println!("{} {}", email.uid, email.subject.original);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod descriptor;
mod error;
mod flag;
mod imap;
mod mailbox;
mod message;
mod search;
mod status;
mod transport;

pub use config::ImapConfig;
pub use connection::Connection;
pub use descriptor::{Attribute, MailboxDescriptor};
pub use email_parser::Email;
pub use error::{Error, Result};
pub use flag::Flag;
pub use imap::{ImapSession, ImapTransport};
pub use mailbox::Mailbox;
pub use message::{FetchedMessage, LoadMode, Message, MessageIterator};
pub use search::{Condition, SearchExpression, SortKey};
pub use status::MailboxStatus;
pub use transport::{Reopen, Transport, Uid};
