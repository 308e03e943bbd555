//! Error types for imap-mailbox

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Email parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    /// The server refused to select the mailbox.
    #[error("Can not open mailbox '{0}'")]
    MailboxOpen(String),

    /// The server reported a warning while selecting the mailbox, even
    /// though the SELECT itself completed.
    #[error("Protocol warning while opening '{mailbox}': {warning}")]
    Warning { mailbox: String, warning: String },

    /// The mailbox was selected but its STATUS could not be read.
    #[error("Can not get mailbox status at '{0}'")]
    Status(String),

    #[error("Unknown mailbox '{0}'")]
    UnknownMailbox(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<async_imap::error::Error> for Error {
    fn from(e: async_imap::error::Error) -> Self {
        Self::Imap(e.to_string())
    }
}
