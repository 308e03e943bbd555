//! async-imap backed transport
//!
//! Opens a TLS-wrapped IMAP session (implicit TLS or STARTTLS), logs in
//! and maps the [`Transport`] operations onto async-imap commands.
//! Untagged responses the server sends alongside a command arrive on
//! the session's unsolicited channel; they are drained after every
//! command to keep the message count current.
//!
//! SELECT and UID SORT are read response by response instead: async-imap
//! gives up on SELECT at the first untagged `NO`, and has no SORT
//! command at all. [`Reply`] collects the untagged data until the
//! tagged completion arrives.

use crate::config::ImapConfig;
use crate::connection::Connection;
use crate::descriptor::{Attribute, MailboxDescriptor};
use crate::error::{Error, Result};
use crate::flag::Flag;
use crate::message::FetchedMessage;
use crate::search::{SortKey, quote};
use crate::status::MailboxStatus;
use crate::transport::{Reopen, Transport, Uid};
use async_imap::Session;
use async_imap::error::Error as ImapError;
use async_imap::imap_proto::{MailboxDatum, RequestId, Response, Status};
use async_imap::types::{NameAttribute, UnsolicitedResponse};
use enumflags2::BitFlags;
use futures::StreamExt;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info, warn};

/// A TLS-wrapped IMAP session.
pub type ImapSession = Session<Compat<tokio_rustls::client::TlsStream<TcpStream>>>;

const FETCH_ITEMS: &str = "(UID FLAGS RFC822.SIZE BODY.PEEK[])";

/// [`Transport`] over an authenticated async-imap session.
pub struct ImapTransport {
    session: ImapSession,
    /// Message count of the selected mailbox, from SELECT and later
    /// EXISTS / EXPUNGE responses.
    exists: u32,
}

impl ImapTransport {
    #[must_use]
    pub const fn new(session: ImapSession) -> Self {
        Self { session, exists: 0 }
    }

    /// Open a fresh TLS-wrapped IMAP session and log in.
    ///
    /// With `config.starttls` the plain connection is upgraded via
    /// STARTTLS, otherwise TLS starts immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connection, TLS negotiation or LOGIN
    /// fails.
    pub async fn connect(config: &ImapConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        debug!("Connecting to IMAP server at {}", addr);

        let tcp_stream = TcpStream::connect(&addr).await?;

        let tcp_stream = if config.starttls {
            let mut client = async_imap::Client::new(tcp_stream.compat());
            client
                .run_command_and_check_ok("STARTTLS", None)
                .await
                .map_err(|e| Error::Tls(format!("STARTTLS failed: {e}")))?;
            client.into_inner().into_inner()
        } else {
            tcp_stream
        };

        let connector = tls_connector(config.accept_invalid_certs)?;
        let server_name = ServerName::try_from(config.host.clone())
            .map_err(|e| Error::Tls(format!("Invalid server name: {e}")))?;
        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| Error::Tls(e.to_string()))?;

        let tls_client = async_imap::Client::new(tls_stream.compat());
        let session = tls_client
            .login(&config.username, &config.password)
            .await
            .map_err(|(e, _)| Error::Imap(format!("Login failed: {e}")))?;

        info!("Connected to IMAP server");
        Ok(Self::new(session))
    }

    /// Apply pending untagged responses. Returns the text of the last
    /// untagged `NO`/`BAD`, if any.
    fn drain_unsolicited(&mut self) -> Option<String> {
        let mut warning = None;
        while let Ok(response) = self.session.unsolicited_responses.try_recv() {
            match response {
                UnsolicitedResponse::Exists(n) => self.exists = n,
                UnsolicitedResponse::Expunge(_) => self.exists = self.exists.saturating_sub(1),
                UnsolicitedResponse::Other(ref data) => {
                    if let Response::Data {
                        status: Status::No | Status::Bad,
                        information,
                        ..
                    } = data.parsed()
                    {
                        warning = Some(information.as_deref().unwrap_or("no details").to_string());
                    } else {
                        debug!("Ignoring unsolicited response {:?}", data.parsed());
                    }
                }
                other => debug!("Ignoring unsolicited response {:?}", other),
            }
        }
        warning
    }

    /// Send `command` and read its responses up to the tagged completion.
    async fn exchange(&mut self, command: &str) -> Result<(Reply, Completion)> {
        debug!("Sending {}", command);
        let tag = self.session.run_command(command).await?;
        let mut reply = Reply::default();
        loop {
            let Some(response) = self.session.read_response().await? else {
                return Err(Error::Imap(format!("Connection lost waiting for {command}")));
            };
            if let Some(done) = reply.absorb(response.parsed(), &tag) {
                return Ok((reply, done));
            }
        }
    }
}

/// Tagged completion of a command.
#[derive(Debug, PartialEq, Eq)]
struct Completion {
    ok: bool,
    text: String,
}

/// Untagged data seen before a command's tagged completion.
#[derive(Debug, Default, PartialEq, Eq)]
struct Reply {
    exists: Option<u32>,
    /// EXPUNGEs since the last EXISTS.
    expunged: u32,
    /// Last untagged `NO`/`BAD`.
    warning: Option<String>,
    sorted: Vec<Uid>,
}

impl Reply {
    /// Take in one response. Returns the completion once the tagged
    /// response for `tag` arrives.
    fn absorb(&mut self, response: &Response<'_>, tag: &RequestId) -> Option<Completion> {
        match response {
            Response::Done {
                tag: done,
                status,
                information,
                ..
            } if done == tag => {
                return Some(Completion {
                    ok: matches!(status, Status::Ok),
                    text: information.as_deref().unwrap_or_default().to_string(),
                });
            }
            Response::MailboxData(MailboxDatum::Exists(n)) => {
                self.exists = Some(*n);
                self.expunged = 0;
            }
            Response::MailboxData(MailboxDatum::Sort(uids)) => self.sorted.extend(uids),
            Response::Expunge(_) => self.expunged += 1,
            Response::Data {
                status: Status::No | Status::Bad,
                information,
                ..
            } => {
                self.warning = Some(information.as_deref().unwrap_or("no details").to_string());
            }
            other => debug!("Ignoring response {:?}", other),
        }
        None
    }

    /// Message count after this reply, starting from `before`.
    fn count_after(&self, before: u32) -> u32 {
        self.exists.unwrap_or(before).saturating_sub(self.expunged)
    }
}

impl Connection<ImapTransport> {
    /// Connect, log in and wrap the session in a shared connection.
    ///
    /// # Errors
    ///
    /// See [`ImapTransport::connect`].
    pub async fn connect(config: &ImapConfig) -> Result<Self> {
        Ok(Self::new(ImapTransport::connect(config).await?))
    }
}

impl Transport for ImapTransport {
    async fn check(&mut self) -> Result<()> {
        self.session.noop().await?;
        self.drain_unsolicited();
        Ok(())
    }

    async fn select(&mut self, path: &str) -> Result<Reopen> {
        if let Some(stale) = self.drain_unsolicited() {
            debug!("Discarding earlier server warning: {}", stale);
        }

        let (reply, done) = self.exchange(&format!("SELECT {}", quote(path))).await?;
        if !done.ok {
            debug!("SELECT {} refused: {}", path, done.text);
            self.exists = 0;
            return Ok(Reopen::refused());
        }

        self.exists = reply.count_after(0);
        Ok(match reply.warning {
            Some(warning) => Reopen::opened().with_warning(warning),
            None => Reopen::opened(),
        })
    }

    async fn message_count(&mut self) -> Result<u32> {
        self.drain_unsolicited();
        Ok(self.exists)
    }

    async fn status(&mut self, path: &str) -> Result<Option<MailboxStatus>> {
        let mailbox = self.session.status(path, MailboxStatus::ITEMS).await?;
        Ok(Some(MailboxStatus {
            messages: Some(mailbox.exists),
            recent: Some(mailbox.recent),
            unseen: mailbox.unseen,
            uid_next: mailbox.uid_next,
            uid_validity: mailbox.uid_validity,
        }))
    }

    async fn uid_search(&mut self, query: &str) -> Result<Vec<Uid>> {
        let uids = self
            .session
            .uid_search(query)
            .await
            .map_err(|e| Error::Imap(format!("Search failed: {e}")))?;
        // SEARCH results arrive as a set; ascending UID order is the
        // order servers report them in.
        let mut uids: Vec<Uid> = uids.into_iter().collect();
        uids.sort_unstable();
        Ok(uids)
    }

    async fn uid_sort(&mut self, key: SortKey, reverse: bool, query: &str) -> Result<Vec<Uid>> {
        let command = format!("UID SORT {} UTF-8 {query}", key.criteria(reverse));
        let (reply, done) = self.exchange(&command).await?;
        self.exists = reply.count_after(self.exists);
        if !done.ok {
            return Err(Error::Imap(format!("Sort failed: {}", done.text)));
        }
        Ok(reply.sorted)
    }

    async fn uid_fetch(&mut self, uid: Uid) -> Result<Option<FetchedMessage>> {
        let fetches = self
            .session
            .uid_fetch(uid.to_string(), FETCH_ITEMS)
            .await
            .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?
            .collect::<Vec<_>>()
            .await;

        for fetch in fetches {
            let fetch = fetch.map_err(|e| Error::Imap(format!("Fetch error: {e}")))?;
            // Other FETCH responses can be interleaved (flag updates).
            if fetch.uid != Some(uid) {
                continue;
            }
            let Some(body) = fetch.body() else {
                continue;
            };
            return Ok(Some(FetchedMessage {
                uid,
                flags: fetch.flags().filter_map(|f| Flag::from_wire(&f)).collect(),
                size: fetch.size,
                body: body.to_vec(),
            }));
        }
        Ok(None)
    }

    async fn expunge(&mut self) -> Result<u32> {
        let removed = self
            .session
            .expunge()
            .await?
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let removed = u32::try_from(removed.len()).unwrap_or(u32::MAX);
        self.exists = self.exists.saturating_sub(removed);
        Ok(removed)
    }

    async fn append(&mut self, path: &str, raw: &[u8]) -> Result<bool> {
        match self.session.append(path, None, None, raw).await {
            Ok(()) => Ok(true),
            Err(ImapError::No(text) | ImapError::Bad(text)) => {
                debug!("APPEND to {} rejected: {}", path, text);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&mut self, path: &str) -> Result<()> {
        self.session.create(path).await?;
        Ok(())
    }

    async fn delete(&mut self, path: &str) -> Result<()> {
        self.session.delete(path).await?;
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<MailboxDescriptor>> {
        let names = self
            .session
            .list(Some(""), Some("*"))
            .await
            .map_err(|e| Error::Imap(format!("List folders failed: {e}")))?
            .collect::<Vec<_>>()
            .await;

        let mut descriptors = Vec::with_capacity(names.len());
        for item in names {
            match item {
                Ok(name) => descriptors.push(MailboxDescriptor::new(
                    name.name(),
                    name.delimiter().map(ToString::to_string),
                    attribute_mask(name.attributes()),
                )),
                Err(e) => warn!("Skipping unparseable LIST entry: {}", e),
            }
        }
        Ok(descriptors)
    }

    async fn logout(&mut self) -> Result<()> {
        self.session.logout().await?;
        Ok(())
    }
}

fn attribute_mask(attributes: &[NameAttribute<'_>]) -> BitFlags<Attribute> {
    attributes
        .iter()
        .filter_map(|attribute| match attribute {
            NameAttribute::NoInferiors => Some(Attribute::NoInferiors),
            NameAttribute::NoSelect => Some(Attribute::NoSelect),
            NameAttribute::Marked => Some(Attribute::Marked),
            NameAttribute::Unmarked => Some(Attribute::Unmarked),
            // RFC 5258: \NonExistent implies \Noselect.
            NameAttribute::Extension(ext) if ext.eq_ignore_ascii_case("\\NonExistent") => {
                Some(Attribute::NoSelect)
            }
            _ => None,
        })
        .collect()
}

fn tls_connector(accept_invalid_certs: bool) -> Result<TlsConnector> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = rustls::ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(e.to_string()))?;

    let config = if accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert { provider }))
            .with_no_client_auth()
    } else {
        let roots = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots).with_no_client_auth()
    };
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Accepts any server certificate (local bridges with self-signed
/// certificates). Handshake signatures are still checked.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: Arc<CryptoProvider>,
}

impl rustls::client::danger::ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
