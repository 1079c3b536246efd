// Legacy sentence protocol session
//
// Wraps a TCP (or TLS) stream with sentence framing, login, and reply
// parsing. One session per gateway call: the caller connects, runs its
// commands, and must close the session on every exit path -- devices cap
// concurrent API sessions, so leaked sessions lock out later calls.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::Error;
use crate::legacy::proto;
use crate::transport::TransportConfig;

/// Port on which the device expects the sentence protocol over TLS.
pub const LEGACY_TLS_PORT: u16 = 8729;

/// One record from a `!re` reply sentence: attribute key to value.
pub type Record = HashMap<String, String>;

#[derive(Debug)]
enum SessionStream {
    Plain(TcpStream),
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

/// An authenticated legacy API session.
///
/// Created by [`LegacySession::connect`], which performs the TCP/TLS
/// handshake and the `/login` exchange. The session is single-purpose:
/// it is not shared across calls and must be released with
/// [`close`](Self::close) when the call finishes.
#[derive(Debug)]
pub struct LegacySession {
    stream: SessionStream,
    peer: String,
    timeout: std::time::Duration,
}

impl LegacySession {
    /// Connect to a device and authenticate.
    ///
    /// Port [`LEGACY_TLS_PORT`] selects TLS (certificate validation
    /// disabled, TLS 1.2 minimum); any other port speaks plaintext.
    /// The connect, handshake, and login each run under the configured
    /// timeout.
    pub async fn connect(
        host: &str,
        port: u16,
        user: &str,
        password: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let peer = format!("{host}:{port}");
        debug!("connecting legacy session to {peer}");

        let tcp = timeout(transport.timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: transport.timeout.as_secs(),
            })??;

        let stream = if port == LEGACY_TLS_PORT {
            let config = transport.build_tls_config()?;
            let server_name = rustls::pki_types::ServerName::try_from(host.to_owned())
                .map_err(|e| Error::Tls(format!("invalid server name {host:?}: {e}")))?;
            let connector = tokio_rustls::TlsConnector::from(config);
            let tls = timeout(transport.timeout, connector.connect(server_name, tcp))
                .await
                .map_err(|_| Error::Timeout {
                    timeout_secs: transport.timeout.as_secs(),
                })?
                .map_err(|e| Error::Tls(format!("handshake with {peer} failed: {e}")))?;
            SessionStream::Tls(Box::new(tls))
        } else {
            SessionStream::Plain(tcp)
        };

        let mut session = Self {
            stream,
            peer,
            timeout: transport.timeout,
        };
        session.login(user, password).await?;
        Ok(session)
    }

    /// Post-6.43 plain login: `/login` with `=name=` / `=password=`.
    async fn login(&mut self, user: &str, password: &SecretString) -> Result<(), Error> {
        let words = vec![
            "/login".to_owned(),
            format!("=name={user}"),
            format!("=password={}", password.expose_secret()),
        ];
        self.send(&words).await?;

        match self.collect_reply().await {
            Ok(records) => {
                // A `=ret=` attribute means the device fell back to the
                // pre-6.43 challenge handshake, which this client does
                // not speak.
                if records.iter().any(|r| r.contains_key("ret")) {
                    return Err(Error::Authentication {
                        message: "device requires challenge-based login (RouterOS < 6.43)".into(),
                    });
                }
                debug!("legacy session to {} authenticated", self.peer);
                Ok(())
            }
            Err(Error::Trap { message, .. }) => Err(Error::Authentication { message }),
            Err(e) => Err(e),
        }
    }

    /// Execute a command sentence and return its `!re` records in
    /// device-reported order. All traps propagate, including the
    /// empty-result trap -- use [`read`](Self::read) for lookups.
    pub async fn talk(
        &mut self,
        command: &str,
        attributes: &[(String, String)],
        queries: &[(String, String)],
    ) -> Result<Vec<Record>, Error> {
        let mut words = Vec::with_capacity(1 + attributes.len() + queries.len());
        words.push(command.to_owned());
        for (key, value) in attributes {
            words.push(format!("={key}={value}"));
        }
        for (key, value) in queries {
            words.push(format!("?{key}={value}"));
        }

        debug!("legacy {} -> {}", self.peer, command);
        self.send(&words).await?;
        self.collect_reply().await
    }

    /// Safe command executor for reads.
    ///
    /// The device signals "no matching records" as a trap; a REST call
    /// for the same lookup returns an empty array. Translating that trap
    /// into `Ok(vec![])` keeps both protocol paths equivalent for
    /// callers. Every other error propagates unchanged.
    pub async fn read(
        &mut self,
        command: &str,
        queries: &[(String, String)],
    ) -> Result<Vec<Record>, Error> {
        match self.talk(command, &[], queries).await {
            Ok(records) => Ok(records),
            Err(e) if e.is_empty_result() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Shut the session down. Always call this, on success and failure
    /// paths alike.
    pub async fn close(mut self) {
        debug!("closing legacy session to {}", self.peer);
        let result = match &mut self.stream {
            SessionStream::Plain(s) => s.shutdown().await,
            SessionStream::Tls(s) => s.shutdown().await,
        };
        if let Err(e) = result {
            debug!("shutdown of {} returned {e}", self.peer);
        }
    }

    // ── Reply parsing ────────────────────────────────────────────────

    /// Read reply sentences until `!done`, accumulating `!re` records.
    ///
    /// A `!trap` aborts the command but not the session: the device still
    /// sends `!done`, so the trap is held until the terminator arrives
    /// and the stream is back in sync.
    async fn collect_reply(&mut self) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();
        let mut trap: Option<Error> = None;

        loop {
            let sentence = self.recv().await?;
            let Some(reply) = sentence.first() else {
                return Err(Error::Frame("empty reply sentence".into()));
            };

            match reply.as_str() {
                "!re" => records.push(parse_attributes(&sentence[1..])),
                "!done" => {
                    // `!done` may carry attributes too (e.g. `=ret=`).
                    if sentence.len() > 1 {
                        records.push(parse_attributes(&sentence[1..]));
                    }
                    return match trap {
                        Some(err) => Err(err),
                        None => Ok(records),
                    };
                }
                "!trap" => {
                    let attrs = parse_attributes(&sentence[1..]);
                    trap = Some(Error::Trap {
                        category: attrs.get("category").cloned(),
                        message: attrs
                            .get("message")
                            .cloned()
                            .unwrap_or_else(|| "unspecified trap".into()),
                    });
                }
                "!fatal" => {
                    return Err(Error::Fatal {
                        message: sentence.get(1).cloned().unwrap_or_default(),
                    });
                }
                other => {
                    return Err(Error::Frame(format!("unexpected reply word {other:?}")));
                }
            }
        }
    }

    async fn send(&mut self, words: &[String]) -> Result<(), Error> {
        match &mut self.stream {
            SessionStream::Plain(s) => proto::write_sentence(s, words).await,
            SessionStream::Tls(s) => proto::write_sentence(s, words).await,
        }
    }

    async fn recv(&mut self) -> Result<Vec<String>, Error> {
        let read = async {
            match &mut self.stream {
                SessionStream::Plain(s) => proto::read_sentence(s).await,
                SessionStream::Tls(s) => proto::read_sentence(s).await,
            }
        };
        timeout(self.timeout, read).await.map_err(|_| Error::Timeout {
            timeout_secs: self.timeout.as_secs(),
        })?
    }
}

/// Parse `=key=value` attribute words into a record.
///
/// Keys keep their wire form (`.id` stays `.id`); malformed words are
/// skipped rather than failing the whole sentence.
fn parse_attributes(words: &[String]) -> Record {
    let mut record = Record::new();
    for word in words {
        let Some(rest) = word.strip_prefix('=') else {
            continue;
        };
        if let Some((key, value)) = rest.split_once('=') {
            record.insert(key.to_owned(), value.to_owned());
        }
    }
    record
}
