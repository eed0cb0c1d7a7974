//! Network execution of an `HttpRequest`.
//!
//! # Design
//! `Transport` is the single seam between request construction and I/O, so
//! `FetchClient` can be exercised without a network. `UreqTransport` is the
//! blocking implementation: one call, one connection, the whole body read
//! into memory. TLS is rustls with bundled webpki roots, so the binary
//! carries every cipher suite it can negotiate. `with_root_certs` swaps the
//! bundled roots for an explicit set, such as a private CA.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use ureq::tls::{parse_pem, Certificate, PemItem, RootCerts, TlsConfig};
use ureq::Agent;

use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a request and returns the response or a classified failure.
///
/// Implementations must not follow redirects and must report every HTTP
/// status as `Ok`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_roots(RootCerts::WebPki)
    }

    /// Trust only `certs` instead of the bundled webpki roots.
    pub fn with_root_certs(certs: Vec<Certificate<'static>>) -> Self {
        Self::with_roots(RootCerts::Specific(Arc::new(certs)))
    }

    fn with_roots(roots: RootCerts) -> Self {
        let tls = TlsConfig::builder().root_certs(roots).build();
        // 4xx/5xx come back as data, 3xx is returned instead of followed.
        let agent = Agent::config_builder()
            .tls_config(tls)
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect the certificates from PEM input; keys and other items are skipped.
pub fn load_root_certs(pem: &[u8]) -> Result<Vec<Certificate<'static>>, FetchError> {
    let mut certs = Vec::new();
    for item in parse_pem(pem) {
        if let PemItem::Certificate(cert) = item.map_err(|e| FetchError::Certificate(e.to_string()))? {
            certs.push(cert.to_owned());
        }
    }
    if certs.is_empty() {
        return Err(FetchError::Certificate("no certificate found in PEM input".to_string()));
    }
    Ok(certs)
}

pub fn load_root_certs_file(path: &Path) -> Result<Vec<Certificate<'static>>, FetchError> {
    let pem = std::fs::read(path)
        .map_err(|e| FetchError::Certificate(format!("{}: {e}", path.display())))?;
    load_root_certs(&pem)
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(request.uri.as_str()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Map a ureq failure onto the fetch error taxonomy.
fn classify(err: ureq::Error) -> FetchError {
    let msg = err.to_string();
    let classified = match err {
        ureq::Error::HostNotFound => FetchError::Resolve(msg),
        ureq::Error::ConnectionFailed => FetchError::Connect(msg),
        ureq::Error::Timeout(_) => FetchError::Timeout(msg),
        ureq::Error::Rustls(_) | ureq::Error::Tls(_) => FetchError::Tls(msg),
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => FetchError::InvalidUri(msg),
        ureq::Error::Io(ref io) => classify_io(io, msg),
        _ => FetchError::Transport(msg),
    };
    debug!(error = %classified, "request failed");
    classified
}

fn classify_io(err: &io::Error, msg: String) -> FetchError {
    // rustls reports handshake failures through the stream as InvalidData.
    if err.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
        return FetchError::Tls(msg);
    }
    match err.kind() {
        io::ErrorKind::TimedOut => FetchError::Timeout(msg),
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable => FetchError::Connect(msg),
        _ if is_lookup_failure(err, &msg) => FetchError::Resolve(msg),
        _ => FetchError::Transport(msg),
    }
}

/// WSAHOST_NOT_FOUND, WSATRY_AGAIN, WSANO_DATA.
const WINDOWS_LOOKUP_ERRORS: [i32; 3] = [11001, 11002, 11004];

/// Name lookup failures carry no stable `ErrorKind`. On Unix std wraps the
/// getaddrinfo error in a "failed to lookup address information" message; on
/// Windows it surfaces the raw WSA code.
fn is_lookup_failure(err: &io::Error, msg: &str) -> bool {
    if msg.contains("failed to lookup address") || msg.contains("No such host is known") {
        return true;
    }
    cfg!(windows) && err.raw_os_error().is_some_and(|code| WINDOWS_LOOKUP_ERRORS.contains(&code))
}
