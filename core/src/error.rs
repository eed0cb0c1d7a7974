//! Error types for a single fetch.
//!
//! # Design
//! Each variant names one failure class and carries the underlying message.
//! `kind()` folds them into the coarse categories callers act on: network
//! failures, TLS failures, and input that never reached the network. None of
//! them is retried.

use std::fmt;

/// Coarse failure category, used by the CLI to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Resolution, connection, timeout, or transport failure.
    Network,
    /// TLS negotiation or certificate failure.
    Tls,
    /// The target or the trust configuration was rejected before any I/O.
    InvalidInput,
}

/// Errors returned by `FetchClient` and `Transport` implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The target is not an absolute `https` URI (or `http`, where allowed) with a host.
    InvalidUri(String),

    /// A trusted root certificate could not be loaded.
    Certificate(String),

    /// The host name could not be resolved.
    Resolve(String),

    /// The TCP connection was refused, reset, or could not be opened.
    Connect(String),

    /// The network stack gave up waiting.
    Timeout(String),

    /// The TLS handshake failed: no shared cipher suite or protocol version,
    /// an untrusted certificate, or a peer that does not speak TLS.
    Tls(String),

    /// Any other failure while sending the request or reading the response.
    Transport(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUri(_) | FetchError::Certificate(_) => ErrorKind::InvalidInput,
            FetchError::Tls(_) => ErrorKind::Tls,
            FetchError::Resolve(_)
            | FetchError::Connect(_)
            | FetchError::Timeout(_)
            | FetchError::Transport(_) => ErrorKind::Network,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUri(msg) => write!(f, "invalid URI: {msg}"),
            FetchError::Certificate(msg) => write!(f, "invalid root certificate: {msg}"),
            FetchError::Resolve(msg) => write!(f, "could not resolve host: {msg}"),
            FetchError::Connect(msg) => write!(f, "connection failed: {msg}"),
            FetchError::Timeout(msg) => write!(f, "request timed out: {msg}"),
            FetchError::Tls(msg) => write!(f, "TLS handshake failed: {msg}"),
            FetchError::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}
