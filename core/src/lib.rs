//! One-shot HTTP(S) fetch core.
//!
//! # Overview
//! Validates an `https` target URI, builds a single `GET` request, executes it through
//! a `Transport`, and hands back the raw response. Redirects are returned as
//! ordinary responses and never followed.
//!
//! # Design
//! - `FetchClient` is stateless apart from the validated URI.
//! - `Transport` is the I/O seam; `UreqTransport` is the blocking, rustls-backed
//!   implementation used by the CLI. It trusts the bundled webpki roots unless
//!   given an explicit set from `load_root_certs`.
//! - `FetchError` classifies failures; `ErrorKind` folds them into network,
//!   TLS, and invalid-input categories.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use client::FetchClient;
pub use error::{ErrorKind, FetchError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{load_root_certs, load_root_certs_file, Transport, UreqTransport};
