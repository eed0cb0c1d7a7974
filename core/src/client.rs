//! Request construction and dispatch for a single fetch.
//!
//! # Design
//! `FetchClient` holds only the validated target URI and carries no state
//! between calls. `build_request` produces the one `HttpRequest`; `fetch`
//! hands it to a `Transport` exactly once and returns the outcome untouched.
//! Every HTTP status is a successful outcome, redirects included.

use tracing::debug;
use ureq::http::Uri;

use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Client bound to one absolute `https` URI, or `http` when explicitly allowed.
#[derive(Debug, Clone)]
pub struct FetchClient {
    uri: String,
}

impl FetchClient {
    pub fn new(uri: &str) -> Result<Self, FetchError> {
        Self::parse(uri, false)
    }

    /// Like `new`, but also accepts plain `http` targets.
    pub fn allowing_http(uri: &str) -> Result<Self, FetchError> {
        Self::parse(uri, true)
    }

    fn parse(uri: &str, allow_http: bool) -> Result<Self, FetchError> {
        let uri = uri.trim();
        let parsed: Uri = uri
            .parse()
            .map_err(|e| FetchError::InvalidUri(format!("{uri}: {e}")))?;

        match parsed.scheme_str() {
            Some("https") => {}
            Some("http") if allow_http => {}
            Some("http") => {
                return Err(FetchError::InvalidUri(format!(
                    "{uri}: plain http is not enabled"
                )))
            }
            Some(other) => {
                return Err(FetchError::InvalidUri(format!(
                    "{uri}: unsupported scheme `{other}`"
                )))
            }
            None => return Err(FetchError::InvalidUri(format!("{uri}: not an absolute URI"))),
        }
        if parsed.host().is_none_or(str::is_empty) {
            return Err(FetchError::InvalidUri(format!("{uri}: missing host")));
        }

        Ok(Self {
            uri: uri.to_string(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn build_request(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            uri: self.uri.clone(),
            headers: Vec::new(),
        }
    }

    /// Send the request through `transport` and return its response.
    pub fn fetch(&self, transport: &impl Transport) -> Result<HttpResponse, FetchError> {
        let request = self.build_request();
        debug!(method = request.method.as_str(), uri = %request.uri, "sending request");
        let response = transport.execute(&request)?;
        debug!(
            status = response.status,
            bytes = response.body.len(),
            success = response.is_success(),
            redirect = response.is_redirect(),
            location = response.location(),
            "received response"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Returns a canned outcome and records every request it sees.
    struct CannedTransport {
        outcome: Result<HttpResponse, FetchError>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(outcome: Result<HttpResponse, FetchError>) -> Self {
            Self {
                outcome,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            self.seen.borrow_mut().push(request.clone());
            self.outcome.clone()
        }
    }

    fn moved() -> HttpResponse {
        HttpResponse {
            status: 301,
            headers: vec![("location".to_string(), "https://www.google.com/".to_string())],
            body: b"<HTML><HEAD><TITLE>301 Moved</TITLE></HEAD></HTML>\n".to_vec(),
        }
    }

    #[test]
    fn build_request_is_a_bare_get() {
        let client = FetchClient::new("https://example.com/index.html").unwrap();
        let req = client.build_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.uri, "https://example.com/index.html");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let client = FetchClient::new("  https://example.com/\n").unwrap();
        assert_eq!(client.uri(), "https://example.com/");
    }

    #[test]
    fn plain_http_is_rejected_by_default() {
        let err = FetchClient::new("http://127.0.0.1:3000/").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri(ref m) if m.contains("plain http")));
    }

    #[test]
    fn plain_http_is_accepted_when_allowed() {
        let client = FetchClient::allowing_http("http://127.0.0.1:3000/").unwrap();
        assert_eq!(client.uri(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn allowing_http_still_rejects_other_schemes() {
        let err = FetchClient::allowing_http("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri(_)));
        assert!(FetchClient::allowing_http("https://example.com/").is_ok());
    }

    #[test]
    fn relative_uri_is_rejected() {
        let err = FetchClient::new("/index.html").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri(_)));
    }

    #[test]
    fn bare_host_is_rejected() {
        let err = FetchClient::new("example.com").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri(_)));
    }

    #[test]
    fn other_schemes_are_rejected() {
        let err = FetchClient::new("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri(ref m) if m.contains("`ftp`")));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = FetchClient::new("https://exa mple.com/").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri(_)));
    }

    #[test]
    fn fetch_sends_exactly_one_request() {
        let transport = CannedTransport::new(Ok(moved()));
        let client = FetchClient::new("https://google.com/").unwrap();
        client.fetch(&transport).unwrap();

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], client.build_request());
    }

    #[test]
    fn redirect_is_returned_not_followed() {
        let transport = CannedTransport::new(Ok(moved()));
        let client = FetchClient::new("https://google.com/").unwrap();
        let resp = client.fetch(&transport).unwrap();

        assert_eq!(resp, moved());
        assert_eq!(transport.seen.borrow().len(), 1);
    }

    #[test]
    fn server_errors_are_responses() {
        let transport = CannedTransport::new(Ok(HttpResponse {
            status: 503,
            headers: Vec::new(),
            body: b"unavailable".to_vec(),
        }));
        let client = FetchClient::new("https://example.com/").unwrap();
        let resp = client.fetch(&transport).unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, b"unavailable");
    }

    #[test]
    fn transport_failure_is_propagated() {
        let transport = CannedTransport::new(Err(FetchError::Tls("no shared cipher".into())));
        let client = FetchClient::new("https://example.com/").unwrap();
        let err = client.fetch(&transport).unwrap_err();
        assert_eq!(err, FetchError::Tls("no shared cipher".into()));
        assert_eq!(transport.seen.borrow().len(), 1);
    }
}
