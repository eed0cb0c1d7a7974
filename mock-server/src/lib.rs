use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

mod spawn;
pub mod tls;

pub use spawn::{closed_port, spawn_on_random_port, spawn_plaintext_peer, spawn_tls_on_random_port};
pub use tls::{serve_tls, TestCert};

pub const HELLO_BODY: &str = "Hello, world!\n";

pub const MOVED_BODY: &str = "<HTML><HEAD><meta http-equiv=\"content-type\" content=\"text/html;charset=utf-8\">\n\
<TITLE>301 Moved</TITLE></HEAD><BODY>\n\
<H1>301 Moved</H1>\n\
The document has moved\n\
<A HREF=\"/landing\">here</A>.\n\
</BODY></HTML>\n";

pub const LANDING_BODY: &str = "you followed the redirect\n";

/// Deliberately not valid UTF-8.
pub const BINARY_BODY: &[u8] = &[0x00, 0xff, 0xfe, b'\n', 0x80, 0x1b, b'[', b'0', b'm'];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UuidBody {
    pub uuid: Uuid,
}

/// Number of requests that reached the redirect target.
#[derive(Clone, Debug, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn landing(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn app() -> Router {
    router(Hits::default())
}

pub fn router(hits: Hits) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/moved", get(moved))
        .route("/landing", get(landing))
        .route("/bytes", get(bytes))
        .route("/uuid", get(uuid))
        .route("/headers", get(headers))
        .route("/status/{code}", get(status))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Hits::default()).await
}

pub async fn serve(listener: TcpListener, hits: Hits) -> Result<(), std::io::Error> {
    axum::serve(listener, router(hits)).await
}

async fn hello() -> &'static str {
    HELLO_BODY
}

async fn moved() -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, "/landing")],
        Html(MOVED_BODY),
    )
        .into_response()
}

async fn landing(State(hits): State<Hits>) -> &'static str {
    hits.0.fetch_add(1, Ordering::SeqCst);
    LANDING_BODY
}

async fn bytes() -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        BINARY_BODY,
    )
        .into_response()
}

async fn uuid() -> Json<UuidBody> {
    Json(UuidBody {
        uuid: Uuid::new_v4(),
    })
}

async fn headers(request_headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let echoed = request_headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(echoed)
}

async fn status(Path(code): Path<u16>) -> Result<Response, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let reason = status.canonical_reason().unwrap_or("Unknown");
    Ok((status, format!("{code} {reason}\n")).into_response())
}
