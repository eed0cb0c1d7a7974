//! Fixtures on random local ports, each driven by its own background thread.

use std::future::Future;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::error;

use crate::tls::{serve_tls, TestCert};
use crate::{serve, Hits};

pub fn spawn_on_random_port(hits: Hits) -> io::Result<SocketAddr> {
    spawn_with(move |listener| serve(listener, hits))
}

/// Like `spawn_on_random_port`, but over TLS with a freshly generated certificate.
pub fn spawn_tls_on_random_port(hits: Hits) -> io::Result<(SocketAddr, TestCert)> {
    let cert = TestCert::generate().map_err(io::Error::other)?;
    let acceptor = cert.acceptor()?;
    let addr = spawn_with(move |listener| serve_tls(listener, hits, acceptor))?;
    Ok((addr, cert))
}

/// Accepts one connection, reads the client hello, and answers in plaintext
/// HTTP, so a TLS client fails its handshake.
pub fn spawn_plaintext_peer() -> io::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello");
            let _ = stream.flush();
            thread::sleep(Duration::from_millis(500));
        }
    });

    Ok(addr)
}

/// An address nothing listens on.
pub fn closed_port() -> io::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.local_addr()
}

fn spawn_with<F, Fut>(serve_fn: F) -> io::Result<SocketAddr>
where
    F: FnOnce(TcpListener) -> Fut + Send + 'static,
    Fut: Future<Output = io::Result<()>>,
{
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::spawn(move || {
        let result = rt.block_on(async move {
            let listener = TcpListener::from_std(std_listener)?;
            serve_fn(listener).await
        });
        if let Err(err) = result {
            error!(%addr, %err, "fixture server stopped");
        }
    });

    Ok(addr)
}
