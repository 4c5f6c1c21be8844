//! Internal module for establishing TCP connections to POP3 servers.
//!
//! Only IPv4 addresses are dialed.

use crate::error::{Error, Result};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

/// Connects to `host:port`, bounded by `timeout`.
#[instrument(
    name = "connection::connect",
    skip_all,
    fields(host = %host, port = port)
)]
pub(crate) async fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let target = format!("{host}:{port}");

    tokio::time::timeout(timeout, connect_ipv4(host, port))
        .await
        .map_err(|_| Error::ConnectTimeout {
            target: target.clone(),
            timeout,
        })?
        .map_err(|source| Error::TcpConnect { target, source })
}

/// Resolves `host` and tries each IPv4 address in turn.
async fn connect_ipv4(host: &str, port: u16) -> io::Result<TcpStream> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await?
        .filter(SocketAddr::is_ipv4)
        .collect();

    let mut last_error = None;
    for addr in addrs {
        debug!(%addr, "Establishing TCP connection");
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "Connection attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no IPv4 address found for {host}"),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = connect("127.0.0.1", port, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(stream.peer_addr().unwrap().is_ipv4());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = connect("127.0.0.1", port, Duration::from_secs(5)).await;
        match result {
            Err(err @ Error::TcpConnect { .. }) => assert!(err.is_retryable()),
            other => panic!("expected TcpConnect error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ipv6_only_host_is_rejected() {
        let result = connect("::1", 110, Duration::from_secs(5)).await;
        match result {
            Err(Error::TcpConnect { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::AddrNotAvailable);
            }
            other => panic!("expected TcpConnect error, got {other:?}"),
        }
    }
}
