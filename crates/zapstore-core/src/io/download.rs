//! Streaming download with SHA-256 hashing and progress reporting.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::debug;
use zapstore_schema::ContentHash;

use crate::Reporter;
use crate::error::{Error, Result};

/// Whole-request deadline for asset downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Upper bound on the buffer reserved up front from `Content-Length`.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// HTTP client used for asset downloads.
///
/// # Errors
///
/// Returns a transport error if the TLS backend cannot be initialized.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(DOWNLOAD_TIMEOUT)
        .tcp_nodelay(true)
        .build()
        .map_err(|e| Error::transport("building HTTP client", e))
}

/// A fully downloaded body and its digest.
#[derive(Debug)]
pub struct Downloaded {
    /// Response body.
    pub body: Vec<u8>,
    /// SHA-256 of `body`.
    pub sha256: ContentHash,
}

/// Fetch `url` into memory, hashing as bytes arrive.
///
/// Non-success statuses are transport failures naming the URL.
///
/// # Errors
///
/// Returns a transport error on connection failure, a non-success status or
/// an interrupted body.
pub async fn fetch<R: Reporter + ?Sized>(
    client: &Client,
    url: &str,
    app_id: &str,
    version: &str,
    reporter: &R,
) -> Result<Downloaded> {
    let ctx = || format!("downloading {app_id} {version} from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| Error::transport(ctx(), e))?;

    let total = response.content_length();
    reporter.downloading(app_id, version, 0, total);

    let mut body = Vec::with_capacity(initial_capacity(total));
    let mut hasher = Sha256::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::transport(ctx(), e))?;
        hasher.update(&chunk);
        body.extend_from_slice(&chunk);
        reporter.downloading(app_id, version, body.len() as u64, total);
    }

    debug!(url, bytes = body.len(), "download complete");
    Ok(Downloaded {
        body,
        sha256: ContentHash::from_digest(&hasher.finalize()),
    })
}

/// Bytes to reserve before the body arrives. The declared length comes from
/// the server and is only a hint.
fn initial_capacity(total: Option<u64>) -> usize {
    total.map_or(0, |t| t.min(MAX_PREALLOC) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_fetch_hashes_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/blob")
            .with_status(200)
            .with_body("abc")
            .create_async()
            .await;

        let client = http_client().unwrap();
        let url = format!("{}/blob", server.url());
        let got = fetch(&client, &url, "foo", "1.0.0", &NullReporter)
            .await
            .unwrap();

        assert_eq!(got.body, b"abc");
        assert_eq!(
            got.sha256.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_http_error_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = http_client().unwrap();
        let url = format!("{}/missing", server.url());
        let err = fetch(&client, &url, "foo", "1.0.0", &NullReporter)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(3)), 3);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_PREALLOC as usize);
    }

    #[tokio::test]
    async fn test_lying_content_length_is_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = sock.read(&mut buf).await;
            let _ = sock
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000000000000000\r\n\r\nabc")
                .await;
        });

        let client = http_client().unwrap();
        let url = format!("http://{addr}/blob");
        let err = fetch(&client, &url, "foo", "1.0.0", &NullReporter)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
