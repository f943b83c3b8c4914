//! Stub endpoints for dispatcher tests.
//!
//! Mock servers run on wiremock's own threads, so a blocking call can wait on
//! them from any context. Plain `#[test]`s set them up through [`runtime`].

#![allow(dead_code)]

use std::time::Duration;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runtime for setting up stubs from synchronous tests
pub fn runtime() -> std::io::Result<Runtime> {
    Runtime::new()
}

/// A server answering every request with `status`, `content_type` and `body`
pub async fn stub(status: u16, content_type: &str, body: &str) -> MockServer {
    stub_delayed(status, content_type, body, Duration::ZERO).await
}

/// Like [`stub`], holding each response back for `delay`
pub async fn stub_delayed(
    status: u16,
    content_type: &str,
    body: &str,
    delay: Duration,
) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_raw(body.as_bytes().to_vec(), content_type)
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

/// Accept one connection and never answer it
pub async fn serve_silent(hold_for: Duration) -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let _ = tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            tokio::time::sleep(hold_for).await;
            drop(stream);
        }
    });

    Ok(format!("http://{addr}"))
}

/// An address nothing listens on
pub async fn closed_port_url() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// Value of header `name` on a recorded request
pub fn header<'a>(request: &'a wiremock::Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}
