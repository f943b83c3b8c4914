use crate::config::ClientConfig;
use crate::error::{HttpError, Result};
use reqwest::Client;
use std::time::Duration;

/// Create the pooled HTTP client shared by every request of a dispatcher
///
/// Features:
/// - HTTP/2 when the server negotiates it
/// - Connection pooling with a configurable idle timeout
/// - Connect timeout from config; the overall timeout is set per request
/// - TCP keep-alive and no-delay
///
/// # Errors
///
/// Returns [`HttpError::Runtime`] if the client cannot be built (e.g. the TLS
/// backend fails to initialize).
pub fn create_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true) // Disable Nagle's algorithm (lower latency)
        .pool_idle_timeout(config.pool_idle_timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| HttpError::Runtime(format!("Failed to create HTTP client: {e}")))
}
