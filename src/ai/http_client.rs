//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized HTTP client for the classification
//! API. The client is built once per process and reused for every document
//! of a batch, so the TLS session and connection stay warm.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Default request timeout for one classification call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Global HTTP client for OpenAI-compatible API calls
///
/// Requests are sequential, so the pool stays small.
pub static OPENAI_CLIENT: Lazy<Client> = Lazy::new(|| {
    build_client(DEFAULT_REQUEST_TIMEOUT).expect("Failed to create OpenAI HTTP client")
});

/// Build a client with the given request timeout
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
}

/// Get the global OpenAI HTTP client
#[inline]
pub fn openai_client() -> &'static Client {
    &OPENAI_CLIENT
}
