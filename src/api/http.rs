use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::RetrievalError;

/// User-Agent sent with every outbound request
pub const USER_AGENT: &str = concat!("telegram-github-bot/", env!("CARGO_PKG_VERSION"));

/// Build a client whose every request is bounded by `timeout`.
///
/// Requests are never retried: a timeout surfaces as an ordinary failure.
pub(super) fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Send a request once and reject transport errors and non-success statuses.
pub(super) async fn send_checked(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<reqwest::Response, RetrievalError> {
    let response = request
        .send()
        .await
        .map_err(|source| RetrievalError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    debug!("GET {} -> {}", url, status);

    if !status.is_success() {
        // Drain the body so the connection can be reused
        let _ = response.bytes().await;
        return Err(RetrievalError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(response)
}
