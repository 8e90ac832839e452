// src/crawler/client.rs
use std::time::Duration;

use reqwest::header;

use crate::crawler::PageSource;
use crate::utils::error::FetchError;

// Some listing sites refuse obvious bot agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Creates a reqwest client with the browser User-Agent and request timeout.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// Downloads one page and returns its body. Non-2xx statuses are errors; no retries.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("Downloading page from: {}", url);

    let response = client.get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await?; // Propagates reqwest::Error as FetchError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::Blocked);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        return Err(FetchError::Http(status));
    }

    let body = response.text().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}

/// Live HTTP page source used by the `crawl` command.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self { client: build_client(user_agent, timeout)? })
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_page(&self.client, url).await
    }
}
