use std::time::Instant;

use domain::{excerpt, PortfolioDocument};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

const BODY_EXCERPT_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("portfolio API returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },
    #[error("portfolio API request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed portfolio response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    fn outcome(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Network(_) => "network",
            FetchError::MalformedResponse(_) => "malformed",
        }
    }
}

/// GET client for the remote `/portfolio?address=` endpoint.
#[derive(Clone)]
pub struct PortfolioClient {
    client: Client,
    url: String,
}

impl PortfolioClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `address` must already be normalized. The remote `error` field is not
    /// interpreted here.
    pub async fn fetch(&self, address: &str) -> Result<PortfolioDocument, FetchError> {
        let started = Instant::now();
        let result = self.fetch_inner(address).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.outcome(),
        };
        metrics::counter!("portfolio_fetch_total", "outcome" => outcome).increment(1);
        info!(
            %address,
            outcome,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "portfolio fetch finished"
        );
        result
    }

    async fn fetch_inner(&self, address: &str) -> Result<PortfolioDocument, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("address", address)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "portfolio response received");

        if status != StatusCode::OK {
            return Err(FetchError::Transport {
                status: status.as_u16(),
                body: excerpt(&body, BODY_EXCERPT_CHARS),
            });
        }
        parse_document(&body)
    }
}

/// Parses a 200 response body, rejecting the HTML pages tunnels and proxies
/// serve in place of JSON.
pub fn parse_document(body: &str) -> Result<PortfolioDocument, FetchError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") {
        return Err(FetchError::MalformedResponse(
            "received HTML instead of JSON".to_string(),
        ));
    }
    serde_json::from_str(body)
        .map_err(|err| FetchError::MalformedResponse(format!("invalid JSON: {err}")))
}
