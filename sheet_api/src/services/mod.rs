pub mod health;
pub mod portfolio;
pub mod sync;

pub use health::{HealthChecker, HealthMonitor, HealthReport};
pub use portfolio::{FetchError, PortfolioClient};
pub use sync::{RenderedPortfolio, SyncError, SyncOutcome, SyncService};

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
    Client,
};

const USER_AGENT: &str = concat!("portfolio-sheets/", env!("CARGO_PKG_VERSION"));

/// One client shared by the portfolio fetcher and the health checker.
///
/// The remote is usually published through an ngrok tunnel, which serves an
/// HTML interstitial unless the skip header is present.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("ngrok-skip-browser-warning"),
        HeaderValue::from_static("true"),
    );
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
}
