use std::sync::Arc;

use alert_engine::LoggingNotifier;
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    services::{build_http_client, HealthChecker, HealthMonitor, PortfolioClient, SyncService},
    state::AppState,
};

/// Wires the services from `config`. Starts the health monitor task when
/// `enable_health_monitor` is set, so this must run inside a tokio runtime.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    for warning in config.warnings() {
        warn!(%warning, "configuration warning");
    }

    let client = build_http_client(config.http_timeout).context("failed to build HTTP client")?;
    let sync = Arc::new(SyncService::new(PortfolioClient::new(
        client.clone(),
        config.portfolio_url.clone(),
    )));
    let checker = Arc::new(HealthChecker::new(client, config.health_url.clone()));
    let monitor = Arc::new(HealthMonitor::new(
        checker.clone(),
        config.alert_window,
        Arc::new(LoggingNotifier::new(config.alert_recipient.clone())),
    ));

    info!(
        portfolio_url = %config.portfolio_url,
        health_url = %config.health_url,
        timezone = config.alert_window.timezone.name(),
        window_start = config.alert_window.start_hour,
        window_end = config.alert_window.end_hour,
        "portfolio sheets configured"
    );

    if config.enable_health_monitor {
        monitor.clone().spawn(config.health_check_interval);
        info!(
            interval_secs = config.health_check_interval.as_secs(),
            "health monitor started"
        );
    }

    Ok(AppState {
        config: config.clone(),
        sync,
        checker,
        monitor,
    })
}
