use std::sync::Arc;
use std::time::Duration;

use alert_engine::{classify, unreachable, AlertNotifier, AlertWindow, HealthAlert};
use chrono::{DateTime, Utc};
use domain::HealthResult;
use reqwest::Client;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Clone)]
pub struct HealthChecker {
    client: Client,
    url: String,
}

impl HealthChecker {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Never fails: transport errors come back as an unhealthy result.
    pub async fn check(&self) -> HealthResult {
        let result = match self.client.get(&self.url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                match resp.text().await {
                    Ok(body) => classify(status, &body),
                    Err(err) => unreachable(err),
                }
            }
            Err(err) => unreachable(err),
        };
        metrics::counter!(
            "health_check_total",
            "healthy" => if result.healthy { "true" } else { "false" }
        )
        .increment(1);
        result
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    #[serde(flatten)]
    pub result: HealthResult,
    pub alerted: bool,
}

/// Periodic health check feeding the alert window gate.
#[derive(Clone)]
pub struct HealthMonitor {
    checker: Arc<HealthChecker>,
    window: AlertWindow,
    notifier: Arc<dyn AlertNotifier>,
}

impl HealthMonitor {
    pub fn new(
        checker: Arc<HealthChecker>,
        window: AlertWindow,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        Self {
            checker,
            window,
            notifier,
        }
    }

    pub fn window(&self) -> &AlertWindow {
        &self.window
    }

    pub fn spawn(self: Arc<Self>, interval: Duration) {
        tokio::spawn(async move {
            loop {
                self.run_once().await;
                sleep(interval).await;
            }
        });
    }

    pub async fn run_once(&self) -> HealthReport {
        self.run_at(Utc::now()).await
    }

    /// Checks once and notifies when the gate allows it at `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> HealthReport {
        let result = self.checker.check().await.with_checked_at(now);
        let endpoint = self.checker.url();

        if result.healthy {
            info!(%endpoint, "health check passed");
            return HealthReport {
                result,
                alerted: false,
            };
        }

        let error = result.error.as_deref().unwrap_or("unknown failure");
        let alerted = self.window.should_alert(&result, now);
        if alerted {
            warn!(%endpoint, %error, "health check failed; sending alert");
            let alert = HealthAlert::compose(&result, endpoint, self.window.timezone);
            self.notifier.notify(&alert).await;
        } else {
            warn!(
                %endpoint,
                %error,
                timezone = self.window.timezone.name(),
                "health check failed outside the alert window; alert suppressed"
            );
        }
        metrics::counter!(
            "health_alert_total",
            "dispatched" => if alerted { "true" } else { "false" }
        )
        .increment(1);

        HealthReport { result, alerted }
    }
}
