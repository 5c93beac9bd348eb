mod classify;
mod gate;

pub use classify::{classify, unreachable};
pub use gate::{
    should_alert, AlertWindow, WindowError, DEFAULT_END_HOUR, DEFAULT_START_HOUR,
    DEFAULT_TIMEZONE,
};

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use domain::HealthResult;

const SUBJECT: &str = "[Portfolio API] Health check failed";

/// Subject and plain-text body of a health alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthAlert {
    pub subject: String,
    pub body: String,
}

impl HealthAlert {
    pub fn compose(result: &HealthResult, endpoint: &str, timezone: Tz) -> Self {
        let local = result.checked_at.with_timezone(&timezone);
        let mut body = format!(
            "The portfolio API health check failed.\n\n\
             Checked at: {} ({})\n\
             Checked at (UTC): {}\n\
             Endpoint: {}\n",
            local.format("%Y-%m-%d %H:%M:%S"),
            timezone.name(),
            result.checked_at.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S"),
            endpoint,
        );
        if let Some(status) = &result.status {
            body.push_str(&format!("Reported status: {status}\n"));
        }
        body.push_str(&format!(
            "Error: {}\n",
            result.error.as_deref().unwrap_or("unknown failure")
        ));
        Self {
            subject: SUBJECT.to_string(),
            body,
        }
    }
}

#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &HealthAlert);
}

/// Writes alerts to the log instead of delivering them.
#[derive(Clone, Default)]
pub struct LoggingNotifier {
    recipient: Option<String>,
}

impl LoggingNotifier {
    pub fn new(recipient: Option<String>) -> Self {
        Self { recipient }
    }
}

#[async_trait]
impl AlertNotifier for LoggingNotifier {
    async fn notify(&self, alert: &HealthAlert) {
        tracing::warn!(
            recipient = self.recipient.as_deref().unwrap_or("-"),
            subject = %alert.subject,
            body = %alert.body,
            "health alert"
        );
    }
}
