use std::{env, time::Duration};

use alert_engine::{AlertWindow, DEFAULT_END_HOUR, DEFAULT_START_HOUR};
use anyhow::{Context, Result};
use chrono_tz::Tz;

const DEFAULT_PORTFOLIO_URL: &str = "http://localhost:5000/portfolio";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub portfolio_url: String,
    pub health_url: String,
    pub http_timeout: Duration,
    pub health_check_interval: Duration,
    pub alert_recipient: Option<String>,
    pub alert_window: AlertWindow,
    pub enable_health_monitor: bool,
    pub port: u16,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let portfolio_url = env::var("PORTFOLIO_API_URL")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_URL.to_string());
        let health_url = env::var("HEALTH_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| derive_health_url(&portfolio_url));

        let timezone_name =
            env::var("ALERT_TIMEZONE").unwrap_or_else(|_| "Asia/Bangkok".to_string());
        let timezone: Tz = timezone_name
            .trim()
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid ALERT_TIMEZONE {timezone_name}: {err}"))?;
        let alert_window = AlertWindow::new(
            timezone,
            parse_hour(
                "ALERT_WINDOW_START_HOUR",
                env::var("ALERT_WINDOW_START_HOUR").ok().as_deref(),
                DEFAULT_START_HOUR,
            )?,
            parse_hour(
                "ALERT_WINDOW_END_HOUR",
                env::var("ALERT_WINDOW_END_HOUR").ok().as_deref(),
                DEFAULT_END_HOUR,
            )?,
        )
        .context("invalid alert window")?;
        let health_check_interval =
            check_interval(parse_duration_seconds("HEALTH_CHECK_INTERVAL_SECS", 600))?;

        Ok(Self {
            portfolio_url,
            health_url,
            http_timeout: parse_duration_seconds("HTTP_TIMEOUT_SECS", 30),
            health_check_interval,
            alert_recipient: env::var("ALERT_RECIPIENT")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            alert_window,
            enable_health_monitor: parse_bool("ENABLE_HEALTH_MONITOR", true),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8082".to_string())
                .parse()
                .context("PORT must be a valid u16")?,
            log_format: log_format_from_env(),
        })
    }

    /// Problems worth a startup warning that should not stop the process.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.alert_recipient.as_deref() {
            None => warnings.push(
                "ALERT_RECIPIENT is not set; health alerts will only be logged".to_string(),
            ),
            Some(recipient) => warnings.extend(recipient_warning(recipient)),
        }
        if self.http_timeout.is_zero() {
            warnings.push("HTTP_TIMEOUT_SECS is 0; requests will time out immediately".to_string());
        }
        warnings
    }
}

/// `https://host/portfolio` -> `https://host/health`.
pub fn derive_health_url(portfolio_url: &str) -> String {
    let base = portfolio_url.trim_end_matches('/');
    match base.strip_suffix("/portfolio") {
        Some(root) => format!("{root}/health"),
        None => format!("{base}/health"),
    }
}

fn recipient_warning(recipient: &str) -> Option<String> {
    let Some((local, domain)) = recipient.split_once('@') else {
        return Some(format!(
            "ALERT_RECIPIENT {recipient:?} does not look like an email address"
        ));
    };
    if domain.is_empty() || local.is_empty() {
        return Some(format!(
            "ALERT_RECIPIENT {recipient:?} does not look like an email address"
        ));
    }
    let local = local.to_lowercase();
    if looks_like_misspelled_alert(&local) {
        return Some(format!(
            "ALERT_RECIPIENT local part {local:?} looks like a misspelling of \"alert\"; \
             check the address (it is used as configured)"
        ));
    }
    None
}

// Same letters as "alert", rearranged or doubled: "alrter", "alret", "alertt".
fn looks_like_misspelled_alert(local: &str) -> bool {
    local != "alert"
        && local.starts_with('a')
        && (4..=6).contains(&local.len())
        && local.chars().all(|c| "alert".contains(c))
}

/// Read on its own before the rest of the configuration so that config
/// errors are already logged in the requested format.
pub fn log_format_from_env() -> LogFormat {
    parse_log_format(env::var("LOG_FORMAT").ok().as_deref())
}

fn parse_log_format(value: Option<&str>) -> LogFormat {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("pretty") | Some("text") => LogFormat::Pretty,
        _ => LogFormat::Json,
    }
}

fn parse_duration_seconds(key: &str, default: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

fn parse_hour(key: &str, value: Option<&str>, default: u32) -> Result<u32> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("{key} must be an hour between 0 and 24, got {raw:?}")),
    }
}

fn check_interval(interval: Duration) -> Result<Duration> {
    if interval.is_zero() {
        anyhow::bail!("HEALTH_CHECK_INTERVAL_SECS must be greater than 0");
    }
    Ok(interval)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "on"))
        .unwrap_or(default)
}
