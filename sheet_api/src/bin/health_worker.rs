use sheet_api::{bootstrap::build_state, config, telemetry};

/// Runs the health monitor in the foreground, one check per interval.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing(config::log_format_from_env())?;

    let mut config = config::AppConfig::from_env()?;
    // Checks run on this task, not the background one.
    config.enable_health_monitor = false;
    let state = build_state(&config)?;
    let interval = config.health_check_interval;
    tracing::info!(
        interval_secs = interval.as_secs(),
        endpoint = %config.health_url,
        "health worker started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = state.monitor.run_once().await;
                tracing::debug!(healthy = report.result.healthy, alerted = report.alerted, "health check cycle done");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("health worker shutting down");
                return Ok(());
            }
        }
    }
}
