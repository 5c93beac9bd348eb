use domain::ChainMode;
use sheet_api::{
    bootstrap::build_state,
    config,
    services::SyncOutcome,
    sheet::MemorySheet,
    telemetry,
};

/// Syncs every address in `SHEET_ADDRESSES` into an in-memory sheet and
/// prints the resulting grid as JSON.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing(config::log_format_from_env())?;

    let mut config = config::AppConfig::from_env()?;
    config.enable_health_monitor = false;
    let state = build_state(&config)?;

    let mode = match std::env::var("SHEET_MODE") {
        Ok(value) if !value.trim().is_empty() => Some(value.parse::<ChainMode>()?),
        _ => None,
    };
    let addresses: Vec<String> = std::env::var("SHEET_ADDRESSES")
        .map_err(|_| anyhow::anyhow!("SHEET_ADDRESSES must list at least one wallet address"))?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let sheet = MemorySheet::new();
    for address in &addresses {
        match state.sync.sync(address, mode, &sheet).await {
            Ok(SyncOutcome::Written {
                address,
                mode,
                start_row,
                rows,
            }) => {
                tracing::info!(%address, %mode, start_row, rows, "portfolio synced");
            }
            Ok(SyncOutcome::Empty { address, mode }) => {
                tracing::info!(%address, %mode, "no portfolio data found");
            }
            Err(err) => {
                tracing::warn!(%address, %err, "portfolio sync failed");
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&sheet.snapshot().await)?);
    Ok(())
}
