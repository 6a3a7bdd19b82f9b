// Small ops utility: run one cache refresh against the configured data directory.
//
// Usage:
//   cargo run --bin manual_refresh_cache -- [--full]
//
// --full forces a fiscal-year reload even when the snapshot is current.
// Configuration is read the same way as the server (DAILY_REPORT_CONFIG / DAILY_REPORT_DATA_DIR).

use anyhow::Context;
use chrono::Local;
use daily_report::app::AppState;
use daily_report::config::AppConfig;
use daily_report::engine::RefreshOutcome;
use daily_report::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let full = std::env::args().skip(1).any(|arg| arg == "--full");
    let config = AppConfig::from_env().context("配置加载失败")?;
    let state = AppState::new(config)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let reconciler = state.reconciler.clone();
    reconciler.load_snapshot();

    let today = Local::now().date_naive();
    let outcome = if full {
        reconciler.initial_load(today).await
    } else {
        reconciler.refresh_at(today).await
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if let RefreshOutcome::SourceFailed { error, .. } = outcome {
        anyhow::bail!("refresh failed: {}", error);
    }
    Ok(())
}
