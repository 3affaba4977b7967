//! The watch loop — periodically evaluates the heartbeat and logs warnings.
//!
//! The daemon never mutates the ledger. It is an observer: the owner pings
//! through the one-shot commands (or any other host), and the daemon reports
//! how close the arrangement is to becoming claimable.

use crate::config::ServerConfig;
use crate::store::LedgerStore;
use anyhow::{Context, Result};
use lastwill_ledger::{evaluate_heartbeat, Clock, HeartbeatAction, SystemClock};
use std::time::Duration;

/// Run the daemon loop. Blocks forever (until shutdown signal).
pub async fn run(config: ServerConfig) -> Result<()> {
    log::info!("LastWill server starting…");
    log::info!("  Label:      {}", config.will.label);
    log::info!("  Owner:      {}", config.will.owner);
    log::info!(
        "  Interval:   {} seconds ({:.1} hours)",
        config.server.check_interval_secs,
        config.server.check_interval_secs as f64 / 3600.0
    );
    log::info!("  Data dir:   {}", config.server.data_dir.display());

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data dir: {}",
            config.server.data_dir.display()
        )
    })?;

    let interval = Duration::from_secs(config.server.check_interval_secs);

    // Run first check immediately, then loop
    let mut first = true;
    loop {
        if !first {
            log::debug!(
                "Sleeping {} seconds until next check…",
                config.server.check_interval_secs
            );
            tokio::time::sleep(interval).await;
        }
        first = false;

        match run_check_cycle(&config).await {
            Ok(()) => log::debug!("Check cycle completed."),
            Err(e) => log::error!("Check cycle failed: {:#}", e),
        }
    }
}

/// Execute a single check cycle: load the ledger, evaluate the heartbeat,
/// log at a severity matching the urgency.
pub async fn run_check_cycle(config: &ServerConfig) -> Result<()> {
    let store = LedgerStore::new(config.state_path());
    let now = SystemClock.now();

    let ledger = store
        .load_or_init(config.owner()?, now)
        .with_context(|| format!("Failed to load ledger state from {}", store.path().display()))?;

    let Some(status) = evaluate_heartbeat(&ledger, now, &config.heartbeat_config()) else {
        log::info!(
            "No will configured yet (owner {}, balance {}). Nothing to watch.",
            ledger.owner(),
            ledger.balance()
        );
        return Ok(());
    };

    match status.action {
        HeartbeatAction::Healthy => log::info!(
            "Heartbeat healthy: {:.1}% of timeout elapsed, {} seconds until claimable.",
            status.elapsed_fraction * 100.0,
            status.remaining_secs
        ),
        HeartbeatAction::PingRecommended => log::warn!(
            "Owner should ping soon: {:.1}% of timeout elapsed, {} seconds until claimable.",
            status.elapsed_fraction * 100.0,
            status.remaining_secs
        ),
        HeartbeatAction::PingRequired => log::warn!(
            "Owner MUST ping now: {:.1}% of timeout elapsed, only {} seconds until claimable.",
            status.elapsed_fraction * 100.0,
            status.remaining_secs
        ),
        HeartbeatAction::Claimable => log::warn!(
            "Timeout elapsed: the heir can claim the balance of {} at any time.",
            ledger.balance()
        ),
    }

    Ok(())
}
