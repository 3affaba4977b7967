//! LastWill Server — headless host for the dead-man's-switch custody ledger
//!
//! Owns a persisted `WillLedger` instance and exposes its four operations as
//! one-shot commands, plus a watch daemon that periodically evaluates the
//! heartbeat and logs warnings. Designed for Docker / server deployment.
//!
//! # Usage
//!
//! ```bash
//! lastwill-server --config /path/to/lastwill.toml            # watch daemon
//! lastwill-server --config lastwill.toml status
//! lastwill-server --config lastwill.toml set-will bob 2592000
//! lastwill-server --config lastwill.toml deposit 100000
//! lastwill-server --config lastwill.toml ping
//! lastwill-server --config lastwill.toml --as bob claim
//! lastwill-server --check     # Run one check cycle and exit
//! lastwill-server --validate  # Validate config and exit
//! ```

mod commands;
mod config;
mod daemon;
mod store;

use anyhow::{Context, Result};
use commands::Command;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Parse CLI args (minimal — no clap dependency needed)
    let args: Vec<String> = std::env::args().collect();

    let mut config_path = PathBuf::from("/config/lastwill.toml");
    let mut caller: Option<String> = None;
    let mut one_shot = false;
    let mut validate_only = false;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_path = PathBuf::from(&args[i]);
                } else {
                    anyhow::bail!("--config requires a path argument");
                }
            }
            "--as" => {
                i += 1;
                if i < args.len() {
                    caller = Some(args[i].clone());
                } else {
                    anyhow::bail!("--as requires an account argument");
                }
            }
            "--check" | "--once" => {
                one_shot = true;
            }
            "--validate" => {
                validate_only = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("lastwill-server {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            other if other.starts_with('-') => {
                anyhow::bail!("Unknown argument: {}", other);
            }
            other => {
                positional.push(other.to_string());
            }
        }
        i += 1;
    }

    // Load config
    let mut server_config = config::ServerConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Apply env overrides
    server_config.apply_env_overrides();

    // Validate
    server_config
        .validate()
        .context("Configuration validation failed")?;

    // Init logger
    std::env::set_var("RUST_LOG", &server_config.server.log_level);
    env_logger::init();

    if validate_only {
        println!("✅ Configuration is valid.");
        println!("  Label:          {}", server_config.will.label);
        println!("  Owner:          {}", server_config.will.owner);
        println!("  Data dir:       {}", server_config.server.data_dir.display());
        println!("  State file:     {}", server_config.state_path().display());
        println!(
            "  Check interval: {} secs",
            server_config.server.check_interval_secs
        );
        println!(
            "  Thresholds:     ping at {:.0}%, critical at {:.0}%",
            server_config.heartbeat.ping_threshold * 100.0,
            server_config.heartbeat.critical_threshold * 100.0
        );
        return Ok(());
    }

    // One-shot ledger command: no runtime needed
    if let Some((name, rest)) = positional.split_first() {
        let command = Command::parse(name, rest)?;
        return commands::run(command, &server_config, caller);
    }

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    if one_shot {
        log::info!("Running single check cycle…");
        rt.block_on(daemon::run_check_cycle(&server_config))?;
        log::info!("Done.");
    } else {
        // Install Ctrl-C handler for graceful shutdown
        let shutdown = rt.block_on(async {
            tokio::select! {
                result = daemon::run(server_config) => result,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received shutdown signal. Exiting…");
                    Ok(())
                }
            }
        });

        if let Err(e) = shutdown {
            log::error!("Server error: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"LastWill Server — headless dead-man's-switch custody host

USAGE:
    lastwill-server [OPTIONS] [COMMAND]

COMMANDS:
    set-will <recipient> <duration-secs>   Configure the heir and timeout (owner)
    deposit <amount>                       Add funds to the ledger (owner)
    ping                                   Reset the inactivity clock (owner)
    claim                                  Sweep the balance (recipient, use --as)
    status                                 Show ledger state and heartbeat

    With no command, runs the watch daemon.

OPTIONS:
    -c, --config <PATH>   Config file path (default: /config/lastwill.toml)
    --as <ACCOUNT>        Caller identity for a command (default: configured owner)
    --check, --once       Run a single check cycle and exit
    --validate            Validate config file and exit
    -h, --help            Show this help message
    -V, --version         Show version

ENVIRONMENT VARIABLES (override config file):
    LASTWILL_DATA_DIR        Data directory path
    LASTWILL_CHECK_INTERVAL  Check interval in seconds
    LASTWILL_LOG_LEVEL       Log level (error/warn/info/debug/trace)
    LASTWILL_OWNER           Owner account id (first start only)

EXAMPLES:
    # Run as daemon with config file
    lastwill-server --config /path/to/lastwill.toml

    # Owner proves liveness (useful for cron jobs)
    lastwill-server --config lastwill.toml ping

    # Heir claims after the timeout
    lastwill-server --config lastwill.toml --as bob claim
"#
    );
}
