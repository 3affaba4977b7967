//! One-shot ledger commands.
//!
//! Each invocation loads the persisted ledger, applies a single operation as
//! the given caller, and writes the result back. The caller identity is
//! whatever the invoker passed with `--as` — authentication happens outside
//! this process (shell access, SSH, a fronting service).

use crate::config::ServerConfig;
use crate::store::LedgerStore;
use anyhow::{bail, Context, Result};
use chrono::DateTime;
use lastwill_ledger::{
    evaluate_heartbeat, AccountId, Clock, SystemClock, Timeout, WillLedger,
};

/// A parsed ledger command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetWill { recipient: String, secs: u64 },
    Deposit { amount: u64 },
    Ping,
    Claim,
    Status,
}

impl Command {
    /// Parse a command name and its positional arguments.
    pub fn parse(name: &str, args: &[String]) -> Result<Self> {
        match name {
            "set-will" => {
                let [recipient, secs] = args else {
                    bail!("Usage: set-will <recipient> <duration-secs>");
                };
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("Invalid duration: {}", secs))?;
                Ok(Command::SetWill {
                    recipient: recipient.clone(),
                    secs,
                })
            }
            "deposit" => {
                let [amount] = args else {
                    bail!("Usage: deposit <amount>");
                };
                let amount: u64 = amount
                    .parse()
                    .with_context(|| format!("Invalid amount: {}", amount))?;
                Ok(Command::Deposit { amount })
            }
            "ping" => {
                if !args.is_empty() {
                    bail!("ping takes no arguments");
                }
                Ok(Command::Ping)
            }
            "claim" => {
                if !args.is_empty() {
                    bail!("claim takes no arguments");
                }
                Ok(Command::Claim)
            }
            "status" => {
                if !args.is_empty() {
                    bail!("status takes no arguments");
                }
                Ok(Command::Status)
            }
            other => bail!("Unknown command: {}", other),
        }
    }
}

/// Execute a command against the persisted ledger.
///
/// `caller` defaults to the configured owner when not given — the common
/// case for set-will/deposit/ping. An heir claims with `--as <account>`.
pub fn run(command: Command, config: &ServerConfig, caller: Option<String>) -> Result<()> {
    let store = LedgerStore::new(config.state_path());
    let now = SystemClock.now();

    let mut ledger = store
        .load_or_init(config.owner()?, now)
        .with_context(|| format!("Failed to load ledger state from {}", store.path().display()))?;

    let caller: AccountId = match caller {
        Some(id) => id.parse()?,
        None => ledger.owner().clone(),
    };

    match command {
        Command::SetWill { recipient, secs } => {
            let recipient: AccountId = recipient.parse()?;
            let duration = Timeout::from_secs(secs)?;
            ledger.set_will(&caller, recipient.clone(), duration, now)?;
            store.save(&ledger)?;
            println!(
                "Will configured: {} inherits after {} seconds of inactivity.",
                recipient, secs
            );
        }
        Command::Deposit { amount } => {
            ledger.deposit(&caller, amount, now)?;
            store.save(&ledger)?;
            println!("Deposited {}. Balance is now {}.", amount, ledger.balance());
        }
        Command::Ping => {
            ledger.ping(&caller, now)?;
            store.save(&ledger)?;
            println!("Ping recorded. Inactivity clock reset.");
        }
        Command::Claim => {
            let swept = ledger.claim(&caller, now)?;
            store.save(&ledger)?;
            println!("Claimed {} as {}.", swept, caller);
        }
        Command::Status => {
            print_status(&ledger, config, now);
        }
    }

    Ok(())
}

fn print_status(ledger: &WillLedger, config: &ServerConfig, now: u64) {
    println!("Will ledger \"{}\"", config.will.label);
    println!("  Owner:        {}", ledger.owner());
    match ledger.recipient() {
        Some(recipient) => println!("  Recipient:    {}", recipient),
        None => println!("  Recipient:    (no will configured)"),
    }
    match ledger.duration() {
        Some(duration) => println!(
            "  Duration:     {} seconds ({:.1} days)",
            duration.secs(),
            duration.secs() as f64 / 86_400.0
        ),
        None => println!("  Duration:     (no will configured)"),
    }
    println!(
        "  Last visited: {} (unix {})",
        format_timestamp(ledger.last_visited()),
        ledger.last_visited()
    );
    println!("  Balance:      {}", ledger.balance());
    if let Some(at) = ledger.claimable_at() {
        println!("  Claimable at: {} (unix {})", format_timestamp(at), at);
    }
    if let Some(status) = evaluate_heartbeat(ledger, now, &config.heartbeat_config()) {
        println!(
            "  Heartbeat:    {:?} ({:.1}% of timeout elapsed)",
            status.action,
            status.elapsed_fraction * 100.0
        );
    }
}

fn format_timestamp(ts: u64) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "invalid timestamp".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_set_will() {
        let cmd = Command::parse("set-will", &strings(&["bob", "3600"])).unwrap();
        assert_eq!(
            cmd,
            Command::SetWill {
                recipient: "bob".into(),
                secs: 3600
            }
        );
    }

    #[test]
    fn test_parse_set_will_bad_arity() {
        assert!(Command::parse("set-will", &strings(&["bob"])).is_err());
        assert!(Command::parse("set-will", &strings(&["bob", "10", "extra"])).is_err());
    }

    #[test]
    fn test_parse_deposit() {
        let cmd = Command::parse("deposit", &strings(&["500"])).unwrap();
        assert_eq!(cmd, Command::Deposit { amount: 500 });
        assert!(Command::parse("deposit", &strings(&["lots"])).is_err());
    }

    #[test]
    fn test_parse_no_arg_commands() {
        assert_eq!(Command::parse("ping", &[]).unwrap(), Command::Ping);
        assert_eq!(Command::parse("claim", &[]).unwrap(), Command::Claim);
        assert_eq!(Command::parse("status", &[]).unwrap(), Command::Status);
        assert!(Command::parse("ping", &strings(&["now"])).is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(Command::parse("withdraw", &[]).is_err());
    }
}
