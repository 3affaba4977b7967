//! Deadman heartbeat evaluation for the will ledger.
//!
//! Pure logic — no I/O, no async. Takes a ledger snapshot and the current
//! time, returns a recommendation. The caller (CLI, daemon) decides whether
//! to act on it.
//!
//! # How It Works
//!
//! Every owner action resets the inactivity clock. The heartbeat module
//! evaluates how much of the timeout has elapsed and recommends action:
//!
//! ```text
//! |--- Healthy ---|--- PingRecommended ---|--- PingRequired ---|--- Claimable
//! 0%             50%                     90%                 100%
//! ```
//!
//! Thresholds are configurable.

use crate::clock::Timestamp;
use crate::ledger::WillLedger;
use serde::{Deserialize, Serialize};

/// Heartbeat configuration — when to recommend a ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Fraction of timeout elapsed before recommending a ping (0.0–1.0).
    /// Default: 0.5 (halfway point).
    pub ping_threshold: f64,

    /// Fraction of timeout elapsed before a ping is critical (0.0–1.0).
    /// Default: 0.9.
    pub critical_threshold: f64,

    /// How often the caller should re-evaluate (seconds). This is advisory —
    /// the heartbeat module doesn't poll itself. Default: 3600 (1 hour).
    pub poll_interval_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_threshold: 0.5,
            critical_threshold: 0.9,
            poll_interval_secs: 3600,
        }
    }
}

impl HeartbeatConfig {
    /// Validate that thresholds are sensible.
    pub fn validate(&self) -> Result<(), HeartbeatError> {
        if self.ping_threshold <= 0.0 || self.ping_threshold >= 1.0 {
            return Err(HeartbeatError::InvalidThreshold(
                "ping_threshold must be between 0.0 and 1.0 exclusive".into(),
            ));
        }
        if self.critical_threshold <= self.ping_threshold || self.critical_threshold >= 1.0 {
            return Err(HeartbeatError::InvalidThreshold(
                "critical_threshold must be between ping_threshold and 1.0 exclusive".into(),
            ));
        }
        Ok(())
    }
}

/// What the heartbeat recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartbeatAction {
    /// Timeout is far from expiry. No action needed.
    Healthy,
    /// Passed the ping threshold. Owner should ping soon.
    PingRecommended,
    /// Passed the critical threshold. Owner must ping now.
    PingRequired,
    /// Timeout elapsed. The heir can claim. Too late to merely ping.
    Claimable,
}

/// Full heartbeat status for a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatStatus {
    /// Seconds of owner inactivity so far.
    pub elapsed_secs: u64,
    /// Seconds until a claim becomes eligible (0 once claimable).
    pub remaining_secs: u64,
    /// Fraction of timeout elapsed (0.0–1.0+).
    pub elapsed_fraction: f64,
    /// Recommended action.
    pub action: HeartbeatAction,
}

/// Errors from heartbeat evaluation.
#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Evaluate the heartbeat status of a will ledger.
///
/// Returns `None` when no will is configured — there is no timeout to
/// measure against.
///
/// # Arguments
/// * `ledger` — the will ledger
/// * `now` — current time
/// * `config` — heartbeat thresholds
pub fn evaluate_heartbeat(
    ledger: &WillLedger,
    now: Timestamp,
    config: &HeartbeatConfig,
) -> Option<HeartbeatStatus> {
    let timeout_secs = ledger.duration()?.secs();

    let elapsed_secs = now.saturating_sub(ledger.last_visited());
    let remaining_secs = timeout_secs.saturating_sub(elapsed_secs);
    // Timeout is always positive, the division is safe
    let elapsed_fraction = elapsed_secs as f64 / timeout_secs as f64;

    // Claimable boundary is the claim eligibility boundary: inclusive >=
    let action = if elapsed_secs >= timeout_secs {
        HeartbeatAction::Claimable
    } else if elapsed_fraction >= config.critical_threshold {
        HeartbeatAction::PingRequired
    } else if elapsed_fraction >= config.ping_threshold {
        HeartbeatAction::PingRecommended
    } else {
        HeartbeatAction::Healthy
    };

    Some(HeartbeatStatus {
        elapsed_secs,
        remaining_secs,
        elapsed_fraction,
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountId, Timeout};

    fn make_test_ledger(timeout_secs: u64) -> WillLedger {
        let owner = AccountId::new("owner").unwrap();
        let heir = AccountId::new("heir").unwrap();
        let mut ledger = WillLedger::new(owner.clone(), 0);
        ledger
            .set_will(&owner, heir, Timeout::from_secs(timeout_secs).unwrap(), 0)
            .unwrap();
        ledger
    }

    #[test]
    fn test_healthy_status() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default();
        let status = evaluate_heartbeat(&ledger, 100, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::Healthy);
        assert!((status.elapsed_fraction - 0.1).abs() < 0.001);
        assert_eq!(status.remaining_secs, 900);
    }

    #[test]
    fn test_ping_recommended() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default(); // threshold at 0.5
                                                 // 600 of 1000 seconds elapsed = 0.6
        let status = evaluate_heartbeat(&ledger, 600, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::PingRecommended);
        assert!((status.elapsed_fraction - 0.6).abs() < 0.001);
    }

    #[test]
    fn test_ping_required() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default(); // critical at 0.9
                                                 // 950 of 1000 seconds elapsed = 0.95
        let status = evaluate_heartbeat(&ledger, 950, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::PingRequired);
        assert!((status.elapsed_fraction - 0.95).abs() < 0.001);
    }

    #[test]
    fn test_claimable() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default();
        let status = evaluate_heartbeat(&ledger, 1100, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::Claimable);
        assert_eq!(status.remaining_secs, 0);
    }

    #[test]
    fn test_claimable_at_exact_boundary() {
        // Must agree with claim eligibility: inclusive at exactly 100%
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default();
        let status = evaluate_heartbeat(&ledger, 1000, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::Claimable);
    }

    #[test]
    fn test_zero_elapsed() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default();
        let status = evaluate_heartbeat(&ledger, 0, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::Healthy);
        assert!(status.elapsed_fraction.abs() < 0.001);
    }

    #[test]
    fn test_exactly_at_ping_threshold() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default(); // threshold at 0.5
        let status = evaluate_heartbeat(&ledger, 500, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::PingRecommended);
    }

    #[test]
    fn test_exactly_at_critical_threshold() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig::default(); // critical at 0.9
        let status = evaluate_heartbeat(&ledger, 900, &config).unwrap();

        assert_eq!(status.action, HeartbeatAction::PingRequired);
    }

    #[test]
    fn test_custom_thresholds() {
        let ledger = make_test_ledger(1000);
        let config = HeartbeatConfig {
            ping_threshold: 0.3,
            critical_threshold: 0.7,
            poll_interval_secs: 600,
        };

        // 350 of 1000 = 0.35 (past 0.3 threshold)
        let status = evaluate_heartbeat(&ledger, 350, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::PingRecommended);

        // 750 of 1000 = 0.75 (past 0.7 critical)
        let status = evaluate_heartbeat(&ledger, 750, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::PingRequired);
    }

    #[test]
    fn test_unconfigured_ledger_has_no_heartbeat() {
        let ledger = WillLedger::new(AccountId::new("owner").unwrap(), 0);
        let config = HeartbeatConfig::default();

        assert!(evaluate_heartbeat(&ledger, 1_000_000, &config).is_none());
    }

    #[test]
    fn test_ping_resets_heartbeat() {
        let mut ledger = make_test_ledger(1000);
        let owner = ledger.owner().clone();
        let config = HeartbeatConfig::default();

        let status = evaluate_heartbeat(&ledger, 950, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::PingRequired);

        ledger.ping(&owner, 950).unwrap();

        let status = evaluate_heartbeat(&ledger, 960, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::Healthy);
    }

    #[test]
    fn test_config_validation() {
        let bad1 = HeartbeatConfig {
            ping_threshold: 0.0,
            critical_threshold: 0.9,
            poll_interval_secs: 3600,
        };
        assert!(bad1.validate().is_err());

        let bad2 = HeartbeatConfig {
            ping_threshold: 0.5,
            critical_threshold: 0.4, // less than ping
            poll_interval_secs: 3600,
        };
        assert!(bad2.validate().is_err());

        let bad3 = HeartbeatConfig {
            ping_threshold: 0.5,
            critical_threshold: 1.0, // not exclusive
            poll_interval_secs: 3600,
        };
        assert!(bad3.validate().is_err());

        let good = HeartbeatConfig::default();
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_six_month_will_realistic() {
        // 6 months = 15,724,800 seconds
        let ledger = make_test_ledger(Timeout::six_months().secs());
        let config = HeartbeatConfig::default();
        let six_months = Timeout::six_months().secs();

        // Just configured
        let status = evaluate_heartbeat(&ledger, 0, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::Healthy);

        // 3 months in (halfway)
        let status = evaluate_heartbeat(&ledger, six_months / 2, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::PingRecommended);

        // ~95% in
        let status = evaluate_heartbeat(&ledger, six_months / 100 * 95, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::PingRequired);

        // Past the timeout
        let status = evaluate_heartbeat(&ledger, six_months + 1, &config).unwrap();
        assert_eq!(status.action, HeartbeatAction::Claimable);
    }
}
