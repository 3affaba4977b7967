//! The will ledger state machine.
//!
//! A single `WillLedger` holds the owner identity, the (optional) will
//! configuration, the liveness clock, and the balance. All four operations
//! — `set_will`, `deposit`, `ping`, `claim` — validate fully before touching
//! any field, so a rejected call leaves the ledger exactly as it was.
//!
//! # State machine
//!
//! ```text
//! Unconfigured --set_will--> Configured{recipient, duration}
//!       |                        |  ping / deposit reset the clock
//!       |                        v
//!       deposit ok          claim (after inactivity >= duration)
//!       claim: NotEligible      sweeps balance to zero, will persists
//! ```

use crate::clock::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from ledger operations.
///
/// None of these are fatal to the ledger itself — state is unchanged on any
/// rejected operation, and none are transient (a caller must fix the input
/// or wait for time to pass).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Claim not eligible: {0}")]
    NotEligible(String),

    #[error("Nothing to claim: balance is zero")]
    NothingToClaim,

    #[error("Balance overflow")]
    Overflow,
}

/// An externally authenticated identity.
///
/// The ledger performs no signature verification — whoever constructs the
/// operation call is responsible for having authenticated the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self, LedgerError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(
                "account id must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Inactivity timeout in seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timeout(u64);

impl Timeout {
    /// Create a timeout from a number of seconds.
    pub fn from_secs(secs: u64) -> Result<Self, LedgerError> {
        if secs == 0 {
            return Err(LedgerError::InvalidArgument(
                "duration must be positive".into(),
            ));
        }
        Ok(Self(secs))
    }

    /// Custom duration in days.
    pub fn days(days: u64) -> Result<Self, LedgerError> {
        let secs = days
            .checked_mul(86_400)
            .ok_or_else(|| LedgerError::InvalidArgument("duration too large".into()))?;
        Self::from_secs(secs)
    }

    /// 6 months (182 days).
    pub fn six_months() -> Self {
        Self(182 * 86_400)
    }

    /// 1 year (365 days).
    pub fn one_year() -> Self {
        Self(365 * 86_400)
    }

    /// Get the duration in seconds.
    pub fn secs(&self) -> u64 {
        self.0
    }
}

/// The will configuration. Recipient and duration are set together or not
/// at all, so "duration without recipient" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WillConfig {
    Unconfigured,
    Configured {
        recipient: AccountId,
        duration: Timeout,
    },
}

/// Single-owner custody ledger with a dead-man's-switch claim path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillLedger {
    owner: AccountId,
    will: WillConfig,
    last_visited: Timestamp,
    balance: u64,
}

impl WillLedger {
    /// Create a fresh ledger. The owner is fixed for the ledger's lifetime;
    /// `now` seeds the liveness clock.
    pub fn new(owner: AccountId, now: Timestamp) -> Self {
        Self {
            owner,
            will: WillConfig::Unconfigured,
            last_visited: now,
            balance: 0,
        }
    }

    /// Configure (or reconfigure) the will: who inherits, and after how much
    /// owner inactivity. Owner only. Also counts as owner activity.
    pub fn set_will(
        &mut self,
        caller: &AccountId,
        recipient: AccountId,
        duration: Timeout,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized);
        }
        if recipient == self.owner {
            return Err(LedgerError::InvalidArgument(
                "recipient must differ from owner".into(),
            ));
        }

        self.will = WillConfig::Configured {
            recipient,
            duration,
        };
        self.touch(now);
        Ok(())
    }

    /// Add funds to the ledger. Owner only. Also counts as owner activity.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        amount: u64,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized);
        }
        if amount == 0 {
            return Err(LedgerError::InvalidArgument(
                "deposit amount must be positive".into(),
            ));
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balance = balance;
        self.touch(now);
        Ok(())
    }

    /// The liveness heartbeat. Owner only. Resets the inactivity clock and
    /// changes nothing else.
    pub fn ping(&mut self, caller: &AccountId, now: Timestamp) -> Result<(), LedgerError> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized);
        }
        self.touch(now);
        Ok(())
    }

    /// Sweep the full balance to the recipient. Recipient only, and only
    /// once the owner has been inactive for at least the configured
    /// duration (boundary inclusive). Returns the swept amount.
    ///
    /// The will stays configured after a claim, so the arrangement can be
    /// refunded and claimed again in a later cycle.
    pub fn claim(&mut self, caller: &AccountId, now: Timestamp) -> Result<u64, LedgerError> {
        let (recipient, duration) = match &self.will {
            WillConfig::Unconfigured => {
                return Err(LedgerError::NotEligible("no will configured".into()));
            }
            WillConfig::Configured {
                recipient,
                duration,
            } => (recipient, *duration),
        };
        if caller != recipient {
            return Err(LedgerError::Unauthorized);
        }

        let deadline = self.last_visited.saturating_add(duration.secs());
        if now < deadline {
            return Err(LedgerError::NotEligible(format!(
                "{} seconds of owner inactivity remaining",
                deadline - now
            )));
        }
        if self.balance == 0 {
            return Err(LedgerError::NothingToClaim);
        }

        let swept = self.balance;
        self.balance = 0;
        Ok(swept)
    }

    // ── Read-only queries ──────────────────────────────────────────────

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn recipient(&self) -> Option<&AccountId> {
        match &self.will {
            WillConfig::Unconfigured => None,
            WillConfig::Configured { recipient, .. } => Some(recipient),
        }
    }

    pub fn duration(&self) -> Option<Timeout> {
        match &self.will {
            WillConfig::Unconfigured => None,
            WillConfig::Configured { duration, .. } => Some(*duration),
        }
    }

    pub fn last_visited(&self) -> Timestamp {
        self.last_visited
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.will, WillConfig::Configured { .. })
    }

    /// Earliest instant at which a claim becomes eligible, if a will is
    /// configured.
    pub fn claimable_at(&self) -> Option<Timestamp> {
        self.duration()
            .map(|d| self.last_visited.saturating_add(d.secs()))
    }

    // last_visited never moves backwards, even if the injected clock does
    fn touch(&mut self, now: Timestamp) {
        self.last_visited = self.last_visited.max(now);
    }
}
