//! LastWill Ledger
//!
//! Dead-man's-switch custody: an owner deposits funds, names an heir and an
//! inactivity timeout, and must periodically prove liveness. If the owner
//! goes silent past the timeout, the heir may sweep the balance.
//!
//! # Concepts
//!
//! - **Owner**: configures the will, deposits funds, pings to reset the clock
//! - **Recipient**: may claim the full balance once the timeout has elapsed
//! - **Ping**: the liveness heartbeat — its only effect is resetting the
//!   inactivity clock
//!
//! # Design
//!
//! Pure logic — no I/O, no network, no async. Every operation takes the
//! authenticated caller identity and the current time as parameters; the
//! host (CLI, daemon, test harness) owns the `WillLedger` instance, supplies
//! both, and decides how to persist the result. Rejected operations never
//! leave partial state behind.

pub mod clock;
pub mod heartbeat;
pub mod ledger;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use heartbeat::{evaluate_heartbeat, HeartbeatAction, HeartbeatConfig, HeartbeatStatus};
pub use ledger::{AccountId, LedgerError, Timeout, WillConfig, WillLedger};
