//! Centralised timing constants for funding evaluation and ledger settlement.
//!
//! The evaluator's re-check hints are derived from the hour projection in the
//! funding snapshot and pinned into a fixed window:
//!
//! | Constant              | Value   |
//! |-----------------------|---------|
//! | `MIN_REEVALUATE_MS`   | 5 min   |
//! | `MAX_REEVALUATE_MS`   | 30 min  |
//!
//! Receipt polling against the JSON-RPC relay shrinks under `cfg(test)` so the
//! unit tests do not sleep.

// ── Unit conversions ────────────────────────────────────────────────────────

pub const MILLIS_PER_SEC: u64 = 1_000;
pub const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SEC;
pub const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

// ── Re-evaluation window ────────────────────────────────────────────────────

/// Floor for the "re-check after" hint returned with every decision.
pub const MIN_REEVALUATE_MS: u64 = 5 * MILLIS_PER_MINUTE;

/// Ceiling for the "re-check after" hint. Also applies to very healthy agents.
pub const MAX_REEVALUATE_MS: u64 = 30 * MILLIS_PER_MINUTE;

/// Default cadence a caller uses when it polls agents on a fixed timer.
pub const DEFAULT_FUNDING_POLL_INTERVAL_MS: u64 = MIN_REEVALUATE_MS;

// ── Ledger settlement ───────────────────────────────────────────────────────

/// Delay between `eth_getTransactionReceipt` polls.
#[cfg(not(test))]
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 2 * MILLIS_PER_SEC;
#[cfg(test)]
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 1;

/// Receipt polls before the submission is reported as unsettled (one minute
/// at the production interval).
pub const RECEIPT_POLL_MAX_ATTEMPTS: u32 = 30;

/// Per-request timeout for relay HTTP calls.
pub const RELAY_REQUEST_TIMEOUT_SECS: u64 = 30;
