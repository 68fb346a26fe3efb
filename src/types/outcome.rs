//! Outcome types for submitted transfers
//!
//! Every submission resolves to exactly one [`Outcome`], and every outcome
//! is either persisted to the settlement sink (settled) or fed back into the
//! retry queue (failed). Outcomes are never silently dropped.

use crate::types::transfer::TransferRecord;
use alloy::primitives::{Address, TxHash};
use rust_decimal::Decimal;

/// Result of one transfer submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The network accepted and applied the transfer
    Settled {
        /// Network-issued settlement identifier (transaction hash)
        tx_hash: TxHash,
    },

    /// The submission was rejected or never confirmed
    ///
    /// All failure causes (rejected, underpriced, sequence conflict,
    /// network timeout) are treated identically: the transfer is requeued
    /// for the next retry cycle.
    Failed {
        /// Human-readable failure reason, for logging only
        reason: String,
    },
}

/// One row of the append-only settlement log
///
/// Written (and flushed) before the dispatcher proceeds past the batch that
/// produced it. The log is the single source of truth for what has actually
/// been paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLogEntry {
    /// Recipient account address
    pub recipient: Address,

    /// Amount paid, in native units
    pub amount: Decimal,

    /// Network-issued settlement identifier
    pub tx_hash: TxHash,
}

impl SettlementLogEntry {
    pub fn new(recipient: Address, amount: Decimal, tx_hash: TxHash) -> Self {
        Self {
            recipient,
            amount,
            tx_hash,
        }
    }
}

/// Summary of a completed dispatch run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Number of transfers confirmed and recorded in the sink
    pub settled: usize,

    /// Number of full passes over the pending set
    pub cycles: u32,

    /// Transfers given up on after the configured retry cap
    ///
    /// Always empty when no retry cap is configured (the default): the
    /// dispatcher then retries until every transfer settles.
    pub abandoned: Vec<TransferRecord>,
}
