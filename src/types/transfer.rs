//! Transfer-related types for the payout dispatcher
//!
//! This module defines the transfer record produced by input parsing and the
//! scalar aliases shared between the dispatcher and the ledger client.

use alloy::primitives::Address;
use rust_decimal::Decimal;

/// Per-account sequence number (nonce)
///
/// Strictly increasing integer required by the network to order and
/// deduplicate submissions from one account.
pub type SequenceNumber = u64;

/// Fee price in wei per gas unit
///
/// Fixed once for the whole run and attached uniformly to every submission.
pub type FeePrice = u128;

/// A single validated payout awaiting submission
///
/// Immutable once created from input. The amount is kept in native units
/// (as read from the source file); conversion to wei happens only at the
/// ledger client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferRecord {
    /// Recipient account address
    pub recipient: Address,

    /// Amount to pay, in native units
    ///
    /// Invariant: at or above the configured minimum threshold. Rows below
    /// the threshold are dropped at load time and never reach the
    /// dispatcher.
    pub amount: Decimal,
}

impl TransferRecord {
    pub fn new(recipient: Address, amount: Decimal) -> Self {
        Self { recipient, amount }
    }
}
