//! The ledger client trait and its error type
//!
//! The dispatcher is generic over this trait; production wiring uses the
//! JSON-RPC implementation in [`crate::ledger::rpc`], tests use scripted
//! in-memory clients.

use crate::types::{FeePrice, SequenceNumber, TransferRecord};
use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by a ledger client
///
/// The dispatcher treats every [`LedgerError::Submission`] identically:
/// the transfer is requeued for the next retry cycle. Query errors
/// (`Network`) are handled per call site: the fee oracle falls back, and
/// the sequence fetch follows the configured refresh policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Query failure: timeout, unreachable endpoint, malformed response
    #[error("network error: {message}")]
    Network {
        /// Description of the transport failure
        message: String,
    },

    /// The network rejected or never confirmed a submitted transfer
    #[error("submission failed: {message}")]
    Submission {
        /// Description of the rejection
        message: String,
    },

    /// The transfer amount could not be converted to the wire unit
    #[error("invalid amount {amount}: {message}")]
    InvalidAmount {
        /// Amount as read from input, in native units
        amount: Decimal,
        /// Description of the conversion failure
        message: String,
    },
}

/// Capabilities the dispatcher requires from the ledger network
///
/// The signing credential is owned by the implementation; the dispatcher
/// never sees key material. Implementations must be shareable across the
/// concurrent submissions of one batch.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Next sequence number (nonce) for `account`
    ///
    /// Fetched once per batch; the returned value seeds the contiguous
    /// nonce run assigned to that batch's transfers.
    async fn sequence_number(&self, account: Address) -> Result<SequenceNumber, LedgerError>;

    /// Current balance of `account`, in native units
    async fn balance(&self, account: Address) -> Result<Decimal, LedgerError>;

    /// Network-recommended fee price, in wei per gas
    async fn recommended_fee_price(&self) -> Result<FeePrice, LedgerError>;

    /// Sign, broadcast, and confirm one transfer
    ///
    /// Suspends until the network either confirms the transfer (returning
    /// its settlement identifier) or rejects it. Signing is local; the
    /// broadcast-and-confirm round trip is the suspending part.
    async fn submit(
        &self,
        transfer: &TransferRecord,
        fee_price: FeePrice,
        sequence: SequenceNumber,
    ) -> Result<TxHash, LedgerError>;
}
