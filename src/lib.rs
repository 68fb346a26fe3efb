//! Payout Dispatcher Library
//! # Overview
//!
//! This library disburses a list of transfers (recipient + amount) from a
//! single funding account over a ledger network, tolerating per-transfer
//! failures and resuming safely across restarts.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (`TransferRecord`, `Outcome`, errors)
//! - [`cli`] - CLI argument parsing with env-var fallbacks
//! - [`core`] - Business logic components:
//!   - [`core::dispatcher`] - Batch dispatch engine: sequencing,
//!     concurrent submission, outcome collection, retry loop
//!   - [`core::preflight`] - Aggregate funds check before any submission
//! - [`io`] - Input CSV parsing and the append-only settlement sink
//! - [`ledger`] - Ledger client boundary: the client trait, the JSON-RPC
//!   implementation, and the fee oracle
//!
//! # Dispatch model
//!
//! The pending set is processed in cycles; each cycle splits it into
//! fixed-size batches submitted concurrently under one freshly fetched
//! account sequence number. Settled transfers are flushed to the
//! settlement log before the next batch starts; failed ones are retried
//! in the next cycle. Re-running against an existing log resumes from the
//! set difference, so an interrupted run never pays anyone twice.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod ledger;
pub mod types;

pub use core::{check_funds, BatchDispatcher, DispatchConfig, SequenceRefreshPolicy};
pub use io::{load_settled, load_transfers, remaining_transfers, FileSink, InputFormat, SettlementSink};
pub use ledger::{FeeOracle, LedgerClient, LedgerError, RpcLedgerClient};
pub use types::{
    DispatchReport, FeePrice, Outcome, PayoutError, SequenceNumber, SettlementLogEntry,
    TransferRecord,
};
