//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transfer`: Transfer records and ledger scalar aliases
//! - `outcome`: Per-submission outcomes and settlement log entries
//! - `error`: Error types for the payout dispatcher

pub mod error;
pub mod outcome;
pub mod transfer;

pub use error::PayoutError;
pub use outcome::{DispatchReport, Outcome, SettlementLogEntry};
pub use transfer::{FeePrice, SequenceNumber, TransferRecord};
