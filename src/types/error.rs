//! Error types for the payout dispatcher
//!
//! This module defines the run-level errors. Only the conditions here
//! terminate a run; per-transfer submission failures are absorbed into the
//! retry loop and never surface as a `PayoutError`.
//!
//! # Error Categories
//!
//! - **Pre-run fatal**: missing credential, unreadable input, insufficient
//!   aggregate balance. These abort before any submission.
//! - **Sink errors**: the settlement log is durability-before-progress; a
//!   failed write stops the run rather than risk an unrecorded payment.
//! - **Sequence refresh**: fatal only under the fail-fast policy, or when
//!   no sequence number was ever fetched.

use rust_decimal::Decimal;
use thiserror::Error;

/// Run-level error type for the payout dispatcher
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayoutError {
    /// The funding account cannot cover the pending transfers plus fees
    ///
    /// Raised by the preflight check before any submission; no partial
    /// dispatch is attempted.
    #[error("Insufficient funds on the funding account: required {required}, available {available}")]
    InsufficientFunds {
        /// Sum of pending amounts plus the per-transfer fee estimate
        required: Decimal,
        /// Current balance of the funding account
        available: Decimal,
    },

    /// No signing credential was provided
    #[error("No funding credential: set the PRIVATE_KEY environment variable")]
    MissingCredential,

    /// I/O error while reading input or writing the settlement log
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// Input CSV could not be read
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// The settlement sink rejected a write
    #[error("Settlement sink error: {message}")]
    Sink {
        /// Description of the sink failure
        message: String,
    },

    /// The account sequence number could not be fetched
    ///
    /// Raised under the fail-fast refresh policy, or in best-effort mode
    /// when the very first fetch fails and there is no last known value to
    /// fall back on.
    #[error("Sequence number refresh failed: {message}")]
    SequenceRefresh {
        /// Description of the ledger query failure
        message: String,
    },
}

impl From<std::io::Error> for PayoutError {
    fn from(error: std::io::Error) -> Self {
        PayoutError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for PayoutError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        PayoutError::Parse {
            line,
            message: error.to_string(),
        }
    }
}
