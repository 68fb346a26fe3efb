//! Input CSV parsing
//!
//! Reads the `;`-delimited payout list into [`TransferRecord`]s. The file
//! has no assumed header: any row whose value column does not parse as a
//! number is skipped, which covers header rows and footers alike. Column
//! positions, the minimum-amount threshold, and the skip-offset are all
//! configurable.

use crate::types::{PayoutError, TransferRecord};
use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Shape of the input file
#[derive(Debug, Clone)]
pub struct InputFormat {
    /// Zero-based column holding the recipient address
    pub address_col: usize,

    /// Zero-based column holding the amount in native units
    pub value_col: usize,

    /// Minimum payout amount; rows strictly below it are dropped
    pub threshold: Decimal,

    /// Number of leading rows to skip before parsing begins
    pub skip: usize,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            address_col: 0,
            value_col: 3,
            threshold: Decimal::ZERO,
            skip: 0,
        }
    }
}

/// Load and filter the payout list
///
/// Returns transfers in input order. Rows are dropped (never erroring the
/// run) when:
/// - the value column is missing or not a number (header rows),
/// - the amount is strictly below the threshold,
/// - the address column is missing or syntactically invalid (logged at
///   `warn`, since a typoed address would otherwise be retried forever).
///
/// # Errors
///
/// Only file-level problems are fatal: a missing or unreadable input file
/// aborts the run before any submission.
pub fn load_transfers(path: &Path, format: &InputFormat) -> Result<Vec<TransferRecord>, PayoutError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                PayoutError::Io {
                    message: format!("Failed to open input file '{}': {e}", path.display()),
                }
            } else {
                e.into()
            }
        })?;

    let mut transfers = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 1;

        if index < format.skip {
            continue;
        }

        let Some(amount) = record
            .get(format.value_col)
            .and_then(|value| Decimal::from_str(value).ok())
        else {
            debug!("Line {line}: no numeric value in column {}, skipping", format.value_col);
            continue;
        };

        if amount < format.threshold {
            debug!("Line {line}: amount {amount} below threshold, skipping");
            continue;
        }

        let recipient = match record.get(format.address_col).map(Address::from_str) {
            Some(Ok(address)) => address,
            _ => {
                warn!(
                    "Line {line}: invalid recipient address '{}', skipping",
                    record.get(format.address_col).unwrap_or_default()
                );
                continue;
            }
        };

        transfers.push(TransferRecord::new(recipient, amount));
    }

    Ok(transfers)
}
