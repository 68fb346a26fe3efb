//! Settlement sink
//!
//! Append-only, `;`-delimited log of confirmed transfers, one row per
//! settlement, header `address;value;tx_hash`. A row is flushed before the
//! dispatcher treats its transfer as no longer pending, so after a crash
//! the sink diffed against the original input recovers the true remaining
//! pending set. That diff is the resumption mechanism, implemented by
//! [`load_settled`] and [`remaining_transfers`].

use crate::types::{PayoutError, SettlementLogEntry, TransferRecord};
use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Header row written when the sink file is first created
pub const SINK_HEADER: &str = "address;value;tx_hash";

/// Durable record of settled transfers
///
/// `record` must not return until the entry is flushed: the sink is the
/// single source of truth for what has been paid, and an entry lost to
/// buffering would be re-paid on resume.
pub trait SettlementSink {
    fn record(&mut self, entry: &SettlementLogEntry) -> Result<(), PayoutError>;
}

/// File-backed settlement sink
///
/// Creation semantics support safe resume: a missing file is created with
/// the header row, an existing file is strictly appended to, and prior
/// history is never clobbered.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Open the sink at `path`, creating it with a header if absent
    pub fn open(path: &Path) -> Result<Self, PayoutError> {
        let exists = path.exists();

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        if !exists {
            writeln!(file, "{SINK_HEADER}")?;
            file.flush()?;
        }

        Ok(Self { file })
    }
}

impl SettlementSink for FileSink {
    fn record(&mut self, entry: &SettlementLogEntry) -> Result<(), PayoutError> {
        writeln!(
            self.file,
            "{};{};{}",
            entry.recipient, entry.amount, entry.tx_hash
        )
        .and_then(|()| self.file.flush())
        .map_err(|e| PayoutError::Sink {
            message: e.to_string(),
        })
    }
}

/// Load the `(recipient, amount)` pairs already settled in a sink file
///
/// Tolerates the header row and malformed lines (skipped with a debug
/// log), so a sink that was interrupted mid-write does not block resume.
/// Returns an empty list when the file does not exist.
pub fn load_settled(path: &Path) -> Result<Vec<(Address, Decimal)>, PayoutError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut settled = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split(';');

        let parsed = match (fields.next(), fields.next()) {
            (Some(address), Some(value)) => {
                Address::from_str(address.trim()).ok().zip(Decimal::from_str(value.trim()).ok())
            }
            _ => None,
        };

        match parsed {
            Some(pair) => settled.push(pair),
            None => debug!("Skipping unparseable sink line: {line}"),
        }
    }

    Ok(settled)
}

/// Multiset difference `input - settled` on `(recipient, amount)`
///
/// Input order is preserved. Duplicate pairs in the input are honored:
/// each settled occurrence cancels exactly one pending occurrence, so a
/// list that legitimately pays the same recipient the same amount twice
/// still dispatches the second payment.
pub fn remaining_transfers(
    input: Vec<TransferRecord>,
    settled: &[(Address, Decimal)],
) -> Vec<TransferRecord> {
    let mut settled_counts: HashMap<(Address, Decimal), usize> = HashMap::new();
    for pair in settled {
        *settled_counts.entry(*pair).or_default() += 1;
    }

    input
        .into_iter()
        .filter(|transfer| {
            match settled_counts.get_mut(&(transfer.recipient, transfer.amount)) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    false
                }
                _ => true,
            }
        })
        .collect()
}
