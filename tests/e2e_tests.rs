//! End-to-end integration tests
//!
//! These tests drive the full pipeline (input CSV parsing, resumption
//! diff, preflight, batch dispatch, settlement sink) against a scripted
//! in-memory ledger and real temporary files, and assert on the durable
//! settlement log the way a resuming operator would.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use payout_dispatcher::core::dispatcher::{BatchDispatcher, DispatchConfig, SequenceRefreshPolicy};
use payout_dispatcher::core::preflight;
use payout_dispatcher::io::csv_input::{load_transfers, InputFormat};
use payout_dispatcher::io::sink::{load_settled, remaining_transfers, FileSink, SettlementSink, SINK_HEADER};
use payout_dispatcher::ledger::{FeeOracle, LedgerClient, LedgerError, FALLBACK_FEE_PRICE};
use payout_dispatcher::types::{
    FeePrice, PayoutError, SequenceNumber, SettlementLogEntry, TransferRecord,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Scripted ledger: accepts everything except recipients told to fail
/// their first N attempts; fee queries can be made to fail.
struct ScriptedLedger {
    state: Mutex<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    sequence: SequenceNumber,
    fee_fails: bool,
    fee_prices: Vec<FeePrice>,
    attempts: HashMap<Address, usize>,
    failures: HashMap<Address, usize>,
    next_hash: u64,
}

impl ScriptedLedger {
    fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn fail_first(self, recipient: Address, count: usize) -> Self {
        self.state.lock().unwrap().failures.insert(recipient, count);
        self
    }

    fn with_failing_fee_query(self) -> Self {
        self.state.lock().unwrap().fee_fails = true;
        self
    }

    fn fee_prices(&self) -> Vec<FeePrice> {
        self.state.lock().unwrap().fee_prices.clone()
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn sequence_number(&self, _account: Address) -> Result<SequenceNumber, LedgerError> {
        Ok(self.state.lock().unwrap().sequence)
    }

    async fn balance(&self, _account: Address) -> Result<Decimal, LedgerError> {
        Ok(Decimal::from(1_000_000))
    }

    async fn recommended_fee_price(&self) -> Result<FeePrice, LedgerError> {
        if self.state.lock().unwrap().fee_fails {
            return Err(LedgerError::Network {
                message: "gas price query timed out".to_string(),
            });
        }
        Ok(2_000_000_000)
    }

    async fn submit(
        &self,
        transfer: &TransferRecord,
        fee_price: FeePrice,
        _sequence: SequenceNumber,
    ) -> Result<B256, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.fee_prices.push(fee_price);

        let attempts = state.attempts.entry(transfer.recipient).or_default();
        *attempts += 1;
        let attempt = *attempts;

        if attempt <= state.failures.get(&transfer.recipient).copied().unwrap_or(0) {
            return Err(LedgerError::Submission {
                message: "rejected".to_string(),
            });
        }

        state.sequence += 1;
        state.next_hash += 1;
        Ok(B256::from(U256::from(state.next_hash)))
    }
}

fn recipient(tag: usize) -> Address {
    Address::with_last_byte(tag as u8 + 1)
}

/// Write a two-column `address;value` input file with the given amounts
fn write_input(dir: &TempDir, amounts: &[&str]) -> PathBuf {
    let path = dir.path().join("in_file.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "address;value").unwrap();
    for (i, amount) in amounts.iter().enumerate() {
        writeln!(file, "{};{amount}", recipient(i)).unwrap();
    }
    path
}

fn two_column_format() -> InputFormat {
    InputFormat {
        address_col: 0,
        value_col: 1,
        threshold: Decimal::ZERO,
        skip: 0,
    }
}

fn fast_config(batch_size: usize) -> DispatchConfig {
    DispatchConfig {
        batch_size,
        batch_delay: Duration::ZERO,
        retry_delay: Duration::ZERO,
        max_retries: None,
        sequence_policy: SequenceRefreshPolicy::BestEffort,
    }
}

/// Load, diff against the sink, preflight, and dispatch
async fn run_pipeline(
    ledger: &ScriptedLedger,
    input: &PathBuf,
    output: &PathBuf,
    batch_size: usize,
) -> Result<usize, PayoutError> {
    let transfers = load_transfers(input, &two_column_format())?;
    let settled = load_settled(output)?;
    let pending = remaining_transfers(transfers, &settled);

    if pending.is_empty() {
        return Ok(0);
    }

    let balance = Decimal::from(1_000_000);
    preflight::check_funds(&pending, balance, Decimal::from_str("0.022").unwrap())?;

    let fee_price = FeeOracle::new(None).price_fee(ledger).await;

    let mut sink = FileSink::open(output)?;
    let report = BatchDispatcher::new(
        ledger,
        &mut sink,
        fast_config(batch_size),
        Address::ZERO,
        fee_price,
    )
    .run(pending)
    .await?;

    Ok(report.settled)
}

#[tokio::test]
async fn test_happy_path_writes_every_transfer_once() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &["1", "2.5", "0.75", "3", "0.1"]);
    let output = dir.path().join("out_file.csv");
    let ledger = ScriptedLedger::new();

    let settled = run_pipeline(&ledger, &input, &output, 2).await.unwrap();

    assert_eq!(settled, 5);

    let contents = fs::read_to_string(&output).unwrap();
    assert_eq!(contents.lines().next().unwrap(), SINK_HEADER);
    assert_eq!(contents.lines().count(), 6);

    let logged = load_settled(&output).unwrap();
    let recipients: HashSet<_> = logged.iter().map(|(address, _)| *address).collect();
    assert_eq!(recipients, (0..5).map(recipient).collect());
}

#[tokio::test]
async fn test_resumption_skips_already_settled_transfers() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &["1", "2", "3", "4", "5"]);
    let output = dir.path().join("out_file.csv");

    // Simulate a prior run that settled the first two transfers before
    // the process died.
    {
        let mut sink = FileSink::open(&output).unwrap();
        for i in 0..2 {
            sink.record(&SettlementLogEntry::new(
                recipient(i),
                Decimal::from(i as i64 + 1),
                B256::from(U256::from(900 + i as u64)),
            ))
            .unwrap();
        }
    }

    let ledger = ScriptedLedger::new();
    let settled = run_pipeline(&ledger, &input, &output, 10).await.unwrap();

    // Only the remaining three were dispatched.
    assert_eq!(settled, 3);

    // The log now covers all five, each exactly once.
    let logged = load_settled(&output).unwrap();
    assert_eq!(logged.len(), 5);
    let unique: HashSet<_> = logged.iter().collect();
    assert_eq!(unique.len(), 5);

    // A third run finds nothing left to do and writes nothing.
    let before = fs::read_to_string(&output).unwrap();
    let settled = run_pipeline(&ledger, &input, &output, 10).await.unwrap();
    assert_eq!(settled, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), before);
}

#[tokio::test]
async fn test_retry_convergence_against_real_sink() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &["1", "1", "1", "1", "1", "1", "1", "1", "1", "1"]);
    let output = dir.path().join("out_file.csv");

    let ledger = ScriptedLedger::new()
        .fail_first(recipient(3), 1)
        .fail_first(recipient(7), 1);

    let settled = run_pipeline(&ledger, &input, &output, 10).await.unwrap();

    assert_eq!(settled, 10);

    let contents = fs::read_to_string(&output).unwrap();
    let rows: Vec<&str> = contents.lines().skip(1).collect();
    assert_eq!(rows.len(), 10);

    // The two retried transfers settle last, after the eight first-cycle
    // writes.
    let late: HashSet<String> = rows[8..]
        .iter()
        .map(|row| row.split(';').next().unwrap().to_string())
        .collect();
    assert_eq!(
        late,
        HashSet::from([recipient(3).to_string(), recipient(7).to_string()])
    );
}

#[tokio::test]
async fn test_insufficient_funds_aborts_with_zero_sink_writes() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &["6", "5"]);
    let output = dir.path().join("out_file.csv");

    let transfers = load_transfers(&input, &two_column_format()).unwrap();
    // Balance of 10 cannot cover 11 plus fees.
    let result = preflight::check_funds(
        &transfers,
        Decimal::from(10),
        Decimal::from_str("0.022").unwrap(),
    );

    assert!(matches!(
        result,
        Err(PayoutError::InsufficientFunds { .. })
    ));
    // The sink was never opened, let alone written.
    assert!(!output.exists());
}

#[tokio::test]
async fn test_fee_query_failure_uses_fallback_for_every_submission() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &["1", "2", "3"]);
    let output = dir.path().join("out_file.csv");
    let ledger = ScriptedLedger::new().with_failing_fee_query();

    let settled = run_pipeline(&ledger, &input, &output, 2).await.unwrap();

    assert_eq!(settled, 3);
    let prices = ledger.fee_prices();
    assert_eq!(prices.len(), 3);
    assert!(prices.iter().all(|&price| price == FALLBACK_FEE_PRICE));
}

#[tokio::test]
async fn test_threshold_filtered_rows_never_reach_the_sink() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &["0.005", "1", "0.009", "2"]);
    let output = dir.path().join("out_file.csv");
    let ledger = ScriptedLedger::new();

    let transfers = load_transfers(
        &input,
        &InputFormat {
            threshold: Decimal::from_str("0.01").unwrap(),
            ..two_column_format()
        },
    )
    .unwrap();
    assert_eq!(transfers.len(), 2);

    let mut sink = FileSink::open(&output).unwrap();
    BatchDispatcher::new(&ledger, &mut sink, fast_config(10), Address::ZERO, 1)
        .run(transfers)
        .await
        .unwrap();

    let logged = load_settled(&output).unwrap();
    let recipients: HashSet<_> = logged.iter().map(|(address, _)| *address).collect();
    assert_eq!(recipients, HashSet::from([recipient(1), recipient(3)]));
}
