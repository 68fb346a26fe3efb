//! Batch dispatch engine
//!
//! Drives the pending transfer set to completion in cycles. One cycle is a
//! full pass over the current pending set, split into fixed-size batches:
//!
//! ```text
//! Idle -> FetchingSequence -> SubmittingBatch -> CollectingOutcomes
//!      -> (MoreBatches | CycleComplete) -> (Retrying | Done)
//! ```
//!
//! # Sequencing
//!
//! The funding account's sequence number is the single serialization point
//! that makes concurrent submissions safe. It is fetched fresh once per
//! batch, not per transfer (which would serialize everything) and not once
//! per run (which would let one rejected batch poison every later nonce),
//! and the batch's transfers are assigned the contiguous run
//! `seq..seq + B` in input order. Batch boundaries are strict barriers: no
//! submission of batch N+1 starts before every task of batch N resolves,
//! so freshly fetched numbers can never collide with in-flight ones and no
//! in-process lock is needed.
//!
//! # Failure semantics
//!
//! A submission failure is never fatal to the run; it demotes the transfer
//! to the next retry cycle. By default the loop retries until everything
//! settles; an optional retry cap turns still-failing transfers into
//! terminal abandoned ones, reported but not retried.

use crate::io::sink::SettlementSink;
use crate::ledger::client::LedgerClient;
use crate::types::{
    DispatchReport, FeePrice, Outcome, PayoutError, SequenceNumber, SettlementLogEntry,
    TransferRecord,
};
use alloy::primitives::Address;
use futures::future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Default number of transfers submitted concurrently per batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default courtesy pause between batches
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(3);

/// Default backoff before a retry cycle
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// What to do when a per-batch sequence number fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceRefreshPolicy {
    /// Log and proceed with the last known value
    ///
    /// Favors liveness: a stale number risks nonce collisions in the next
    /// batch, but those surface as submission failures and are retried.
    #[default]
    BestEffort,

    /// Abort the run on the first failed refresh
    FailFast,
}

/// Configuration for the dispatch loop
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Number of transfers submitted concurrently per batch
    pub batch_size: usize,

    /// Pause between batches within a cycle (0 permitted)
    pub batch_delay: Duration,

    /// Backoff before starting a retry cycle
    pub retry_delay: Duration,

    /// Maximum retry cycles after the first attempt
    ///
    /// `None` retries forever, matching unattended operation. `Some(0)`
    /// abandons failures after the first cycle.
    pub max_retries: Option<u32>,

    /// Policy for failed sequence number refreshes
    pub sequence_policy: SequenceRefreshPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retries: None,
            sequence_policy: SequenceRefreshPolicy::default(),
        }
    }
}

impl DispatchConfig {
    /// Create a config, falling back to the default batch size on zero
    pub fn new(
        batch_size: usize,
        batch_delay: Duration,
        retry_delay: Duration,
        max_retries: Option<u32>,
        sequence_policy: SequenceRefreshPolicy,
    ) -> Self {
        let batch_size = if batch_size == 0 {
            warn!("Invalid batch size 0, using default ({DEFAULT_BATCH_SIZE})");
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };

        Self {
            batch_size,
            batch_delay,
            retry_delay,
            max_retries,
            sequence_policy,
        }
    }
}

/// The batch dispatcher
///
/// Owns the pending set for the duration of [`run`](Self::run) and is the
/// only writer to the settlement sink. Generic over the ledger client and
/// the sink so tests can drive it with scripted collaborators.
#[derive(Debug)]
pub struct BatchDispatcher<'a, L, S> {
    /// Ledger client shared by all concurrent submissions of a batch
    client: &'a L,

    /// Append-only settlement log; written and flushed per settled transfer
    sink: &'a mut S,

    config: DispatchConfig,

    /// Funding account whose sequence number orders all submissions
    funding: Address,

    /// Run-fixed fee price attached to every submission
    fee_price: FeePrice,
}

impl<'a, L: LedgerClient, S: SettlementSink> BatchDispatcher<'a, L, S> {
    pub fn new(
        client: &'a L,
        sink: &'a mut S,
        config: DispatchConfig,
        funding: Address,
        fee_price: FeePrice,
    ) -> Self {
        Self {
            client,
            sink,
            config,
            funding,
            fee_price,
        }
    }

    /// Dispatch every pending transfer until settled or abandoned
    ///
    /// An empty pending set completes immediately with zero cycles.
    ///
    /// # Errors
    ///
    /// Only sink write failures and (policy-dependent) sequence refresh
    /// failures abort the run; per-transfer submission errors are requeued
    /// internally.
    pub async fn run(
        &mut self,
        pending: Vec<TransferRecord>,
    ) -> Result<DispatchReport, PayoutError> {
        let mut pending = pending;
        let mut report = DispatchReport::default();
        let mut last_sequence: Option<SequenceNumber> = None;

        while !pending.is_empty() {
            report.cycles += 1;
            info!(
                cycle = report.cycles,
                pending = pending.len(),
                "Dispatch cycle starting"
            );

            let to_repeat = self
                .run_cycle(&pending, &mut last_sequence, &mut report)
                .await?;

            if to_repeat.is_empty() {
                break;
            }

            if let Some(cap) = self.config.max_retries {
                if report.cycles > cap {
                    warn!(
                        "Abandoning {} transfers after {cap} retry cycles",
                        to_repeat.len()
                    );
                    report.abandoned = to_repeat;
                    break;
                }
            }

            info!("Retrying {} transfers", to_repeat.len());
            pending = to_repeat;

            if !self.config.retry_delay.is_zero() {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        Ok(report)
    }

    /// One full pass over the pending set; returns the transfers to retry
    async fn run_cycle(
        &mut self,
        pending: &[TransferRecord],
        last_sequence: &mut Option<SequenceNumber>,
        report: &mut DispatchReport,
    ) -> Result<Vec<TransferRecord>, PayoutError> {
        let mut to_repeat = Vec::new();
        let mut sink_error: Option<PayoutError> = None;
        let total_batches = pending.len().div_ceil(self.config.batch_size);

        for (batch_index, batch) in pending.chunks(self.config.batch_size).enumerate() {
            let sequence = self.fetch_sequence(last_sequence).await?;

            let client = self.client;
            let fee_price = self.fee_price;
            let submissions = batch.iter().enumerate().map(|(offset, transfer)| {
                // Nonce assignment follows input order exactly; completion
                // order within the batch is irrelevant.
                let sequence = sequence + offset as SequenceNumber;
                async move { client.submit(transfer, fee_price, sequence).await }
            });

            // Barrier: every submission of this batch resolves before the
            // next batch fetches its sequence number.
            let results = future::join_all(submissions).await;

            for (transfer, result) in batch.iter().zip(results) {
                let outcome = match result {
                    Ok(tx_hash) => Outcome::Settled { tx_hash },
                    Err(e) => Outcome::Failed {
                        reason: e.to_string(),
                    },
                };

                match outcome {
                    Outcome::Settled { tx_hash } => {
                        // Durability before progress: flushed before the
                        // transfer stops counting as pending. A write failure
                        // must not short-circuit the batch, or every later
                        // settled outcome would vanish from the log and be
                        // paid again on resume. Record what we can, surface
                        // the rest for manual reconciliation, then abort.
                        let entry =
                            SettlementLogEntry::new(transfer.recipient, transfer.amount, tx_hash);
                        match self.sink.record(&entry) {
                            Ok(()) => report.settled += 1,
                            Err(e) => {
                                error!(
                                    recipient = %entry.recipient,
                                    amount = %entry.amount,
                                    tx_hash = %entry.tx_hash,
                                    "Settled on ledger but not persisted to the log; \
                                     reconcile by hand before re-running"
                                );
                                if sink_error.is_none() {
                                    sink_error = Some(e);
                                }
                            }
                        }
                    }
                    Outcome::Failed { reason } => {
                        warn!(
                            recipient = %transfer.recipient,
                            %reason,
                            "Submission failed, queued for retry"
                        );
                        to_repeat.push(transfer.clone());
                    }
                }
            }

            if let Some(e) = sink_error.take() {
                return Err(e);
            }

            if batch_index + 1 < total_batches && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        Ok(to_repeat)
    }

    /// Fetch a fresh sequence number, honoring the refresh policy
    async fn fetch_sequence(
        &self,
        last_sequence: &mut Option<SequenceNumber>,
    ) -> Result<SequenceNumber, PayoutError> {
        match self.client.sequence_number(self.funding).await {
            Ok(sequence) => {
                *last_sequence = Some(sequence);
                Ok(sequence)
            }
            Err(e) => match (self.config.sequence_policy, *last_sequence) {
                (SequenceRefreshPolicy::BestEffort, Some(sequence)) => {
                    warn!("Sequence refresh failed ({e}), proceeding with last known value {sequence}");
                    Ok(sequence)
                }
                // Fail-fast policy, or no known value to fall back on.
                _ => Err(PayoutError::SequenceRefresh {
                    message: e.to_string(),
                }),
            },
        }
    }
}
