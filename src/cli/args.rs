use crate::core::dispatcher::{DispatchConfig, SequenceRefreshPolicy};
use crate::io::csv_input::InputFormat;
use crate::types::FeePrice;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Disburse a list of transfers from a single funding account
#[derive(Parser, Debug)]
#[command(name = "payout-dispatcher")]
#[command(about = "Batch-dispatch payouts over a ledger network, with retries and safe resume", long_about = None)]
pub struct CliArgs {
    /// Input CSV file with the payout list (`;`-delimited)
    #[arg(long = "input", env = "IN_FILE", value_name = "FILE", default_value = "in_file.csv")]
    pub input_file: PathBuf,

    /// Settlement log; appended to (never clobbered) across runs
    #[arg(long = "output", env = "OUT_FILE", value_name = "FILE", default_value = "out_file.csv")]
    pub output_file: PathBuf,

    /// JSON-RPC endpoint of the ledger network
    #[arg(
        long = "endpoint",
        env = "RPC_ENDPOINT",
        value_name = "URL",
        default_value = "https://rpc.callisto.network/"
    )]
    pub endpoint: Url,

    /// Zero-based input column holding the recipient address
    #[arg(long = "address-col", env = "ADDRESS_COL", value_name = "COL", default_value_t = 0)]
    pub address_col: usize,

    /// Zero-based input column holding the amount
    #[arg(long = "value-col", env = "VALUE_COL", value_name = "COL", default_value_t = 3)]
    pub value_col: usize,

    /// Minimum payout amount; smaller rows are skipped
    #[arg(long = "threshold", env = "THRESHOLD", value_name = "AMOUNT", default_value = "0")]
    pub threshold: Decimal,

    /// Number of leading input rows to skip
    #[arg(long = "skip", env = "SKIP_LINES", value_name = "ROWS", default_value_t = 0)]
    pub skip: usize,

    /// Number of transfers submitted concurrently per batch
    #[arg(long = "batch-size", env = "BATCH_SIZE", value_name = "SIZE", default_value_t = 500)]
    pub batch_size: usize,

    /// Pause between batches, in seconds (0 permitted)
    #[arg(long = "batch-delay", env = "BATCH_DELAY", value_name = "SECS", default_value_t = 3)]
    pub batch_delay_secs: u64,

    /// Backoff before a retry cycle, in seconds
    #[arg(long = "retry-delay", env = "RETRY_DELAY", value_name = "SECS", default_value_t = 10)]
    pub retry_delay_secs: u64,

    /// Maximum retry cycles before abandoning failing transfers
    ///
    /// Unset means retry forever.
    #[arg(long = "max-retries", env = "MAX_RETRIES", value_name = "COUNT")]
    pub max_retries: Option<u32>,

    /// Pin the fee price (wei per gas), bypassing fee discovery
    #[arg(long = "gas-price", env = "GAS_PRICE", value_name = "WEI")]
    pub gas_price: Option<FeePrice>,

    /// Per-transfer fee estimate for the preflight funds check
    #[arg(long = "fee-estimate", env = "FEE_ESTIMATE", value_name = "AMOUNT", default_value = "0.022")]
    pub fee_estimate: Decimal,

    /// Abort the run when a sequence number refresh fails
    ///
    /// Default is best-effort: log and proceed with the last known value.
    #[arg(long = "fail-fast-sequence", env = "FAIL_FAST_SEQUENCE")]
    pub fail_fast_sequence: bool,
}

impl CliArgs {
    /// Build the input file description from the column/filter flags
    pub fn to_input_format(&self) -> InputFormat {
        InputFormat {
            address_col: self.address_col,
            value_col: self.value_col,
            threshold: self.threshold,
            skip: self.skip,
        }
    }

    /// Build the dispatcher configuration from the batching flags
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        let sequence_policy = if self.fail_fast_sequence {
            SequenceRefreshPolicy::FailFast
        } else {
            SequenceRefreshPolicy::BestEffort
        };

        DispatchConfig::new(
            self.batch_size,
            Duration::from_secs(self.batch_delay_secs),
            Duration::from_secs(self.retry_delay_secs),
            self.max_retries,
            sequence_policy,
        )
    }
}
