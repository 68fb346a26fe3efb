//! Payout Dispatcher CLI
//!
//! Reads a `;`-delimited payout list, diffs it against the settlement log
//! from any previous run, verifies the funding account covers the rest,
//! and dispatches the pending transfers in concurrent batches with
//! per-transfer retry.
//!
//! # Usage
//!
//! ```bash
//! PRIVATE_KEY=0x... payout-dispatcher --input in_file.csv --output out_file.csv
//! payout-dispatcher --batch-size 100 --threshold 0.01 --max-retries 5
//! ```
//!
//! Every flag can also come from the environment (or a `.env` file):
//! `IN_FILE`, `OUT_FILE`, `RPC_ENDPOINT`, `BATCH_SIZE`, `THRESHOLD`, ...
//! The signing credential comes from `PRIVATE_KEY` only.
//!
//! # Exit Codes
//!
//! - 0: all pending transfers settled (or none were pending)
//! - 1: fatal pre-run error (missing credential, unreadable input,
//!   insufficient funds) or an aborted dispatch

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use payout_dispatcher::cli;
use payout_dispatcher::core::{dispatcher::BatchDispatcher, preflight};
use payout_dispatcher::io::{csv_input, sink, sink::FileSink};
use payout_dispatcher::ledger::{FeeOracle, LedgerClient, RpcLedgerClient};
use payout_dispatcher::types::PayoutError;
use std::env;
use std::io;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = cli::parse_args();

    let signer: PrivateKeySigner = env::var("PRIVATE_KEY")
        .map_err(|_| PayoutError::MissingCredential)?
        .trim()
        .parse()
        .context("PRIVATE_KEY is not a valid signing key")?;

    let transfers = csv_input::load_transfers(&args.input_file, &args.to_input_format())?;
    info!("Loaded {} transfers from {}", transfers.len(), args.input_file.display());

    // Resume: anything already in the settlement log is no longer pending.
    let settled = sink::load_settled(&args.output_file)?;
    if !settled.is_empty() {
        info!(
            "Found {} settled transfers in {}, resuming",
            settled.len(),
            args.output_file.display()
        );
    }
    let pending = sink::remaining_transfers(transfers, &settled);

    if pending.is_empty() {
        info!("Nothing to dispatch");
        return Ok(());
    }

    let client = RpcLedgerClient::connect(args.endpoint.clone(), signer);
    let funding = client.funding_address();
    let chain_id = client
        .chain_id()
        .await
        .context("Failed to reach the ledger endpoint")?;
    info!("Connected to chain {chain_id}, funding account {funding}");

    let balance = client
        .balance(funding)
        .await
        .context("Failed to query the funding account balance")?;
    info!("Funding balance: {balance}");

    preflight::check_funds(&pending, balance, args.fee_estimate)?;

    let fee_price = FeeOracle::new(args.gas_price).price_fee(&client).await;
    info!("Dispatching {} transfers at fee price {fee_price}", pending.len());

    let mut sink = FileSink::open(&args.output_file)?;
    let mut dispatcher = BatchDispatcher::new(
        &client,
        &mut sink,
        args.to_dispatch_config(),
        funding,
        fee_price,
    );

    let report = dispatcher.run(pending).await?;

    info!(
        "Done: {} settled in {} cycles",
        report.settled, report.cycles
    );

    if !report.abandoned.is_empty() {
        warn!("Abandoned {} transfers:", report.abandoned.len());
        for transfer in &report.abandoned {
            warn!("  {} {}", transfer.recipient, transfer.amount);
        }
        anyhow::bail!("{} transfers abandoned after retry cap", report.abandoned.len());
    }

    Ok(())
}
