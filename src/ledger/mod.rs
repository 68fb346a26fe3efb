//! Ledger client boundary
//!
//! Everything the dispatcher needs from the remote ledger network sits
//! behind the [`LedgerClient`] trait: sequence number and balance queries,
//! fee-price discovery, and submit-and-confirm of a signed transfer.
//!
//! # Components
//!
//! - `client` - The `LedgerClient` trait and `LedgerError`
//! - `rpc` - JSON-RPC implementation backed by an alloy provider
//! - `fee` - Fee oracle with a conservative fallback price

pub mod client;
pub mod fee;
pub mod rpc;

pub use client::{LedgerClient, LedgerError};
pub use fee::{FeeOracle, FALLBACK_FEE_PRICE, FEE_PRICE_BUMP};
pub use rpc::RpcLedgerClient;
