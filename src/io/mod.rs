//! I/O module
//!
//! Handles input CSV parsing and the settlement sink.
//!
//! # Components
//!
//! - `csv_input` - `;`-delimited input parsing with column selection,
//!   minimum-amount threshold, and skip-offset
//! - `sink` - Append-only settlement log and the resumption loader

pub mod csv_input;
pub mod sink;

pub use csv_input::{load_transfers, InputFormat};
pub use sink::{load_settled, remaining_transfers, FileSink, SettlementSink, SINK_HEADER};
