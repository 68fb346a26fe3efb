//! Core business logic
//!
//! # Components
//!
//! - `preflight` - Aggregate funds check, run before any submission
//! - `dispatcher` - The batch dispatch engine: sequencing, concurrent
//!   submission, outcome collection, and the retry loop

pub mod dispatcher;
pub mod preflight;

pub use dispatcher::{BatchDispatcher, DispatchConfig, SequenceRefreshPolicy};
pub use preflight::check_funds;
