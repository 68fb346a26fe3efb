//! Fee oracle
//!
//! Decides the fee price attached to every submission of a run. The price
//! is chosen exactly once, at run start: either the operator pins one via
//! configuration (the oracle is then bypassed entirely), or the network is
//! queried and the recommendation bumped slightly to keep the run out of
//! the bottom of the fee market.
//!
//! A failed query never stalls the run (paying more than minimal beats
//! blocking), so the oracle substitutes a deliberately high fallback price
//! and continues.

use crate::ledger::client::LedgerClient;
use crate::types::FeePrice;
use tracing::warn;

/// Conservative fallback price used when fee discovery fails: 1002 gwei
pub const FALLBACK_FEE_PRICE: FeePrice = 1_002_000_000_000;

/// Bump added on top of the network recommendation: 1 gwei
pub const FEE_PRICE_BUMP: FeePrice = 1_000_000_000;

/// Run-scoped fee price selector
#[derive(Debug, Clone, Default)]
pub struct FeeOracle {
    /// Operator-pinned price; set from `--gas-price`
    pinned: Option<FeePrice>,
}

impl FeeOracle {
    pub fn new(pinned: Option<FeePrice>) -> Self {
        Self { pinned }
    }

    /// Choose the fee price for this run
    ///
    /// Returns the pinned price when one is configured, without touching
    /// the network. Otherwise queries the client; on success the
    /// recommendation plus [`FEE_PRICE_BUMP`], on any failure
    /// [`FALLBACK_FEE_PRICE`].
    pub async fn price_fee<L: LedgerClient + ?Sized>(&self, client: &L) -> FeePrice {
        if let Some(price) = self.pinned {
            return price;
        }

        match client.recommended_fee_price().await {
            Ok(price) => price + FEE_PRICE_BUMP,
            Err(e) => {
                warn!("Fee price query failed, using fallback price: {e}");
                FALLBACK_FEE_PRICE
            }
        }
    }
}
