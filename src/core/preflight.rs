//! Preflight funds validation
//!
//! A hard precondition check, not a retryable operation: if the funding
//! account cannot cover every pending transfer plus a per-transfer fee
//! estimate, the whole run aborts before a single submission. Partially
//! funded runs are never attempted.

use crate::types::{PayoutError, TransferRecord};
use rust_decimal::Decimal;

/// Default per-transfer fee estimate, in native units
///
/// Deliberately generous for a plain value transfer; operators can tighten
/// it via `--fee-estimate`.
pub const DEFAULT_FEE_ESTIMATE: Decimal = Decimal::from_parts(22, 0, 0, false, 3);

/// Verify the funding account can cover the whole pending set
///
/// Computes `required = sum(amounts) + fee_estimate * count` and compares
/// it against `available`. An exact match passes; only a strict shortfall
/// aborts.
///
/// # Errors
///
/// [`PayoutError::InsufficientFunds`] carrying both sides of the
/// comparison, for the operator-facing abort message.
pub fn check_funds(
    pending: &[TransferRecord],
    available: Decimal,
    fee_estimate: Decimal,
) -> Result<(), PayoutError> {
    let total: Decimal = pending.iter().map(|transfer| transfer.amount).sum();
    let required = total + fee_estimate * Decimal::from(pending.len());

    if required > available {
        return Err(PayoutError::InsufficientFunds {
            required,
            available,
        });
    }

    Ok(())
}
