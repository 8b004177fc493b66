//! Decimal <-> integer minor-unit conversion at the API boundary.
//!
//! All arithmetic inside the core happens on i64 minor units (cents);
//! Decimal only exists on the wire.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::LedgerError;

/// Fractional digits of the ledger currency (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Convert a client-supplied decimal amount into minor units.
///
/// Rejects amounts with more than [`MINOR_UNIT_SCALE`] fractional digits
/// rather than rounding them silently, and surfaces overflow instead of
/// truncating. Sign is preserved; positivity is the caller's rule.
pub fn to_minor_units(amount: Decimal) -> Result<i64, LedgerError> {
    if amount.normalize().scale() > MINOR_UNIT_SCALE {
        return Err(LedgerError::InvalidPrecision {
            value: amount.to_string(),
            max_scale: MINOR_UNIT_SCALE,
        });
    }

    let multiplier = Decimal::from(10_i64.pow(MINOR_UNIT_SCALE));
    amount
        .checked_mul(multiplier)
        .and_then(|scaled| scaled.to_i64())
        .ok_or(LedgerError::AmountOverflow)
}

/// Convert minor units back to a decimal for client display.
pub fn to_decimal(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}
