//! Risk-based position sizing for scalper orders.

use laabhum_core::{OmsError, OmsResult, Price, Quantity};
use rust_decimal::Decimal;

/// Reference account balance used when none is configured.
pub const DEFAULT_ACCOUNT_BALANCE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Whole units such that a stop-out loses at most `risk_percentage` of
/// `account_balance`:
///
/// `floor(account_balance * risk_percentage / (entry - stop_loss))`
///
/// Fails with `Validation` when the inputs are non-positive, the stop is
/// not below the entry, or the result rounds down to zero units.
pub fn scalper_quantity(
    account_balance: Decimal,
    risk_percentage: Decimal,
    entry: Price,
    stop_loss: Price,
) -> OmsResult<Quantity> {
    if !entry.is_positive() {
        return Err(OmsError::validation("price must be positive"));
    }
    if !stop_loss.is_positive() {
        return Err(OmsError::validation("stop loss must be positive"));
    }
    if risk_percentage <= Decimal::ZERO {
        return Err(OmsError::validation("risk percentage must be positive"));
    }
    if entry <= stop_loss {
        return Err(OmsError::validation(format!(
            "stop loss {stop_loss} must be below price {entry}"
        )));
    }
    if account_balance <= Decimal::ZERO {
        return Err(OmsError::validation("account balance must be positive"));
    }

    let risk_amount = account_balance
        .checked_mul(risk_percentage)
        .ok_or_else(|| OmsError::validation("position size out of range"))?;
    let risk_per_unit = entry.inner() - stop_loss.inner();
    let units = risk_amount
        .checked_div(risk_per_unit)
        .and_then(Quantity::from_decimal_floor)
        .ok_or_else(|| OmsError::validation("position size out of range"))?;

    if units.is_zero() {
        return Err(OmsError::validation(format!(
            "risk budget {risk_amount} is smaller than one unit of risk {risk_per_unit}"
        )));
    }
    Ok(units)
}
