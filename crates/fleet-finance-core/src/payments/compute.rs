//! Per-investment payout arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FleetFinanceError;
use crate::types::Money;
use crate::FleetFinanceResult;

/// Decimal places money amounts are settled at.
pub const MONEY_DP: u32 = 2;

/// Rounds a money amount to `dp` places, half away from zero.
pub fn round_money(amount: Money, dp: u32) -> Money {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Gross quarterly return: `principal × roi_percentage / 100`, settled at
/// `dp` places. The principal is the post-exit figure, never the original.
pub fn gross_roi(principal: Money, roi_percentage: Decimal, dp: u32) -> FleetFinanceResult<Money> {
    if principal < Decimal::ZERO {
        return Err(FleetFinanceError::Validation {
            field: "principal".into(),
            reason: format!("principal cannot be negative, got {principal}"),
        });
    }
    if roi_percentage <= Decimal::ZERO {
        return Err(FleetFinanceError::Validation {
            field: "roi_percentage".into(),
            reason: format!("declared ROI must be positive, got {roi_percentage}"),
        });
    }
    Ok(round_money(
        principal * roi_percentage / Decimal::ONE_HUNDRED,
        dp,
    ))
}

/// Net amount owed to the investor. A payout can never go negative: when
/// deductions outweigh the gross return plus FD add-back, the result is
/// clamped to zero rather than carried as a debt.
pub fn net_payable(
    gross_roi: Money,
    emergency_fund_deduction: Money,
    fd_returns: Option<Money>,
    tds_deduction: Money,
) -> Money {
    let net = gross_roi - emergency_fund_deduction + fd_returns.unwrap_or(Decimal::ZERO)
        - tds_deduction;
    net.max(Decimal::ZERO)
}

/// ROI percentage implied by the stored gross amount, for display.
///
/// Once an admin overrides a payment's gross amount, the declaration's rate
/// no longer describes that payout; the implied rate is computed from the
/// stored figures instead and is never persisted. Falls back to the declared
/// percentage when the principal is zero.
pub fn effective_roi_percentage(
    gross_roi: Money,
    principal: Money,
    declared_roi_percentage: Decimal,
) -> Decimal {
    if principal > Decimal::ZERO {
        gross_roi / principal * Decimal::ONE_HUNDRED
    } else {
        declared_roi_percentage
    }
}
