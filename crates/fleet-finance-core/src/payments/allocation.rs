//! Splitting an emergency-fund draw across a pool's investments.
//!
//! The split is an explicit strategy rather than a hardcoded formula so the
//! rule is visible, testable, and swappable per deployment.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::FleetFinanceError;
use crate::types::Money;
use crate::FleetFinanceResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationStrategy {
    /// Weight each share by `principal / Σ principals`.
    #[default]
    ProRataByPrincipal,
    /// Identical share for every investment regardless of stake size.
    EqualSplit,
}

/// Splits `draw` into one share per entry of `principals`, in order.
///
/// Shares are settled at `dp` decimal places by the largest-remainder
/// method: every share is floored to the precision, then the leftover units
/// go to the shares that lost the biggest fractions (larger principal wins
/// ties). The shares therefore always sum to the draw exactly.
pub fn allocate_draw(
    draw: Money,
    principals: &[Money],
    strategy: AllocationStrategy,
    dp: u32,
) -> FleetFinanceResult<Vec<Money>> {
    if draw <= Decimal::ZERO {
        return Err(FleetFinanceError::Validation {
            field: "emergency_fund_draw".into(),
            reason: format!("draw must be positive, got {draw}"),
        });
    }
    if draw != draw.round_dp_with_strategy(dp, RoundingStrategy::ToZero) {
        return Err(FleetFinanceError::Validation {
            field: "emergency_fund_draw".into(),
            reason: format!("draw {draw} is not expressible at {dp} decimal places"),
        });
    }
    if principals.is_empty() {
        return Err(FleetFinanceError::Validation {
            field: "principals".into(),
            reason: "cannot allocate a draw across zero investments".into(),
        });
    }
    if principals.iter().any(|p| *p < Decimal::ZERO) {
        return Err(FleetFinanceError::Validation {
            field: "principals".into(),
            reason: "principals cannot be negative".into(),
        });
    }

    let total: Money = principals.iter().copied().sum();
    let count = Decimal::from(principals.len());

    let raw_shares: Vec<Decimal> = match strategy {
        AllocationStrategy::ProRataByPrincipal => {
            if total <= Decimal::ZERO {
                return Err(FleetFinanceError::Validation {
                    field: "principals".into(),
                    reason: "pool has no remaining principal to allocate the draw against".into(),
                });
            }
            principals.iter().map(|p| draw * p / total).collect()
        }
        AllocationStrategy::EqualSplit => principals.iter().map(|_| draw / count).collect(),
    };

    let mut shares: Vec<Money> = raw_shares
        .iter()
        .map(|raw| raw.round_dp_with_strategy(dp, RoundingStrategy::ToZero))
        .collect();

    let unit = Decimal::new(1, dp);
    let floored: Money = shares.iter().copied().sum();
    let leftover_units = ((draw - floored) / unit).to_i64().ok_or_else(|| {
        FleetFinanceError::Validation {
            field: "emergency_fund_draw".into(),
            reason: format!("draw {draw} cannot be distributed at {dp} decimal places"),
        }
    })?;

    // Hand the leftover units to the biggest fractional losers.
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = raw_shares[a] - shares[a];
        let frac_b = raw_shares[b] - shares[b];
        frac_b
            .cmp(&frac_a)
            .then_with(|| principals[b].cmp(&principals[a]))
            .then_with(|| a.cmp(&b))
    });
    for &idx in order.iter().take(leftover_units.max(0) as usize) {
        shares[idx] += unit;
    }

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn pro_rata_shares_follow_principal_weights() {
        let shares = allocate_draw(
            dec!(10_000),
            &[dec!(500_000), dec!(300_000), dec!(200_000)],
            AllocationStrategy::ProRataByPrincipal,
            2,
        )
        .unwrap();
        assert_eq!(shares, vec![dec!(5_000.00), dec!(3_000.00), dec!(2_000.00)]);
    }

    #[test]
    fn shares_sum_exactly_to_the_draw() {
        // 100.00 over three equal stakes cannot split evenly; the remainder
        // cent must land somewhere, and the total must stay exact.
        let shares = allocate_draw(
            dec!(100),
            &[dec!(1_000), dec!(1_000), dec!(1_000)],
            AllocationStrategy::ProRataByPrincipal,
            2,
        )
        .unwrap();
        let total: Decimal = shares.iter().copied().sum();
        assert_eq!(total, dec!(100));
        assert!(shares.iter().all(|s| *s == dec!(33.33) || *s == dec!(33.34)));
    }

    #[test]
    fn awkward_weights_still_sum_exactly() {
        let principals = [dec!(123_457), dec!(98_765), dec!(55_555), dec!(1)];
        let shares = allocate_draw(
            dec!(7_777.77),
            &principals,
            AllocationStrategy::ProRataByPrincipal,
            2,
        )
        .unwrap();
        let total: Decimal = shares.iter().copied().sum();
        assert_eq!(total, dec!(7_777.77));
        assert!(shares.iter().all(|s| *s >= Decimal::ZERO));
    }

    #[test]
    fn equal_split_ignores_stake_size() {
        let shares = allocate_draw(
            dec!(99),
            &[dec!(900_000), dec!(50_000), dec!(50_000)],
            AllocationStrategy::EqualSplit,
            2,
        )
        .unwrap();
        let total: Decimal = shares.iter().copied().sum();
        assert_eq!(total, dec!(99));
        assert!(shares.iter().all(|s| *s == dec!(33.00)));
    }

    #[test]
    fn zero_principal_investments_get_nothing_pro_rata() {
        let shares = allocate_draw(
            dec!(600),
            &[dec!(150_000), dec!(0), dec!(50_000)],
            AllocationStrategy::ProRataByPrincipal,
            2,
        )
        .unwrap();
        assert_eq!(shares, vec![dec!(450.00), dec!(0), dec!(150.00)]);
    }

    #[test]
    fn fully_exited_pool_cannot_absorb_a_draw() {
        let result = allocate_draw(
            dec!(600),
            &[dec!(0), dec!(0)],
            AllocationStrategy::ProRataByPrincipal,
            2,
        );
        assert!(matches!(result, Err(FleetFinanceError::Validation { .. })));
    }

    #[test]
    fn invalid_draws_are_rejected() {
        let principals = [dec!(1_000)];
        for bad in [dec!(0), dec!(-5)] {
            assert!(allocate_draw(bad, &principals, AllocationStrategy::default(), 2).is_err());
        }
        // Sub-cent draw cannot be settled at two decimal places.
        assert!(allocate_draw(dec!(10.005), &principals, AllocationStrategy::default(), 2).is_err());
        // No investments at all.
        assert!(allocate_draw(dec!(10), &[], AllocationStrategy::default(), 2).is_err());
    }
}
