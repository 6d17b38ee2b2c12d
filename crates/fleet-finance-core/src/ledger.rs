//! Investment ledger: source of truth for an investor's stake in a pool and
//! its exit history.
//!
//! Payments computed in earlier quarters are never touched by a later exit;
//! each quarter's payout is computed against the principal as it stood when
//! the declaration was processed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::FleetFinanceError;
use crate::store::InvestmentStore;
use crate::types::{ExitRecord, Investment, Money};
use crate::FleetFinanceResult;

/// Principal currently at work in the pool. Exits have already been applied
/// to the stored figure.
pub fn current_principal(investment: &Investment) -> Money {
    investment.current_principal
}

/// Sum of all committed exits.
pub fn total_exited(investment: &Investment) -> Money {
    investment.exits.iter().map(|e| e.amount).sum()
}

/// Reconstructs the originally invested amount from the current principal
/// and the exit history. Recomputed on every call rather than cached, so a
/// concurrent exit edit can never leave a stale figure behind.
pub fn original_principal(investment: &Investment) -> Money {
    investment.current_principal + total_exited(investment)
}

/// Share of the pool's investor capital contributed by one stake, as a
/// percentage.
pub fn investment_percentage(principal: Money, pool_investor_amount: Money) -> FleetFinanceResult<Decimal> {
    if pool_investor_amount <= Decimal::ZERO {
        return Err(FleetFinanceError::Validation {
            field: "pool_investor_amount".into(),
            reason: "pool investor capital must be positive".into(),
        });
    }
    Ok(principal / pool_investor_amount * Decimal::ONE_HUNDRED)
}

/// Checks that one more exit of `amount` fits the stake, given `staged_total`
/// of not-yet-committed exits on top of the committed history. The original
/// principal is reconstructed fresh for the check.
pub(crate) fn validate_exit_amount(
    investment: &Investment,
    amount: Money,
    staged_total: Money,
) -> FleetFinanceResult<()> {
    if amount <= Decimal::ZERO {
        return Err(FleetFinanceError::Validation {
            field: "amount".into(),
            reason: "exit amount must be positive".into(),
        });
    }

    let original = original_principal(investment);
    let exited = total_exited(investment);
    if exited + staged_total + amount > original {
        let available = original - exited - staged_total;
        return Err(FleetFinanceError::Validation {
            field: "amount".into(),
            reason: format!(
                "exit of {amount} exceeds remaining principal {available} on investment {}",
                investment.investment_id
            ),
        });
    }
    Ok(())
}

pub struct InvestmentLedger<'a, S: InvestmentStore> {
    store: &'a S,
}

impl<'a, S: InvestmentStore> InvestmentLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        InvestmentLedger { store }
    }

    /// All investments staked against a pool; the input set for payment
    /// generation. Storage errors propagate untouched.
    pub fn investments_for_pool(&self, pool_id: &str) -> FleetFinanceResult<Vec<Investment>> {
        self.store.get_by_pool(pool_id)
    }

    /// Appends one exit and persists the reduced principal. Fails without
    /// side effects when the amount is non-positive or would take total
    /// exits past the originally invested amount.
    pub fn record_exit(
        &self,
        investment_id: &str,
        amount: Money,
        date: NaiveDate,
    ) -> FleetFinanceResult<Investment> {
        let mut investment = self.store.get(investment_id)?;
        validate_exit_amount(&investment, amount, Decimal::ZERO)?;

        investment.exits.push(ExitRecord { amount, date });
        investment.current_principal -= amount;
        let saved = self.store.save(&investment)?;

        debug!(
            investment_id,
            %amount,
            remaining = %saved.current_principal,
            "recorded partial exit"
        );
        Ok(saved)
    }
}
