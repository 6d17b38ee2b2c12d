//! Multi-exit editing sessions.
//!
//! Exits can be entered speculatively and saved together; a session stages
//! them in memory, validating each against the principal left after both
//! committed and staged exits, and commits all-or-nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::FleetFinanceError;
use crate::ledger::validate_exit_amount;
use crate::store::InvestmentStore;
use crate::types::{ExitRecord, Investment, Money};
use crate::FleetFinanceResult;

pub struct ExitSession {
    investment: Investment,
    staged: Vec<ExitRecord>,
}

impl ExitSession {
    /// Opens a session against a snapshot of the investment. The snapshot's
    /// version is what the commit will be checked against.
    pub fn begin(investment: Investment) -> Self {
        ExitSession {
            investment,
            staged: Vec::new(),
        }
    }

    pub fn investment(&self) -> &Investment {
        &self.investment
    }

    pub fn staged(&self) -> &[ExitRecord] {
        &self.staged
    }

    pub fn staged_total(&self) -> Money {
        self.staged.iter().map(|e| e.amount).sum()
    }

    /// Adds an exit to the uncommitted list. Rejected when non-positive or
    /// when committed plus staged exits would pass the original principal.
    pub fn stage_exit(&mut self, amount: Money, date: NaiveDate) -> FleetFinanceResult<()> {
        validate_exit_amount(&self.investment, amount, self.staged_total())?;
        self.staged.push(ExitRecord { amount, date });
        Ok(())
    }

    /// Appends all staged exits to the ledger in one write.
    ///
    /// The investment is re-read and its version compared against the
    /// session's snapshot; a mismatch means another writer committed in the
    /// meantime and the whole session fails with `StateConflict` so the
    /// caller can re-read and retry. On any validation failure nothing is
    /// persisted.
    pub fn commit<S: InvestmentStore>(self, store: &S) -> FleetFinanceResult<Investment> {
        if self.staged.is_empty() {
            return Ok(self.investment);
        }

        let mut fresh = store.get(&self.investment.investment_id)?;
        if fresh.version != self.investment.version {
            return Err(FleetFinanceError::StateConflict {
                entity: "investment",
                id: self.investment.investment_id.clone(),
            });
        }

        let staged_count = self.staged.len();
        let staged_total = self.staged_total();
        for exit in self.staged {
            validate_exit_amount(&fresh, exit.amount, Decimal::ZERO)?;
            fresh.current_principal -= exit.amount;
            fresh.exits.push(exit);
        }
        let saved = store.save(&fresh)?;

        info!(
            investment_id = %saved.investment_id,
            exits = staged_count,
            %staged_total,
            remaining = %saved.current_principal,
            "committed exit session"
        );
        Ok(saved)
    }
}
