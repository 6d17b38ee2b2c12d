//! Quarterly payment generation.
//!
//! For a finalized declaration, derives one payment per investment staked
//! against the declaration's pool and persists them. Generation is safe to
//! retry: existing payments are skipped, and the payment store's uniqueness
//! constraint on `(investment_id, declaration_id)` catches the race where a
//! concurrent run inserts first.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::FleetFinanceError;
use crate::ledger::current_principal;
use crate::payments::allocation::{allocate_draw, AllocationStrategy};
use crate::payments::compute::{gross_roi, net_payable, round_money, MONEY_DP};
use crate::store::{DeclarationStore, InvestmentStore, PaymentStore};
use crate::types::{
    Declaration, DeclarationId, Investment, InvestmentId, Money, Payment, PaymentId,
    PaymentStatus, Rate,
};
use crate::FleetFinanceResult;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub allocation: AllocationStrategy,
    /// Withholding rate applied to each gross return (0.10 = 10%). When
    /// unset, TDS defaults to zero and is entered per payment later.
    pub default_tds_rate: Option<Rate>,
    /// Decimal places money amounts are settled at.
    pub money_dp: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            allocation: AllocationStrategy::default(),
            default_tds_rate: None,
            money_dp: MONEY_DP,
        }
    }
}

/// One investment the engine could not settle. The rest of the pool is
/// unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationFailure {
    pub investment_id: InvestmentId,
    pub reason: String,
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub declaration_id: DeclarationId,
    /// Payments inserted by this run; the figure callers report as
    /// "N payments generated".
    pub generated: u32,
    /// Investments that already had a payment for this declaration.
    pub skipped_existing: u32,
    pub failures: Vec<GenerationFailure>,
    pub warnings: Vec<String>,
}

/// Deterministic payment identifier for one investment × declaration
/// settlement. Deriving it from the unique key keeps retried runs from
/// minting fresh identities for the same payment.
pub fn payment_id_for(declaration_id: &str, investment_id: &str) -> PaymentId {
    format!("{declaration_id}:{investment_id}")
}

pub struct PaymentEngine<'a, I, D, P> {
    investments: &'a I,
    declarations: &'a D,
    payments: &'a P,
    config: EngineConfig,
}

impl<'a, I, D, P> PaymentEngine<'a, I, D, P>
where
    I: InvestmentStore,
    D: DeclarationStore,
    P: PaymentStore,
{
    pub fn new(investments: &'a I, declarations: &'a D, payments: &'a P) -> Self {
        Self::with_config(investments, declarations, payments, EngineConfig::default())
    }

    pub fn with_config(
        investments: &'a I,
        declarations: &'a D,
        payments: &'a P,
        config: EngineConfig,
    ) -> Self {
        PaymentEngine {
            investments,
            declarations,
            payments,
            config,
        }
    }

    /// Generates pending payments for every investment in the declaration's
    /// pool.
    ///
    /// Per-investment failures are collected in the report rather than
    /// aborting the batch; one investor's storage hiccup must not hold up
    /// the rest of the pool. Callers treat the whole run as a critical
    /// section per declaration.
    pub fn generate_payments(&self, declaration_id: &str) -> FleetFinanceResult<GenerationReport> {
        let declaration = self.declarations.get(declaration_id)?;
        if !declaration.is_finalized {
            return Err(FleetFinanceError::Validation {
                field: "declaration_id".into(),
                reason: format!(
                    "declaration {declaration_id} must be finalized before payments are generated"
                ),
            });
        }

        let investments = self.investments.get_by_pool(&declaration.pool_id)?;

        let mut report = GenerationReport {
            declaration_id: declaration_id.to_string(),
            generated: 0,
            skipped_existing: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
        };

        if investments.is_empty() {
            report
                .warnings
                .push(format!("pool {} has no investments", declaration.pool_id));
            return Ok(report);
        }

        let principals: Vec<Money> = investments.iter().map(current_principal).collect();
        let deductions = match declaration.emergency_fund_draw {
            Some(draw) => allocate_draw(
                draw,
                &principals,
                self.config.allocation,
                self.config.money_dp,
            )?,
            None => vec![Decimal::ZERO; investments.len()],
        };

        for (investment, ef_deduction) in investments.iter().zip(deductions) {
            match self.settle_one(&declaration, investment, ef_deduction) {
                Ok(Settled::Inserted) => report.generated += 1,
                Ok(Settled::AlreadyExists) => {
                    debug!(
                        investment_id = %investment.investment_id,
                        declaration_id,
                        "payment already exists, skipping"
                    );
                    report.skipped_existing += 1;
                }
                Err(err) => {
                    warn!(
                        investment_id = %investment.investment_id,
                        declaration_id,
                        error = %err,
                        "failed to settle investment"
                    );
                    report.failures.push(GenerationFailure {
                        investment_id: investment.investment_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            declaration_id,
            generated = report.generated,
            skipped_existing = report.skipped_existing,
            failed = report.failures.len(),
            "quarterly payment generation finished"
        );
        Ok(report)
    }

    fn settle_one(
        &self,
        declaration: &Declaration,
        investment: &Investment,
        ef_deduction: Money,
    ) -> FleetFinanceResult<Settled> {
        if self
            .payments
            .exists(&investment.investment_id, &declaration.declaration_id)?
        {
            return Ok(Settled::AlreadyExists);
        }

        let principal = current_principal(investment);
        let gross = gross_roi(principal, declaration.roi_percentage, self.config.money_dp)?;
        let tds = self
            .config
            .default_tds_rate
            .map(|rate| round_money(gross * rate, self.config.money_dp))
            .unwrap_or(Decimal::ZERO);

        let payment = Payment {
            payment_id: payment_id_for(&declaration.declaration_id, &investment.investment_id),
            investment_id: investment.investment_id.clone(),
            declaration_id: declaration.declaration_id.clone(),
            gross_roi: gross,
            emergency_fund_deduction: ef_deduction,
            fd_returns: None,
            tds_deduction: tds,
            net_payable: net_payable(gross, ef_deduction, None, tds),
            status: PaymentStatus::Pending,
            payment_date: None,
            receipt: None,
            remark: None,
        };

        match self.payments.insert(&payment) {
            Ok(_) => Ok(Settled::Inserted),
            // A concurrent run inserted first; the settlement exists, which
            // is all the idempotence contract asks for.
            Err(FleetFinanceError::StateConflict { .. }) => Ok(Settled::AlreadyExists),
            Err(err) => Err(err),
        }
    }
}

enum Settled {
    Inserted,
    AlreadyExists,
}
