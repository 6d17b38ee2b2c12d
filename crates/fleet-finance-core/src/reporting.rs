//! Read-only rollups: per-investor and per-pool summaries, and the
//! quarter-over-quarter payout history.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::declarations::quarter::QuarterLabel;
use crate::ledger::{current_principal, original_principal, total_exited};
use crate::payments::compute::effective_roi_percentage;
use crate::store::{DeclarationStore, InvestmentStore, PaymentStore, PoolStore};
use crate::types::{
    DeclarationId, InvestorId, Money, PaymentStatus, PoolId, PoolStatus,
};
use crate::FleetFinanceResult;

/// Output envelope for report computations: the result plus how it was
/// produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub engine_version: String,
}

fn wrap<T: Serialize>(
    methodology: &str,
    assumptions: serde_json::Value,
    warnings: Vec<String>,
    result: T,
) -> ReportOutput<T> {
    ReportOutput {
        result,
        methodology: methodology.to_string(),
        assumptions,
        warnings,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Investor summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct InvestorSummary {
    pub investor_id: InvestorId,
    /// Principal currently at work across all pools.
    pub total_invested: Money,
    pub total_exited: Money,
    pub total_gross_roi: Money,
    pub total_emergency_deduction: Money,
    pub total_fd_returns: Money,
    pub total_tds_deduction: Money,
    pub total_net_payable: Money,
    /// Net amounts of payments already marked Paid.
    pub total_paid: Money,
    pub pending_amount: Money,
    pub quarters_invested: u32,
    /// Mean declared ROI across the investor's payments.
    pub avg_roi_percentage: Decimal,
    pub last_payment_date: Option<NaiveDate>,
}

pub fn investor_summary<I, D, P>(
    investments: &I,
    declarations: &D,
    payments: &P,
    investor_id: &str,
) -> FleetFinanceResult<ReportOutput<InvestorSummary>>
where
    I: InvestmentStore,
    D: DeclarationStore,
    P: PaymentStore,
{
    let stakes = investments.get_by_investor(investor_id)?;
    let mut warnings = Vec::new();
    if stakes.is_empty() {
        warnings.push(format!("investor {investor_id} has no investments"));
    }

    let mut summary = InvestorSummary {
        investor_id: investor_id.to_string(),
        total_invested: stakes.iter().map(current_principal).sum(),
        total_exited: stakes.iter().map(total_exited).sum(),
        total_gross_roi: Decimal::ZERO,
        total_emergency_deduction: Decimal::ZERO,
        total_fd_returns: Decimal::ZERO,
        total_tds_deduction: Decimal::ZERO,
        total_net_payable: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        pending_amount: Decimal::ZERO,
        quarters_invested: 0,
        avg_roi_percentage: Decimal::ZERO,
        last_payment_date: None,
    };

    let mut declared_pct_sum = Decimal::ZERO;
    for stake in &stakes {
        for payment in payments.list_by_investment(&stake.investment_id)? {
            let declaration = declarations.get(&payment.declaration_id)?;
            declared_pct_sum += declaration.roi_percentage;

            summary.total_gross_roi += payment.gross_roi;
            summary.total_emergency_deduction += payment.emergency_fund_deduction;
            summary.total_fd_returns += payment.fd_returns.unwrap_or(Decimal::ZERO);
            summary.total_tds_deduction += payment.tds_deduction;
            summary.total_net_payable += payment.net_payable;
            summary.quarters_invested += 1;

            if payment.status == PaymentStatus::Paid {
                summary.total_paid += payment.net_payable;
                if payment.payment_date > summary.last_payment_date {
                    summary.last_payment_date = payment.payment_date;
                }
            }
        }
    }

    summary.pending_amount = summary.total_net_payable - summary.total_paid;
    if summary.quarters_invested > 0 {
        summary.avg_roi_percentage = declared_pct_sum / Decimal::from(summary.quarters_invested);
    }

    Ok(wrap(
        "Investor rollup across pools and quarters",
        serde_json::json!({
            "investor_id": investor_id,
            "investments": stakes.len(),
            "payments": summary.quarters_invested,
        }),
        warnings,
        summary,
    ))
}

// ---------------------------------------------------------------------------
// Quarterly history
// ---------------------------------------------------------------------------

/// One settled quarter for one investment, as shown in payout histories.
#[derive(Debug, Clone, Serialize)]
pub struct QuarterlyEntry {
    pub quarter: QuarterLabel,
    pub month_names: Option<String>,
    pub pool_id: PoolId,
    pub pool_name: String,
    pub declaration_id: DeclarationId,
    pub declared_roi_percentage: Decimal,
    /// Rate implied by the stored gross amount; diverges from the declared
    /// rate once a payment has been overridden.
    pub effective_roi_percentage: Decimal,
    pub principal: Money,
    pub gross_roi: Money,
    pub emergency_fund_deduction: Money,
    pub fd_returns: Option<Money>,
    pub tds_deduction: Money,
    pub net_payable: Money,
    pub status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
}

/// The investor's payout history, newest quarter first (year descending,
/// then quarter number descending).
pub fn quarterly_history<I, D, P, L>(
    investments: &I,
    declarations: &D,
    payments: &P,
    pools: &L,
    investor_id: &str,
) -> FleetFinanceResult<ReportOutput<Vec<QuarterlyEntry>>>
where
    I: InvestmentStore,
    D: DeclarationStore,
    P: PaymentStore,
    L: PoolStore,
{
    let stakes = investments.get_by_investor(investor_id)?;

    let mut entries = Vec::new();
    for stake in &stakes {
        let principal = current_principal(stake);
        for payment in payments.list_by_investment(&stake.investment_id)? {
            let declaration = declarations.get(&payment.declaration_id)?;
            let pool = pools.get(&declaration.pool_id)?;

            entries.push(QuarterlyEntry {
                quarter: declaration.quarter,
                month_names: declaration.month_names.clone(),
                pool_id: declaration.pool_id.clone(),
                pool_name: pool.pool_name,
                declaration_id: payment.declaration_id.clone(),
                declared_roi_percentage: declaration.roi_percentage,
                effective_roi_percentage: effective_roi_percentage(
                    payment.gross_roi,
                    principal,
                    declaration.roi_percentage,
                ),
                principal,
                gross_roi: payment.gross_roi,
                emergency_fund_deduction: payment.emergency_fund_deduction,
                fd_returns: payment.fd_returns,
                tds_deduction: payment.tds_deduction,
                net_payable: payment.net_payable,
                status: payment.status,
                payment_date: payment.payment_date,
            });
        }
    }

    entries.sort_by(|a, b| {
        b.quarter
            .cmp(&a.quarter)
            .then_with(|| a.pool_id.cmp(&b.pool_id))
    });

    Ok(wrap(
        "Quarter-over-quarter payout history, newest first",
        serde_json::json!({
            "investor_id": investor_id,
            "entries": entries.len(),
        }),
        Vec::new(),
        entries,
    ))
}

// ---------------------------------------------------------------------------
// Pool summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub pool_id: PoolId,
    pub pool_name: String,
    pub status: PoolStatus,
    /// Principal currently at work, summed over the ledger.
    pub capital_invested: Money,
    pub capital_exited: Money,
    /// Investor capital the pool was recorded with at purchase time.
    pub recorded_investor_amount: Money,
    pub investor_count: u32,
    pub declaration_count: u32,
    pub total_gross_roi: Money,
    pub total_net_payable: Money,
    pub total_paid: Money,
    pub emergency_fund_investor_share: Money,
    pub emergency_fund_remaining: Money,
}

pub fn pool_summary<L, I, D, P>(
    pools: &L,
    investments: &I,
    declarations: &D,
    payments: &P,
    pool_id: &str,
) -> FleetFinanceResult<ReportOutput<PoolSummary>>
where
    L: PoolStore,
    I: InvestmentStore,
    D: DeclarationStore,
    P: PaymentStore,
{
    let pool = pools.get(pool_id)?;
    let stakes = investments.get_by_pool(pool_id)?;
    let pool_declarations = declarations.list_by_pool(pool_id)?;

    let investors: HashSet<&str> = stakes.iter().map(|s| s.investor_id.as_str()).collect();
    let original_total: Money = stakes.iter().map(original_principal).sum();

    let mut summary = PoolSummary {
        pool_id: pool.pool_id.clone(),
        pool_name: pool.pool_name.clone(),
        status: pool.status,
        capital_invested: stakes.iter().map(current_principal).sum(),
        capital_exited: stakes.iter().map(total_exited).sum(),
        recorded_investor_amount: pool.investor_amount,
        investor_count: investors.len() as u32,
        declaration_count: pool_declarations.len() as u32,
        total_gross_roi: Decimal::ZERO,
        total_net_payable: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        emergency_fund_investor_share: pool.emergency_fund_investor_share,
        emergency_fund_remaining: pool.emergency_fund_remaining,
    };

    for declaration in &pool_declarations {
        for payment in payments.list_by_declaration(&declaration.declaration_id)? {
            summary.total_gross_roi += payment.gross_roi;
            summary.total_net_payable += payment.net_payable;
            if payment.status == PaymentStatus::Paid {
                summary.total_paid += payment.net_payable;
            }
        }
    }

    let mut warnings = Vec::new();
    if original_total != pool.investor_amount {
        warnings.push(format!(
            "ledger total {original_total} differs from recorded pool investor amount {}",
            pool.investor_amount
        ));
    }

    Ok(wrap(
        "Pool rollup over ledger, declarations and payments",
        serde_json::json!({
            "pool_id": pool_id,
            "investments": stakes.len(),
            "declarations": summary.declaration_count,
        }),
        warnings,
        summary,
    ))
}
