use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::declarations::quarter::QuarterLabel;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Declared ROI is the one
/// exception: it arrives as a percentage and is suffixed `_percentage`
/// wherever it appears.
pub type Rate = Decimal;

pub type PoolId = String;
pub type InvestorId = String;
pub type InvestmentId = String;
pub type DeclarationId = String;
pub type PaymentId = String;

/// Administrative lifecycle of a pool. Transitions are an operator decision,
/// never computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    Active,
    Inactive,
    Sold,
}

/// A vehicle-purchase funding unit: bank loan plus pooled investor capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: PoolId,
    pub pool_name: String,
    pub description: String,
    pub vehicle_numbers: Vec<String>,
    pub purchase_date: NaiveDate,
    pub total_cost: Money,
    pub bank_loan_amount: Money,
    /// Total investor capital committed to the purchase
    pub investor_amount: Money,
    pub monthly_emi: Money,
    pub emergency_fund_collected: Money,
    pub emergency_fund_company_share: Money,
    pub emergency_fund_investor_share: Money,
    /// Investor-share portion not yet reserved by declaration draws.
    /// Never negative.
    pub emergency_fund_remaining: Money,
    pub status: PoolStatus,
}

/// One partial capital withdrawal from an investment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRecord {
    pub amount: Money,
    pub date: NaiveDate,
}

/// One investor's stake in one pool.
///
/// The originally invested amount is not stored; it is reconstructed as
/// `current_principal + Σ exits` whenever a new exit is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub investment_id: InvestmentId,
    pub investor_id: InvestorId,
    pub pool_id: PoolId,
    /// Principal still at work in the pool; exits have already been
    /// subtracted from it.
    pub current_principal: Money,
    /// Append-only exit history, chronological.
    pub exits: Vec<ExitRecord>,
    pub investment_date: NaiveDate,
    /// Optimistic-lock counter; bumped by the store on every save.
    pub version: u64,
}

/// One quarter's ROI announcement for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub declaration_id: DeclarationId,
    pub pool_id: PoolId,
    pub quarter: QuarterLabel,
    /// Declared quarterly return, as a percentage (6.00 = 6%).
    pub roi_percentage: Decimal,
    pub declaration_date: NaiveDate,
    pub is_finalized: bool,
    /// Amount drawn from the pool's emergency fund, reserved at declaration
    /// time.
    pub emergency_fund_draw: Option<Money>,
    /// Display label for the months the quarter covers, e.g. "Jan-Mar".
    pub month_names: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// The computed settlement for one investment against one declaration.
///
/// `net_payable` is always derived from the stored components and re-derived
/// after every correction; it is never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub investment_id: InvestmentId,
    pub declaration_id: DeclarationId,
    pub gross_roi: Money,
    pub emergency_fund_deduction: Money,
    /// Interest earned while the emergency fund sat in a fixed deposit,
    /// added back to the payout. Admin-entered.
    pub fd_returns: Option<Money>,
    pub tds_deduction: Money,
    pub net_payable: Money,
    pub status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
    /// Reference to an uploaded receipt; storage itself lives outside this
    /// crate.
    pub receipt: Option<String>,
    pub remark: Option<String>,
}

/// Caller identity, passed explicitly into operations that are restricted to
/// administrators. Authentication lives above this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub is_admin: bool,
}

impl Actor {
    pub fn admin() -> Self {
        Actor { is_admin: true }
    }

    pub fn viewer() -> Self {
        Actor { is_admin: false }
    }
}
