//! Shared fixtures for module tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::declarations::quarter::QuarterLabel;
use crate::types::{
    Declaration, Investment, Money, Payment, PaymentStatus, Pool, PoolStatus,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn pool(pool_id: &str, emergency_fund_remaining: Money) -> Pool {
    Pool {
        pool_id: pool_id.into(),
        pool_name: format!("{pool_id} fleet"),
        description: "Two-truck purchase".into(),
        vehicle_numbers: vec!["KA01AB1234".into()],
        purchase_date: date(2023, 1, 15),
        total_cost: dec!(2_500_000),
        bank_loan_amount: dec!(1_500_000),
        investor_amount: dec!(1_000_000),
        monthly_emi: dec!(45_000),
        emergency_fund_collected: dec!(120_000),
        emergency_fund_company_share: dec!(40_000),
        emergency_fund_investor_share: dec!(80_000),
        emergency_fund_remaining,
        status: PoolStatus::Active,
    }
}

pub fn investment(
    investment_id: &str,
    investor_id: &str,
    pool_id: &str,
    principal: i64,
) -> Investment {
    Investment {
        investment_id: investment_id.into(),
        investor_id: investor_id.into(),
        pool_id: pool_id.into(),
        current_principal: Decimal::from(principal),
        exits: Vec::new(),
        investment_date: date(2023, 2, 1),
        version: 0,
    }
}

pub fn declaration(
    declaration_id: &str,
    pool_id: &str,
    quarter: &str,
    roi_percentage: Decimal,
    emergency_fund_draw: Option<Money>,
) -> Declaration {
    Declaration {
        declaration_id: declaration_id.into(),
        pool_id: pool_id.into(),
        quarter: quarter.parse::<QuarterLabel>().expect("valid test quarter"),
        roi_percentage,
        declaration_date: date(2024, 4, 5),
        is_finalized: true,
        emergency_fund_draw,
        month_names: None,
    }
}

pub fn pending_payment(payment_id: &str, investment_id: &str, declaration_id: &str) -> Payment {
    Payment {
        payment_id: payment_id.into(),
        investment_id: investment_id.into(),
        declaration_id: declaration_id.into(),
        gross_roi: dec!(6_000),
        emergency_fund_deduction: Decimal::ZERO,
        fd_returns: None,
        tds_deduction: dec!(500),
        net_payable: dec!(5_500),
        status: PaymentStatus::Pending,
        payment_date: None,
        receipt: None,
        remark: None,
    }
}
