//! Post-generation payment corrections.
//!
//! Individual payment fields can be overridden by an administrator after
//! generation (a negotiated payout, a manual TDS figure, a marked-paid
//! status). Every correction re-derives `net_payable` from the stored
//! components, so a payment can never be edited into an inconsistent state,
//! and overriding one investor's gross amount never touches the pool's
//! declared rate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::FleetFinanceError;
use crate::payments::compute::net_payable;
use crate::store::PaymentStore;
use crate::types::{Actor, Money, Payment, PaymentStatus};
use crate::FleetFinanceResult;

/// Field overrides for one payment. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct PaymentCorrection {
    pub gross_roi: Option<Money>,
    pub emergency_fund_deduction: Option<Money>,
    pub fd_returns: Option<Money>,
    pub tds_deduction: Option<Money>,
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<NaiveDate>,
    pub receipt: Option<String>,
    pub remark: Option<String>,
}

impl PaymentCorrection {
    pub fn is_empty(&self) -> bool {
        self.gross_roi.is_none()
            && self.emergency_fund_deduction.is_none()
            && self.fd_returns.is_none()
            && self.tds_deduction.is_none()
            && self.status.is_none()
            && self.payment_date.is_none()
            && self.receipt.is_none()
            && self.remark.is_none()
    }
}

/// Applies a correction and persists the re-derived payment.
pub fn apply_correction<P: PaymentStore>(
    store: &P,
    payment_id: &str,
    correction: &PaymentCorrection,
    actor: &Actor,
) -> FleetFinanceResult<Payment> {
    if !actor.is_admin {
        return Err(FleetFinanceError::Validation {
            field: "actor".into(),
            reason: "payment corrections require an admin actor".into(),
        });
    }

    for (field, amount) in [
        ("gross_roi", correction.gross_roi),
        ("emergency_fund_deduction", correction.emergency_fund_deduction),
        ("fd_returns", correction.fd_returns),
        ("tds_deduction", correction.tds_deduction),
    ] {
        if let Some(amount) = amount {
            if amount < Decimal::ZERO {
                return Err(FleetFinanceError::Validation {
                    field: field.into(),
                    reason: format!("{field} cannot be negative, got {amount}"),
                });
            }
        }
    }

    let mut payment = store.get(payment_id)?;

    if let Some(gross) = correction.gross_roi {
        payment.gross_roi = gross;
    }
    if let Some(ef) = correction.emergency_fund_deduction {
        payment.emergency_fund_deduction = ef;
    }
    if let Some(fd) = correction.fd_returns {
        payment.fd_returns = Some(fd);
    }
    if let Some(tds) = correction.tds_deduction {
        payment.tds_deduction = tds;
    }
    if let Some(status) = correction.status {
        payment.status = status;
    }
    if let Some(date) = correction.payment_date {
        payment.payment_date = Some(date);
    }
    if let Some(receipt) = &correction.receipt {
        payment.receipt = Some(receipt.clone());
    }
    if let Some(remark) = &correction.remark {
        payment.remark = Some(remark.clone());
    }

    payment.net_payable = net_payable(
        payment.gross_roi,
        payment.emergency_fund_deduction,
        payment.fd_returns,
        payment.tds_deduction,
    );

    let saved = store.update(&payment)?;
    info!(
        payment_id,
        net_payable = %saved.net_payable,
        "applied payment correction"
    );
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::payments::compute::effective_roi_percentage;
    use crate::store::memory::MemoryStore;
    use crate::testutil;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert(&testutil::pending_payment("pay-1", "inv-1", "decl-1"))
            .unwrap();
        store
    }

    #[test]
    fn gross_override_rederives_net_and_implied_rate() {
        let store = seeded_store();

        let corrected = apply_correction(
            &store,
            "pay-1",
            &PaymentCorrection {
                gross_roi: Some(dec!(7_500)),
                ..PaymentCorrection::default()
            },
            &Actor::admin(),
        )
        .unwrap();

        // Net follows the stored components: 7,500 - 0 + 0 - 500.
        assert_eq!(corrected.net_payable, dec!(7_000));

        // The implied rate is a view over the payment, not a write to the
        // declaration: a 100,000 stake now shows 7.5% against a declared 6%.
        let implied = effective_roi_percentage(corrected.gross_roi, dec!(100_000), dec!(6));
        assert_eq!(implied, dec!(7.5));
    }

    #[test]
    fn correction_can_push_net_to_the_zero_floor() {
        let store = seeded_store();

        let corrected = apply_correction(
            &store,
            "pay-1",
            &PaymentCorrection {
                emergency_fund_deduction: Some(dec!(7_000)),
                ..PaymentCorrection::default()
            },
            &Actor::admin(),
        )
        .unwrap();

        // 6,000 - 7,000 - 500 would be negative; the floor holds.
        assert_eq!(corrected.net_payable, dec!(0));
    }

    #[test]
    fn fd_returns_add_back_into_net() {
        let store = seeded_store();

        let corrected = apply_correction(
            &store,
            "pay-1",
            &PaymentCorrection {
                fd_returns: Some(dec!(300)),
                ..PaymentCorrection::default()
            },
            &Actor::admin(),
        )
        .unwrap();

        assert_eq!(corrected.fd_returns, Some(dec!(300)));
        assert_eq!(corrected.net_payable, dec!(5_800));
    }

    #[test]
    fn marking_paid_keeps_derived_fields_consistent() {
        let store = seeded_store();

        let corrected = apply_correction(
            &store,
            "pay-1",
            &PaymentCorrection {
                status: Some(PaymentStatus::Paid),
                payment_date: Some(testutil::date(2024, 4, 20)),
                receipt: Some("receipts/pay-1.pdf".into()),
                ..PaymentCorrection::default()
            },
            &Actor::admin(),
        )
        .unwrap();

        assert_eq!(corrected.status, PaymentStatus::Paid);
        assert_eq!(corrected.payment_date, Some(testutil::date(2024, 4, 20)));
        assert_eq!(corrected.net_payable, dec!(5_500));
    }

    #[test]
    fn non_admin_actor_is_rejected() {
        let store = seeded_store();

        let result = apply_correction(
            &store,
            "pay-1",
            &PaymentCorrection {
                gross_roi: Some(dec!(1)),
                ..PaymentCorrection::default()
            },
            &Actor::viewer(),
        );
        assert!(matches!(result, Err(FleetFinanceError::Validation { .. })));

        let untouched = store.get("pay-1").unwrap();
        assert_eq!(untouched.gross_roi, dec!(6_000));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let store = seeded_store();

        let result = apply_correction(
            &store,
            "pay-1",
            &PaymentCorrection {
                tds_deduction: Some(dec!(-1)),
                ..PaymentCorrection::default()
            },
            &Actor::admin(),
        );
        assert!(matches!(result, Err(FleetFinanceError::Validation { .. })));
    }

    #[test]
    fn unknown_payment_is_not_found() {
        let store = MemoryStore::new();
        let result = apply_correction(
            &store,
            "ghost",
            &PaymentCorrection::default(),
            &Actor::admin(),
        );
        assert!(matches!(
            result,
            Err(FleetFinanceError::NotFound { entity: "payment", .. })
        ));
    }
}
