//! Validated creation and lookup of quarterly ROI declarations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::declarations::quarter::QuarterLabel;
use crate::error::FleetFinanceError;
use crate::store::{DeclarationStore, PoolStore};
use crate::types::{Declaration, Money};
use crate::FleetFinanceResult;

/// Input for a new declaration. The quarter label arrives as entered and is
/// validated here.
#[derive(Debug, Clone)]
pub struct NewDeclaration {
    pub declaration_id: String,
    pub pool_id: String,
    pub quarter_year: String,
    /// Declared quarterly return as a percentage (6.00 = 6%).
    pub roi_percentage: Decimal,
    pub declaration_date: NaiveDate,
    pub emergency_fund_draw: Option<Money>,
    pub month_names: Option<String>,
    pub finalized: bool,
}

pub struct DeclarationRegistry<'a, D: DeclarationStore, P: PoolStore> {
    declarations: &'a D,
    pools: &'a P,
}

impl<'a, D: DeclarationStore, P: PoolStore> DeclarationRegistry<'a, D, P> {
    pub fn new(declarations: &'a D, pools: &'a P) -> Self {
        DeclarationRegistry {
            declarations,
            pools,
        }
    }

    /// Creates a declaration after validating the quarter label, the rate,
    /// and any emergency-fund draw against the pool's remaining balance.
    ///
    /// A draw is reserved immediately: the pool's `emergency_fund_remaining`
    /// is decremented here, at declaration time, so the balance can never be
    /// promised twice even before payments are generated. One declaration
    /// per pool per quarter; a duplicate quarter is rejected outright since
    /// it would pay investors twice.
    pub fn create(&self, input: NewDeclaration) -> FleetFinanceResult<Declaration> {
        let quarter: QuarterLabel = input.quarter_year.parse()?;

        if input.roi_percentage <= Decimal::ZERO {
            return Err(FleetFinanceError::Validation {
                field: "roi_percentage".into(),
                reason: format!("declared ROI must be positive, got {}", input.roi_percentage),
            });
        }

        let pool = self.pools.get(&input.pool_id)?;

        if let Some(existing) = self
            .declarations
            .find_by_pool_quarter(&input.pool_id, quarter)?
        {
            return Err(FleetFinanceError::Validation {
                field: "quarter_year".into(),
                reason: format!(
                    "{} already declared for pool {} (declaration {})",
                    quarter, input.pool_id, existing.declaration_id
                ),
            });
        }

        if let Some(draw) = input.emergency_fund_draw {
            if draw <= Decimal::ZERO {
                return Err(FleetFinanceError::Validation {
                    field: "emergency_fund_draw".into(),
                    reason: format!("draw must be positive, got {draw}"),
                });
            }
            if draw > pool.emergency_fund_remaining {
                return Err(FleetFinanceError::Validation {
                    field: "emergency_fund_draw".into(),
                    reason: format!(
                        "draw {draw} exceeds remaining emergency fund {}",
                        pool.emergency_fund_remaining
                    ),
                });
            }
        }

        let declaration = Declaration {
            declaration_id: input.declaration_id,
            pool_id: input.pool_id,
            quarter,
            roi_percentage: input.roi_percentage,
            declaration_date: input.declaration_date,
            is_finalized: input.finalized,
            emergency_fund_draw: input.emergency_fund_draw,
            month_names: input.month_names,
        };
        let saved = self.declarations.save(&declaration)?;

        if let Some(draw) = saved.emergency_fund_draw {
            let new_remaining = pool.emergency_fund_remaining - draw;
            self.declarations
                .update_pool_emergency_fund(&saved.pool_id, new_remaining)?;
            debug!(
                pool_id = %saved.pool_id,
                %draw,
                %new_remaining,
                "reserved emergency fund draw"
            );
        }

        info!(
            declaration_id = %saved.declaration_id,
            pool_id = %saved.pool_id,
            quarter = %saved.quarter,
            roi_percentage = %saved.roi_percentage,
            finalized = saved.is_finalized,
            "created ROI declaration"
        );
        Ok(saved)
    }

    /// Flips the finalized flag. Re-finalizing is a no-op, not an error.
    pub fn finalize(&self, declaration_id: &str) -> FleetFinanceResult<Declaration> {
        let mut declaration = self.declarations.get(declaration_id)?;
        if declaration.is_finalized {
            return Ok(declaration);
        }
        declaration.is_finalized = true;
        let saved = self.declarations.save(&declaration)?;
        info!(declaration_id, "finalized ROI declaration");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::testutil;

    fn new_declaration(pool_id: &str, quarter: &str, draw: Option<Money>) -> NewDeclaration {
        NewDeclaration {
            declaration_id: format!("decl-{quarter}"),
            pool_id: pool_id.into(),
            quarter_year: quarter.into(),
            roi_percentage: dec!(6),
            declaration_date: testutil::date(2024, 4, 5),
            emergency_fund_draw: draw,
            month_names: None,
            finalized: false,
        }
    }

    #[test]
    fn create_reserves_emergency_fund_draw() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(80_000))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        let declaration = registry
            .create(new_declaration("pool-1", "Q1-2024", Some(dec!(30_000))))
            .unwrap();
        assert_eq!(declaration.emergency_fund_draw, Some(dec!(30_000)));

        let pool = PoolStore::get(&store, "pool-1").unwrap();
        assert_eq!(pool.emergency_fund_remaining, dec!(50_000));
    }

    #[test]
    fn over_draw_is_rejected_and_fund_untouched() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(20_000))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        let result = registry.create(new_declaration("pool-1", "Q1-2024", Some(dec!(20_001))));
        assert!(matches!(result, Err(FleetFinanceError::Validation { .. })));

        let pool = PoolStore::get(&store, "pool-1").unwrap();
        assert_eq!(pool.emergency_fund_remaining, dec!(20_000));
    }

    #[test]
    fn non_positive_draw_is_rejected() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(20_000))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        for bad in [dec!(0), dec!(-500)] {
            let result = registry.create(new_declaration("pool-1", "Q1-2024", Some(bad)));
            assert!(result.is_err(), "draw of {bad} should be rejected");
        }
    }

    #[test]
    fn malformed_quarter_is_rejected() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(0))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        let result = registry.create(new_declaration("pool-1", "Q5-2024", None));
        assert!(matches!(result, Err(FleetFinanceError::Validation { .. })));
    }

    #[test]
    fn non_positive_roi_is_rejected() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(0))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        let mut input = new_declaration("pool-1", "Q1-2024", None);
        input.roi_percentage = dec!(0);
        assert!(registry.create(input).is_err());
    }

    #[test]
    fn duplicate_quarter_for_pool_is_rejected() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(0))).unwrap();
        store.seed_pool(testutil::pool("pool-2", dec!(0))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        registry
            .create(new_declaration("pool-1", "Q1-2024", None))
            .unwrap();

        let mut duplicate = new_declaration("pool-1", "Q1-2024", None);
        duplicate.declaration_id = "decl-other".into();
        assert!(registry.create(duplicate).is_err());

        // Same quarter on a different pool is fine.
        registry
            .create(new_declaration("pool-2", "Q1-2024", None))
            .unwrap();
    }

    #[test]
    fn missing_pool_is_not_found() {
        let store = MemoryStore::new();
        let registry = DeclarationRegistry::new(&store, &store);

        let result = registry.create(new_declaration("ghost", "Q1-2024", None));
        assert!(matches!(
            result,
            Err(FleetFinanceError::NotFound { entity: "pool", .. })
        ));
    }

    #[test]
    fn finalize_is_idempotent() {
        let store = MemoryStore::new();
        store.seed_pool(testutil::pool("pool-1", dec!(0))).unwrap();
        let registry = DeclarationRegistry::new(&store, &store);

        let declaration = registry
            .create(new_declaration("pool-1", "Q1-2024", None))
            .unwrap();
        assert!(!declaration.is_finalized);

        let first = registry.finalize(&declaration.declaration_id).unwrap();
        assert!(first.is_finalized);

        let second = registry.finalize(&declaration.declaration_id).unwrap();
        assert!(second.is_finalized);
    }
}
