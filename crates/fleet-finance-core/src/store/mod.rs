//! Abstract persistence interfaces.
//!
//! The engine never talks to a concrete database; the surrounding
//! application provides implementations of these traits over whatever store
//! it uses. [`memory::MemoryStore`] is the reference implementation and the
//! fixture every stateful test runs against.

use crate::declarations::quarter::QuarterLabel;
use crate::types::{Declaration, Investment, Money, Payment, Pool};
use crate::FleetFinanceResult;

pub mod memory;

pub trait PoolStore {
    fn get(&self, pool_id: &str) -> FleetFinanceResult<Pool>;
}

pub trait InvestmentStore {
    fn get(&self, investment_id: &str) -> FleetFinanceResult<Investment>;

    /// All investments staked against a pool, the input set for payment
    /// generation.
    fn get_by_pool(&self, pool_id: &str) -> FleetFinanceResult<Vec<Investment>>;

    fn get_by_investor(&self, investor_id: &str) -> FleetFinanceResult<Vec<Investment>>;

    /// Version-checked upsert. Implementations must reject a save whose
    /// `version` does not match the stored record with
    /// [`FleetFinanceError::StateConflict`](crate::FleetFinanceError::StateConflict)
    /// and bump the counter on success. The returned record carries the new
    /// version.
    fn save(&self, investment: &Investment) -> FleetFinanceResult<Investment>;
}

pub trait DeclarationStore {
    fn get(&self, declaration_id: &str) -> FleetFinanceResult<Declaration>;

    /// Lookup used to enforce one declaration per pool per quarter.
    fn find_by_pool_quarter(
        &self,
        pool_id: &str,
        quarter: QuarterLabel,
    ) -> FleetFinanceResult<Option<Declaration>>;

    fn list_by_pool(&self, pool_id: &str) -> FleetFinanceResult<Vec<Declaration>>;

    fn save(&self, declaration: &Declaration) -> FleetFinanceResult<Declaration>;

    /// Writes the pool's post-draw emergency fund balance. Paired with the
    /// declaration save so the draw is reserved the moment the declaration
    /// lands.
    fn update_pool_emergency_fund(
        &self,
        pool_id: &str,
        new_remaining: Money,
    ) -> FleetFinanceResult<()>;
}

pub trait PaymentStore {
    fn get(&self, payment_id: &str) -> FleetFinanceResult<Payment>;

    fn exists(&self, investment_id: &str, declaration_id: &str) -> FleetFinanceResult<bool>;

    /// Inserts a new payment. Implementations must enforce uniqueness on
    /// `(investment_id, declaration_id)` and reject duplicates with
    /// [`FleetFinanceError::StateConflict`](crate::FleetFinanceError::StateConflict);
    /// that constraint is what makes retried generation runs safe.
    fn insert(&self, payment: &Payment) -> FleetFinanceResult<Payment>;

    fn update(&self, payment: &Payment) -> FleetFinanceResult<Payment>;

    fn list_by_declaration(&self, declaration_id: &str) -> FleetFinanceResult<Vec<Payment>>;

    fn list_by_investment(&self, investment_id: &str) -> FleetFinanceResult<Vec<Payment>>;
}
