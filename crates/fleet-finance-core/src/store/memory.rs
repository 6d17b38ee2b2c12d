//! In-memory store, honoring the same uniqueness and version contracts a
//! database-backed implementation must provide.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::declarations::quarter::QuarterLabel;
use crate::error::FleetFinanceError;
use crate::store::{DeclarationStore, InvestmentStore, PaymentStore, PoolStore};
use crate::types::{
    Declaration, DeclarationId, Investment, InvestmentId, Money, Payment, PaymentId, Pool, PoolId,
};
use crate::FleetFinanceResult;

#[derive(Debug, Default)]
struct Inner {
    pools: HashMap<PoolId, Pool>,
    investments: HashMap<InvestmentId, Investment>,
    declarations: HashMap<DeclarationId, Declaration>,
    payments: HashMap<PaymentId, Payment>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> FleetFinanceResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| FleetFinanceError::Storage("store lock poisoned".into()))
    }

    /// Seeds a pool directly, bypassing validation. Test setup only.
    pub fn seed_pool(&self, pool: Pool) -> FleetFinanceResult<()> {
        self.locked()?.pools.insert(pool.pool_id.clone(), pool);
        Ok(())
    }

    pub fn seed_investment(&self, investment: Investment) -> FleetFinanceResult<()> {
        self.locked()?
            .investments
            .insert(investment.investment_id.clone(), investment);
        Ok(())
    }

    pub fn seed_declaration(&self, declaration: Declaration) -> FleetFinanceResult<()> {
        self.locked()?
            .declarations
            .insert(declaration.declaration_id.clone(), declaration);
        Ok(())
    }
}

impl PoolStore for MemoryStore {
    fn get(&self, pool_id: &str) -> FleetFinanceResult<Pool> {
        self.locked()?
            .pools
            .get(pool_id)
            .cloned()
            .ok_or_else(|| FleetFinanceError::NotFound {
                entity: "pool",
                id: pool_id.to_string(),
            })
    }
}

impl InvestmentStore for MemoryStore {
    fn get(&self, investment_id: &str) -> FleetFinanceResult<Investment> {
        self.locked()?
            .investments
            .get(investment_id)
            .cloned()
            .ok_or_else(|| FleetFinanceError::NotFound {
                entity: "investment",
                id: investment_id.to_string(),
            })
    }

    fn get_by_pool(&self, pool_id: &str) -> FleetFinanceResult<Vec<Investment>> {
        let inner = self.locked()?;
        let mut investments: Vec<Investment> = inner
            .investments
            .values()
            .filter(|inv| inv.pool_id == pool_id)
            .cloned()
            .collect();
        investments.sort_by(|a, b| a.investment_id.cmp(&b.investment_id));
        Ok(investments)
    }

    fn get_by_investor(&self, investor_id: &str) -> FleetFinanceResult<Vec<Investment>> {
        let inner = self.locked()?;
        let mut investments: Vec<Investment> = inner
            .investments
            .values()
            .filter(|inv| inv.investor_id == investor_id)
            .cloned()
            .collect();
        investments.sort_by(|a, b| a.investment_id.cmp(&b.investment_id));
        Ok(investments)
    }

    fn save(&self, investment: &Investment) -> FleetFinanceResult<Investment> {
        let mut inner = self.locked()?;
        if let Some(existing) = inner.investments.get(&investment.investment_id) {
            if existing.version != investment.version {
                return Err(FleetFinanceError::StateConflict {
                    entity: "investment",
                    id: investment.investment_id.clone(),
                });
            }
        }
        let mut stored = investment.clone();
        stored.version += 1;
        inner
            .investments
            .insert(stored.investment_id.clone(), stored.clone());
        Ok(stored)
    }
}

impl DeclarationStore for MemoryStore {
    fn get(&self, declaration_id: &str) -> FleetFinanceResult<Declaration> {
        self.locked()?
            .declarations
            .get(declaration_id)
            .cloned()
            .ok_or_else(|| FleetFinanceError::NotFound {
                entity: "declaration",
                id: declaration_id.to_string(),
            })
    }

    fn find_by_pool_quarter(
        &self,
        pool_id: &str,
        quarter: QuarterLabel,
    ) -> FleetFinanceResult<Option<Declaration>> {
        let inner = self.locked()?;
        Ok(inner
            .declarations
            .values()
            .find(|d| d.pool_id == pool_id && d.quarter == quarter)
            .cloned())
    }

    fn list_by_pool(&self, pool_id: &str) -> FleetFinanceResult<Vec<Declaration>> {
        let inner = self.locked()?;
        let mut declarations: Vec<Declaration> = inner
            .declarations
            .values()
            .filter(|d| d.pool_id == pool_id)
            .cloned()
            .collect();
        declarations.sort_by(|a, b| a.quarter.cmp(&b.quarter));
        Ok(declarations)
    }

    fn save(&self, declaration: &Declaration) -> FleetFinanceResult<Declaration> {
        let mut inner = self.locked()?;
        inner
            .declarations
            .insert(declaration.declaration_id.clone(), declaration.clone());
        Ok(declaration.clone())
    }

    fn update_pool_emergency_fund(
        &self,
        pool_id: &str,
        new_remaining: Money,
    ) -> FleetFinanceResult<()> {
        let mut inner = self.locked()?;
        let pool = inner
            .pools
            .get_mut(pool_id)
            .ok_or_else(|| FleetFinanceError::NotFound {
                entity: "pool",
                id: pool_id.to_string(),
            })?;
        pool.emergency_fund_remaining = new_remaining;
        Ok(())
    }
}

impl PaymentStore for MemoryStore {
    fn get(&self, payment_id: &str) -> FleetFinanceResult<Payment> {
        self.locked()?
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| FleetFinanceError::NotFound {
                entity: "payment",
                id: payment_id.to_string(),
            })
    }

    fn exists(&self, investment_id: &str, declaration_id: &str) -> FleetFinanceResult<bool> {
        let inner = self.locked()?;
        Ok(inner
            .payments
            .values()
            .any(|p| p.investment_id == investment_id && p.declaration_id == declaration_id))
    }

    fn insert(&self, payment: &Payment) -> FleetFinanceResult<Payment> {
        let mut inner = self.locked()?;
        let duplicate = inner.payments.values().any(|p| {
            p.investment_id == payment.investment_id && p.declaration_id == payment.declaration_id
        });
        if duplicate {
            return Err(FleetFinanceError::StateConflict {
                entity: "payment",
                id: format!("{}/{}", payment.investment_id, payment.declaration_id),
            });
        }
        inner
            .payments
            .insert(payment.payment_id.clone(), payment.clone());
        Ok(payment.clone())
    }

    fn update(&self, payment: &Payment) -> FleetFinanceResult<Payment> {
        let mut inner = self.locked()?;
        if !inner.payments.contains_key(&payment.payment_id) {
            return Err(FleetFinanceError::NotFound {
                entity: "payment",
                id: payment.payment_id.clone(),
            });
        }
        inner
            .payments
            .insert(payment.payment_id.clone(), payment.clone());
        Ok(payment.clone())
    }

    fn list_by_declaration(&self, declaration_id: &str) -> FleetFinanceResult<Vec<Payment>> {
        let inner = self.locked()?;
        let mut payments: Vec<Payment> = inner
            .payments
            .values()
            .filter(|p| p.declaration_id == declaration_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.payment_id.cmp(&b.payment_id));
        Ok(payments)
    }

    fn list_by_investment(&self, investment_id: &str) -> FleetFinanceResult<Vec<Payment>> {
        let inner = self.locked()?;
        let mut payments: Vec<Payment> = inner
            .payments
            .values()
            .filter(|p| p.investment_id == investment_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.payment_id.cmp(&b.payment_id));
        Ok(payments)
    }
}
