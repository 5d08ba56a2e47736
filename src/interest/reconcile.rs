use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::interest::{AccrualEngine, InterestCalculator};
use crate::status::derive_status;
use crate::types::{LendingStatus, LendingTerms, Repayment};

/// balances of a lending as of one instant; recomputed on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub principal: Money,
    pub interest_amount: Money,
    pub total_with_interest: Money,
    pub total_repaid: Money,
    /// never negative
    pub remaining_amount: Money,
    pub accrual_days: u32,
    /// instant interest was accrued up to
    pub accrual_end: DateTime<Utc>,
}

impl ReconciliationResult {
    pub fn derive_status(&self, previous: LendingStatus, tolerance: Money) -> LendingStatus {
        derive_status(self.total_repaid, self.total_with_interest, previous, tolerance)
    }
}

/// reconciles lending terms against repayments
///
/// Accrual runs from `lent_at` to `min(as_of, due_at)`. Once a lending is
/// FULLY_PAID the end is frozen at its settlement instant instead, so a
/// paid-off lending never shows a growing remainder. The settlement instant
/// is `terms.settled_at` when the ledger tracked it, otherwise the first
/// repayment date at which the repayments so far covered the obligation,
/// otherwise `as_of`.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    accrual: AccrualEngine,
    tolerance: Money,
}

impl ReconciliationEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            accrual: AccrualEngine::new(config.day_count_convention),
            tolerance: config.tolerance,
        }
    }

    pub fn tolerance(&self) -> Money {
        self.tolerance
    }

    /// the terms every reconciliation needs: a positive principal and a non-negative rate
    pub fn check_terms(&self, terms: &LendingTerms) -> Result<()> {
        if !terms.principal.is_positive() {
            return Err(LendingError::InvalidTerms {
                message: format!("principal must be positive, got {}", terms.principal),
            });
        }
        if terms.annual_rate.is_negative() {
            return Err(LendingError::InvalidTerms {
                message: format!("interest rate must not be negative, got {}", terms.annual_rate),
            });
        }
        Ok(())
    }

    pub fn reconcile(
        &self,
        terms: &LendingTerms,
        repayments: &[Repayment],
        as_of: DateTime<Utc>,
    ) -> Result<ReconciliationResult> {
        self.check_terms(terms)?;

        let accrual_end = self.accrual_end(terms, repayments, as_of)?;
        let calc = self.accrual.calculate_interest(
            terms.principal,
            terms.annual_rate,
            terms.lent_at,
            accrual_end,
        )?;

        let total_with_interest = terms.principal.checked_add(calc.interest_amount)?;
        let total_repaid = Money::checked_sum(repayments.iter().map(|r| r.amount))?;
        let remaining_amount = total_with_interest.saturating_sub(total_repaid);

        Ok(ReconciliationResult {
            principal: terms.principal,
            interest_amount: calc.interest_amount,
            total_with_interest,
            total_repaid,
            remaining_amount,
            accrual_days: calc.days,
            accrual_end,
        })
    }

    /// principal plus interest accrued up to `at`, capped at the due date
    pub fn obligation_at(&self, terms: &LendingTerms, at: DateTime<Utc>) -> Result<Money> {
        self.check_terms(terms)?;
        let end = cap_at_due(terms, at);
        let calc = self
            .accrual
            .calculate_interest(terms.principal, terms.annual_rate, terms.lent_at, end)?;
        terms.principal.checked_add(calc.interest_amount)
    }

    /// first repayment date at which cumulative repayments covered the obligation
    pub fn settlement_date(
        &self,
        terms: &LendingTerms,
        repayments: &[Repayment],
    ) -> Result<Option<DateTime<Utc>>> {
        let mut by_date: Vec<&Repayment> = repayments.iter().collect();
        by_date.sort_by_key(|r| r.repayment_date);

        let mut repaid = Money::ZERO;
        for repayment in by_date {
            repaid = repaid.checked_add(repayment.amount)?;
            let owed = self.obligation_at(terms, repayment.repayment_date)?;
            if repaid >= owed - self.tolerance {
                return Ok(Some(repayment.repayment_date));
            }
        }
        Ok(None)
    }

    fn accrual_end(
        &self,
        terms: &LendingTerms,
        repayments: &[Repayment],
        as_of: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let end = match terms.status {
            LendingStatus::FullyPaid => {
                let settled = match terms.settled_at {
                    Some(at) => Some(at),
                    None => self.settlement_date(terms, repayments)?,
                };
                settled.map_or(as_of, |at| at.min(as_of))
            }
            _ => as_of,
        };
        Ok(cap_at_due(terms, end))
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

fn cap_at_due(terms: &LendingTerms, at: DateTime<Utc>) -> DateTime<Utc> {
    terms.due_at.map_or(at, |due| at.min(due))
}
