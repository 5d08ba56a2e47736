use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{AccountId, LendingId, LendingStatus, LendingTerms, Repayment, RepaymentId};

/// stored lending record; `terms.status` is its only mutable lifecycle field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lending {
    pub id: LendingId,
    pub borrower: String,
    pub terms: LendingTerms,
    pub repayments: Vec<Repayment>,
    /// account the principal was paid out of
    pub funding_account_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub last_status_change: DateTime<Utc>,
}

impl Lending {
    pub fn status(&self) -> LendingStatus {
        self.terms.status
    }

    pub fn total_repaid(&self) -> Money {
        self.repayments.iter().map(|r| r.amount).sum()
    }

    pub(crate) fn remove_repayment(&mut self, id: RepaymentId) -> Option<Repayment> {
        let index = self.repayments.iter().position(|r| r.id == id)?;
        Some(self.repayments.remove(index))
    }

    pub(crate) fn set_status(&mut self, status: LendingStatus, timestamp: DateTime<Utc>) {
        if self.terms.status != status {
            self.terms.status = status;
            self.last_status_change = timestamp;
        }
    }
}

/// request to record a new lending
#[derive(Debug, Clone, PartialEq)]
pub struct NewLending {
    pub borrower: String,
    pub principal: Money,
    pub annual_rate: Rate,
    pub lent_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub initial_status: LendingStatus,
    pub funding_account_id: Option<AccountId>,
}

impl NewLending {
    pub fn new(
        borrower: impl Into<String>,
        principal: Money,
        annual_rate: Rate,
        lent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            borrower: borrower.into(),
            principal,
            annual_rate,
            lent_at,
            due_at: None,
            initial_status: LendingStatus::Active,
            funding_account_id: None,
        }
    }

    pub fn due(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn funded_from(mut self, account_id: AccountId) -> Self {
        self.funding_account_id = Some(account_id);
        self
    }

    pub fn with_status(mut self, status: LendingStatus) -> Self {
        self.initial_status = status;
        self
    }

    pub(crate) fn terms(&self) -> LendingTerms {
        LendingTerms {
            principal: self.principal,
            annual_rate: self.annual_rate,
            lent_at: self.lent_at,
            due_at: self.due_at,
            status: self.initial_status,
            settled_at: None,
        }
    }
}
