use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::LendingError;

/// unique identifier for a lending
pub type LendingId = Uuid;

/// unique identifier for a repayment
pub type RepaymentId = Uuid;

/// unique identifier for a money account
pub type AccountId = Uuid;

/// lending lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LendingStatus {
    /// lent out, nothing repaid yet
    #[default]
    Active,
    /// some of the obligation repaid
    PartiallyPaid,
    /// obligation covered
    FullyPaid,
    /// due date passed with nothing repaid
    Overdue,
    /// written off by the lender; only a manual override leaves it
    Defaulted,
}

impl LendingStatus {
    pub const ALL: [LendingStatus; 5] = [
        LendingStatus::Active,
        LendingStatus::PartiallyPaid,
        LendingStatus::FullyPaid,
        LendingStatus::Overdue,
        LendingStatus::Defaulted,
    ];

    /// no automatic transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, LendingStatus::FullyPaid | LendingStatus::Defaulted)
    }

    pub fn is_transient(&self) -> bool {
        !self.is_terminal()
    }

    /// repayments may be recorded against this status
    pub fn accepts_repayments(&self) -> bool {
        !matches!(self, LendingStatus::Defaulted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LendingStatus::Active => "ACTIVE",
            LendingStatus::PartiallyPaid => "PARTIALLY_PAID",
            LendingStatus::FullyPaid => "FULLY_PAID",
            LendingStatus::Overdue => "OVERDUE",
            LendingStatus::Defaulted => "DEFAULTED",
        }
    }
}

impl fmt::Display for LendingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LendingStatus {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LendingStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LendingError::UnknownStatus {
                value: s.to_string(),
            })
    }
}

/// static terms of a lending plus its last known status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub lent_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    /// hint only; balances are always recomputed
    pub status: LendingStatus,
    /// set by the ledger when the lending became fully paid
    pub settled_at: Option<DateTime<Utc>>,
}

impl LendingTerms {
    pub fn new(principal: Money, annual_rate: Rate, lent_at: DateTime<Utc>) -> Self {
        Self {
            principal,
            annual_rate,
            lent_at,
            due_at: None,
            status: LendingStatus::Active,
            settled_at: None,
        }
    }

    pub fn with_due_date(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_status(mut self, status: LendingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_settled_at(mut self, settled_at: DateTime<Utc>) -> Self {
        self.settled_at = Some(settled_at);
        self
    }
}

/// a single partial repayment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repayment {
    pub id: RepaymentId,
    pub amount: Money,
    pub repayment_date: DateTime<Utc>,
    pub notes: Option<String>,
    /// account the money landed in
    pub source_account_id: Option<AccountId>,
}

impl Repayment {
    pub fn new(amount: Money, repayment_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            repayment_date,
            notes: None,
            source_account_id: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.source_account_id = Some(account_id);
        self
    }
}
