use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::AccountId;

/// a money account the lender funds lendings from and receives repayments into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// may go negative; overdrafts are the bank's concern
    pub balance: Money,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, opening_balance: Money, opened_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            balance: opening_balance,
            opened_at,
        }
    }

    pub fn credit(&mut self, amount: Money) {
        self.balance += amount;
    }

    pub fn debit(&mut self, amount: Money) {
        self.balance -= amount;
    }
}
