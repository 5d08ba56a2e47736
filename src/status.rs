//! lifecycle status derivation
//!
//! Status is recomputed from amounts after every repayment change. The only
//! date-driven transitions (ACTIVE <-> OVERDUE) live in [`derive_overdue`],
//! which callers run separately against their clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::LendingStatus;

/// derive the status implied by cumulative repayments, first matching rule wins
pub fn derive_status(
    total_repaid: Money,
    total_with_interest: Money,
    previous: LendingStatus,
    tolerance: Money,
) -> LendingStatus {
    if previous == LendingStatus::Defaulted {
        return LendingStatus::Defaulted;
    }
    if total_repaid >= total_with_interest - tolerance {
        return LendingStatus::FullyPaid;
    }
    if total_repaid > tolerance {
        return LendingStatus::PartiallyPaid;
    }
    if previous == LendingStatus::Overdue {
        return LendingStatus::Overdue;
    }
    LendingStatus::Active
}

/// float entry point for callers holding raw numbers; nan and infinities fail
pub fn derive_status_f64(
    total_repaid: f64,
    total_with_interest: f64,
    previous: LendingStatus,
    tolerance: f64,
) -> Result<LendingStatus> {
    Ok(derive_status(
        Money::try_from_f64(total_repaid)?,
        Money::try_from_f64(total_with_interest)?,
        previous,
        Money::try_from_f64(tolerance)?,
    ))
}

/// date-driven check: an untouched lending past its due date is overdue,
/// and an overdue one whose due date moved out again is active
pub fn derive_overdue(
    status: LendingStatus,
    due_at: Option<DateTime<Utc>>,
    as_of: DateTime<Utc>,
) -> LendingStatus {
    let past_due = due_at.is_some_and(|due| due < as_of);
    match status {
        LendingStatus::Active if past_due => LendingStatus::Overdue,
        LendingStatus::Overdue if !past_due => LendingStatus::Active,
        other => other,
    }
}

/// a status before and after a recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub previous: LendingStatus,
    pub current: LendingStatus,
}

impl StatusChange {
    pub fn new(previous: LendingStatus, current: LendingStatus) -> Self {
        Self { previous, current }
    }

    pub fn is_change(&self) -> bool {
        self.previous != self.current
    }
}
