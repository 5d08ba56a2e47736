/// serialization support for reconciled lendings
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::decimal::{Money, Rate};
use crate::interest::ReconciliationResult;
use crate::ledger::Lending;
use crate::types::{AccountId, LendingId, LendingStatus, RepaymentId};

/// read-only view of a lending as of one instant, for tables and charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingView {
    pub id: LendingId,
    pub borrower: String,
    pub status: LendingStatus,
    pub as_of: DateTime<Utc>,
    pub terms: TermsView,
    pub balances: BalanceView,
    pub repayments: Vec<RepaymentView>,
    pub due: DueView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsView {
    pub principal: Money,
    pub annual_rate: Rate,
    pub lent_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub currency: Currency,
    pub interest_amount: Money,
    pub total_with_interest: Money,
    pub total_repaid: Money,
    pub remaining_amount: Money,
    /// remaining amount formatted for display
    pub remaining_display: String,
    pub accrual_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentView {
    pub id: RepaymentId,
    pub amount: Money,
    pub repayment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub source_account_id: Option<AccountId>,
}

/// due-date urgency for the due-date chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueView {
    /// negative once the due date has passed
    pub days_until_due: Option<i64>,
    pub is_past_due: bool,
}

impl LendingView {
    pub fn new(
        lending: &Lending,
        reconciliation: &ReconciliationResult,
        as_of: DateTime<Utc>,
        currency: Currency,
    ) -> Self {
        let days_until_due = lending
            .terms
            .due_at
            .map(|due| (due.date_naive() - as_of.date_naive()).num_days());
        let open = !lending.status().is_terminal();
        // a lending settled within tolerance shows nothing owed
        let remaining = if lending.status() == LendingStatus::FullyPaid {
            Money::ZERO
        } else {
            reconciliation.remaining_amount
        };

        let mut repayments: Vec<RepaymentView> = lending
            .repayments
            .iter()
            .map(|r| RepaymentView {
                id: r.id,
                amount: r.amount,
                repayment_date: r.repayment_date,
                notes: r.notes.clone(),
                source_account_id: r.source_account_id,
            })
            .collect();
        repayments.sort_by_key(|r| r.repayment_date);

        LendingView {
            id: lending.id,
            borrower: lending.borrower.clone(),
            status: lending.status(),
            as_of,
            terms: TermsView {
                principal: lending.terms.principal,
                annual_rate: lending.terms.annual_rate,
                lent_at: lending.terms.lent_at,
                due_at: lending.terms.due_at,
                settled_at: lending.terms.settled_at,
            },
            balances: BalanceView {
                currency,
                interest_amount: reconciliation.interest_amount.to_display(),
                total_with_interest: reconciliation.total_with_interest.to_display(),
                total_repaid: reconciliation.total_repaid.to_display(),
                remaining_amount: remaining.to_display(),
                remaining_display: currency.format(remaining),
                accrual_days: reconciliation.accrual_days,
            },
            repayments,
            due: DueView {
                days_until_due,
                is_past_due: open && days_until_due.is_some_and(|d| d < 0),
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ledger::{Ledger, NewLending};
    use crate::types::Repayment;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::{SafeTimeProvider, TimeSource};

    #[test]
    fn test_view_json() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let time = SafeTimeProvider::new(TimeSource::Test(start));
        let ledger = Ledger::new(EngineConfig::default()).unwrap();
        let id = ledger
            .create_lending(
                NewLending::new("jo", Money::from_major(1_000), Rate::from_percentage(12), start)
                    .due(start + Duration::days(90)),
                &time,
            )
            .unwrap();

        time.test_control().unwrap().advance(Duration::days(100));
        ledger
            .add_repayment(id, Repayment::new(Money::from_major(100), time.now()).with_notes("first"), &time)
            .unwrap();

        let view = ledger.view(id, time.now()).unwrap();
        assert_eq!(view.status, LendingStatus::PartiallyPaid);
        assert_eq!(view.balances.accrual_days, 90);
        assert_eq!(view.due.days_until_due, Some(-10));
        assert!(view.due.is_past_due);
        assert_eq!(view.repayments.len(), 1);

        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"PARTIALLY_PAID\""));
        assert!(json.contains("\"remaining_display\": \"$929.59\""));

        let back: LendingView = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_settled_within_tolerance_shows_zero() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let time = SafeTimeProvider::new(TimeSource::Test(start));
        let ledger = Ledger::new(EngineConfig::default()).unwrap();
        let id = ledger
            .create_lending(NewLending::new("jo", Money::from_major(1_000), Rate::ZERO, start), &time)
            .unwrap();

        let short = Money::from_str_exact("999.995").unwrap();
        let outcome = ledger.add_repayment(id, Repayment::new(short, start), &time).unwrap();
        assert_eq!(outcome.status.current, LendingStatus::FullyPaid);
        assert_eq!(outcome.reconciliation.remaining_amount, Money::from_str_exact("0.005").unwrap());

        let view = ledger.view(id, start).unwrap();
        assert!(view.balances.remaining_amount.is_zero());
        assert_eq!(view.balances.remaining_display, "$0.00");
    }
}
