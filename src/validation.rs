use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::interest::{ReconciliationEngine, ReconciliationResult};
use crate::types::{LendingTerms, Repayment};

/// checks lending terms and proposed repayments before anything is written
#[derive(Debug, Clone)]
pub struct RepaymentValidator {
    engine: ReconciliationEngine,
    config: EngineConfig,
}

impl RepaymentValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            engine: ReconciliationEngine::new(config),
            config: config.clone(),
        }
    }

    /// form-level checks on new or amended terms
    pub fn validate_terms(&self, terms: &LendingTerms, now: DateTime<Utc>) -> Result<()> {
        self.engine.check_terms(terms)?;
        if terms.annual_rate > self.config.limits.max_annual_rate {
            return Err(LendingError::InvalidTerms {
                message: format!(
                    "interest rate {} exceeds the maximum of {}",
                    terms.annual_rate, self.config.limits.max_annual_rate
                ),
            });
        }
        if !self.config.limits.allow_future_lent_at && terms.lent_at > now {
            return Err(LendingError::InvalidTerms {
                message: format!("lending date {} is in the future", terms.lent_at.date_naive()),
            });
        }
        if let Some(due) = terms.due_at {
            if due < terms.lent_at {
                return Err(LendingError::InvalidTerms {
                    message: format!(
                        "due date {} is before lending date {}",
                        due.date_naive(),
                        terms.lent_at.date_naive()
                    ),
                });
            }
        }
        Ok(())
    }

    /// reject `proposed` when it exceeds what is still owed by more than the tolerance
    pub fn check_amount(&self, proposed: Money, reconciled: &ReconciliationResult) -> Result<()> {
        if !proposed.is_positive() {
            return Err(LendingError::InvalidRepaymentAmount { amount: proposed });
        }
        let remaining = reconciled.remaining_amount;
        if proposed > remaining + self.config.tolerance {
            let currency = self.config.currency;
            return Err(LendingError::OverpaymentRejected {
                proposed,
                remaining,
                message: format!(
                    "repayment of {} exceeds the remaining balance of {}",
                    currency.format(proposed),
                    currency.format(remaining)
                ),
            });
        }
        Ok(())
    }

    /// full check of a repayment against the existing history, reconciled as of
    /// the repayment's own date
    pub fn validate_repayment(
        &self,
        terms: &LendingTerms,
        existing: &[Repayment],
        proposed: &Repayment,
    ) -> Result<ReconciliationResult> {
        if !terms.status.accepts_repayments() {
            return Err(LendingError::LendingClosed { status: terms.status });
        }
        if proposed.repayment_date.date_naive() < terms.lent_at.date_naive() {
            return Err(LendingError::RepaymentBeforeLending);
        }
        let reconciled = self.engine.reconcile(terms, existing, proposed.repayment_date)?;
        self.check_amount(proposed.amount, &reconciled)?;
        Ok(reconciled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::decimal::Rate;
    use crate::types::LendingStatus;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn terms() -> LendingTerms {
        LendingTerms::new(Money::from_major(1_000), Rate::from_percentage(12), at(2024, 1, 1))
    }

    #[test]
    fn test_rejects_just_over_remaining() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let engine = ReconciliationEngine::default();
        let reconciled = engine.reconcile(&terms(), &[], at(2024, 7, 1)).unwrap();

        let proposed = reconciled.remaining_amount + Money::from_str_exact("0.02").unwrap();
        let err = validator.check_amount(proposed, &reconciled).unwrap_err();
        match err {
            LendingError::OverpaymentRejected { remaining, message, .. } => {
                assert_eq!(remaining, reconciled.remaining_amount);
                assert_eq!(
                    message,
                    "repayment of $1,059.86 exceeds the remaining balance of $1,059.84"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_accepts_within_tolerance() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let engine = ReconciliationEngine::default();
        let reconciled = engine.reconcile(&terms(), &[], at(2024, 7, 1)).unwrap();

        assert!(validator.check_amount(reconciled.remaining_amount, &reconciled).is_ok());
        let rounded_up = Money::from_str_exact("1059.84").unwrap();
        assert!(validator.check_amount(rounded_up, &reconciled).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let reconciled = ReconciliationEngine::default()
            .reconcile(&terms(), &[], at(2024, 7, 1))
            .unwrap();
        assert!(matches!(
            validator.check_amount(Money::ZERO, &reconciled),
            Err(LendingError::InvalidRepaymentAmount { .. })
        ));
        assert!(matches!(
            validator.check_amount(Money::from_major(-1), &reconciled),
            Err(LendingError::InvalidRepaymentAmount { .. })
        ));
    }

    #[test]
    fn test_message_uses_configured_currency() {
        let validator = RepaymentValidator::new(&EngineConfig::default().with_currency(Currency::Inr));
        let terms = LendingTerms::new(Money::from_major(150_000), Rate::ZERO, at(2024, 1, 1));
        let reconciled = ReconciliationEngine::default().reconcile(&terms, &[], at(2024, 2, 1)).unwrap();
        let err = validator.check_amount(Money::from_major(200_000), &reconciled).unwrap_err();
        assert_eq!(
            err.to_string(),
            "repayment of ₹2,00,000.00 exceeds the remaining balance of ₹1,50,000.00"
        );
    }

    #[test]
    fn test_validate_repayment_against_history() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let existing = vec![Repayment::new(Money::from_major(600), at(2024, 3, 1))];

        let ok = Repayment::new(Money::from_major(400), at(2024, 7, 1));
        let reconciled = validator.validate_repayment(&terms(), &existing, &ok).unwrap();
        assert_eq!(reconciled.total_repaid, Money::from_major(600));

        let too_much = Repayment::new(Money::from_major(500), at(2024, 7, 1));
        assert!(matches!(
            validator.validate_repayment(&terms(), &existing, &too_much),
            Err(LendingError::OverpaymentRejected { .. })
        ));
    }

    #[test]
    fn test_validate_repayment_guards() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let early = Repayment::new(Money::from_major(10), at(2023, 12, 31));
        assert_eq!(
            validator.validate_repayment(&terms(), &[], &early).unwrap_err(),
            LendingError::RepaymentBeforeLending
        );

        let defaulted = terms().with_status(LendingStatus::Defaulted);
        let late = Repayment::new(Money::from_major(10), at(2024, 2, 1));
        assert!(matches!(
            validator.validate_repayment(&defaulted, &[], &late),
            Err(LendingError::LendingClosed { status: LendingStatus::Defaulted })
        ));
    }

    #[test]
    fn test_validate_terms() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let now = at(2024, 7, 1);

        assert!(validator.validate_terms(&terms(), now).is_ok());

        let future = LendingTerms::new(Money::from_major(10), Rate::ZERO, now + Duration::days(1));
        assert!(validator.validate_terms(&future, now).is_err());

        let usurious = LendingTerms::new(Money::from_major(10), Rate::from_percentage(101), at(2024, 1, 1));
        assert!(validator.validate_terms(&usurious, now).is_err());

        let backwards = terms().with_due_date(at(2023, 6, 1));
        assert!(validator.validate_terms(&backwards, now).is_err());

        let zero = LendingTerms::new(Money::ZERO, Rate::ZERO, at(2024, 1, 1));
        assert!(matches!(
            validator.validate_terms(&zero, now),
            Err(LendingError::InvalidTerms { .. })
        ));
    }

    #[test]
    fn test_term_errors_match_the_engine() {
        let validator = RepaymentValidator::new(&EngineConfig::default());
        let engine = ReconciliationEngine::default();
        let now = at(2024, 7, 1);

        let negative = LendingTerms::new(Money::from_major(10), Rate::from_decimal(dec!(-0.05)), at(2024, 1, 1));
        let zero = LendingTerms::new(Money::ZERO, Rate::ZERO, at(2024, 1, 1));

        for terms in [negative, zero] {
            assert_eq!(
                validator.validate_terms(&terms, now).unwrap_err(),
                engine.reconcile(&terms, &[], now).unwrap_err()
            );
        }
    }
}
