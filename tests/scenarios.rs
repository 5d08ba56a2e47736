use chrono::{DateTime, TimeZone, Utc};
use lending_ledger_rs::{
    EngineConfig, LendingError, LendingStatus, LendingTerms, Money, Rate, ReconciliationEngine,
    Repayment, RepaymentValidator,
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn money(s: &str) -> Money {
    Money::from_str_exact(s).unwrap()
}

fn terms() -> LendingTerms {
    LendingTerms::new(Money::from_major(1_000), Rate::from_percentage(12), at(2024, 1, 1))
}

#[test]
fn half_year_without_repayments() {
    let engine = ReconciliationEngine::new(&EngineConfig::default());
    let result = engine.reconcile(&terms(), &[], at(2024, 7, 1)).unwrap();

    assert_eq!(result.accrual_days, 182);
    assert_eq!(result.interest_amount.to_display(), money("59.84"));
    assert_eq!(result.remaining_amount.to_display(), money("1059.84"));
}

#[test]
fn half_year_with_partial_repayment() {
    let engine = ReconciliationEngine::new(&EngineConfig::default());
    let repayments = [Repayment::new(Money::from_major(500), at(2024, 7, 1))];
    let result = engine.reconcile(&terms(), &repayments, at(2024, 7, 1)).unwrap();

    assert_eq!(result.remaining_amount.to_display(), money("559.84"));
    assert_eq!(
        lending_ledger_rs::derive_status(money("500"), money("1059.84"), LendingStatus::Active, Money::CENT),
        LendingStatus::PartiallyPaid
    );
}

#[test]
fn settled_lending_stops_accruing() {
    let engine = ReconciliationEngine::new(&EngineConfig::default());
    let repayments = [Repayment::new(money("1059.84"), at(2024, 7, 1))];

    let settled = engine.reconcile(&terms(), &repayments, at(2024, 7, 1)).unwrap();
    let status = settled.derive_status(LendingStatus::Active, engine.tolerance());
    assert_eq!(status, LendingStatus::FullyPaid);

    let later = engine
        .reconcile(&terms().with_status(status), &repayments, at(2025, 1, 1))
        .unwrap();
    assert_eq!(later.interest_amount, settled.interest_amount);
    assert!(later.remaining_amount.is_zero());
}

#[test]
fn repayment_two_cents_over_is_rejected() {
    let config = EngineConfig::default();
    let engine = ReconciliationEngine::new(&config);
    let validator = RepaymentValidator::new(&config);

    let reconciled = engine.reconcile(&terms(), &[], at(2024, 7, 1)).unwrap();
    let proposed = reconciled.remaining_amount + money("0.02");
    let err = validator.check_amount(proposed, &reconciled).unwrap_err();
    assert!(matches!(err, LendingError::OverpaymentRejected { .. }));
}

#[test]
fn zero_principal_is_invalid() {
    let engine = ReconciliationEngine::new(&EngineConfig::default());
    let zero = LendingTerms::new(Money::ZERO, Rate::from_percentage(12), at(2024, 1, 1));
    assert!(matches!(
        engine.reconcile(&zero, &[], at(2024, 7, 1)),
        Err(LendingError::InvalidTerms { .. })
    ));
}
