use chrono::{DateTime, TimeZone, Utc};
use lending_ledger_rs::{
    EngineConfig, Ledger, LendingError, LendingStatus, Money, NewLending, Rate, Repayment,
    SafeTimeProvider, TimeSource,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn concurrent_repayments_never_overdraw() {
    let time = SafeTimeProvider::new(TimeSource::Test(start()));
    let ledger = Ledger::new(EngineConfig::default()).unwrap();
    let account = ledger.open_account("savings", Money::from_major(1_000), &time);
    let lending = ledger
        .create_lending(
            NewLending::new("pat", Money::from_major(1_000), Rate::ZERO, start()).funded_from(account),
            &time,
        )
        .unwrap();

    let results: Vec<Result<_, LendingError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = &ledger;
                scope.spawn(move || {
                    let time = SafeTimeProvider::new(TimeSource::Test(start()));
                    ledger.add_repayment(
                        lending,
                        Repayment::new(Money::from_major(200), start()).with_account(account),
                        &time,
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(LendingError::OverpaymentRejected { .. })))
        .count();
    assert_eq!(accepted, 5);
    assert_eq!(rejected, 3);

    let stored = ledger.lending(lending).unwrap();
    assert_eq!(stored.total_repaid(), Money::from_major(1_000));
    assert_eq!(stored.status(), LendingStatus::FullyPaid);
    assert_eq!(ledger.account(account).unwrap().balance, Money::from_major(1_000));
}

#[test]
fn concurrent_repayments_across_lendings() {
    let time = SafeTimeProvider::new(TimeSource::Test(start()));
    let ledger = Ledger::new(EngineConfig::default()).unwrap();
    let account = ledger.open_account("checking", Money::from_major(10_000), &time);

    let lendings: Vec<_> = (0..4)
        .map(|i| {
            ledger
                .create_lending(
                    NewLending::new(format!("borrower-{i}"), Money::from_major(500), Rate::ZERO, start())
                        .funded_from(account),
                    &time,
                )
                .unwrap()
        })
        .collect();
    assert_eq!(ledger.account(account).unwrap().balance, Money::from_major(8_000));

    std::thread::scope(|scope| {
        for &lending in &lendings {
            for _ in 0..3 {
                let ledger = &ledger;
                scope.spawn(move || {
                    let time = SafeTimeProvider::new(TimeSource::Test(start()));
                    let _ = ledger.add_repayment(
                        lending,
                        Repayment::new(Money::from_major(200), start()).with_account(account),
                        &time,
                    );
                });
            }
        }
    });

    for lending in lendings {
        let stored = ledger.lending(lending).unwrap();
        assert!(stored.total_repaid() <= Money::from_major(500));
        assert_eq!(stored.repayments.len(), 2);
        assert_eq!(stored.status(), LendingStatus::PartiallyPaid);
    }
    assert_eq!(ledger.account(account).unwrap().balance, Money::from_major(9_600));
}
