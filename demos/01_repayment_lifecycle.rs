/// repayment lifecycle - ledger with controlled time and structured logs
use chrono::{Duration, TimeZone, Utc};
use lending_ledger_rs::{
    EngineConfig, Ledger, LendingError, Money, NewLending, Rate, Repayment, SafeTimeProvider,
    TimeSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lending_ledger_rs=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== repayment lifecycle ===\n");

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let controller = time.test_control().unwrap();

    let ledger = Ledger::new(EngineConfig::default())?;
    let account = ledger.open_account("checking", Money::from_major(5_000), &time);
    let lending = ledger.create_lending(
        NewLending::new("alex", Money::from_major(1_000), Rate::from_percentage(12), start)
            .due(start + Duration::days(365))
            .funded_from(account),
        &time,
    )?;
    println!("1. lent $1,000 at 12%, status {}", ledger.lending(lending)?.status());

    controller.advance(Duration::days(182));
    let partial = ledger.add_repayment(
        lending,
        Repayment::new(Money::from_major(500), time.now()).with_account(account),
        &time,
    )?;
    println!(
        "2. repaid $500 on {}: {} -> {}, remaining {}",
        time.now().format("%Y-%m-%d"),
        partial.status.previous,
        partial.status.current,
        partial.reconciliation.remaining_amount.to_display()
    );

    let remaining = partial.reconciliation.remaining_amount;
    match ledger.add_repayment(
        lending,
        Repayment::new(remaining + Money::from_major(10), time.now()),
        &time,
    ) {
        Err(LendingError::OverpaymentRejected { message, .. }) => println!("3. rejected: {}", message),
        other => println!("3. unexpected: {:?}", other),
    }

    let full = ledger.add_repayment(
        lending,
        Repayment::new(remaining, time.now()).with_account(account),
        &time,
    )?;
    println!("4. paid off: {} -> {}", full.status.previous, full.status.current);

    controller.advance(Duration::days(180));
    let later = ledger.reconcile(lending, time.now())?;
    println!(
        "5. six months later remaining is still {}",
        later.remaining_amount.to_display()
    );

    ledger.delete_repayment(lending, full.repayment_id, &time)?;
    println!("6. deleted last repayment, status {}", ledger.lending(lending)?.status());

    let removed = ledger.delete_lending(lending)?;
    println!(
        "7. deleted lending with {} repayment(s), account back to {}",
        removed.repayments.len(),
        ledger.account(account)?.balance
    );

    Ok(())
}
