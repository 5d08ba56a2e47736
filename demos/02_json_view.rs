/// json view - serialize a reconciled lending for the dashboard
use chrono::{Duration, TimeZone, Utc};
use lending_ledger_rs::{
    Currency, EngineConfig, Ledger, Money, NewLending, Rate, Repayment, SafeTimeProvider,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let controller = time.test_control().unwrap();

    let ledger = Ledger::new(EngineConfig::default().with_currency(Currency::Inr))?;
    let id = ledger.create_lending(
        NewLending::new("priya", Money::from_major(250_000), Rate::from_percentage(9), start)
            .due(start + Duration::days(120)),
        &time,
    )?;

    controller.advance(Duration::days(60));
    ledger.add_repayment(
        id,
        Repayment::new(Money::from_major(50_000), time.now()).with_notes("first instalment"),
        &time,
    )?;

    controller.advance(Duration::days(90));
    ledger.refresh_overdue(&time);

    println!("{}", ledger.view(id, time.now())?.to_json_pretty()?);
    Ok(())
}
