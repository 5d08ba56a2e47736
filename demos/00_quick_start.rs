/// quick start - reconcile a lending against its repayments
use chrono::{TimeZone, Utc};
use lending_ledger_rs::{
    EngineConfig, LendingTerms, Money, Rate, ReconciliationEngine, Repayment,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::default();
    let engine = ReconciliationEngine::new(&config);

    let lent_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let as_of = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let terms = LendingTerms::new(Money::from_major(1_000), Rate::from_percentage(12), lent_at);
    let repayments = vec![Repayment::new(Money::from_major(500), as_of)];

    let result = engine.reconcile(&terms, &repayments, as_of)?;
    let status = result.derive_status(terms.status, config.tolerance);

    println!("interest:  {}", config.currency.format(result.interest_amount));
    println!("total:     {}", config.currency.format(result.total_with_interest));
    println!("repaid:    {}", config.currency.format(result.total_repaid));
    println!("remaining: {}", config.currency.format(result.remaining_amount));
    println!("status:    {}", status);

    Ok(())
}
