pub mod accrual;
pub mod reconcile;

use chrono::{DateTime, Utc};

use crate::decimal::{Money, Rate};
use crate::errors::Result;

pub use accrual::{AccrualEngine, DayCountConvention};
pub use reconcile::{ReconciliationEngine, ReconciliationResult};

/// interest calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCalculation {
    pub interest_amount: Money,
    pub days: u32,
    /// days in the year the interest was divided by
    pub year_basis: u32,
}

/// trait for interest calculations
pub trait InterestCalculator {
    fn calculate_interest(
        &self,
        principal: Money,
        rate: Rate,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<InterestCalculation>;
}
