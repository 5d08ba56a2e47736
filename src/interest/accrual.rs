use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::interest::{InterestCalculation, InterestCalculator};

/// day count convention for interest calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DayCountConvention {
    /// actual days / 365
    #[default]
    Actual365,
    /// actual days / 360
    Actual360,
    /// 30 days per month / 360 days per year
    Thirty360,
    /// actual days / actual days in year (handles leap years)
    ActualActual,
}

/// simple, non-compounding interest at daily granularity
#[derive(Debug, Clone, Copy)]
pub struct AccrualEngine {
    pub convention: DayCountConvention,
}

impl AccrualEngine {
    pub fn new(convention: DayCountConvention) -> Self {
        Self { convention }
    }

    /// whole calendar days from `start` to `end`, zero when `end` precedes `start`
    pub fn calculate_days(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
        let (start, end) = (start.date_naive(), end.date_naive());
        if end <= start {
            return 0;
        }
        match self.convention {
            DayCountConvention::Actual365
            | DayCountConvention::Actual360
            | DayCountConvention::ActualActual => {
                u32::try_from((end - start).num_days()).unwrap_or(u32::MAX)
            }
            DayCountConvention::Thirty360 => self.days_30_360(start, end),
        }
    }

    /// calculate 30/360 days between dates
    fn days_30_360(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let y1 = start.year();
        let y2 = end.year();
        let m1 = start.month() as i32;
        let m2 = end.month() as i32;
        let d1 = start.day().min(30) as i32;
        let d2 = if d1 == 30 { end.day().min(30) as i32 } else { end.day() as i32 };

        let days = 360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1);
        days.max(0) as u32
    }

    /// get year basis for the convention
    pub fn year_basis(&self, year: i32) -> u32 {
        match self.convention {
            DayCountConvention::Actual365 => 365,
            DayCountConvention::Actual360 | DayCountConvention::Thirty360 => 360,
            DayCountConvention::ActualActual => {
                if is_leap_year(year) { 366 } else { 365 }
            }
        }
    }

    /// principal × rate × days / basis, multiplied before dividing to keep precision
    pub fn calculate_simple_interest(
        &self,
        principal: Money,
        annual_rate: Rate,
        days: u32,
        year_basis: u32,
    ) -> Result<Money> {
        if year_basis == 0 {
            return Err(LendingError::Computation {
                message: "zero year basis".to_string(),
            });
        }
        principal
            .as_decimal()
            .checked_mul(annual_rate.as_decimal())
            .and_then(|v| v.checked_mul(Decimal::from(days)))
            .and_then(|v| v.checked_div(Decimal::from(year_basis)))
            .map(Money::from_decimal)
            .ok_or_else(|| LendingError::Computation {
                message: format!(
                    "interest overflow: principal {}, rate {}, {} days",
                    principal, annual_rate, days
                ),
            })
    }
}

impl Default for AccrualEngine {
    fn default() -> Self {
        Self::new(DayCountConvention::default())
    }
}

impl InterestCalculator for AccrualEngine {
    fn calculate_interest(
        &self,
        principal: Money,
        rate: Rate,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<InterestCalculation> {
        let days = self.calculate_days(start_date, end_date);
        let year_basis = self.year_basis(end_date.year());
        let interest = self.calculate_simple_interest(principal, rate, days, year_basis)?;

        Ok(InterestCalculation {
            interest_amount: interest,
            days,
            year_basis,
        })
    }
}

/// check if year is a leap year
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
