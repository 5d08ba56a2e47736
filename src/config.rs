use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::interest::DayCountConvention;

/// engine configuration, passed explicitly to every engine and ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub day_count_convention: DayCountConvention,
    /// absolute tolerance absorbing rounding when comparing amounts
    pub tolerance: Money,
    pub currency: Currency,
    pub limits: TermLimits,
}

/// bounds enforced by the validation layer, never by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermLimits {
    pub max_annual_rate: Rate,
    pub allow_future_lent_at: bool,
}

impl Default for TermLimits {
    fn default() -> Self {
        Self {
            max_annual_rate: Rate::ONE,
            allow_future_lent_at: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            day_count_convention: DayCountConvention::Actual365,
            tolerance: Money::CENT,
            currency: Currency::Usd,
            limits: TermLimits::default(),
        }
    }
}

impl EngineConfig {
    /// dashboard defaults shown in rupees
    pub fn inr() -> Self {
        Self {
            currency: Currency::Inr,
            ..Self::default()
        }
    }

    /// exact comparisons, for tests that want no slack at all
    pub fn exact() -> Self {
        Self {
            tolerance: Money::ZERO,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: Money) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_day_count(mut self, convention: DayCountConvention) -> Self {
        self.day_count_convention = convention;
        self
    }

    /// parse from json; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| LendingError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tolerance.is_negative() {
            return Err(LendingError::InvalidConfiguration {
                message: format!("tolerance must not be negative, got {}", self.tolerance),
            });
        }
        // a tolerance of a whole unit or more would hide real balances
        if self.tolerance.as_decimal() >= dec!(1) {
            return Err(LendingError::InvalidConfiguration {
                message: format!("tolerance must be below one currency unit, got {}", self.tolerance),
            });
        }
        if self.limits.max_annual_rate.is_negative() {
            return Err(LendingError::InvalidConfiguration {
                message: format!("max annual rate must not be negative, got {}", self.limits.max_annual_rate),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.day_count_convention, DayCountConvention::Actual365);
        assert_eq!(config.tolerance, Money::CENT);
        assert_eq!(config.limits.max_annual_rate, Rate::from_percentage(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{ "currency": "INR", "tolerance": "0.05" }"#).unwrap();
        assert_eq!(config.currency, Currency::Inr);
        assert_eq!(config.tolerance, Money::from_str_exact("0.05").unwrap());
        assert_eq!(config.day_count_convention, DayCountConvention::Actual365);
    }

    #[test]
    fn test_from_json_rejects_bad_tolerance() {
        let err = EngineConfig::from_json(r#"{ "tolerance": "-0.01" }"#).unwrap_err();
        assert!(matches!(err, LendingError::InvalidConfiguration { .. }));

        let err = EngineConfig::from_json(r#"{ "tolerance": "2" }"#).unwrap_err();
        assert!(matches!(err, LendingError::InvalidConfiguration { .. }));

        assert!(EngineConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_round_trip_json() {
        let config = EngineConfig::inr().with_day_count(DayCountConvention::Actual360);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
