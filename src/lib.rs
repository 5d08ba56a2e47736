pub mod config;
pub mod currency;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod ledger;
pub mod serialization;
pub mod status;
pub mod types;
pub mod validation;

// re-export key types
pub use config::{EngineConfig, TermLimits};
pub use currency::Currency;
pub use decimal::{Money, Rate};
pub use errors::{LendingError, Result};
pub use interest::{
    AccrualEngine, DayCountConvention, InterestCalculation, InterestCalculator,
    ReconciliationEngine, ReconciliationResult,
};
pub use ledger::{Account, Ledger, Lending, NewLending, RepaymentOutcome};
pub use serialization::LendingView;
pub use status::{derive_overdue, derive_status, StatusChange};
pub use types::{AccountId, LendingId, LendingStatus, LendingTerms, Repayment, RepaymentId};
pub use validation::RepaymentValidator;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
