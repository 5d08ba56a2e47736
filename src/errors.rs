use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::LendingStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LendingError {
    #[error("invalid lending terms: {message}")]
    InvalidTerms {
        message: String,
    },

    /// user-facing; `message` carries the currency-formatted amounts
    #[error("{message}")]
    OverpaymentRejected {
        proposed: Money,
        remaining: Money,
        message: String,
    },

    #[error("computation error: {message}")]
    Computation {
        message: String,
    },

    #[error("invalid repayment amount: {amount}")]
    InvalidRepaymentAmount {
        amount: Money,
    },

    #[error("repayment dated before the lending date")]
    RepaymentBeforeLending,

    #[error("lending not found: {id}")]
    LendingNotFound {
        id: Uuid,
    },

    #[error("repayment not found: {id}")]
    RepaymentNotFound {
        id: Uuid,
    },

    #[error("account not found: {id}")]
    AccountNotFound {
        id: Uuid,
    },

    #[error("lending does not accept repayments: current status is {status}")]
    LendingClosed {
        status: LendingStatus,
    },

    #[error("unknown lending status: {value}")]
    UnknownStatus {
        value: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LendingError>;
