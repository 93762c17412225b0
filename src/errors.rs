use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::RuleId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("invalid loan amount: {amount}")]
    InvalidLoanAmount {
        amount: Money,
    },

    #[error("invalid loan term: {term}")]
    InvalidTerm {
        term: u32,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid early repayment amount {amount} for rule {rule_id}")]
    InvalidRepaymentAmount {
        rule_id: RuleId,
        amount: Money,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan does not amortize: payment in period {period} does not cover interest, balance {balance}")]
    NonAmortizing {
        period: u32,
        balance: Money,
    },

    #[error("iteration cap reached after {periods} periods with balance {balance} outstanding")]
    IterationCapReached {
        periods: u32,
        balance: Money,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
