use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::{Money, Rate};

/// unique identifier for an early repayment rule
pub type RuleId = Uuid;

/// unit of the nominal loan term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermUnit {
    Years,
    Months,
}

/// immutable loan terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub term: u32,
    pub term_unit: TermUnit,
    pub annual_rate: Rate,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        term: u32,
        term_unit: TermUnit,
        annual_rate: Rate,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            term,
            term_unit,
            annual_rate,
            start_date,
        }
    }

    /// number of monthly periods in the nominal term
    pub fn nominal_periods(&self) -> u32 {
        match self.term_unit {
            TermUnit::Years => self.term.saturating_mul(12),
            TermUnit::Months => self.term,
        }
    }

    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate.monthly_rate()
    }
}

/// how the remaining schedule responds to an early repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecalculationPolicy {
    /// re-amortize the remaining balance over the remaining nominal periods
    ReducePayment,
    /// keep the payment, pay the loan off sooner
    ReduceTerm,
}

/// month steps accepted for recurring repayments
pub const SUPPORTED_MONTH_STEPS: [u32; 7] = [1, 2, 3, 4, 6, 9, 12];

/// how often an early repayment rule recurs
///
/// Parsing never fails: any value outside the supported set becomes
/// `Unrecognized` and expands to no events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Once,
    Every(u32),
    Unrecognized(String),
}

impl Frequency {
    /// month step between occurrences, zero when not periodic
    pub fn month_step(&self) -> u32 {
        match self {
            Frequency::Every(months) if SUPPORTED_MONTH_STEPS.contains(months) => *months,
            Frequency::Every(_) | Frequency::Once | Frequency::Unrecognized(_) => 0,
        }
    }
}

impl FromStr for Frequency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "once" => Frequency::Once,
            "1_month" => Frequency::Every(1),
            "2_months" => Frequency::Every(2),
            "3_months" => Frequency::Every(3),
            "4_months" => Frequency::Every(4),
            "6_months" => Frequency::Every(6),
            "9_months" => Frequency::Every(9),
            "12_months" => Frequency::Every(12),
            other => Frequency::Unrecognized(other.to_string()),
        };
        Ok(parsed)
    }
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(frequency) => frequency,
            Err(never) => match never {},
        }
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Once => write!(f, "once"),
            Frequency::Every(1) => write!(f, "1_month"),
            Frequency::Every(months) => write!(f, "{}_months", months),
            Frequency::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

/// caller supplied early repayment instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyRepaymentRule {
    pub id: RuleId,
    pub date: NaiveDate,
    pub frequency: Frequency,
    pub amount: Money,
    pub recalc_type: RecalculationPolicy,
}

impl EarlyRepaymentRule {
    /// one-off repayment with a fresh id
    pub fn once(date: NaiveDate, amount: Money, recalc_type: RecalculationPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            frequency: Frequency::Once,
            amount,
            recalc_type,
        }
    }

    /// recurring repayment every `months` months with a fresh id
    pub fn every(
        months: u32,
        date: NaiveDate,
        amount: Money,
        recalc_type: RecalculationPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            frequency: Frequency::Every(months),
            amount,
            recalc_type,
        }
    }
}
