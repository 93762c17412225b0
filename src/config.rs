use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};

/// period cap protecting against loans that never pay off
pub const DEFAULT_MAX_PERIODS: u32 = 600;

/// months past the nominal term that recurring repayments are generated for
pub const DEFAULT_HORIZON_OVERRUN_MONTHS: u32 = 120;

/// largest accepted loan amount; keeps interest and balances within `Decimal` range
pub const MAX_LOAN_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

/// largest accepted annual rate, in percent
pub const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(1000);

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// balances at or below this amount are treated as paid off
    pub balance_epsilon: Money,
    /// maximum number of monthly periods before the run is abandoned
    pub max_periods: u32,
    /// how far past the nominal term recurring repayments are expanded
    pub horizon_overrun_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            balance_epsilon: Money::CENT,
            max_periods: DEFAULT_MAX_PERIODS,
            horizon_overrun_months: DEFAULT_HORIZON_OVERRUN_MONTHS,
        }
    }
}

impl EngineConfig {
    /// configuration for currencies without minor units (e.g. JPY)
    pub fn whole_units() -> Self {
        Self {
            balance_epsilon: Money::from_decimal(dec!(0.5)),
            ..Self::default()
        }
    }

    pub fn with_max_periods(mut self, max_periods: u32) -> Self {
        self.max_periods = max_periods;
        self
    }

    pub fn with_balance_epsilon(mut self, epsilon: Money) -> Self {
        self.balance_epsilon = epsilon;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.balance_epsilon.is_positive() {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!("balance epsilon must be positive, got {}", self.balance_epsilon),
            });
        }

        if self.max_periods == 0 {
            return Err(ScheduleError::InvalidConfiguration {
                message: "max periods must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
