use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{shift_months, EndOfMonthClamp, MonthCalendar};
use crate::config::DEFAULT_HORIZON_OVERRUN_MONTHS;
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{EarlyRepaymentRule, Frequency, RecalculationPolicy, RuleId};

/// one concrete occurrence of an early repayment rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentEvent {
    pub rule_id: RuleId,
    pub date: NaiveDate,
    pub amount: Money,
    pub recalc_type: RecalculationPolicy,
}

impl RepaymentEvent {
    fn from_rule(rule: &EarlyRepaymentRule, date: NaiveDate) -> Self {
        Self {
            rule_id: rule.id,
            date,
            amount: rule.amount,
            recalc_type: rule.recalc_type,
        }
    }
}

/// expands early repayment rules into a date-ordered list of events
#[derive(Debug, Clone)]
pub struct RepaymentEventExpander<C = EndOfMonthClamp> {
    calendar: C,
    horizon_overrun_months: u32,
}

impl Default for RepaymentEventExpander {
    fn default() -> Self {
        Self::new(EndOfMonthClamp)
    }
}

impl<C: MonthCalendar> RepaymentEventExpander<C> {
    pub fn new(calendar: C) -> Self {
        Self {
            calendar,
            horizon_overrun_months: DEFAULT_HORIZON_OVERRUN_MONTHS,
        }
    }

    pub fn with_horizon_overrun(mut self, months: u32) -> Self {
        self.horizon_overrun_months = months;
        self
    }

    /// expand every rule and merge the results by ascending date
    ///
    /// Recurring rules stop before `start_date + nominal_periods + overrun`
    /// months. Events sharing a date keep rule input order; callers should
    /// not rely on that order.
    pub fn expand(
        &self,
        rules: &[EarlyRepaymentRule],
        start_date: NaiveDate,
        nominal_periods: u32,
    ) -> Result<Vec<RepaymentEvent>> {
        let horizon = shift_months(
            &self.calendar,
            start_date,
            nominal_periods.saturating_add(self.horizon_overrun_months),
        )?;

        let mut events = Vec::new();
        for rule in rules {
            self.expand_rule(rule, horizon, &mut events)?;
        }

        events.sort_by_key(|event| event.date);
        Ok(events)
    }

    fn expand_rule(
        &self,
        rule: &EarlyRepaymentRule,
        horizon: NaiveDate,
        events: &mut Vec<RepaymentEvent>,
    ) -> Result<()> {
        if rule.frequency == Frequency::Once {
            events.push(RepaymentEvent::from_rule(rule, rule.date));
            return Ok(());
        }

        let step = rule.frequency.month_step();
        if step == 0 {
            tracing::debug!(
                rule_id = %rule.id,
                frequency = %rule.frequency,
                "unrecognized repayment frequency, no events generated"
            );
            return Ok(());
        }

        let mut offset = 0u32;
        loop {
            let date = shift_months(&self.calendar, rule.date, offset)?;
            if date >= horizon {
                break;
            }
            events.push(RepaymentEvent::from_rule(rule, date));
            offset += step;
        }

        Ok(())
    }
}
