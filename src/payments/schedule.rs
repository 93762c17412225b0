use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{shift_months, EndOfMonthClamp, MonthCalendar};
use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::events::{RepaymentEvent, RepaymentEventExpander};
use crate::types::{EarlyRepaymentRule, LoanTerms, RecalculationPolicy, RuleId};

use super::annuity::AnnuityCalculator;

/// one row of the repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleEntry {
    /// scheduled monthly payment
    Regular {
        number: u32,
        date: NaiveDate,
        amount: Money,
        principal: Money,
        interest: Money,
        balance: Money,
    },
    /// extra principal payment produced by an early repayment rule
    EarlyRepayment {
        date: NaiveDate,
        amount: Money,
        balance: Money,
        early_repayment_id: RuleId,
    },
}

impl ScheduleEntry {
    pub fn date(&self) -> NaiveDate {
        match self {
            ScheduleEntry::Regular { date, .. } | ScheduleEntry::EarlyRepayment { date, .. } => *date,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            ScheduleEntry::Regular { amount, .. } | ScheduleEntry::EarlyRepayment { amount, .. } => *amount,
        }
    }

    /// principal component; an early repayment is all principal
    pub fn principal(&self) -> Money {
        match self {
            ScheduleEntry::Regular { principal, .. } => *principal,
            ScheduleEntry::EarlyRepayment { amount, .. } => *amount,
        }
    }

    pub fn interest(&self) -> Money {
        match self {
            ScheduleEntry::Regular { interest, .. } => *interest,
            ScheduleEntry::EarlyRepayment { .. } => Money::ZERO,
        }
    }

    /// outstanding balance after this row
    pub fn balance(&self) -> Money {
        match self {
            ScheduleEntry::Regular { balance, .. } | ScheduleEntry::EarlyRepayment { balance, .. } => *balance,
        }
    }

    /// period number for regular payments
    pub fn number(&self) -> Option<u32> {
        match self {
            ScheduleEntry::Regular { number, .. } => Some(*number),
            ScheduleEntry::EarlyRepayment { .. } => None,
        }
    }

    /// originating rule for early repayments
    pub fn early_repayment_id(&self) -> Option<RuleId> {
        match self {
            ScheduleEntry::Regular { .. } => None,
            ScheduleEntry::EarlyRepayment { early_repayment_id, .. } => Some(*early_repayment_id),
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, ScheduleEntry::Regular { .. })
    }
}

/// how a schedule run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Termination {
    /// balance reached zero
    PaidOff,
    /// the payment no longer covers the interest accruing in `period`
    NonAmortizing {
        period: u32,
        balance: Money,
        payment: Money,
        interest: Money,
    },
    /// the period cap was exhausted before payoff
    IterationCap {
        periods: u32,
        balance: Money,
    },
}

/// generated schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    /// payment computed from the original terms, before any recalculation
    pub initial_payment: Money,
    pub termination: Termination,
}

impl Schedule {
    pub fn is_paid_off(&self) -> bool {
        self.termination == Termination::PaidOff
    }

    pub fn regular_entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(|entry| entry.is_regular())
    }

    pub fn early_repayment_entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(|entry| !entry.is_regular())
    }

    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(ScheduleEntry::interest).sum()
    }

    /// convert an abnormal termination into an error
    pub fn into_result(self) -> Result<Schedule> {
        match self.termination {
            Termination::PaidOff => Ok(self),
            Termination::NonAmortizing { period, balance, .. } => {
                Err(ScheduleError::NonAmortizing { period, balance })
            }
            Termination::IterationCap { periods, balance } => {
                Err(ScheduleError::IterationCapReached { periods, balance })
            }
        }
    }

    /// serialize the schedule to pretty json
    pub fn json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

/// iteration state threaded from one period to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationState {
    pub period: u32,
    pub balance: Money,
    pub payment: Money,
}

/// what happens after a period has been processed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Continue(AmortizationState),
    Finished(Termination),
}

/// rows emitted by one period and the resulting transition
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodOutcome {
    pub entries: Vec<ScheduleEntry>,
    pub transition: Transition,
}

/// per-loan constants used by the period step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodContext {
    pub monthly_rate: Rate,
    pub nominal_periods: u32,
    pub period_end: NaiveDate,
}

/// month-by-month schedule state machine
#[derive(Debug, Clone)]
pub struct ScheduleGenerator<C = EndOfMonthClamp> {
    calendar: C,
    config: EngineConfig,
}

impl Default for ScheduleGenerator {
    fn default() -> Self {
        Self::new(EndOfMonthClamp, EngineConfig::default())
    }
}

impl ScheduleGenerator {
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(EndOfMonthClamp, config)
    }
}

impl<C: MonthCalendar> ScheduleGenerator<C> {
    pub fn new(calendar: C, config: EngineConfig) -> Self {
        Self { calendar, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// state before the first period
    pub fn initial_state(&self, terms: &LoanTerms) -> AmortizationState {
        AmortizationState {
            period: 1,
            balance: terms.principal,
            payment: AnnuityCalculator::payment(
                terms.principal,
                i64::from(terms.nominal_periods()),
                terms.monthly_rate(),
            ),
        }
    }

    /// expand `rules` and run the schedule
    pub fn generate_with_rules(
        &self,
        terms: &LoanTerms,
        rules: &[EarlyRepaymentRule],
    ) -> Result<Schedule>
    where
        C: Clone,
    {
        let events = RepaymentEventExpander::new(self.calendar.clone())
            .with_horizon_overrun(self.config.horizon_overrun_months)
            .expand(rules, terms.start_date, terms.nominal_periods())?;

        self.generate(terms, &events)
    }

    /// run the schedule against pre-expanded events
    ///
    /// Abnormal endings are reported through `Schedule::termination`
    /// together with the rows produced up to that point. Errors are only
    /// returned when a period boundary falls outside the calendar range.
    pub fn generate(&self, terms: &LoanTerms, events: &[RepaymentEvent]) -> Result<Schedule> {
        let events = sorted_by_date(events);
        let epsilon = self.config.balance_epsilon;

        let mut state = self.initial_state(terms);
        let initial_payment = state.payment;
        let mut entries = Vec::new();
        let mut finished = None;

        while state.balance > epsilon && state.period <= self.config.max_periods {
            let period_start = shift_months(&self.calendar, terms.start_date, state.period - 1)?;
            let period_end = shift_months(&self.calendar, terms.start_date, state.period)?;
            let due = due_events(&events, period_start, period_end, state.period == 1);

            let context = PeriodContext {
                monthly_rate: terms.monthly_rate(),
                nominal_periods: terms.nominal_periods(),
                period_end,
            };

            let outcome = self.step(state, &context, due);
            entries.extend(outcome.entries);

            match outcome.transition {
                Transition::Continue(next) => state = next,
                Transition::Finished(termination) => {
                    finished = Some(termination);
                    break;
                }
            }
        }

        let termination = match finished {
            Some(termination) => termination,
            None if state.balance <= epsilon => Termination::PaidOff,
            None => Termination::IterationCap {
                periods: self.config.max_periods,
                balance: state.balance,
            },
        };

        if termination != Termination::PaidOff {
            tracing::warn!(
                principal = %terms.principal,
                rows = entries.len(),
                ?termination,
                "schedule did not pay off"
            );
        }

        Ok(Schedule {
            entries,
            initial_payment,
            termination,
        })
    }

    /// process one period: regular payment, then any due early repayments
    pub fn step(
        &self,
        state: AmortizationState,
        context: &PeriodContext,
        due: &[RepaymentEvent],
    ) -> PeriodOutcome {
        let epsilon = self.config.balance_epsilon;
        let mut entries = Vec::with_capacity(1 + due.len());

        let interest = state.balance * context.monthly_rate;
        let mut amount = state.payment;
        let mut principal = amount - interest;

        // final payment only covers what is left
        if state.balance + interest < amount {
            principal = state.balance;
            amount = principal + interest;
        }
        principal = principal.min(state.balance);

        if !principal.is_positive() {
            return PeriodOutcome {
                entries,
                transition: Transition::Finished(Termination::NonAmortizing {
                    period: state.period,
                    balance: state.balance,
                    payment: state.payment,
                    interest,
                }),
            };
        }

        let mut balance = state.balance - principal;
        let paid_off = balance <= epsilon;
        if paid_off {
            balance = Money::ZERO;
        }

        tracing::trace!(
            period = state.period,
            amount = %amount,
            principal = %principal,
            interest = %interest,
            balance = %balance,
            "regular payment"
        );

        entries.push(ScheduleEntry::Regular {
            number: state.period,
            date: context.period_end,
            amount,
            principal,
            interest,
            balance,
        });

        // a paid-off loan takes no further repayments
        if paid_off {
            return PeriodOutcome {
                entries,
                transition: Transition::Finished(Termination::PaidOff),
            };
        }

        let mut applied = false;
        let mut reduce_payment = false;

        for event in due {
            if balance.is_zero() {
                break;
            }

            let paid = event.amount.min(balance);
            balance -= paid;
            if balance <= epsilon {
                balance = Money::ZERO;
            }

            entries.push(ScheduleEntry::EarlyRepayment {
                date: event.date,
                amount: paid,
                balance,
                early_repayment_id: event.rule_id,
            });

            applied = true;
            reduce_payment |= event.recalc_type == RecalculationPolicy::ReducePayment;
        }

        if balance.is_zero() {
            return PeriodOutcome {
                entries,
                transition: Transition::Finished(Termination::PaidOff),
            };
        }

        let payment = if applied && reduce_payment {
            let remaining = i64::from(context.nominal_periods) - i64::from(state.period);
            let payment = AnnuityCalculator::payment(balance, remaining, context.monthly_rate);
            tracing::debug!(
                period = state.period,
                remaining,
                old_payment = %state.payment,
                new_payment = %payment,
                "payment recalculated after early repayment"
            );
            payment
        } else {
            state.payment
        };

        PeriodOutcome {
            entries,
            transition: Transition::Continue(AmortizationState {
                period: state.period + 1,
                balance,
                payment,
            }),
        }
    }
}

/// events falling in `(start, end]`, or `[start, end]` for the first period
pub fn due_events(
    events: &[RepaymentEvent],
    start: NaiveDate,
    end: NaiveDate,
    inclusive_start: bool,
) -> &[RepaymentEvent] {
    let lo = if inclusive_start {
        events.partition_point(|event| event.date < start)
    } else {
        events.partition_point(|event| event.date <= start)
    };
    let hi = events.partition_point(|event| event.date <= end).max(lo);
    &events[lo..hi]
}

fn sorted_by_date(events: &[RepaymentEvent]) -> Cow<'_, [RepaymentEvent]> {
    if events.windows(2).all(|w| w[0].date <= w[1].date) {
        Cow::Borrowed(events)
    } else {
        let mut owned = events.to_vec();
        owned.sort_by_key(|event| event.date);
        Cow::Owned(owned)
    }
}
