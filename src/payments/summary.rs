use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

use super::schedule::{Schedule, ScheduleEntry};

/// aggregate figures for a generated schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub regular_payments: u32,
    pub early_repayments: u32,
    pub initial_payment: Money,
    pub total_interest: Money,
    /// principal retired through regular payments
    pub regular_principal: Money,
    pub early_repayment_total: Money,
    pub total_paid: Money,
    pub payoff_date: Option<NaiveDate>,
}

impl ScheduleSummary {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut summary = Self {
            regular_payments: 0,
            early_repayments: 0,
            initial_payment: schedule.initial_payment,
            total_interest: Money::ZERO,
            regular_principal: Money::ZERO,
            early_repayment_total: Money::ZERO,
            total_paid: Money::ZERO,
            payoff_date: None,
        };

        for entry in &schedule.entries {
            match entry {
                ScheduleEntry::Regular { principal, interest, .. } => {
                    summary.regular_payments += 1;
                    summary.regular_principal += *principal;
                    summary.total_interest += *interest;
                }
                ScheduleEntry::EarlyRepayment { amount, .. } => {
                    summary.early_repayments += 1;
                    summary.early_repayment_total += *amount;
                }
            }
            summary.total_paid += entry.amount();
        }

        if schedule.is_paid_off() {
            summary.payoff_date = schedule.entries.last().map(ScheduleEntry::date);
        }

        summary
    }
}

/// what early repayments saved compared with the plain schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentSavings {
    pub interest_saved: Money,
    pub payments_saved: u32,
}

impl RepaymentSavings {
    /// savings of `actual` over `baseline`, floored at zero
    pub fn compare(baseline: &ScheduleSummary, actual: &ScheduleSummary) -> Self {
        Self {
            interest_saved: (baseline.total_interest - actual.total_interest).max(Money::ZERO),
            payments_saved: baseline.regular_payments.saturating_sub(actual.regular_payments),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::schedule::Termination;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn regular(number: u32, principal: i64, interest: i64, balance: i64) -> ScheduleEntry {
        ScheduleEntry::Regular {
            number,
            date: ymd(2024, number + 1, 1),
            amount: Money::from_major(principal + interest),
            principal: Money::from_major(principal),
            interest: Money::from_major(interest),
            balance: Money::from_major(balance),
        }
    }

    fn sample() -> Schedule {
        Schedule {
            entries: vec![
                regular(1, 300, 30, 700),
                ScheduleEntry::EarlyRepayment {
                    date: ymd(2024, 2, 10),
                    amount: Money::from_major(200),
                    balance: Money::from_major(500),
                    early_repayment_id: Uuid::nil(),
                },
                regular(2, 300, 5, 200),
                regular(3, 200, 2, 0),
            ],
            initial_payment: Money::from_major(330),
            termination: Termination::PaidOff,
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = ScheduleSummary::from_schedule(&sample());

        assert_eq!(summary.regular_payments, 3);
        assert_eq!(summary.early_repayments, 1);
        assert_eq!(summary.total_interest, Money::from_major(37));
        assert_eq!(summary.regular_principal, Money::from_major(800));
        assert_eq!(summary.early_repayment_total, Money::from_major(200));
        assert_eq!(summary.total_paid, Money::from_major(1_037));
        assert_eq!(summary.payoff_date, Some(ymd(2024, 4, 1)));
    }

    #[test]
    fn test_unpaid_schedule_has_no_payoff_date() {
        let mut schedule = sample();
        schedule.termination = Termination::IterationCap {
            periods: 3,
            balance: Money::from_decimal(dec!(0.5)),
        };

        assert_eq!(ScheduleSummary::from_schedule(&schedule).payoff_date, None);
    }

    #[test]
    fn test_savings_are_floored() {
        let base = ScheduleSummary::from_schedule(&sample());
        let mut better = base.clone();
        better.total_interest = Money::from_major(20);
        better.regular_payments = 2;

        let savings = RepaymentSavings::compare(&base, &better);
        assert_eq!(savings.interest_saved, Money::from_major(17));
        assert_eq!(savings.payments_saved, 1);

        let reversed = RepaymentSavings::compare(&better, &base);
        assert_eq!(reversed.interest_saved, Money::ZERO);
        assert_eq!(reversed.payments_saved, 0);
    }
}
