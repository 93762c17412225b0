use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, MAX_ANNUAL_RATE_PERCENT, MAX_LOAN_AMOUNT};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::payments::{RepaymentSavings, Schedule, ScheduleGenerator, ScheduleSummary};
use crate::types::{EarlyRepaymentRule, LoanTerms, RuleId, TermUnit};

/// compute the full repayment schedule for a loan
///
/// Fails on invalid input and when the loan cannot be paid off within the
/// period cap.
pub fn compute_schedule(
    amount: Money,
    term: u32,
    term_unit: TermUnit,
    annual_rate: Rate,
    start_date: NaiveDate,
    early_repayments: &[EarlyRepaymentRule],
) -> Result<Schedule> {
    ScheduleRequest {
        amount,
        term,
        term_unit,
        annual_rate_percent: annual_rate.as_percentage(),
        start_date,
        early_repayments: early_repayments.to_vec(),
    }
    .compute()
}

/// loan terms plus early repayment rules
///
/// Mirrors the arguments of `compute_schedule` so a transport layer can
/// deserialize it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub amount: Money,
    pub term: u32,
    pub term_unit: TermUnit,
    /// annual nominal rate in percent, 12 means 12% a year
    pub annual_rate_percent: Decimal,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub early_repayments: Vec<EarlyRepaymentRule>,
}

impl ScheduleRequest {
    pub fn builder() -> ScheduleRequestBuilder {
        ScheduleRequestBuilder::new()
    }

    /// parse and validate a json request
    pub fn from_json(json: &str) -> Result<Self> {
        let request: ScheduleRequest =
            serde_json::from_str(json).map_err(|e| ScheduleError::InvalidConfiguration {
                message: format!("malformed schedule request: {}", e),
            })?;
        request.validate()?;
        Ok(request)
    }

    pub fn terms(&self) -> LoanTerms {
        LoanTerms::new(
            self.amount,
            self.term,
            self.term_unit,
            Rate::from_percent_decimal(self.annual_rate_percent),
            self.start_date,
        )
    }

    /// reject input before it reaches the schedule state machine
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() || self.amount.as_decimal() > MAX_LOAN_AMOUNT {
            return Err(ScheduleError::InvalidLoanAmount { amount: self.amount });
        }

        if self.term == 0 {
            return Err(ScheduleError::InvalidTerm { term: self.term });
        }

        let rate = Rate::from_percent_decimal(self.annual_rate_percent);
        if rate.is_negative() || self.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
            return Err(ScheduleError::InvalidInterestRate { rate });
        }

        for rule in &self.early_repayments {
            if !rule.amount.is_positive() {
                return Err(ScheduleError::InvalidRepaymentAmount {
                    rule_id: rule.id,
                    amount: rule.amount,
                });
            }
        }

        Ok(())
    }

    /// validate and compute with the default engine configuration
    pub fn compute(&self) -> Result<Schedule> {
        self.compute_with(&EngineConfig::default())
    }

    pub fn compute_with(&self, config: &EngineConfig) -> Result<Schedule> {
        self.validate()?;
        config.validate()?;

        ScheduleGenerator::with_config(config.clone())
            .generate_with_rules(&self.terms(), &self.early_repayments)?
            .into_result()
    }

    /// the same loan without any early repayments
    pub fn baseline(&self) -> Self {
        Self {
            early_repayments: Vec::new(),
            ..self.clone()
        }
    }

    /// the same request with one rule removed, for delete-and-recompute flows
    pub fn without_rule(&self, rule_id: RuleId) -> Self {
        Self {
            early_repayments: self
                .early_repayments
                .iter()
                .filter(|rule| rule.id != rule_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// summary of this request alongside the savings over its baseline
    pub fn summarize(&self) -> Result<(ScheduleSummary, RepaymentSavings)> {
        let actual = ScheduleSummary::from_schedule(&self.compute()?);
        let baseline = ScheduleSummary::from_schedule(&self.baseline().compute()?);
        let savings = RepaymentSavings::compare(&baseline, &actual);
        Ok((actual, savings))
    }
}

/// builder for schedule requests
#[derive(Debug, Default)]
pub struct ScheduleRequestBuilder {
    amount: Option<Money>,
    term: Option<(u32, TermUnit)>,
    annual_rate_percent: Option<Decimal>,
    start_date: Option<NaiveDate>,
    early_repayments: Vec<EarlyRepaymentRule>,
}

impl ScheduleRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term = Some((months, TermUnit::Months));
        self
    }

    pub fn term_years(mut self, years: u32) -> Self {
        self.term = Some((years, TermUnit::Years));
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.annual_rate_percent = Some(rate.as_percentage());
        self
    }

    pub fn annual_rate_percent(mut self, percent: Decimal) -> Self {
        self.annual_rate_percent = Some(percent);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn early_repayment(mut self, rule: EarlyRepaymentRule) -> Self {
        self.early_repayments.push(rule);
        self
    }

    pub fn early_repayments(mut self, rules: impl IntoIterator<Item = EarlyRepaymentRule>) -> Self {
        self.early_repayments.extend(rules);
        self
    }

    pub fn build(self) -> Result<ScheduleRequest> {
        let amount = self.amount.ok_or(ScheduleError::InvalidConfiguration {
            message: "Amount required".to_string(),
        })?;

        let (term, term_unit) = self.term.ok_or(ScheduleError::InvalidConfiguration {
            message: "Term required".to_string(),
        })?;

        let annual_rate_percent = self.annual_rate_percent.ok_or(ScheduleError::InvalidConfiguration {
            message: "Rate required".to_string(),
        })?;

        let start_date = self.start_date.ok_or(ScheduleError::InvalidConfiguration {
            message: "Start date required".to_string(),
        })?;

        let request = ScheduleRequest {
            amount,
            term,
            term_unit,
            annual_rate_percent,
            start_date,
            early_repayments: self.early_repayments,
        };
        request.validate()?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, RecalculationPolicy};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_builder() -> ScheduleRequestBuilder {
        ScheduleRequest::builder()
            .amount(Money::from_major(1_000_000))
            .term_years(1)
            .annual_rate_percent(dec!(12))
            .start_date(ymd(2024, 1, 1))
    }

    #[test]
    fn test_compute_schedule_entry_point() {
        let schedule = compute_schedule(
            Money::from_major(1_000_000),
            12,
            TermUnit::Months,
            Rate::from_percentage(12),
            ymd(2024, 1, 1),
            &[],
        )
        .unwrap();

        assert_eq!(schedule.entries.len(), 12);
        assert_eq!(schedule.initial_payment.round_dp(2), Money::from_decimal(dec!(88848.79)));
    }

    #[test]
    fn test_years_and_months_agree() {
        let years = base_builder().build().unwrap().compute().unwrap();
        let months = base_builder().term_months(12).build().unwrap().compute().unwrap();
        assert_eq!(years, months);
    }

    #[test]
    fn test_builder_requires_fields() {
        let missing_amount = ScheduleRequest::builder()
            .term_months(12)
            .rate(Rate::from_percentage(5))
            .start_date(ymd(2024, 1, 1))
            .build();

        assert!(matches!(
            missing_amount,
            Err(ScheduleError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_numbers() {
        assert!(matches!(
            base_builder().amount(Money::ZERO).build(),
            Err(ScheduleError::InvalidLoanAmount { .. })
        ));
        assert!(matches!(
            base_builder().term_months(0).build(),
            Err(ScheduleError::InvalidTerm { term: 0 })
        ));
        assert!(matches!(
            base_builder().annual_rate_percent(dec!(-1)).build(),
            Err(ScheduleError::InvalidInterestRate { .. })
        ));

        let negative = EarlyRepaymentRule::once(
            ymd(2024, 3, 1),
            Money::from_major(-5),
            RecalculationPolicy::ReduceTerm,
        );
        let rule_id = negative.id;
        assert_eq!(
            base_builder().early_repayment(negative).build(),
            Err(ScheduleError::InvalidRepaymentAmount {
                rule_id,
                amount: Money::from_major(-5),
            })
        );
    }

    #[test]
    fn test_rejects_out_of_range_amount_and_rate() {
        let oversized = compute_schedule(
            Money::from_decimal(dec!(50_000_000_000_000_000_000_000_000_000)),
            12,
            TermUnit::Months,
            Rate::from_percent_decimal(dec!(2400)),
            ymd(2024, 1, 1),
            &[],
        );
        assert!(matches!(oversized, Err(ScheduleError::InvalidLoanAmount { .. })));

        assert!(matches!(
            base_builder().annual_rate_percent(dec!(2400)).build(),
            Err(ScheduleError::InvalidInterestRate { .. })
        ));
    }

    #[test]
    fn test_largest_accepted_input_computes() {
        let schedule = compute_schedule(
            Money::from_decimal(MAX_LOAN_AMOUNT),
            12,
            TermUnit::Months,
            Rate::from_percent_decimal(MAX_ANNUAL_RATE_PERCENT),
            ymd(2024, 1, 1),
            &[],
        )
        .unwrap();

        assert!(schedule.is_paid_off());
        assert_eq!(schedule.entries.len(), 12);
    }

    #[test]
    fn test_non_amortizing_loan_is_an_error() {
        // (1.01)^7000 overflows, so the payment only covers interest
        let result = compute_schedule(
            Money::from_major(1_000),
            7_000,
            TermUnit::Months,
            Rate::from_percentage(12),
            ymd(2024, 1, 1),
            &[],
        );

        assert_eq!(
            result,
            Err(ScheduleError::NonAmortizing {
                period: 1,
                balance: Money::from_major(1_000),
            })
        );
    }

    #[test]
    fn test_compute_with_rejects_bad_config() {
        let request = base_builder().build().unwrap();
        let result = request.compute_with(&EngineConfig::default().with_max_periods(0));
        assert!(matches!(result, Err(ScheduleError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_cap_exhaustion_is_an_error() {
        let request = base_builder().build().unwrap();
        let result = request.compute_with(&EngineConfig::default().with_max_periods(6));
        assert!(matches!(
            result,
            Err(ScheduleError::IterationCapReached { periods: 6, .. })
        ));
    }

    #[test]
    fn test_without_rule_recomputes_baseline() {
        let rule = EarlyRepaymentRule::every(
            2,
            ymd(2024, 2, 15),
            Money::from_major(50_000),
            RecalculationPolicy::ReduceTerm,
        );
        let request = base_builder().early_repayment(rule.clone()).build().unwrap();

        let with_rule = request.compute().unwrap();
        assert!(with_rule
            .early_repayment_entries()
            .all(|entry| entry.early_repayment_id() == Some(rule.id)));

        let without = request.without_rule(rule.id).compute().unwrap();
        assert_eq!(without, request.baseline().compute().unwrap());
        assert_eq!(without.early_repayment_entries().count(), 0);

        // removing an unknown id changes nothing
        assert_eq!(request.without_rule(Uuid::new_v4()), request);
    }

    #[test]
    fn test_summarize_reports_savings() {
        let rule = EarlyRepaymentRule::once(
            ymd(2024, 6, 10),
            Money::from_major(200_000),
            RecalculationPolicy::ReduceTerm,
        );
        let request = base_builder().early_repayment(rule).build().unwrap();

        let (summary, savings) = request.summarize().unwrap();

        assert_eq!(summary.early_repayments, 1);
        assert_eq!(summary.early_repayment_total, Money::from_major(200_000));
        assert!(savings.interest_saved.is_positive());
        assert!(savings.payments_saved >= 1);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "amount": "1000000",
            "term": 1,
            "term_unit": "years",
            "annual_rate_percent": "12",
            "start_date": "2024-01-01",
            "early_repayments": [
                {
                    "id": "6f1c1d9e-3b1a-4b43-9d3e-2d8c5c1f0a11",
                    "date": "2024-03-01",
                    "frequency": "3_months",
                    "amount": "10000",
                    "recalc_type": "reduce_payment"
                },
                {
                    "id": "0b7dd3a4-98a8-4e6e-8f3c-5c7b2d9e1f20",
                    "date": "2024-04-01",
                    "frequency": "every_full_moon",
                    "amount": "10000",
                    "recalc_type": "reduce_term"
                }
            ]
        }"#;

        let request = ScheduleRequest::from_json(json).unwrap();
        assert_eq!(request.terms().nominal_periods(), 12);
        assert_eq!(request.early_repayments[0].frequency, Frequency::Every(3));

        let schedule = request.compute().unwrap();
        let unknown = request.early_repayments[1].id;
        assert!(schedule
            .early_repayment_entries()
            .all(|entry| entry.early_repayment_id() != Some(unknown)));
        assert!(schedule.early_repayment_entries().count() >= 3);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ScheduleRequest::from_json("{\"amount\": 5}"),
            Err(ScheduleError::InvalidConfiguration { .. })
        ));
    }
}
