/// early repayments - compare the two recalculation policies
use chrono::NaiveDate;
use repayment_schedule_rs::{
    EarlyRepaymentRule, Money, RecalculationPolicy, ScheduleEntry, ScheduleRequest,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let start = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("invalid start date")?;
    let first_extra = NaiveDate::from_ymd_opt(2024, 7, 1).ok_or("invalid repayment date")?;

    for policy in [RecalculationPolicy::ReduceTerm, RecalculationPolicy::ReducePayment] {
        let request = ScheduleRequest::builder()
            .amount(Money::from_major(3_000_000))
            .term_years(5)
            .annual_rate_percent(rust_decimal_macros::dec!(14.5))
            .start_date(start)
            .early_repayment(EarlyRepaymentRule::every(
                6,
                first_extra,
                Money::from_major(150_000),
                policy,
            ))
            .build()?;

        let schedule = request.compute()?;
        let (summary, savings) = request.summarize()?;

        println!("=== {:?} ===", policy);
        for entry in &schedule.entries {
            match entry {
                ScheduleEntry::Regular { number, date, amount, balance, .. } => {
                    println!("{:>3} {}  {:>12}  balance {:>12}", number, date, amount.round_dp(2), balance.round_dp(2));
                }
                ScheduleEntry::EarlyRepayment { date, amount, balance, .. } => {
                    println!("  + {}  {:>12}  balance {:>12}", date, amount.round_dp(2), balance.round_dp(2));
                }
            }
        }
        println!(
            "payments: {}, interest: {}, saved: {} ({} payments)\n",
            summary.regular_payments,
            summary.total_interest.round_dp(2),
            savings.interest_saved.round_dp(2),
            savings.payments_saved,
        );
    }

    Ok(())
}
