/// quick start - minimal example to get started
use chrono::NaiveDate;
use repayment_schedule_rs::{compute_schedule, Money, Rate, TermUnit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;

    // 1,000,000 over 12 months at 12% a year
    let schedule = compute_schedule(
        Money::from_major(1_000_000),
        12,
        TermUnit::Months,
        Rate::from_percentage(12),
        start,
        &[],
    )?;

    println!("monthly payment: {}", schedule.initial_payment.round_dp(2));
    for entry in &schedule.entries {
        println!(
            "{:>3} {}  amount {:>12}  principal {:>12}  interest {:>10}  balance {:>12}",
            entry.number().unwrap_or_default(),
            entry.date(),
            entry.amount().round_dp(2),
            entry.principal().round_dp(2),
            entry.interest().round_dp(2),
            entry.balance().round_dp(2),
        );
    }

    Ok(())
}
