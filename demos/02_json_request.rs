/// json request - parse a request, compute, print the schedule as json
use repayment_schedule_rs::{ScheduleRequest, ScheduleSummary};

const REQUEST: &str = r#"{
    "amount": "500000",
    "term": 24,
    "term_unit": "months",
    "annual_rate_percent": "9.9",
    "start_date": "2024-01-31",
    "early_repayments": [
        {
            "id": "6f1c1d9e-3b1a-4b43-9d3e-2d8c5c1f0a11",
            "date": "2024-03-31",
            "frequency": "1_month",
            "amount": "5000",
            "recalc_type": "reduce_term"
        }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let request = ScheduleRequest::from_json(REQUEST)?;
    let schedule = request.compute()?;

    println!("{}", schedule.json());
    println!("{}", serde_json::to_string_pretty(&ScheduleSummary::from_schedule(&schedule))?);

    Ok(())
}
