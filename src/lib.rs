pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod payments;
pub mod request;
pub mod types;

// re-export key types
pub use calendar::{add_months, EndOfMonthClamp, MonthCalendar};
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use errors::{Result, ScheduleError};
pub use events::{RepaymentEvent, RepaymentEventExpander};
pub use payments::{
    AnnuityCalculator, RepaymentSavings, Schedule, ScheduleEntry, ScheduleGenerator,
    ScheduleSummary, Termination,
};
pub use request::{compute_schedule, ScheduleRequest, ScheduleRequestBuilder};
pub use types::{
    EarlyRepaymentRule, Frequency, LoanTerms, RecalculationPolicy, RuleId, TermUnit,
};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
